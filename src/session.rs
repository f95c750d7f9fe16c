//! Chat session controller
//!
//! [`ChatSession`] owns everything a conversation mutates: the transcript,
//! the session statistics and the store they are persisted to. The view
//! and the backend are collaborators it drives, never state it keeps.
//!
//! Every statistics mutation is followed by a persist. Persistence failures
//! are logged and otherwise ignored; nothing in a session is fatal.

use crate::backend::{ChatBackend, ChatResponse};
use crate::error::SofiError;
use crate::formatter::format_message_text;
use crate::reveal::Animator;
use crate::stats::SessionStats;
use crate::storage::{load_stats, save_stats, KeyValueStore};
use crate::transcript::{Sender, Transcript};
use crate::view::View;

use chrono::Local;
use std::sync::Arc;
use tokio::time::Instant;

/// Model indicator shown until the backend reports one
pub const DEFAULT_MODEL: &str = "auto";

/// Shown when a failed answer carries no text of its own
pub const GENERIC_ERROR: &str = "Error in response";

/// Shown when the chat request never completed
pub const CONNECTION_ERROR: &str =
    "❌ Connection error. Please check your connection and try again.";

/// Question asked before clearing the conversation
pub const CLEAR_PROMPT: &str = "Are you sure you want to clear the conversation?";

/// How a call to [`ChatSession::send_message`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Input was empty after trimming; nothing happened
    Ignored,
    /// The backend answered successfully and the reply was revealed
    Replied,
    /// The backend answered but flagged a failure
    Rejected,
    /// The request never completed
    TransportFailed,
}

/// One interactive conversation
pub struct ChatSession {
    backend: Arc<dyn ChatBackend>,
    store: Box<dyn KeyValueStore>,
    stats: SessionStats,
    transcript: Transcript,
    current_model: String,
    animator: Animator,
}

impl ChatSession {
    /// Create a session, loading statistics from `store`
    ///
    /// # Arguments
    ///
    /// * `backend` - Chat backend to send messages to
    /// * `store` - Durable store holding the statistics record
    /// * `animator` - Reveal animator for assistant replies
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        store: Box<dyn KeyValueStore>,
        animator: Animator,
    ) -> Self {
        let stats = load_stats(store.as_ref());
        tracing::debug!(
            "Loaded statistics: {} messages, {} tokens, {} samples",
            stats.message_count,
            stats.tokens_used,
            stats.response_times.len()
        );

        Self {
            backend,
            store,
            stats,
            transcript: Transcript::default(),
            current_model: DEFAULT_MODEL.to_string(),
            animator,
        }
    }

    /// Replace the greeting-only transcript, for a custom greeting
    pub fn with_transcript(mut self, transcript: Transcript) -> Self {
        self.transcript = transcript;
        self
    }

    /// Render the transcript and the initial indicators
    pub fn start(&mut self, view: &mut dyn View) {
        for message in self.transcript.messages() {
            view.render_message(message, &format_message_text(&message.text));
            view.render_complete(message.id);
        }
        view.set_current_model(&self.current_model);
        view.set_statistics(&self.stats.snapshot());
        view.scroll_to_bottom();
    }

    /// The backend this session talks to
    pub fn backend(&self) -> &dyn ChatBackend {
        self.backend.as_ref()
    }

    /// Current statistics
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Messages of the conversation
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Model that produced the last reply, `auto` before the first one
    pub fn current_model(&self) -> &str {
        &self.current_model
    }

    /// Send one user message and show the backend's answer
    ///
    /// Whitespace-only input is ignored. Otherwise the message count and the
    /// response-time history each grow by exactly one, whatever the outcome,
    /// and statistics are persisted both once the message is counted and
    /// before returning. A successful reply is
    /// revealed to completion before this returns, so reveals never overlap.
    ///
    /// # Arguments
    ///
    /// * `view` - View to render into
    /// * `text` - Raw input as typed
    pub async fn send_message(&mut self, view: &mut dyn View, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }

        let user = self.transcript.push(Sender::User, text);
        view.render_message(&user, &format_message_text(text));
        view.render_complete(user.id);
        view.scroll_to_bottom();
        self.stats.record_message();
        self.persist();
        view.set_statistics(&self.stats.snapshot());
        view.clear_input();
        view.set_typing(true);

        let started = Instant::now();
        let result = self.backend.chat(text).await;
        view.set_typing(false);
        let elapsed = started.elapsed().as_millis() as u64;
        self.stats.record_response_time(elapsed);
        tracing::debug!("Backend round-trip took {}ms", elapsed);

        let outcome = match result {
            Ok(response) if response.success && response.text().is_some() => {
                self.show_reply(view, response).await;
                SendOutcome::Replied
            }
            Ok(response) => {
                tracing::warn!("Backend flagged failure: {:?}", response.text());
                let detail = response.text().unwrap_or(GENERIC_ERROR).to_string();
                self.add_assistant_message(view, &format!("⚠️ {}", detail));
                view.set_last_response(&clock());
                SendOutcome::Rejected
            }
            Err(e) => match e.downcast_ref::<SofiError>() {
                Some(SofiError::Transport(_)) => {
                    tracing::error!("Chat request failed: {:#}", e);
                    self.add_assistant_message(view, CONNECTION_ERROR);
                    SendOutcome::TransportFailed
                }
                _ => {
                    tracing::error!("Chat response unusable: {:#}", e);
                    self.add_assistant_message(view, &format!("⚠️ {}", GENERIC_ERROR));
                    view.set_last_response(&clock());
                    SendOutcome::Rejected
                }
            },
        };

        view.set_statistics(&self.stats.snapshot());
        self.persist();
        outcome
    }

    /// Clear the conversation back to its greeting, after confirmation
    ///
    /// Statistics are reset and persisted. Returns `false` when the user
    /// declined and nothing changed.
    pub fn clear_conversation(&mut self, view: &mut dyn View) -> bool {
        if !view.confirm(CLEAR_PROMPT) {
            tracing::debug!("Clear conversation declined");
            return false;
        }

        let removed = self.transcript.clear_to_greeting();
        let keep: Vec<_> = self.transcript.messages().iter().map(|m| m.id).collect();
        view.retain_messages(&keep);

        self.stats.reset();
        view.set_statistics(&self.stats.snapshot());
        self.persist();

        tracing::info!("Cleared conversation ({} messages removed)", removed);
        true
    }

    async fn show_reply(&mut self, view: &mut dyn View, response: ChatResponse) {
        if let Some(model) = response.model_used.as_deref().filter(|m| !m.is_empty()) {
            self.current_model = model.to_string();
            view.set_current_model(model);
        }
        if let Some(tokens) = response.tokens {
            self.stats.add_tokens(tokens);
        }
        view.set_statistics(&self.stats.snapshot());

        let text = response.text().unwrap_or_default().to_string();
        let id = self.transcript.push(Sender::Assistant, "").id;
        let animator = &self.animator;
        if let Some(message) = self.transcript.get_mut(id) {
            animator.run(view, message, &text).await;
        }
        view.set_last_response(&clock());
    }

    fn add_assistant_message(&mut self, view: &mut dyn View, text: &str) {
        let message = self.transcript.push(Sender::Assistant, text);
        view.render_message(&message, &format_message_text(text));
        view.render_complete(message.id);
        view.scroll_to_bottom();
    }

    fn persist(&mut self) {
        if let Err(e) = save_stats(self.store.as_mut(), &self.stats) {
            tracing::warn!("Failed to persist statistics: {:#}", e);
        }
    }
}

fn clock() -> String {
    Local::now().format("%H:%M").to_string()
}
