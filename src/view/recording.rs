//! In-memory view that records every call
//!
//! Keeps the same element model a DOM would (message id → markup, in
//! insertion order) plus an event log, so tests can assert both on the final
//! state and on the ordering of rendering steps.

use crate::backend::ModelDescriptor;
use crate::stats::StatsSnapshot;
use crate::transcript::{Message, MessageId, Sender};
use crate::view::{ConnectionState, View};

/// One recorded view call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// A complete message was rendered
    Render(MessageId, Sender),
    /// An empty frame was opened
    Open(MessageId),
    /// Markup was appended
    Append(MessageId, String),
    /// Markup was replaced
    Replace(MessageId, String),
    /// Post-insertion hook ran
    RenderComplete(MessageId),
    /// View scrolled to the bottom
    Scroll,
    /// Typing affordance toggled
    Typing(bool),
    /// Input cleared
    ClearInput,
    /// Connection indicator changed
    Connection(ConnectionState),
    /// Model list rendered
    Models(usize),
    /// Model count set without a list
    ModelCount(usize),
    /// Current model changed
    CurrentModel(String),
    /// Statistics panel updated
    Statistics(StatsSnapshot),
    /// Last-response clock updated
    LastResponse(String),
    /// Messages pruned
    Retain(Vec<MessageId>),
    /// Confirmation requested
    Confirm(String),
    /// Feature panel shown
    Features(usize),
}

/// Recording view with a scripted answer for confirmations
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    /// Every call, in order
    pub events: Vec<ViewEvent>,
    /// Rendered messages as (id, sender, markup), in view order
    pub elements: Vec<(MessageId, Sender, String)>,
    /// Answer returned by [`View::confirm`]
    pub confirm_answer: bool,
    /// Last connection state
    pub connection: ConnectionState,
    /// Last key status while online
    pub key_status: Option<String>,
    /// Last model count
    pub model_count: Option<usize>,
    /// Last rendered model list
    pub models: Vec<ModelDescriptor>,
    /// Last current-model indicator
    pub current_model: Option<String>,
    /// Last statistics panel
    pub statistics: Option<StatsSnapshot>,
    /// Last-response clock
    pub last_response: Option<String>,
    /// Whether the typing affordance is visible
    pub typing: bool,
}

impl RecordingView {
    /// View that answers every confirmation with `answer`
    pub fn confirming(answer: bool) -> Self {
        Self {
            confirm_answer: answer,
            ..Default::default()
        }
    }

    /// Markup of a rendered message
    pub fn markup(&self, id: MessageId) -> Option<&str> {
        self.elements
            .iter()
            .find(|(el, _, _)| *el == id)
            .map(|(_, _, markup)| markup.as_str())
    }

    /// Markup of the most recently inserted message
    pub fn last_markup(&self) -> Option<&str> {
        self.elements.last().map(|(_, _, markup)| markup.as_str())
    }

    /// Number of message elements in the view
    pub fn message_count(&self) -> usize {
        self.elements.len()
    }

    /// Number of recorded events matching `pred`
    pub fn count(&self, pred: impl Fn(&ViewEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    fn element_mut(&mut self, id: MessageId) -> Option<&mut String> {
        self.elements
            .iter_mut()
            .find(|(el, _, _)| *el == id)
            .map(|(_, _, markup)| markup)
    }
}

impl View for RecordingView {
    fn render_message(&mut self, message: &Message, markup: &str) {
        self.elements
            .push((message.id, message.sender, markup.to_string()));
        self.events
            .push(ViewEvent::Render(message.id, message.sender));
    }

    fn open_message(&mut self, message: &Message) {
        self.elements
            .push((message.id, message.sender, String::new()));
        self.events.push(ViewEvent::Open(message.id));
    }

    fn append_markup(&mut self, id: MessageId, markup: &str) {
        if let Some(el) = self.element_mut(id) {
            el.push_str(markup);
        }
        self.events.push(ViewEvent::Append(id, markup.to_string()));
    }

    fn replace_markup(&mut self, id: MessageId, markup: &str) {
        if let Some(el) = self.element_mut(id) {
            *el = markup.to_string();
        }
        self.events.push(ViewEvent::Replace(id, markup.to_string()));
    }

    fn render_complete(&mut self, id: MessageId) {
        self.events.push(ViewEvent::RenderComplete(id));
    }

    fn scroll_to_bottom(&mut self) {
        self.events.push(ViewEvent::Scroll);
    }

    fn set_typing(&mut self, visible: bool) {
        self.typing = visible;
        self.events.push(ViewEvent::Typing(visible));
    }

    fn clear_input(&mut self) {
        self.events.push(ViewEvent::ClearInput);
    }

    fn set_connection(&mut self, state: &ConnectionState) {
        if let ConnectionState::Online { key_status } = state {
            self.key_status = Some(key_status.clone());
        }
        self.connection = state.clone();
        self.events.push(ViewEvent::Connection(state.clone()));
    }

    fn set_models(&mut self, models: &[ModelDescriptor]) {
        self.models = models.to_vec();
        self.model_count = Some(models.len());
        self.events.push(ViewEvent::Models(models.len()));
    }

    fn set_model_count(&mut self, count: usize) {
        self.model_count = Some(count);
        self.events.push(ViewEvent::ModelCount(count));
    }

    fn set_current_model(&mut self, model: &str) {
        self.current_model = Some(model.to_string());
        self.events.push(ViewEvent::CurrentModel(model.to_string()));
    }

    fn set_statistics(&mut self, stats: &StatsSnapshot) {
        self.statistics = Some(stats.clone());
        self.events.push(ViewEvent::Statistics(stats.clone()));
    }

    fn set_last_response(&mut self, time: &str) {
        self.last_response = Some(time.to_string());
        self.events.push(ViewEvent::LastResponse(time.to_string()));
    }

    fn retain_messages(&mut self, keep: &[MessageId]) {
        self.elements.retain(|(id, _, _)| keep.contains(id));
        self.events.push(ViewEvent::Retain(keep.to_vec()));
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        self.events.push(ViewEvent::Confirm(prompt.to_string()));
        self.confirm_answer
    }

    fn show_features(&mut self, features: &[&str]) {
        self.events.push(ViewEvent::Features(features.len()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Transcript;

    #[test]
    fn test_open_append_replace() {
        let mut transcript = Transcript::with_greeting("hi");
        let reply = transcript.push(Sender::Assistant, "");
        let mut view = RecordingView::default();

        view.open_message(&reply);
        view.append_markup(reply.id, "a");
        view.append_markup(reply.id, "b");
        assert_eq!(view.markup(reply.id), Some("ab"));

        view.replace_markup(reply.id, "<em>ab</em>");
        assert_eq!(view.last_markup(), Some("<em>ab</em>"));
        assert_eq!(view.count(|e| matches!(e, ViewEvent::Append(..))), 2);
    }

    #[test]
    fn test_retain_prunes_elements() {
        let mut transcript = Transcript::with_greeting("hi");
        let mut view = RecordingView::default();
        for m in transcript.messages().to_vec() {
            view.render_message(&m, &m.text);
        }
        let user = transcript.push(Sender::User, "q");
        view.render_message(&user, "q");

        view.retain_messages(&[0]);
        assert_eq!(view.message_count(), 1);
        assert_eq!(view.markup(0), Some("hi"));
    }
}
