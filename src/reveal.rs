//! Typewriter-style reveal of assistant replies
//!
//! [`Reveal`] is a small state machine over the reply text. Each step yields
//! the next chunk and the pause to take before the following step:
//!
//! - a complete fenced code block, flushed as one unit (50ms)
//! - an unterminated fence marker, emitted as a literal backtick (30ms)
//! - any other single character, paced by the character itself:
//!   `.` `!` `?` 100ms, `,` `;` 70ms, whitespace 20ms, anything else 30ms
//!
//! When the text is exhausted the machine is `Flushed` and [`Animator`]
//! replaces the partial markup with the fully formatted reply.
//!
//! Replies are never cancelled once started. Overlap is impossible because
//! [`ChatSession::send_message`](crate::session::ChatSession::send_message)
//! holds the session mutably until the reveal finishes.

use crate::config::RevealConfig;
use crate::formatter::{escape_html, format_message_text, CODE_FENCE};
use crate::transcript::Message;
use crate::view::View;
use std::time::Duration;

/// Pause after a flushed code block
pub const BLOCK_DELAY: Duration = Duration::from_millis(50);
/// Pause after an unterminated fence marker
pub const UNCLOSED_FENCE_DELAY: Duration = Duration::from_millis(30);
/// Pause after `.`, `!` or `?`
pub const SENTENCE_DELAY: Duration = Duration::from_millis(100);
/// Pause after `,` or `;`
pub const CLAUSE_DELAY: Duration = Duration::from_millis(70);
/// Pause after whitespace
pub const WHITESPACE_DELAY: Duration = Duration::from_millis(20);
/// Pause after any other character
pub const CHAR_DELAY: Duration = Duration::from_millis(30);

/// Pause that follows emitting `c`
pub fn char_delay(c: char) -> Duration {
    match c {
        '.' | '!' | '?' => SENTENCE_DELAY,
        ',' | ';' => CLAUSE_DELAY,
        c if c.is_whitespace() => WHITESPACE_DELAY,
        _ => CHAR_DELAY,
    }
}

/// What a single step emits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// One literal character
    Char(char),
    /// A complete fenced block, opening through closing marker
    Block(String),
}

impl Chunk {
    /// Markup to append for this chunk
    pub fn to_markup(&self) -> String {
        match self {
            Self::Char(c) => escape_html(c.encode_utf8(&mut [0u8; 4])),
            Self::Block(raw) => format_message_text(raw),
        }
    }

    /// Raw text this chunk consumed
    pub fn raw(&self) -> String {
        match self {
            Self::Char(c) => c.to_string(),
            Self::Block(raw) => raw.clone(),
        }
    }
}

/// One reveal step: the emitted chunk and the pause before the next step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Emitted chunk
    pub chunk: Chunk,
    /// Pause before the next step
    pub delay: Duration,
}

/// Position of the reveal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    /// Emitting; `index` is the byte offset of the next unread character
    Scanning {
        /// Byte offset into the text
        index: usize,
    },
    /// All text has been emitted
    Flushed,
}

/// Step-by-step reveal of one reply
///
/// # Examples
///
/// ```
/// use sofi_chat::reveal::{Chunk, Reveal, RevealState};
///
/// let mut reveal = Reveal::new("Hi!");
/// let chunks: Vec<Chunk> = reveal.by_ref().map(|step| step.chunk).collect();
/// assert_eq!(chunks, vec![Chunk::Char('H'), Chunk::Char('i'), Chunk::Char('!')]);
/// assert_eq!(reveal.state(), RevealState::Flushed);
/// ```
#[derive(Debug, Clone)]
pub struct Reveal {
    text: String,
    state: RevealState,
}

impl Reveal {
    /// Start revealing `text` from its first character
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            state: RevealState::Scanning { index: 0 },
        }
    }

    /// Full text being revealed
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current state
    pub fn state(&self) -> RevealState {
        self.state
    }

    /// Advance by one step; `None` once the text is exhausted
    pub fn step(&mut self) -> Option<Step> {
        let index = match self.state {
            RevealState::Scanning { index } => index,
            RevealState::Flushed => return None,
        };

        let rest = &self.text[index..];
        let Some(c) = rest.chars().next() else {
            self.state = RevealState::Flushed;
            return None;
        };

        if rest.starts_with(CODE_FENCE) {
            let body_start = CODE_FENCE.len();
            if let Some(close) = rest[body_start..].find(CODE_FENCE) {
                let end = body_start + close + CODE_FENCE.len();
                self.state = RevealState::Scanning { index: index + end };
                return Some(Step {
                    chunk: Chunk::Block(rest[..end].to_string()),
                    delay: BLOCK_DELAY,
                });
            }

            self.state = RevealState::Scanning { index: index + 1 };
            return Some(Step {
                chunk: Chunk::Char(c),
                delay: UNCLOSED_FENCE_DELAY,
            });
        }

        self.state = RevealState::Scanning {
            index: index + c.len_utf8(),
        };
        Some(Step {
            chunk: Chunk::Char(c),
            delay: char_delay(c),
        })
    }
}

impl Iterator for Reveal {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        self.step()
    }
}

/// Drives a [`Reveal`] against a view on the async runtime's timer
#[derive(Debug, Clone)]
pub struct Animator {
    enabled: bool,
    speed: f64,
}

impl Default for Animator {
    fn default() -> Self {
        Self::new(&RevealConfig::default())
    }
}

impl Animator {
    /// Create an animator from configuration
    pub fn new(config: &RevealConfig) -> Self {
        Self {
            enabled: config.enabled,
            speed: if config.speed > 0.0 { config.speed } else { 1.0 },
        }
    }

    /// Whether replies are animated
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Pause actually taken for a nominal delay
    pub fn scaled(&self, delay: Duration) -> Duration {
        if self.speed == 1.0 {
            return delay;
        }
        Duration::from_nanos((delay.as_nanos() as f64 / self.speed).round() as u64)
    }

    /// Reveal `text` into `message`, which must be empty and not yet rendered
    ///
    /// The message frame is inserted first so it shows before any content.
    /// On completion the frame holds `format_message_text(text)` and the
    /// view's post-render hook has run.
    pub async fn run(&self, view: &mut dyn View, message: &mut Message, text: &str) {
        let id = message.id;
        view.open_message(message);
        view.scroll_to_bottom();

        if self.enabled {
            let mut reveal = Reveal::new(text);
            while let Some(step) = reveal.step() {
                message.text.push_str(&step.chunk.raw());
                view.append_markup(id, &step.chunk.to_markup());
                if matches!(step.chunk, Chunk::Block(_)) {
                    view.render_complete(id);
                }
                view.scroll_to_bottom();
                tokio::time::sleep(self.scaled(step.delay)).await;
            }
        } else {
            message.text.push_str(text);
        }

        view.replace_markup(id, &format_message_text(text));
        view.render_complete(id);
        view.scroll_to_bottom();
        tracing::debug!("Reveal of message {} complete", id);
    }
}
