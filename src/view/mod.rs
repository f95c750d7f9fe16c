//! Chat view abstraction
//!
//! The session controller drives a [`View`] the way a web client drives its
//! DOM: messages are inserted as markup elements, grown in place by the
//! reveal animator, and status indicators are updated as results arrive.
//!
//! Two implementations ship with the crate:
//!
//! - [`TerminalView`]: renders to an ANSI terminal
//! - [`RecordingView`]: keeps every call in memory, for tests and headless use

use crate::backend::ModelDescriptor;
use crate::stats::StatsSnapshot;
use crate::transcript::{Message, MessageId};
use std::fmt;

pub mod markup;
pub mod recording;
pub mod terminal;

pub use recording::{RecordingView, ViewEvent};
pub use terminal::TerminalView;

/// Feature list shown by the informational panel
pub const FEATURES: &[&str] = &[
    "🤖 **Smart model selection**: the backend picks the best model for each question",
    "💡 **Step-by-step reasoning**: processes are explained in detail",
    "👩‍💻 **Code syntax**: code blocks are highlighted and can be copied with `/copy`",
    "🎯 **Clear answers**: focused on being precise and useful",
    "🚀 **Real-time replies**: typewriter-style reveal of every answer",
    "📊 **Statistics**: tokens and response times are measured",
    "💾 **Automatic saving**: statistics are stored locally",
];

/// Ready-made prompts offered by `/examples`
pub const EXAMPLE_PROMPTS: &[&str] = &[
    "Explain the difference between a process and a thread",
    "Write a Python function that checks whether a string is a palindrome",
    "How does HTTPS keep my data safe?",
    "Give me a study plan to learn SQL in two weeks",
    "Summarize the main causes of the French Revolution",
];

/// Example prompt by its 1-based number
pub fn example_prompt(number: usize) -> Option<&'static str> {
    number
        .checked_sub(1)
        .and_then(|i| EXAMPLE_PROMPTS.get(i))
        .copied()
}

/// Backend reachability as last observed
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No health check has completed yet
    #[default]
    Unknown,
    /// The health endpoint answered successfully
    Online {
        /// Key status string reported by the backend
        key_status: String,
    },
    /// The health check failed
    Offline,
}

impl ConnectionState {
    /// Whether the backend answered the last health check
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online { .. })
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "Checking…"),
            Self::Online { .. } => write!(f, "Connected"),
            Self::Offline => write!(f, "Disconnected"),
        }
    }
}

/// Rendering surface for a chat session
pub trait View {
    /// Insert a complete message rendered from `markup`
    fn render_message(&mut self, message: &Message, markup: &str);

    /// Insert an empty message frame to be filled by [`View::append_markup`]
    fn open_message(&mut self, message: &Message);

    /// Append markup to the end of a message
    fn append_markup(&mut self, id: MessageId, markup: &str);

    /// Replace the whole content of a message
    fn replace_markup(&mut self, id: MessageId, markup: &str);

    /// Post-insertion hook, called once the markup of `id` is in place
    ///
    /// Implementations locate the message's code blocks here, highlight
    /// them and attach a copy affordance.
    fn render_complete(&mut self, id: MessageId);

    /// Keep the newest content visible
    fn scroll_to_bottom(&mut self);

    /// Show or hide the "assistant is typing" affordance
    fn set_typing(&mut self, visible: bool);

    /// Empty the message input
    fn clear_input(&mut self);

    /// Update the connection indicator
    fn set_connection(&mut self, state: &ConnectionState);

    /// Render the model list (and its count)
    fn set_models(&mut self, models: &[ModelDescriptor]);

    /// Update the model count alone, used when the list cannot be loaded
    fn set_model_count(&mut self, count: usize);

    /// Update the "current model" indicator
    fn set_current_model(&mut self, model: &str);

    /// Update the statistics panel
    fn set_statistics(&mut self, stats: &StatsSnapshot);

    /// Update the "last response" clock
    fn set_last_response(&mut self, time: &str);

    /// Remove every message element except the listed ones
    fn retain_messages(&mut self, keep: &[MessageId]);

    /// Ask the user to confirm an action
    fn confirm(&mut self, prompt: &str) -> bool;

    /// Show the informational feature panel
    fn show_features(&mut self, features: &[&str]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_display() {
        assert_eq!(ConnectionState::Unknown.to_string(), "Checking…");
        assert_eq!(ConnectionState::Offline.to_string(), "Disconnected");
        let online = ConnectionState::Online {
            key_status: "3/5 keys".to_string(),
        };
        assert_eq!(online.to_string(), "Connected");
        assert!(online.is_online());
        assert!(!ConnectionState::Offline.is_online());
    }

    #[test]
    fn test_example_prompt_is_one_based() {
        assert_eq!(example_prompt(1), Some(EXAMPLE_PROMPTS[0]));
        assert_eq!(
            example_prompt(EXAMPLE_PROMPTS.len()),
            EXAMPLE_PROMPTS.last().copied()
        );
        assert_eq!(example_prompt(0), None);
        assert_eq!(example_prompt(EXAMPLE_PROMPTS.len() + 1), None);
    }
}
