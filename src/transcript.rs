//! Conversation transcript
//!
//! The ordered list of messages shown in the chat view. Messages are
//! appended on send/receive and never edited afterwards, except that the
//! reveal animator grows the text of the reply it is animating.

use chrono::{DateTime, Local};
use std::fmt;

/// Greeting shown when a conversation starts and kept by "clear conversation"
pub const GREETING: &str = "Hi! I'm **Sofi AI**, your assistant. I pick the best model for every \
question, explain things step by step and highlight code for you.\n\nWhat can I help you with today?";

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    /// The person at the keyboard
    User,
    /// The backend's reply
    Assistant,
}

impl Sender {
    /// Label shown in the message header
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Assistant => "Sofi AI",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// Stable identifier of a rendered message
pub type MessageId = u64;

/// One chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Identifier, unique within a transcript
    pub id: MessageId,
    /// Author
    pub sender: Sender,
    /// Raw (unformatted) text
    pub text: String,
    /// Wall-clock creation time
    pub timestamp: DateTime<Local>,
}

impl Message {
    /// `HH:MM` creation time for message headers
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// Ordered messages of the current conversation
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: MessageId,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::with_greeting(GREETING)
    }
}

impl Transcript {
    /// Start a transcript whose first message is an assistant greeting
    pub fn with_greeting(greeting: &str) -> Self {
        let mut transcript = Self {
            messages: Vec::new(),
            next_id: 0,
        };
        transcript.push(Sender::Assistant, greeting);
        transcript
    }

    /// Append a message and return a copy of it
    pub fn push(&mut self, sender: Sender, text: &str) -> Message {
        let message = Message {
            id: self.next_id,
            sender,
            text: text.to_string(),
            timestamp: Local::now(),
        };
        self.next_id += 1;
        self.messages.push(message.clone());
        message
    }

    /// Look up a message for in-place growth by the reveal animator
    pub fn get_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }

    /// Messages in view order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the transcript holds no message at all
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop every message except the first assistant message
    ///
    /// Returns the number of messages removed.
    pub fn clear_to_greeting(&mut self) -> usize {
        let before = self.messages.len();
        let greeting = self
            .messages
            .iter()
            .position(|m| m.sender == Sender::Assistant)
            .map(|i| self.messages.swap_remove(i));
        self.messages.clear();
        self.messages.extend(greeting);
        before - self.messages.len()
    }
}
