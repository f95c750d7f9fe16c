//! Sofi Chat - terminal client for the Sofi AI chat service
//!
//! This library provides the building blocks of the `sofi` client: the
//! backend client, the conversation controller, the typewriter reveal of
//! replies, message formatting, and local persistence of usage statistics.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `formatter`: Raw message text to markup (code, emphasis, lists, links)
//! - `backend`: Chat backend abstraction and its HTTP implementation
//! - `storage`: Key-value persistence of session statistics
//! - `status`: Health and model-list polling
//! - `session`: Conversation controller driving a view
//! - `reveal`: Character-by-character reveal of replies
//! - `view`: Rendering surface abstraction, terminal and recording views
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sofi_chat::{ChatSession, Config, HttpBackend, MemoryStore, RecordingView};
//! use sofi_chat::reveal::Animator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let backend = Arc::new(HttpBackend::new(&config.backend)?);
//!     let mut session = ChatSession::new(
//!         backend,
//!         Box::new(MemoryStore::new()),
//!         Animator::new(&config.reveal),
//!     );
//!     let mut view = RecordingView::default();
//!     session.send_message(&mut view, "Hello!").await;
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod formatter;
pub mod reveal;
pub mod session;
pub mod stats;
pub mod status;
pub mod storage;
pub mod transcript;
pub mod view;

// Re-export commonly used types
pub use backend::{ChatBackend, HttpBackend};
pub use config::Config;
pub use error::{Result, SofiError};
pub use formatter::format_message_text;
pub use session::{ChatSession, SendOutcome};
pub use stats::SessionStats;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use view::{RecordingView, TerminalView, View};

#[cfg(test)]
pub mod test_utils;
