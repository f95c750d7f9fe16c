//! Test utilities for Sofi Chat
//!
//! This module provides a scriptable in-process backend, a store that logs
//! its writes, temporary directory management and assertion helpers shared
//! by unit tests.

use crate::backend::{ChatBackend, ChatResponse, HealthResponse, ModelDescriptor};
use crate::error::{Result, SofiError};
use crate::storage::{KeyValueStore, MemoryStore};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T: std::fmt::Debug>(result: Result<T>, expected: &str) {
    match result {
        Ok(v) => panic!("Expected error containing '{}' but got Ok({:?})", expected, v),
        Err(e) => {
            let error_msg = format!("{:#}", e);
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Memory store that keeps a shared log of every value written
#[derive(Debug, Default, Clone)]
pub struct WriteLogStore {
    inner: MemoryStore,
    writes: Arc<Mutex<Vec<(String, String)>>>,
}

impl WriteLogStore {
    /// Handle on the write log that stays valid after the store is moved
    pub fn writes(&self) -> Arc<Mutex<Vec<(String, String)>>> {
        Arc::clone(&self.writes)
    }
}

impl KeyValueStore for WriteLogStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.writes
            .lock()
            .expect("write log poisoned")
            .push((key.to_string(), value.to_string()));
        self.inner.set(key, value)
    }
}

/// Scripted outcome of one chat call
#[derive(Debug, Clone)]
pub enum FakeReply {
    /// Backend answered with this payload
    Answer(ChatResponse),
    /// Request never completed
    Transport,
    /// Backend answered with something unusable
    Garbage,
}

/// Successful chat payload
pub fn success_reply(text: &str, model: &str, tokens: Option<u64>) -> ChatResponse {
    ChatResponse {
        success: true,
        response: Some(text.to_string()),
        model_used: Some(model.to_string()),
        tokens,
        message: None,
    }
}

/// Failed chat payload
pub fn failure_reply(text: Option<&str>) -> ChatResponse {
    ChatResponse {
        success: false,
        response: text.map(str::to_string),
        ..Default::default()
    }
}

/// In-process backend with scripted answers
///
/// Chat replies are consumed in order; once the script is exhausted every
/// further call is a transport failure.
#[derive(Debug, Default)]
pub struct FakeBackend {
    offline: bool,
    key_status: Option<String>,
    models: Vec<ModelDescriptor>,
    replies: Mutex<VecDeque<FakeReply>>,
    latency: Duration,
    sent: Mutex<Vec<String>>,
}

impl FakeBackend {
    /// Backend whose every request fails at the transport level
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Default::default()
        }
    }

    /// Report `status` from the health endpoint
    pub fn with_key_status(mut self, status: &str) -> Self {
        self.key_status = Some(status.to_string());
        self
    }

    /// Serve models with the given names
    pub fn with_models(mut self, names: Vec<&str>) -> Self {
        self.models = names
            .into_iter()
            .map(|name| ModelDescriptor {
                name: name.to_string(),
                description: format!("{} model", name),
                best_for: vec!["chat".to_string()],
                key_configured: true,
            })
            .collect();
        self
    }

    /// Queue a chat outcome
    pub fn with_reply(self, reply: FakeReply) -> Self {
        self.replies
            .lock()
            .expect("reply script poisoned")
            .push_back(reply);
        self
    }

    /// Wait this long before answering a chat request
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Messages received by the chat endpoint, in order
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().expect("sent log poisoned").clone()
    }

    fn unreachable() -> anyhow::Error {
        SofiError::Transport("connection refused".to_string()).into()
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn health(&self) -> Result<HealthResponse> {
        if self.offline {
            return Err(Self::unreachable());
        }
        Ok(HealthResponse {
            key_status: self.key_status.clone(),
            ..Default::default()
        })
    }

    async fn list_models(&self) -> Result<Vec<ModelDescriptor>> {
        if self.offline {
            return Err(Self::unreachable());
        }
        Ok(self.models.clone())
    }

    async fn chat(&self, message: &str) -> Result<ChatResponse> {
        self.sent
            .lock()
            .expect("sent log poisoned")
            .push(message.to_string());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.offline {
            return Err(Self::unreachable());
        }

        let reply = self
            .replies
            .lock()
            .expect("reply script poisoned")
            .pop_front();
        match reply {
            Some(FakeReply::Answer(response)) => Ok(response),
            Some(FakeReply::Garbage) => {
                Err(SofiError::Backend("Unparseable chat response".to_string()).into())
            }
            Some(FakeReply::Transport) | None => Err(Self::unreachable()),
        }
    }
}
