//! HTTP implementation of the chat backend
//!
//! Talks to the Sofi AI service over reqwest. Every request is bounded by
//! the configured timeout; a timeout is reported as a transport failure like
//! any other request that never completed.

use crate::backend::base::{
    ChatBackend, ChatRequest, ChatResponse, HealthResponse, ModelDescriptor, ModelsResponse,
};
use crate::config::BackendConfig;
use crate::error::{Result, SofiError};

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Chat backend reached over HTTP
///
/// # Examples
///
/// ```no_run
/// use sofi_chat::backend::{ChatBackend, HttpBackend};
/// use sofi_chat::config::BackendConfig;
///
/// # async fn example() -> sofi_chat::error::Result<()> {
/// let backend = HttpBackend::new(&BackendConfig::default())?;
/// let health = backend.health().await?;
/// println!("keys: {:?}", health.key_status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpBackend {
    /// Create a backend client
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sofi-chat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SofiError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized HTTP backend: base_url={}, timeout={}s",
            config.base_url,
            config.timeout_seconds
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn transport_error(&self, url: &str, e: reqwest::Error) -> SofiError {
        if e.is_timeout() {
            tracing::warn!("Request to {} timed out after {:?}", url, self.timeout);
            SofiError::Transport(format!("request timed out after {:?}", self.timeout))
        } else {
            tracing::warn!("Request to {} failed: {}", url, e);
            SofiError::Transport(format!("failed to reach backend: {}", e))
        }
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response> {
        let url = self.endpoint(path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!("Backend returned error {} for {}: {}", status, path, error_text);
            return Err(SofiError::Backend(format!("{} returned {}", path, status)).into());
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn health(&self) -> Result<HealthResponse> {
        let response = self.get("/health").await?;

        // A reachable backend with an odd body is still online.
        match response.json::<HealthResponse>().await {
            Ok(health) => Ok(health),
            Err(e) => {
                tracing::warn!("Failed to parse health response: {}", e);
                Ok(HealthResponse::default())
            }
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelDescriptor>> {
        let response = self.get("/api/models").await?;

        let models: ModelsResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse models response: {}", e);
            SofiError::Backend(format!("Failed to parse models response: {}", e))
        })?;

        tracing::debug!("Backend reported {} models", models.models.len());
        Ok(models.models)
    }

    async fn chat(&self, message: &str) -> Result<ChatResponse> {
        let url = self.endpoint("/api/chat");
        tracing::debug!("POST {} ({} chars)", url, message.chars().count());

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest {
                message: message.to_string(),
            })
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        match serde_json::from_str::<ChatResponse>(&body) {
            Ok(mut chat) => {
                if !status.is_success() && chat.success {
                    tracing::warn!("Backend flagged success with status {}", status);
                    chat.success = false;
                }
                Ok(chat)
            }
            Err(e) => {
                tracing::error!("Unparseable chat response ({}): {}", status, e);
                Err(SofiError::Backend(format!(
                    "Unparseable chat response ({}): {}",
                    status, e
                ))
                .into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let config = BackendConfig {
            base_url: "http://localhost:10000/".to_string(),
            timeout_seconds: 5,
        };
        let backend = HttpBackend::new(&config).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:10000");
        assert_eq!(backend.endpoint("/health"), "http://localhost:10000/health");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Port 9 (discard) on localhost is essentially never listening.
        let config = BackendConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 2,
        };
        let backend = HttpBackend::new(&config).unwrap();
        let err = backend.health().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SofiError>(),
            Some(SofiError::Transport(_))
        ));
    }
}
