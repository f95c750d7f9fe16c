//! Backend trait and wire types
//!
//! Payload shapes for `GET /health`, `GET /api/models` and `POST /api/chat`.
//! Optional fields default so that sparse or older backends still parse.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

/// Body of a successful `GET /health`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Human-readable state of the backend's model API keys
    #[serde(default)]
    pub key_status: Option<String>,
    /// Free-form status reported by the service
    #[serde(default)]
    pub status: Option<String>,
    /// Service version, when reported
    #[serde(default)]
    pub version: Option<String>,
}

/// One model the backend can route to
///
/// # Examples
///
/// ```
/// use sofi_chat::backend::ModelDescriptor;
///
/// let model: ModelDescriptor =
///     serde_json::from_str(r#"{"name": "Mistral", "for": "Fast answers"}"#).unwrap();
/// assert_eq!(model.best_for, vec!["Fast answers".to_string()]);
/// assert!(!model.key_configured);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Display name
    pub name: String,
    /// Short description of the model
    #[serde(default)]
    pub description: String,
    /// Tags describing what the model is best at
    #[serde(default, alias = "for", deserialize_with = "one_or_many")]
    pub best_for: Vec<String>,
    /// Whether the backend has an API key for this model
    #[serde(default)]
    pub key_configured: bool,
}

/// Body of `GET /api/models`
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsResponse {
    /// Available models
    pub models: Vec<ModelDescriptor>,
}

/// Body of `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    /// The user's message, already trimmed
    pub message: String,
}

/// Answer from `POST /api/chat`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Whether the backend produced a reply
    #[serde(default)]
    pub success: bool,
    /// Reply text on success, error text on failure
    #[serde(default)]
    pub response: Option<String>,
    /// Model that produced the reply
    #[serde(default)]
    pub model_used: Option<String>,
    /// Tokens consumed by the exchange
    #[serde(default)]
    pub tokens: Option<u64>,
    /// Secondary message some backends send instead of `response`
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatResponse {
    /// Text to show for this answer: `response`, else `message`
    pub fn text(&self) -> Option<&str> {
        self.response
            .as_deref()
            .or(self.message.as_deref())
            .filter(|t| !t.is_empty())
    }
}

/// The chat backend as seen by the client
///
/// Implementations report a request that never completed (connection
/// refused, timeout) as [`SofiError::Transport`](crate::error::SofiError::Transport)
/// and any other failure as
/// [`SofiError::Backend`](crate::error::SofiError::Backend).
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Query `GET /health`
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or a non-success status
    async fn health(&self) -> Result<HealthResponse>;

    /// Query `GET /api/models`
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, a non-success status, or a body
    /// without a `models` list
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>>;

    /// Send one message to `POST /api/chat`
    ///
    /// Non-success statuses whose body still parses are returned as a
    /// response so the backend's own error text can be shown.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or an unparseable body
    async fn chat(&self, message: &str) -> Result<ChatResponse>;
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(tag) => vec![tag],
        OneOrMany::Many(tags) => tags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_model_descriptor_full_shape() {
        let model: ModelDescriptor = serde_json::from_value(json!({
            "name": "Qwen Coder",
            "description": "Code specialist",
            "best_for": ["code", "debugging"],
            "key_configured": true
        }))
        .unwrap();
        assert_eq!(model.name, "Qwen Coder");
        assert_eq!(model.best_for, vec!["code", "debugging"]);
        assert!(model.key_configured);
    }

    #[test]
    fn test_model_descriptor_sparse_shape() {
        let model: ModelDescriptor =
            serde_json::from_value(json!({"name": "Gemini", "for": "Creativity"})).unwrap();
        assert_eq!(model.description, "");
        assert_eq!(model.best_for, vec!["Creativity"]);
        assert!(!model.key_configured);
    }

    #[test]
    fn test_model_descriptor_requires_name() {
        let parsed = serde_json::from_value::<ModelDescriptor>(json!({"description": "x"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_chat_request_body() {
        let body = serde_json::to_value(ChatRequest {
            message: "hola".to_string(),
        })
        .unwrap();
        assert_eq!(body, json!({"message": "hola"}));
    }

    #[test]
    fn test_chat_response_optional_fields() {
        let response: ChatResponse =
            serde_json::from_value(json!({"success": true, "response": "hi"})).unwrap();
        assert!(response.success);
        assert_eq!(response.text(), Some("hi"));
        assert_eq!(response.model_used, None);
        assert_eq!(response.tokens, None);
    }

    #[test]
    fn test_chat_response_falls_back_to_message() {
        let response: ChatResponse = serde_json::from_value(json!({
            "success": true,
            "message": "Chat endpoint ready"
        }))
        .unwrap();
        assert_eq!(response.text(), Some("Chat endpoint ready"));
    }

    #[test]
    fn test_chat_response_empty_text_is_none() {
        let response: ChatResponse =
            serde_json::from_value(json!({"success": false, "response": ""})).unwrap();
        assert_eq!(response.text(), None);
    }

    #[test]
    fn test_health_without_key_status() {
        let health: HealthResponse =
            serde_json::from_value(json!({"status": "online", "version": "1.0"})).unwrap();
        assert_eq!(health.key_status, None);
        assert_eq!(health.status.as_deref(), Some("online"));
    }
}
