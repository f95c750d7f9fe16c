//! Backend status polling
//!
//! One-shot checks of the backend's health and model list. Neither retries:
//! each call issues a single request and reflects its outcome in the view.
//! They run at session start and again on `/status` and `/models`.

use crate::backend::{ChatBackend, ModelDescriptor};
use crate::view::{ConnectionState, View};

/// Key status shown when the backend does not report one
pub const UNKNOWN_KEY_STATUS: &str = "unknown";

/// Query the health endpoint and update the connection indicator
///
/// Any failure, transport or HTTP, marks the backend offline.
///
/// # Returns
///
/// The connection state shown in the view
pub async fn check_backend_status(
    backend: &dyn ChatBackend,
    view: &mut dyn View,
) -> ConnectionState {
    let state = match backend.health().await {
        Ok(health) => ConnectionState::Online {
            key_status: health
                .key_status
                .unwrap_or_else(|| UNKNOWN_KEY_STATUS.to_string()),
        },
        Err(e) => {
            tracing::error!("Error connecting to backend: {:#}", e);
            ConnectionState::Offline
        }
    };

    view.set_connection(&state);
    state
}

/// Fetch the model list and render it
///
/// On failure the model count is set to zero and nothing else is shown.
///
/// # Returns
///
/// The models rendered, empty on failure
pub async fn load_models(backend: &dyn ChatBackend, view: &mut dyn View) -> Vec<ModelDescriptor> {
    match backend.list_models().await {
        Ok(models) => {
            tracing::info!("Loaded {} models", models.len());
            view.set_models(&models);
            models
        }
        Err(e) => {
            tracing::error!("Error loading models: {:#}", e);
            view.set_model_count(0);
            Vec::new()
        }
    }
}
