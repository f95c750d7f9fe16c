use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use sofi_chat::config::{BackendConfig, RevealConfig};
use sofi_chat::reveal::Animator;
use sofi_chat::storage::KeyValueStore;
use sofi_chat::{ChatSession, HttpBackend};

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

#[allow(dead_code)]
pub fn backend_for(base_url: &str) -> HttpBackend {
    HttpBackend::new(&BackendConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
    })
    .expect("failed to create backend")
}

#[allow(dead_code)]
pub fn instant_animator() -> Animator {
    Animator::new(&RevealConfig {
        enabled: false,
        speed: 1.0,
    })
}

#[allow(dead_code)]
pub fn session_for(base_url: &str, store: Box<dyn KeyValueStore>) -> ChatSession {
    ChatSession::new(Arc::new(backend_for(base_url)), store, instant_animator())
}
