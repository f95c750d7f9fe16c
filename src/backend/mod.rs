//! Backend module for Sofi Chat
//!
//! This module contains the contract of the chat backend and its HTTP
//! implementation. The backend itself (model selection, completions) is an
//! external service; only its three endpoints are consumed here.

pub mod base;
pub mod http;

pub use base::{ChatBackend, ChatRequest, ChatResponse, HealthResponse, ModelDescriptor};
pub use http::HttpBackend;
