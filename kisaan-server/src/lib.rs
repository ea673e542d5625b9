//! HTTP service for the Kisaan Sahayak farming assistant.
//!
//! Endpoints: `POST /api/chat`, `GET /api/health`, `GET /api/info`, and
//! `POST /api/index-data`. Handlers are stateless pass-throughs over one
//! dependency-injected [`Assistant`](assistant::Assistant).

use std::sync::Arc;

pub mod assistant;
pub mod config;
pub mod handlers;
pub mod routes;

pub use assistant::{Assistant, AssistantError, Generator, IndexSummary};
pub use config::{AppConfig, Cli, ConfigError};
pub use routes::create_router;

/// Shared state injected into the handlers.
///
/// `assistant` is `None` when startup failed (missing keys, model load or
/// index errors); the service still answers, and the health endpoint
/// reports `not initialized`.
#[derive(Clone, Default)]
pub struct AppState {
    /// The RAG orchestrator, present once startup succeeded.
    pub assistant: Option<Arc<Assistant>>,
}
