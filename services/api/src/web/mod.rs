//! services/api/src/web/mod.rs
//!
//! The web layer: REST bootstrap endpoints, the session WebSocket and the
//! background tasks behind them.

pub mod loading_task;
pub mod protocol;
pub mod publish;
pub mod rest;
pub mod state;
pub mod sweep_task;
pub mod ws_handler;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

// Re-export the handlers so the binary can build extra routes around them.
pub use rest::{create_session_handler, health_handler, questionnaire_options_handler};
pub use state::AppState;
pub use ws_handler::ws_handler;

/// Builds the API router: REST bootstrap endpoints plus the session WebSocket.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/sessions", post(create_session_handler))
        .route("/questionnaire/options", get(questionnaire_options_handler))
        .route("/ws", get(ws_handler))
        .with_state(app_state)
}
