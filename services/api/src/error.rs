//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service.

use crate::config::ConfigError;
use wellness_plan_core::ports::PortError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error related to the WebSocket connection.
    #[error("WebSocket Error: {0}")]
    Websocket(#[from] axum::Error),

    /// Represents a failure to encode a protocol message.
    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::{
        protocol::ServerMessage,
        publish::{send, Outbound},
    };
    use tokio::sync::mpsc;

    async fn forward(outbound: &Outbound) -> Result<(), ApiError> {
        send(outbound, ServerMessage::toast("Plan deleted")).await?;
        Ok(())
    }

    #[tokio::test]
    async fn closed_outbound_queue_surfaces_as_port_error() {
        let (outbound, inbox) = mpsc::channel(1);
        drop(inbox);

        let err = forward(&outbound).await.unwrap_err();

        assert!(matches!(err, ApiError::Port(PortError::Unexpected(_))));
    }

    #[test]
    fn json_failures_convert_to_serialization_errors() {
        let err: ApiError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();

        assert!(matches!(err, ApiError::Serialization(_)));
        assert!(err.to_string().starts_with("Serialization Error"));
    }
}
