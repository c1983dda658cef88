//! services/api/src/web/publish.rs
//!
//! Helpers for pushing server messages to a connected client. Every connection
//! has one outbound queue; a writer task drains it onto the WebSocket.

use crate::web::{
    protocol::{PlanContentView, ServerMessage},
    state::AppState,
};
use tokio::sync::mpsc;
use tracing::error;
use wellness_plan_core::{
    domain::QuestionnaireAnswers,
    ports::{PortError, PortResult},
};

/// The sending half of a connection's outbound queue.
pub type Outbound = mpsc::Sender<ServerMessage>;

/// Queue size per connection. The loading task alone produces about a hundred frames.
pub const OUTBOUND_CAPACITY: usize = 256;

pub async fn send(outbound: &Outbound, message: ServerMessage) -> PortResult<()> {
    outbound
        .send(message)
        .await
        .map_err(|_| PortError::Unexpected("Client connection closed.".to_string()))
}

/// Generates the plan for `answers` and sends it. A generator failure is
/// reported to the client and is not fatal for the connection.
pub async fn publish_plan_content(
    app_state: &AppState,
    answers: Option<QuestionnaireAnswers>,
    outbound: &Outbound,
) -> PortResult<()> {
    let Some(answers) = answers else {
        return send(outbound, ServerMessage::error("There is no plan to show yet.")).await;
    };

    match app_state.plan_generator.generate(&answers).await {
        Ok(content) => {
            let content = PlanContentView::from(&content);
            send(outbound, ServerMessage::PlanContent { content }).await
        }
        Err(e) => {
            error!("Plan generation failed: {:?}", e);
            send(outbound, ServerMessage::error("Failed to generate the plan.")).await
        }
    }
}
