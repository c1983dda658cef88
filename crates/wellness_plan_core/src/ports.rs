//! crates/wellness_plan_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, keeping the core
//! independent of how plan content is actually produced.

use crate::domain::{PlanContent, QuestionnaireAnswers};
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait PlanGenerator: Send + Sync {
    /// Produces the weekly workout and meal plan for a set of answers.
    async fn generate(&self, answers: &QuestionnaireAnswers) -> PortResult<PlanContent>;
}
