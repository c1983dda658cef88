//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI document.

use crate::web::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;
use wellness_plan_core::domain::{DietaryRestriction, FitnessLevel, Goal, WorkoutsPerWeek};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        create_session_handler,
        questionnaire_options_handler,
        health_handler,
    ),
    components(
        schemas(CreateSessionResponse, QuestionnaireOptions, OptionItem, WorkoutRange, HealthResponse)
    ),
    tags(
        (name = "MyWellnessPlan API", description = "Session bootstrap and questionnaire metadata for the plan builder.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The response payload sent after successfully creating a session.
#[derive(Serialize, ToSchema)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

/// A selectable questionnaire answer.
#[derive(Serialize, ToSchema, Debug, PartialEq, Eq)]
pub struct OptionItem {
    pub value: String,
    pub label: String,
}

#[derive(Serialize, ToSchema, Debug, PartialEq, Eq)]
pub struct WorkoutRange {
    pub min: u8,
    pub max: u8,
}

/// Everything the questionnaire form needs to render its controls.
#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireOptions {
    pub goals: Vec<OptionItem>,
    pub fitness_levels: Vec<OptionItem>,
    pub workouts_per_week: WorkoutRange,
    pub dietary_restrictions: Vec<OptionItem>,
}

impl QuestionnaireOptions {
    pub fn current() -> Self {
        Self {
            goals: options(Goal::ALL, |g| (g.as_str(), g.label())),
            fitness_levels: options(FitnessLevel::ALL, |l| (l.as_str(), l.label())),
            workouts_per_week: WorkoutRange {
                min: WorkoutsPerWeek::MIN,
                max: WorkoutsPerWeek::MAX,
            },
            dietary_restrictions: options(DietaryRestriction::ALL, |d| (d.as_str(), d.label())),
        }
    }
}

fn options<T: Copy>(all: &[T], describe: impl Fn(T) -> (&'static str, &'static str)) -> Vec<OptionItem> {
    all.iter()
        .map(|item| {
            let (value, label) = describe(*item);
            OptionItem {
                value: value.to_string(),
                label: label.to_string(),
            }
        })
        .collect()
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Create a new planning session.
///
/// The session starts on the home screen with no saved plans. Attach to it by
/// sending `{"type":"init","session_id":...}` as the first WebSocket message on `/ws`.
#[utoipa::path(
    post,
    path = "/sessions",
    responses(
        (status = 201, description = "Session created successfully", body = CreateSessionResponse)
    )
)]
pub async fn create_session_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let session_id = app_state.sessions.create().await;
    info!(%session_id, "Session created.");
    (StatusCode::CREATED, Json(CreateSessionResponse { session_id }))
}

/// List the answers the questionnaire offers.
#[utoipa::path(
    get,
    path = "/questionnaire/options",
    responses(
        (status = 200, description = "Questionnaire options", body = QuestionnaireOptions)
    )
)]
pub async fn questionnaire_options_handler() -> Json<QuestionnaireOptions> {
    Json(QuestionnaireOptions::current())
}

/// Liveness check.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{adapters::StaticPlanGenerator, config::Config, web::router};
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn app() -> (axum::Router, Arc<AppState>) {
        let state = Arc::new(AppState::new(
            Arc::new(Config::default()),
            Arc::new(StaticPlanGenerator::new()),
        ));
        (router(state.clone()), state)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn creating_a_session_registers_it() {
        let (app, state) = app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/sessions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        let session_id: Uuid = json["session_id"].as_str().unwrap().parse().unwrap();
        assert!(state.sessions.get(session_id).await.is_some());
    }

    #[tokio::test]
    async fn questionnaire_options_list_every_code() {
        let (app, _) = app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/questionnaire/options")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["goals"].as_array().unwrap().len(), 4);
        assert_eq!(json["goals"][0]["value"], "weight-loss");
        assert_eq!(json["fitnessLevels"].as_array().unwrap().len(), 3);
        assert_eq!(json["dietaryRestrictions"].as_array().unwrap().len(), 6);
        assert_eq!(json["workoutsPerWeek"]["min"], 2);
        assert_eq!(json["workoutsPerWeek"]["max"], 6);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (app, _) = app();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[test]
    fn openapi_document_lists_all_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.contains(&&"/sessions".to_string()));
        assert!(paths.contains(&&"/questionnaire/options".to_string()));
        assert!(paths.contains(&&"/health".to_string()));
    }
}
