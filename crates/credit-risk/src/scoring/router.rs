use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use tracing::{error, warn};

use super::domain::LoanSubmission;
use super::engine::{AssessmentError, RiskEngine};

/// Engine plus the caller-level bound on one assessment.
#[derive(Clone)]
pub struct ScoringState {
    pub engine: RiskEngine,
    pub timeout: Duration,
}

/// Router exposing the scoring endpoints.
pub fn assessment_router(engine: RiskEngine, timeout: Duration) -> Router {
    Router::new()
        .route("/predict", post(predict_handler))
        .route("/decision", post(decision_handler))
        .with_state(ScoringState { engine, timeout })
}

pub(crate) async fn predict_handler(
    State(state): State<ScoringState>,
    payload: Result<Json<LoanSubmission>, JsonRejection>,
) -> Response {
    let Json(submission) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };
    let engine = state.engine.clone();
    match run_bounded(state.timeout, move || engine.assess(submission)).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn decision_handler(
    State(state): State<ScoringState>,
    payload: Result<Json<LoanSubmission>, JsonRejection>,
) -> Response {
    let Json(submission) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };
    let engine = state.engine.clone();
    match run_bounded(state.timeout, move || engine.quick_decision(submission)).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => error_response(err),
    }
}

/// Run CPU-bound scoring off the async workers, giving up after `timeout`.
///
/// The bound applies to the caller's wait only. A blocking job that overruns
/// keeps its thread until it finishes and its result is discarded.
async fn run_bounded<T, F>(timeout: Duration, job: F) -> Result<T, AssessmentError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AssessmentError> + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(job);
    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(join_error)) => {
            error!(error = %join_error, "scoring task aborted");
            Err(AssessmentError::Internal(join_error.to_string()))
        }
        Err(_) => {
            warn!(
                timeout_ms = timeout.as_millis() as u64,
                "assessment timed out; abandoning the scoring task"
            );
            Err(AssessmentError::Timeout(timeout.as_millis()))
        }
    }
}

/// Malformed or incomplete JSON bodies keep the `{"error": ...}` shape.
pub(crate) fn rejection_response(rejection: JsonRejection) -> Response {
    let status = rejection.status();
    let message = rejection.body_text();
    warn!(%status, error = %message, "rejected request body");
    (status, Json(json!({ "error": message }))).into_response()
}

pub(crate) fn error_response(err: AssessmentError) -> Response {
    let (status, message) = match &err {
        AssessmentError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
        AssessmentError::Oracle(_) => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
        AssessmentError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, err.to_string()),
        AssessmentError::Internal(detail) => {
            error!(detail = %detail, "assessment failed internally");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error while scoring application".to_string(),
            )
        }
    };

    (status, Json(json!({ "error": message }))).into_response()
}
