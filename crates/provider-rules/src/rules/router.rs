use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde_json::json;
use tracing::warn;

use super::evaluation::{EvaluationRequest, EvaluationResponse};
use super::service::{RuleEvaluationService, RuleServiceError};
use crate::providers::{ProviderId, ProviderRepository};

/// Router exposing rule evaluation and registry introspection.
pub fn rule_router<R>(service: Arc<RuleEvaluationService<R>>) -> Router
where
    R: ProviderRepository + 'static,
{
    Router::new()
        .route("/api/rules", get(rules_handler::<R>))
        .route("/api/rules/status", get(status_handler::<R>))
        .route("/api/rules/evaluate", post(evaluate_handler::<R>))
        .route(
            "/api/rules/evaluate/:provider_id",
            post(evaluate_provider_handler::<R>),
        )
        .with_state(service)
}

fn evaluation_response(result: Result<EvaluationResponse, RuleServiceError>) -> Response {
    match result {
        Ok(response) if response.success => (StatusCode::OK, axum::Json(response)).into_response(),
        Ok(response) => (StatusCode::BAD_REQUEST, axum::Json(response)).into_response(),
        Err(RuleServiceError::ProviderNotFound(id)) => {
            let payload = json!({ "error": format!("provider not found with id: {id}") });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

/// Bodies that fail to deserialize (bad dates included) are reported in the
/// evaluation response shape rather than as a bare extractor rejection.
pub(crate) async fn evaluate_handler<R>(
    State(service): State<Arc<RuleEvaluationService<R>>>,
    payload: Result<axum::Json<EvaluationRequest>, JsonRejection>,
) -> Response
where
    R: ProviderRepository + 'static,
{
    match payload {
        Ok(axum::Json(request)) => evaluation_response(service.evaluate(request)),
        Err(rejection) => {
            let reason = rejection.body_text();
            warn!(%reason, "malformed evaluation request");
            let response =
                EvaluationResponse::failed(format!("Error evaluating rules: {reason}"), Utc::now());
            (StatusCode::BAD_REQUEST, axum::Json(response)).into_response()
        }
    }
}

pub(crate) async fn evaluate_provider_handler<R>(
    State(service): State<Arc<RuleEvaluationService<R>>>,
    Path(provider_id): Path<u64>,
) -> Response
where
    R: ProviderRepository + 'static,
{
    evaluation_response(service.evaluate_for_provider(ProviderId(provider_id)))
}

pub(crate) async fn rules_handler<R>(
    State(service): State<Arc<RuleEvaluationService<R>>>,
) -> Response
where
    R: ProviderRepository + 'static,
{
    let rules = service.loaded_rules();
    let payload = json!({
        "count": rules.len(),
        "rules": rules,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<RuleEvaluationService<R>>>,
) -> Response
where
    R: ProviderRepository + 'static,
{
    let payload = json!({ "initialized": service.is_initialized() });
    (StatusCode::OK, axum::Json(payload)).into_response()
}
