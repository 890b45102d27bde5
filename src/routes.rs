use crate::demo::{seed_samples, SeedOutcome};
use crate::infra::{AppState, Services};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::Local;
use provider_rules::error::AppError;
use provider_rules::providers::provider_router;
use provider_rules::rules::rule_router;
use serde_json::json;

pub(crate) fn with_api_routes(services: &Services) -> Router {
    let seed = Router::new()
        .route("/api/seed/providers", post(seed_endpoint))
        .with_state(services.clone());

    provider_router(services.providers.clone())
        .merge(rule_router(services.rules.clone()))
        .merge(seed)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn seed_endpoint(State(services): State<Services>) -> Result<Response, AppError> {
    let (message, records) = match seed_samples(&services)? {
        SeedOutcome::Created(records) => ("Sample providers created successfully", records),
        SeedOutcome::AlreadySeeded(records) => ("Sample providers already exist", records),
    };

    let today = Local::now().date_naive();
    let providers: Vec<_> = records
        .iter()
        .map(|record| services.providers.view(record, today))
        .collect();
    let payload = json!({
        "message": message,
        "count": providers.len(),
        "providers": providers,
    });
    Ok((StatusCode::OK, Json(payload)).into_response())
}
