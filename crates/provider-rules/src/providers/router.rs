use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde_json::json;

use super::domain::{ProviderId, ProviderPayload, VerificationStatus};
use super::repository::{ProviderRepository, RepositoryError};
use super::service::{ProviderServiceError, ProviderService};

/// Router exposing provider intake, lookup, and maintenance endpoints.
pub fn provider_router<R>(service: Arc<ProviderService<R>>) -> Router
where
    R: ProviderRepository + 'static,
{
    Router::new()
        .route(
            "/api/providers",
            post(create_handler::<R>).get(list_handler::<R>),
        )
        .route("/api/providers/bulk", post(bulk_handler::<R>))
        .route(
            "/api/providers/:id",
            get(get_handler::<R>)
                .put(update_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .route("/api/providers/npi/:npi", get(npi_handler::<R>))
        .route("/api/providers/status/:status", get(status_handler::<R>))
        .route("/api/providers/:id/normalize", post(normalize_handler::<R>))
        .route(
            "/api/providers/:id/duplicates",
            post(duplicates_handler::<R>),
        )
        .route("/api/providers/:id/audit", get(audit_handler::<R>))
        .with_state(service)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn error_response(err: ProviderServiceError) -> Response {
    let status = match &err {
        ProviderServiceError::Fact(_) => StatusCode::BAD_REQUEST,
        ProviderServiceError::Duplicates(duplicates) => {
            let payload = json!({
                "message": "Potential duplicate providers found",
                "duplicates": duplicates,
            });
            return (StatusCode::CONFLICT, axum::Json(payload)).into_response();
        }
        ProviderServiceError::NotFound(_) | ProviderServiceError::NpiNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        ProviderServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ProviderServiceError::Repository(_) | ProviderServiceError::Candidates(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<ProviderService<R>>>,
    axum::Json(payload): axum::Json<ProviderPayload>,
) -> Response
where
    R: ProviderRepository + 'static,
{
    match service.create(payload) {
        Ok(record) => {
            let view = service.view(&record, today());
            (StatusCode::CREATED, axum::Json(view)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn bulk_handler<R>(
    State(service): State<Arc<ProviderService<R>>>,
    axum::Json(payloads): axum::Json<Vec<ProviderPayload>>,
) -> Response
where
    R: ProviderRepository + 'static,
{
    match service.create_bulk(payloads) {
        Ok(records) => {
            let today = today();
            let views: Vec<_> = records
                .iter()
                .map(|record| service.view(record, today))
                .collect();
            (StatusCode::CREATED, axum::Json(views)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_handler<R>(State(service): State<Arc<ProviderService<R>>>) -> Response
where
    R: ProviderRepository + 'static,
{
    match service.list() {
        Ok(records) => {
            let today = today();
            let views: Vec<_> = records
                .iter()
                .map(|record| service.view(record, today))
                .collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<ProviderService<R>>>,
    Path(id): Path<u64>,
) -> Response
where
    R: ProviderRepository + 'static,
{
    match service.get(ProviderId(id)) {
        Ok(record) => (StatusCode::OK, axum::Json(service.view(&record, today()))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn npi_handler<R>(
    State(service): State<Arc<ProviderService<R>>>,
    Path(npi): Path<String>,
) -> Response
where
    R: ProviderRepository + 'static,
{
    match service.get_by_npi(&npi) {
        Ok(record) => (StatusCode::OK, axum::Json(service.view(&record, today()))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<ProviderService<R>>>,
    Path(status): Path<String>,
) -> Response
where
    R: ProviderRepository + 'static,
{
    let Some(status) = VerificationStatus::parse(&status) else {
        let payload = json!({ "error": format!("unknown verification status '{status}'") });
        return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
    };

    match service.list_by_status(status) {
        Ok(records) => {
            let today = today();
            let views: Vec<_> = records
                .iter()
                .map(|record| service.view(record, today))
                .collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_handler<R>(
    State(service): State<Arc<ProviderService<R>>>,
    Path(id): Path<u64>,
    axum::Json(payload): axum::Json<ProviderPayload>,
) -> Response
where
    R: ProviderRepository + 'static,
{
    match service.update(ProviderId(id), payload) {
        Ok(record) => (StatusCode::OK, axum::Json(service.view(&record, today()))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_handler<R>(
    State(service): State<Arc<ProviderService<R>>>,
    Path(id): Path<u64>,
) -> Response
where
    R: ProviderRepository + 'static,
{
    match service.delete(ProviderId(id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn normalize_handler<R>(
    State(service): State<Arc<ProviderService<R>>>,
    Path(id): Path<u64>,
) -> Response
where
    R: ProviderRepository + 'static,
{
    match service.normalize(ProviderId(id)) {
        Ok(record) => (StatusCode::OK, axum::Json(service.view(&record, today()))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn duplicates_handler<R>(
    State(service): State<Arc<ProviderService<R>>>,
    Path(id): Path<u64>,
) -> Response
where
    R: ProviderRepository + 'static,
{
    match service.find_duplicates(ProviderId(id)) {
        Ok(duplicates) => {
            let payload = json!({
                "count": duplicates.len(),
                "duplicates": duplicates,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn audit_handler<R>(
    State(service): State<Arc<ProviderService<R>>>,
    Path(id): Path<u64>,
) -> Response
where
    R: ProviderRepository + 'static,
{
    match service.audit_trail(ProviderId(id)) {
        Ok(entries) => (StatusCode::OK, axum::Json(entries)).into_response(),
        Err(err) => error_response(err),
    }
}
