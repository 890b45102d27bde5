use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::providers::{
    provider_router, AuditEntry, CandidateSourceError, DuplicateCandidateSource, DuplicateQuery,
    InMemoryProviderRepository, LicensePayload, PracticeLocationPayload, Provider, ProviderId,
    ProviderPayload, ProviderRecord, ProviderRepository, ProviderService, RepositoryError,
};
use crate::rules::RuleResult;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn license(number: &str, state: &str, expiry: NaiveDate) -> LicensePayload {
    LicensePayload {
        license_number: number.to_string(),
        state: state.to_string(),
        license_type: "Medical Doctor".to_string(),
        issue_date: Some(date(2010, 6, 1)),
        expiry_date: Some(expiry),
        status: None,
    }
}

pub(super) fn john_smith() -> ProviderPayload {
    ProviderPayload {
        npi: "1234567890".to_string(),
        first_name: "John".to_string(),
        middle_name: Some("Michael".to_string()),
        last_name: "Smith".to_string(),
        email: Some("john.smith@example.com".to_string()),
        date_of_birth: Some(date(1980, 5, 15)),
        specialty: Some("Internal Medicine".to_string()),
        licenses: vec![license("MD123456", "CA", date(2030, 6, 1))],
        practice_locations: vec![PracticeLocationPayload {
            name: "Main Street Clinic".to_string(),
            address_line1: "123 Main St".to_string(),
            address_line2: Some("Suite 100".to_string()),
            city: "Los Angeles".to_string(),
            state: "CA".to_string(),
            zip_code: "90001".to_string(),
            is_primary: true,
            ..PracticeLocationPayload::default()
        }],
        ..ProviderPayload::default()
    }
}

pub(super) fn jane_doe() -> ProviderPayload {
    ProviderPayload {
        npi: "2345678901".to_string(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        date_of_birth: Some(date(1975, 8, 22)),
        specialty: Some("Pediatrics".to_string()),
        licenses: vec![license("MD789012", "NY", date(2023, 1, 15))],
        ..ProviderPayload::default()
    }
}

pub(super) fn build_service() -> (
    Arc<ProviderService<InMemoryProviderRepository>>,
    Arc<InMemoryProviderRepository>,
) {
    let repository = Arc::new(InMemoryProviderRepository::default());
    let service = Arc::new(ProviderService::new(repository.clone(), 30));
    (service, repository)
}

pub(super) fn router_with_service(
    service: Arc<ProviderService<InMemoryProviderRepository>>,
) -> Router {
    provider_router(service)
}

pub(super) fn json_request<T: Serialize>(method: &str, uri: &str, body: &T) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("serialize body")))
        .expect("request builds")
}

pub(super) fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Store whose backing service is down.
pub(super) struct UnavailableRepository;

impl DuplicateCandidateSource for UnavailableRepository {
    fn candidates(&self, _query: &DuplicateQuery) -> Result<Vec<Provider>, CandidateSourceError> {
        Err(CandidateSourceError::Unavailable("offline".to_string()))
    }
}

impl ProviderRepository for UnavailableRepository {
    fn insert(
        &self,
        _provider: Provider,
        _audit: AuditEntry,
    ) -> Result<ProviderRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn insert_all(
        &self,
        _batch: Vec<(Provider, AuditEntry)>,
    ) -> Result<Vec<ProviderRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn update(&self, _record: ProviderRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn fetch(&self, _id: ProviderId) -> Result<Option<ProviderRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn fetch_by_npi(&self, _npi: &str) -> Result<Option<ProviderRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn list(&self) -> Result<Vec<ProviderRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn delete(&self, _id: ProviderId) -> Result<ProviderRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn record_evaluations(
        &self,
        _id: ProviderId,
        _results: &[RuleResult],
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }
}
