use std::collections::BTreeMap;
use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::providers::{
    CandidateSourceError, DuplicateCandidateSource, DuplicateQuery, InMemoryProviderRepository,
    LicensePayload, Provider, ProviderId, ProviderPayload, StaticCandidates,
};
use crate::rules::{FactSet, RuleEngine, RuleEvaluationService};

pub(super) fn today() -> NaiveDate {
    date(2024, 6, 1)
}

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

/// Provider with one license valid well past [`today`].
pub(super) fn current_provider() -> ProviderPayload {
    ProviderPayload {
        npi: "1234567890".to_string(),
        first_name: "John".to_string(),
        middle_name: Some("Michael".to_string()),
        last_name: "Smith".to_string(),
        date_of_birth: Some(date(1980, 5, 15)),
        specialty: Some("Internal Medicine".to_string()),
        licenses: vec![license("MD123456", "CA", date(2030, 6, 1))],
        ..ProviderPayload::default()
    }
}

/// Provider whose only license lapsed before [`today`].
pub(super) fn expired_provider() -> ProviderPayload {
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

pub(super) fn facts(payload: ProviderPayload) -> FactSet {
    FactSet::assemble(payload, BTreeMap::new(), today()).expect("valid facts")
}

pub(super) fn stored(payload: ProviderPayload, id: u64) -> Provider {
    let mut provider = Provider::try_from(payload).expect("valid provider");
    provider.id = Some(ProviderId(id));
    provider
}

pub(super) fn static_engine(candidates: Vec<Provider>) -> RuleEngine<StaticCandidates> {
    let engine = RuleEngine::new(Arc::new(StaticCandidates(candidates)));
    engine.initialize().expect("built-in rules load");
    engine
}

pub(super) fn build_service() -> (
    Arc<RuleEvaluationService<InMemoryProviderRepository>>,
    Arc<InMemoryProviderRepository>,
) {
    let repository = Arc::new(InMemoryProviderRepository::default());
    let service = Arc::new(RuleEvaluationService::new(repository.clone()));
    service.initialize().expect("built-in rules load");
    (service, repository)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Candidate source that cannot be reached.
pub(super) struct FailingCandidates;

impl DuplicateCandidateSource for FailingCandidates {
    fn candidates(&self, _query: &DuplicateQuery) -> Result<Vec<Provider>, CandidateSourceError> {
        Err(CandidateSourceError::Unavailable("registry offline".to_string()))
    }
}
