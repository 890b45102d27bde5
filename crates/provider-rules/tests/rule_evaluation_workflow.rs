use std::sync::Arc;

use chrono::NaiveDate;
use provider_rules::providers::{
    InMemoryProviderRepository, LicensePayload, ProviderPayload, ProviderService,
};
use provider_rules::rules::{
    EvaluationRequest, RuleEvaluationService, DUPLICATE_DETECTION_RULE, LICENSE_EXPIRY_RULE,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn provider(npi: &str, first: &str, last: &str, dob: NaiveDate, expiry: NaiveDate) -> ProviderPayload {
    ProviderPayload {
        npi: npi.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        date_of_birth: Some(dob),
        licenses: vec![LicensePayload {
            license_number: format!("MD{npi}"),
            state: "CA".to_string(),
            license_type: "Medical Doctor".to_string(),
            issue_date: Some(date(2010, 1, 1)),
            expiry_date: Some(expiry),
            status: None,
        }],
        ..ProviderPayload::default()
    }
}

struct Registry {
    repository: Arc<InMemoryProviderRepository>,
    providers: ProviderService<InMemoryProviderRepository>,
    rules: RuleEvaluationService<InMemoryProviderRepository>,
}

fn registry() -> Registry {
    let repository = Arc::new(InMemoryProviderRepository::default());
    let providers = ProviderService::new(repository.clone(), 30);
    let rules = RuleEvaluationService::new(repository.clone());
    rules.initialize().expect("built-in rules load");
    Registry {
        repository,
        providers,
        rules,
    }
}

#[test]
fn intake_then_evaluation_flags_a_lapsed_license_and_records_it() {
    let registry = registry();
    let today = date(2024, 6, 1);
    let record = registry
        .providers
        .create(provider(
            "2345678901",
            "Jane",
            "Doe",
            date(1975, 8, 22),
            date(2024, 5, 31),
        ))
        .expect("provider stored");

    let request = EvaluationRequest::new(ProviderPayload::from(&record.provider)).on(today);
    let response = registry.rules.evaluate(request).expect("evaluation runs");

    assert!(response.success);
    assert_eq!(response.fired_rule_names(), vec![LICENSE_EXPIRY_RULE]);

    let stored = registry
        .providers
        .get(record.id().expect("id"))
        .expect("provider present");
    assert_eq!(stored.rule_evaluations.len(), 1);
    assert_eq!(stored.rule_evaluations[0].rule_name, LICENSE_EXPIRY_RULE);
    assert_eq!(registry.repository.len(), 1);
}

#[test]
fn unsaved_applicant_matching_a_stored_provider_is_a_duplicate() {
    let registry = registry();
    registry
        .providers
        .create(provider(
            "1234567890",
            "John",
            "Smith",
            date(1980, 5, 15),
            date(2030, 1, 1),
        ))
        .expect("provider stored");

    let applicant = provider(
        "9876543210",
        "John ",
        " Smith",
        date(1980, 5, 15),
        date(2030, 1, 1),
    );
    let response = registry
        .rules
        .evaluate(EvaluationRequest::new(applicant).on(date(2024, 6, 1)))
        .expect("evaluation runs");

    assert!(response.success);
    assert_eq!(response.fired_rule_names(), vec![DUPLICATE_DETECTION_RULE]);
    assert_eq!(response.results[0].facts.len(), 1);
    assert_eq!(
        response.message,
        "Rules evaluated successfully. 1 rules fired."
    );
}

#[test]
fn duplicate_lookup_and_duplicate_rule_agree() {
    let registry = registry();
    let records = registry
        .providers
        .create_bulk(vec![
            provider("1111111111", "Ana", "Lopez", date(1990, 1, 1), date(2030, 1, 1)),
            provider("2222222222", "ana", "LOPEZ", date(1990, 1, 1), date(2030, 1, 1)),
            provider("3333333333", "Ana", "Lopez", date(1990, 1, 2), date(2030, 1, 1)),
        ])
        .expect("bulk stored");

    for record in &records {
        let id = record.id().expect("id");
        let lookup = registry.providers.find_duplicates(id).expect("lookup");
        let response = registry
            .rules
            .evaluate(EvaluationRequest::new(ProviderPayload::from(&record.provider)).on(date(2024, 6, 1)))
            .expect("evaluation runs");

        let rule_matches = response
            .results
            .iter()
            .find(|result| result.rule_name == DUPLICATE_DETECTION_RULE)
            .map(|result| result.facts.len())
            .unwrap_or(0);
        assert_eq!(lookup.len(), rule_matches);
    }
}

#[test]
fn evaluating_an_unknown_stored_provider_is_not_found() {
    let registry = registry();

    let err = registry
        .rules
        .evaluate_for_provider(provider_rules::providers::ProviderId(41))
        .expect_err("no such provider");

    assert_eq!(err.to_string(), "provider not found with id: 41");
}
