use super::common::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

use serde_json::json;

use crate::providers::StaticCandidates;
use crate::rules::{
    BuiltinRule, EngineError, EvaluationRequest, RegistryError, RuleDefinition, RuleEngine,
    DUPLICATE_DETECTION_RULE, LICENSE_EXPIRY_RULE,
};

#[test]
fn current_unique_provider_fires_nothing() {
    let engine = static_engine(Vec::new());

    let response = engine.evaluate(EvaluationRequest::new(current_provider()).on(today()));

    assert!(response.success);
    assert_eq!(response.message, "Rules evaluated successfully. 0 rules fired.");
    assert!(response.results.is_empty());
    assert_eq!(response.metadata.rules_fired, 0);
    assert!(response.metadata.facts.is_empty());
    assert_eq!(
        response.metadata.rules_evaluated,
        vec![LICENSE_EXPIRY_RULE, DUPLICATE_DETECTION_RULE]
    );
}

#[test]
fn expired_license_fires_license_rule_only() {
    let engine = static_engine(vec![stored(current_provider(), 1)]);

    let response = engine.evaluate(EvaluationRequest::new(expired_provider()).on(today()));

    assert!(response.success);
    assert_eq!(response.fired_rule_names(), vec![LICENSE_EXPIRY_RULE]);
    assert_eq!(response.metadata.rules_fired, 1);
    assert_eq!(
        response.metadata.facts,
        vec!["License MD789012 (NY) expired on 2023-01-15".to_string()]
    );
    assert!(response.results.iter().all(|result| result.triggered));
    assert_eq!(response.metadata.evaluation_date, Some(today()));
}

#[test]
fn stored_twin_fires_duplicate_rule_with_one_match() {
    let engine = static_engine(vec![stored(current_provider(), 1)]);
    let mut subject = current_provider();
    subject.npi = "9999999999".to_string();

    let response = engine.evaluate(EvaluationRequest::new(subject).on(today()));

    assert!(response.success);
    assert_eq!(response.fired_rule_names(), vec![DUPLICATE_DETECTION_RULE]);
    assert_eq!(response.results[0].facts.len(), 1);
    assert!(response.results[0].facts[0].contains("NPI 1234567890"));
}

#[test]
fn rules_fired_counts_results_and_facts_follow_result_order() {
    let engine = static_engine(vec![stored(expired_provider(), 1)]);
    let mut subject = expired_provider();
    subject.npi = "8888888888".to_string();

    let response = engine.evaluate(EvaluationRequest::new(subject).on(today()));

    assert_eq!(
        response.fired_rule_names(),
        vec![LICENSE_EXPIRY_RULE, DUPLICATE_DETECTION_RULE]
    );
    assert_eq!(response.metadata.rules_fired, response.results.len());
    let expected: Vec<String> = response
        .results
        .iter()
        .flat_map(|result| result.facts.clone())
        .collect();
    assert_eq!(response.metadata.facts, expected);
    assert!(response
        .results
        .iter()
        .all(|result| result.evaluated_at == response.evaluated_at));
}

#[test]
fn repeated_evaluation_is_identical_apart_from_timestamps() {
    let engine = static_engine(vec![stored(expired_provider(), 1)]);
    let mut subject = expired_provider();
    subject.npi = "8888888888".to_string();
    let request = EvaluationRequest::new(subject).on(today());

    let first = engine.evaluate(request.clone());
    let second = engine.evaluate(request);

    assert_eq!(first.success, second.success);
    assert_eq!(first.message, second.message);
    assert_eq!(first.metadata, second.metadata);
    assert_eq!(first.results.len(), second.results.len());
    for (left, right) in first.results.iter().zip(&second.results) {
        assert_eq!(left.rule_name, right.rule_name);
        assert_eq!(left.severity, right.severity);
        assert_eq!(left.message, right.message);
        assert_eq!(left.metadata, right.metadata);
        assert_eq!(left.facts, right.facts);
    }
}

#[test]
fn evaluation_before_initialisation_fails_fast() {
    let engine = RuleEngine::new(Arc::new(StaticCandidates::default()));

    assert!(!engine.is_initialized());
    let response = engine.evaluate(EvaluationRequest::new(expired_provider()).on(today()));

    assert!(!response.success);
    assert!(response.results.is_empty());
    assert_eq!(
        response.message,
        "Error evaluating rules: rule engine is not initialized"
    );
    assert_eq!(
        engine.run(&facts(expired_provider()), None, response.evaluated_at),
        Err(EngineError::NotInitialized)
    );
}

#[test]
fn failed_initialisation_leaves_engine_unusable() {
    let engine = RuleEngine::with_definitions(
        Arc::new(StaticCandidates::default()),
        vec![
            RuleDefinition::from(BuiltinRule::LicenseExpiry),
            RuleDefinition::new("  ", BuiltinRule::DuplicateDetection),
        ],
    );

    assert_eq!(
        engine.initialize(),
        Err(EngineError::Registry(RegistryError::BlankName))
    );
    assert!(!engine.is_initialized());
}

#[test]
fn initialisation_can_be_repeated() {
    let engine = static_engine(Vec::new());
    engine.initialize().expect("second load");

    assert!(engine.is_initialized());
    assert_eq!(
        engine.rule_names(),
        vec![LICENSE_EXPIRY_RULE, DUPLICATE_DETECTION_RULE]
    );
}

#[test]
fn candidate_source_failure_fails_the_whole_call() {
    let engine = RuleEngine::new(Arc::new(FailingCandidates));
    engine.initialize().expect("rules load");

    let response = engine.evaluate(EvaluationRequest::new(expired_provider()).on(today()));

    assert!(!response.success);
    assert!(response.results.is_empty());
    assert_eq!(response.metadata.rules_fired, 0);
    assert!(response.message.contains(DUPLICATE_DETECTION_RULE));
    assert!(response.message.contains("registry offline"));
}

#[test]
fn malformed_payload_is_reported_not_raised() {
    let engine = static_engine(Vec::new());
    let mut payload = current_provider();
    payload.npi = String::new();

    let response = engine.evaluate(EvaluationRequest::new(payload).on(today()));

    assert!(!response.success);
    assert_eq!(
        response.message,
        "Error evaluating rules: malformed provider facts: provider is missing required field `npi`"
    );
}

#[test]
fn rule_set_limits_the_pass() {
    let engine = static_engine(vec![stored(expired_provider(), 1)]);
    let mut subject = expired_provider();
    subject.npi = "8888888888".to_string();

    let response = engine.evaluate(
        EvaluationRequest::new(subject.clone())
            .on(today())
            .with_rule_set(DUPLICATE_DETECTION_RULE),
    );
    assert_eq!(response.fired_rule_names(), vec![DUPLICATE_DETECTION_RULE]);
    assert_eq!(
        response.metadata.rules_evaluated,
        vec![DUPLICATE_DETECTION_RULE]
    );
    assert_eq!(
        response.metadata.rule_set.as_deref(),
        Some(DUPLICATE_DETECTION_RULE)
    );

    let response = engine.evaluate(
        EvaluationRequest::new(subject)
            .on(today())
            .with_rule_set("sanctions-rule"),
    );
    assert!(!response.success);
    assert_eq!(
        response.message,
        "Error evaluating rules: unknown rule 'sanctions-rule' in rule set"
    );
}

#[test]
fn rule_set_of_bare_separators_is_refused() {
    let engine = static_engine(Vec::new());

    let response = engine.evaluate(
        EvaluationRequest::new(expired_provider())
            .on(today())
            .with_rule_set(","),
    );

    assert!(!response.success);
    assert!(response.results.is_empty());
    assert_eq!(
        response.message,
        "Error evaluating rules: rule set ',' names no rules"
    );
}

#[test]
fn formatted_npi_reaches_rules_as_digits() {
    let engine = static_engine(Vec::new());
    let mut subject = expired_provider();
    subject.npi = " 234-567 8901 ".to_string();
    let digits = "2345678901";

    let response = engine.evaluate(EvaluationRequest::new(subject).on(today()));

    assert_eq!(response.fired_rule_names(), vec![LICENSE_EXPIRY_RULE]);
    let result = &response.results[0];
    assert!(result.message.contains(&format!("(NPI {digits})")), "{}", result.message);
    let metadata: serde_json::Value =
        serde_json::from_str(&result.metadata).expect("metadata is json");
    assert_eq!(metadata["npi"], digits);
}

#[test]
fn excluding_facts_keeps_per_result_evidence() {
    let engine = static_engine(Vec::new());
    let mut request = EvaluationRequest::new(expired_provider()).on(today());
    request.include_facts = false;
    request.context = BTreeMap::from([("requestedBy".to_string(), json!("intake"))]);

    let response = engine.evaluate(request);

    assert_eq!(response.metadata.rules_fired, 1);
    assert!(response.metadata.facts.is_empty());
    assert_eq!(response.results[0].facts.len(), 1);
    assert_eq!(response.metadata.context["requestedBy"], "intake");
}

#[test]
fn concurrent_evaluations_share_one_registry() {
    let engine = Arc::new(static_engine(vec![stored(current_provider(), 1)]));

    let handles: Vec<_> = (0..8)
        .map(|index| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let mut subject = if index % 2 == 0 {
                    expired_provider()
                } else {
                    current_provider()
                };
                subject.npi = format!("70000000{index:02}");
                engine.evaluate(EvaluationRequest::new(subject).on(today()))
            })
        })
        .collect();

    for (index, handle) in handles.into_iter().enumerate() {
        let response = handle.join().expect("evaluation thread");
        assert!(response.success);
        let expected = if index % 2 == 0 {
            LICENSE_EXPIRY_RULE
        } else {
            DUPLICATE_DETECTION_RULE
        };
        assert_eq!(response.fired_rule_names(), vec![expected]);
    }
}

#[test]
fn request_wire_format_is_camel_case() {
    let raw = json!({
        "provider": {
            "npi": "1234567890",
            "firstName": "John",
            "lastName": "Smith",
            "dateOfBirth": "1980-05-15",
            "licenses": [{
                "licenseNumber": "MD1",
                "state": "CA",
                "licenseType": "Medical Doctor",
                "issueDate": "2010-01-01",
                "expiryDate": "2020-01-01"
            }]
        },
        "ruleSet": "license-expiry-rule",
        "today": "2024-06-01"
    });

    let request: EvaluationRequest = serde_json::from_value(raw).expect("request parses");
    assert!(request.include_facts);

    let response = static_engine(Vec::new()).evaluate(request);
    let value = serde_json::to_value(&response).expect("response serializes");
    assert_eq!(value["metadata"]["rulesFired"], 1);
    assert_eq!(value["results"][0]["ruleName"], LICENSE_EXPIRY_RULE);
    assert!(value["evaluatedAt"].is_string());
}
