//! Flags providers holding at least one lapsed license.

use serde_json::json;

use super::facts::FactSet;
use super::rule::{RuleFiring, SEVERITY_HIGH};

pub const RULE_NAME: &str = "license-expiry-rule";

/// Fires when any license is past its expiry date. Expiring today is not expired.
pub(crate) fn evaluate(facts: &FactSet) -> Option<RuleFiring> {
    let today = facts.today();
    let expired: Vec<_> = facts
        .licenses()
        .iter()
        .filter(|license| license.is_expired_on(today))
        .collect();

    if expired.is_empty() {
        return None;
    }

    let provider = facts.provider();
    let evidence = expired
        .iter()
        .map(|license| {
            format!(
                "License {} ({}) expired on {}",
                license.license_number, license.state, license.expiry_date
            )
        })
        .collect();

    let metadata = json!({
        "npi": provider.npi,
        "expiredLicenses": expired
            .iter()
            .map(|license| license.license_number.as_str())
            .collect::<Vec<_>>(),
        "evaluationDate": today.to_string(),
    });

    Some(RuleFiring {
        severity: SEVERITY_HIGH.to_string(),
        message: format!(
            "{RULE_NAME}: provider {} (NPI {}) holds {} expired license(s)",
            provider.full_name(),
            provider.npi,
            expired.len()
        ),
        metadata: metadata.to_string(),
        facts: evidence,
    })
}
