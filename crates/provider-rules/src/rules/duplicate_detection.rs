//! Flags providers whose name and date of birth already exist in the registry.

use serde_json::json;

use super::facts::FactSet;
use super::rule::{RuleError, RuleFiring, SEVERITY_MEDIUM};
use crate::providers::{find_duplicates, DuplicateCandidateSource, DuplicateQuery};

pub const RULE_NAME: &str = "duplicate-detection-rule";

/// Fires when the candidate source holds another provider with the same
/// normalised name and exact date of birth. A candidate source failure fails
/// the rule instead of being read as "no duplicates".
pub(crate) fn evaluate<S>(facts: &FactSet, candidates: &S) -> Result<Option<RuleFiring>, RuleError>
where
    S: DuplicateCandidateSource + ?Sized,
{
    let provider = facts.provider();
    let query = DuplicateQuery::for_provider(provider);
    let matches = find_duplicates(candidates, &query)?;

    if matches.is_empty() {
        return Ok(None);
    }

    let evidence = matches
        .iter()
        .map(|candidate| {
            let id = candidate
                .id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "unsaved".to_string());
            format!("Potential duplicate: provider id {id}, NPI {}", candidate.npi)
        })
        .collect();

    let metadata = json!({
        "npi": provider.npi,
        "matchCount": matches.len(),
        "matchedNpis": matches
            .iter()
            .map(|candidate| candidate.npi.as_str())
            .collect::<Vec<_>>(),
    });

    Ok(Some(RuleFiring {
        severity: SEVERITY_MEDIUM.to_string(),
        message: format!(
            "{RULE_NAME}: found {} potential duplicate provider(s) for {} born {}",
            matches.len(),
            provider.full_name(),
            provider.date_of_birth
        ),
        metadata: metadata.to_string(),
        facts: evidence,
    }))
}
