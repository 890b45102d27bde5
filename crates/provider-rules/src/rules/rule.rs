use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::duplicate_detection;
use super::facts::FactSet;
use super::license_expiry;
use crate::providers::{CandidateSourceError, DuplicateCandidateSource};

pub const SEVERITY_HIGH: &str = "HIGH";
pub const SEVERITY_MEDIUM: &str = "MEDIUM";
pub const SEVERITY_LOW: &str = "LOW";

/// The closed set of rules the engine knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinRule {
    LicenseExpiry,
    DuplicateDetection,
}

impl BuiltinRule {
    /// Registry key the rule is published under by default.
    pub fn default_name(&self) -> &'static str {
        match self {
            BuiltinRule::LicenseExpiry => license_expiry::RULE_NAME,
            BuiltinRule::DuplicateDetection => duplicate_detection::RULE_NAME,
        }
    }

    /// Run the rule's condition. `Ok(None)` means the rule did not fire.
    pub fn evaluate<S>(
        &self,
        facts: &FactSet,
        candidates: &S,
    ) -> Result<Option<RuleFiring>, RuleError>
    where
        S: DuplicateCandidateSource + ?Sized,
    {
        match self {
            BuiltinRule::LicenseExpiry => Ok(license_expiry::evaluate(facts)),
            BuiltinRule::DuplicateDetection => duplicate_detection::evaluate(facts, candidates),
        }
    }
}

/// What a rule reports when its condition holds. The engine turns it into a [`RuleResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFiring {
    pub severity: String,
    pub message: String,
    pub metadata: String,
    pub facts: Vec<String>,
}

/// A fired rule with its evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleResult {
    pub rule_name: String,
    /// Always true for results the engine returns; absence means the rule did not fire.
    pub triggered: bool,
    pub severity: String,
    pub message: String,
    pub metadata: String,
    pub facts: Vec<String>,
    pub evaluated_at: DateTime<Utc>,
}

impl RuleResult {
    pub(crate) fn fired(rule_name: &str, firing: RuleFiring, evaluated_at: DateTime<Utc>) -> Self {
        Self {
            rule_name: rule_name.to_string(),
            triggered: true,
            severity: firing.severity,
            message: firing.message,
            metadata: firing.metadata,
            facts: firing.facts,
            evaluated_at,
        }
    }
}

/// Failures a rule is allowed to raise past its own boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error(transparent)]
    Candidates(#[from] CandidateSourceError),
}
