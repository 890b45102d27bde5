use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::rule::RuleResult;
use crate::providers::ProviderPayload;

fn default_include_facts() -> bool {
    true
}

/// Input to a rule evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    pub provider: ProviderPayload,
    #[serde(default)]
    pub context: BTreeMap<String, Value>,
    /// Rule selector; absent means every registered rule.
    #[serde(default)]
    pub rule_set: Option<String>,
    #[serde(default = "default_include_facts")]
    pub include_facts: bool,
    /// Evaluation date. Defaults to the local calendar date.
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

impl EvaluationRequest {
    pub fn new(provider: ProviderPayload) -> Self {
        Self {
            provider,
            context: BTreeMap::new(),
            rule_set: None,
            include_facts: true,
            today: None,
        }
    }

    pub fn with_rule_set(mut self, rule_set: impl Into<String>) -> Self {
        self.rule_set = Some(rule_set.into());
        self
    }

    pub fn on(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }
}

/// Outcome of one evaluation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResponse {
    pub success: bool,
    pub message: String,
    pub evaluated_at: DateTime<Utc>,
    pub results: Vec<RuleResult>,
    pub metadata: EvaluationMetadata,
}

impl EvaluationResponse {
    pub(crate) fn failed(message: String, evaluated_at: DateTime<Utc>) -> Self {
        Self {
            success: false,
            message,
            evaluated_at,
            results: Vec::new(),
            metadata: EvaluationMetadata::default(),
        }
    }

    pub fn fired_rule_names(&self) -> Vec<&str> {
        self.results
            .iter()
            .map(|result| result.rule_name.as_str())
            .collect()
    }
}

/// Execution summary attached to every response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationMetadata {
    /// Number of rules that fired, not rules examined.
    pub rules_fired: usize,
    /// Evidence lines of every fired rule, in result order.
    pub facts: Vec<String>,
    /// Rules examined during the pass, in registry order.
    #[serde(default)]
    pub rules_evaluated: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, Value>,
}
