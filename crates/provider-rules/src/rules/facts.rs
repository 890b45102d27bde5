use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::Value;

use crate::providers::{
    normalize_npi, FactError, License, PracticeLocation, Provider, ProviderPayload,
};

/// Immutable facts a single evaluation reasons over.
///
/// Built fresh for every call and dropped once the engine returns. Rules only
/// ever see a shared reference, so nothing a rule produces can feed back into
/// the facts another rule sees.
#[derive(Debug, Clone, PartialEq)]
pub struct FactSet {
    provider: Provider,
    context: BTreeMap<String, Value>,
    today: NaiveDate,
}

impl FactSet {
    pub fn new(provider: Provider, context: BTreeMap<String, Value>, today: NaiveDate) -> Self {
        Self {
            provider,
            context,
            today,
        }
    }

    /// Validate a payload into typed facts. The NPI is reduced to its digits.
    pub fn assemble(
        payload: ProviderPayload,
        context: BTreeMap<String, Value>,
        today: NaiveDate,
    ) -> Result<Self, FactError> {
        let mut provider = Provider::try_from(payload)?;
        provider.npi = normalize_npi(&provider.npi);
        Ok(Self::new(provider, context, today))
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    pub fn licenses(&self) -> &[License] {
        &self.provider.licenses
    }

    pub fn practice_locations(&self) -> &[PracticeLocation] {
        &self.provider.practice_locations
    }

    /// Opaque caller context; no built-in rule reads it.
    pub fn context(&self) -> &BTreeMap<String, Value> {
        &self.context
    }

    /// Calendar date the derived license values are computed against.
    pub fn today(&self) -> NaiveDate {
        self.today
    }
}
