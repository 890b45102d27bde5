//! Credentialing roster imports: CSV exports in, evaluated providers out.

mod parser;

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::providers::{
    ProviderId, ProviderPayload, ProviderRepository, ProviderService, ProviderServiceError,
};
use crate::rules::{EvaluationRequest, EvaluationResponse, RuleEvaluationService, RuleServiceError};

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Provider(ProviderServiceError),
    Rules(RuleServiceError),
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read roster export: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid roster CSV data: {}", err),
            RosterImportError::Provider(err) => {
                write!(f, "could not store roster providers: {}", err)
            }
            RosterImportError::Rules(err) => {
                write!(f, "could not evaluate roster providers: {}", err)
            }
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            RosterImportError::Provider(err) => Some(err),
            RosterImportError::Rules(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<ProviderServiceError> for RosterImportError {
    fn from(err: ProviderServiceError) -> Self {
        Self::Provider(err)
    }
}

impl From<RuleServiceError> for RosterImportError {
    fn from(err: RuleServiceError) -> Self {
        Self::Rules(err)
    }
}

pub struct RosterImporter;

impl RosterImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ProviderPayload>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// One payload per distinct NPI, in first-seen order.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ProviderPayload>, RosterImportError> {
        Ok(parser::parse_roster(reader)?)
    }
}

/// Outcome of evaluating one roster provider.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub provider_id: Option<ProviderId>,
    pub npi: String,
    pub full_name: String,
    pub response: EvaluationResponse,
}

impl RosterEntry {
    pub fn flagged(&self) -> bool {
        !self.response.results.is_empty()
    }
}

/// Evaluation summary for a whole roster.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterReport {
    pub evaluation_date: Option<NaiveDate>,
    pub entries: Vec<RosterEntry>,
}

impl RosterReport {
    /// Store the roster, then evaluate every stored provider against the whole store.
    ///
    /// Providers are stored before any evaluation so a roster row can be flagged
    /// as a duplicate of a later row.
    pub fn build<R>(
        payloads: Vec<ProviderPayload>,
        providers: &ProviderService<R>,
        rules: &RuleEvaluationService<R>,
        today: NaiveDate,
    ) -> Result<Self, RosterImportError>
    where
        R: ProviderRepository + 'static,
    {
        let records = providers.create_bulk(payloads)?;

        let mut entries = Vec::with_capacity(records.len());
        for record in records {
            let request =
                EvaluationRequest::new(ProviderPayload::from(&record.provider)).on(today);
            let response = rules.evaluate(request)?;
            entries.push(RosterEntry {
                provider_id: record.id(),
                npi: record.provider.npi.clone(),
                full_name: record.provider.full_name(),
                response,
            });
        }

        let report = Self {
            evaluation_date: Some(today),
            entries,
        };
        info!(
            providers = report.entries.len(),
            flagged = report.flagged_count(),
            rules_fired = report.rules_fired(),
            "roster evaluated"
        );
        Ok(report)
    }

    pub fn flagged_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.flagged()).count()
    }

    pub fn rules_fired(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| entry.response.metadata.rules_fired)
            .sum()
    }

    /// Number of fired results per rule name, in first-fired order.
    pub fn fired_by_rule(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for result in self.entries.iter().flat_map(|entry| &entry.response.results) {
            match counts.iter_mut().find(|(name, _)| *name == result.rule_name) {
                Some((_, count)) => *count += 1,
                None => counts.push((result.rule_name.clone(), 1)),
            }
        }
        counts
    }
}
