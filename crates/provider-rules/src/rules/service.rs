use std::sync::Arc;

use tracing::{info, warn};

use super::engine::{EngineError, RuleEngine};
use super::evaluation::{EvaluationRequest, EvaluationResponse};
use crate::providers::{ProviderId, ProviderPayload, ProviderRepository, RepositoryError};

/// Service pairing the rule engine with the provider store that feeds and records it.
pub struct RuleEvaluationService<R> {
    engine: RuleEngine<R>,
    repository: Arc<R>,
}

impl<R> RuleEvaluationService<R>
where
    R: ProviderRepository + 'static,
{
    /// Service over the built-in rules, with the store acting as duplicate candidate source.
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_engine(RuleEngine::new(repository.clone()), repository)
    }

    pub fn with_engine(engine: RuleEngine<R>, repository: Arc<R>) -> Self {
        Self { engine, repository }
    }

    pub fn engine(&self) -> &RuleEngine<R> {
        &self.engine
    }

    pub fn initialize(&self) -> Result<(), EngineError> {
        self.engine.initialize()
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.is_initialized()
    }

    pub fn loaded_rules(&self) -> Vec<String> {
        self.engine.rule_names()
    }

    /// Evaluate a request and, for a stored provider, persist the fired results.
    pub fn evaluate(
        &self,
        request: EvaluationRequest,
    ) -> Result<EvaluationResponse, RuleServiceError> {
        let provider_id = request.provider.id;
        let response = self.engine.evaluate(request);

        if let (true, Some(id)) = (response.success, provider_id) {
            self.persist(id, &response)?;
        }

        Ok(response)
    }

    /// Load a stored provider and evaluate every rule against it.
    pub fn evaluate_for_provider(
        &self,
        id: ProviderId,
    ) -> Result<EvaluationResponse, RuleServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RuleServiceError::ProviderNotFound(id))?;

        let request = EvaluationRequest::new(ProviderPayload::from(&record.provider));
        self.evaluate(request)
    }

    fn persist(&self, id: ProviderId, response: &EvaluationResponse) -> Result<(), RuleServiceError> {
        if response.results.is_empty() {
            return Ok(());
        }

        match self.repository.record_evaluations(id, &response.results) {
            Ok(()) => {
                info!(provider_id = %id, stored = response.results.len(), "rule results recorded");
                Ok(())
            }
            Err(RepositoryError::NotFound) => {
                warn!(provider_id = %id, "provider not stored; rule results not recorded");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Error raised by the rule evaluation service.
#[derive(Debug, thiserror::Error)]
pub enum RuleServiceError {
    #[error("provider not found with id: {0}")]
    ProviderNotFound(ProviderId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
