use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Local, Utc};
use tracing::{debug, error, info, warn};

use super::evaluation::{EvaluationMetadata, EvaluationRequest, EvaluationResponse};
use super::facts::FactSet;
use super::registry::{standard_definitions, RegistryError, RuleDefinition, RuleRegistry};
use super::rule::{RuleError, RuleResult};
use crate::providers::{DuplicateCandidateSource, FactError};

/// Single-pass evaluator running the rule registry over one fact set at a time.
///
/// The registry is built by [`RuleEngine::initialize`], the only write to shared
/// state. Evaluations before a successful initialisation fail fast with
/// [`EngineError::NotInitialized`] rather than waiting. Once built, the registry
/// is shared read-only, so concurrent evaluations never contend on it beyond
/// cloning an `Arc`.
pub struct RuleEngine<C: ?Sized> {
    definitions: Vec<RuleDefinition>,
    registry: RwLock<Option<Arc<RuleRegistry>>>,
    candidates: Arc<C>,
}

/// Fired results from one pass plus the rules that were examined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulePass {
    pub results: Vec<RuleResult>,
    pub examined: Vec<String>,
}

impl<C> RuleEngine<C>
where
    C: DuplicateCandidateSource + ?Sized,
{
    /// Engine over the built-in rules. Call [`initialize`](Self::initialize) before evaluating.
    pub fn new(candidates: Arc<C>) -> Self {
        Self::with_definitions(candidates, standard_definitions())
    }

    pub fn with_definitions(candidates: Arc<C>, definitions: Vec<RuleDefinition>) -> Self {
        Self {
            definitions,
            registry: RwLock::new(None),
            candidates,
        }
    }

    /// Build the registry from its static definitions.
    ///
    /// Safe to call again: the registry is rebuilt and swapped in whole. A
    /// failed build leaves the engine uninitialised.
    pub fn initialize(&self) -> Result<(), EngineError> {
        let built = RuleRegistry::from_definitions(&self.definitions);
        let mut slot = self.registry.write().unwrap_or_else(PoisonError::into_inner);

        match built {
            Ok(registry) => {
                info!(rules = ?registry.names(), "rule engine initialized");
                *slot = Some(Arc::new(registry));
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "rule engine failed to initialize");
                *slot = None;
                Err(EngineError::Registry(err))
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Names of the configured rules in registration order.
    pub fn rule_names(&self) -> Vec<String> {
        self.definitions
            .iter()
            .map(|definition| definition.name.trim().to_string())
            .collect()
    }

    fn registry(&self) -> Result<Arc<RuleRegistry>, EngineError> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(EngineError::NotInitialized)
    }

    /// Assemble facts from the request and evaluate them.
    pub fn evaluate(&self, request: EvaluationRequest) -> EvaluationResponse {
        let EvaluationRequest {
            provider,
            context,
            rule_set,
            include_facts,
            today,
        } = request;

        let today = today.unwrap_or_else(|| Local::now().date_naive());
        match FactSet::assemble(provider, context, today) {
            Ok(facts) => self.evaluate_facts(&facts, rule_set.as_deref(), include_facts),
            Err(err) => failure(EngineError::Fact(err), Utc::now()),
        }
    }

    /// Evaluate an already assembled fact set.
    ///
    /// Any failure discards the partial results and yields `success = false`.
    pub fn evaluate_facts(
        &self,
        facts: &FactSet,
        rule_set: Option<&str>,
        include_facts: bool,
    ) -> EvaluationResponse {
        let evaluated_at = Utc::now();
        let pass = match self.run(facts, rule_set, evaluated_at) {
            Ok(pass) => pass,
            Err(err) => return failure(err, evaluated_at),
        };

        let rules_fired = pass.results.len();
        let evidence = if include_facts {
            pass.results
                .iter()
                .flat_map(|result| result.facts.iter().cloned())
                .collect()
        } else {
            Vec::new()
        };

        info!(
            npi = %facts.provider().npi,
            rules_fired,
            rules_evaluated = pass.examined.len(),
            "rules evaluated"
        );

        EvaluationResponse {
            success: true,
            message: format!("Rules evaluated successfully. {rules_fired} rules fired."),
            evaluated_at,
            results: pass.results,
            metadata: EvaluationMetadata {
                rules_fired,
                facts: evidence,
                rules_evaluated: pass.examined,
                rule_set: rule_set.map(str::to_string),
                evaluation_date: Some(facts.today()),
                context: facts.context().clone(),
            },
        }
    }

    /// Run the selected rules once, in registry order. Rules never see each other's output.
    pub fn run(
        &self,
        facts: &FactSet,
        rule_set: Option<&str>,
        evaluated_at: DateTime<Utc>,
    ) -> Result<RulePass, EngineError> {
        let registry = self.registry()?;
        let selected = registry.select(rule_set)?;

        let mut results = Vec::new();
        let mut examined = Vec::with_capacity(selected.len());
        for registered in selected {
            examined.push(registered.name().to_string());

            let firing = registered
                .rule()
                .evaluate(facts, self.candidates.as_ref())
                .map_err(|source| EngineError::Rule {
                    rule: registered.name().to_string(),
                    source,
                })?;

            match firing {
                Some(firing) => {
                    debug!(rule = registered.name(), severity = %firing.severity, "rule fired");
                    results.push(RuleResult::fired(registered.name(), firing, evaluated_at));
                }
                None => debug!(rule = registered.name(), "rule did not fire"),
            }
        }

        Ok(RulePass { results, examined })
    }
}

fn failure(err: EngineError, evaluated_at: DateTime<Utc>) -> EvaluationResponse {
    warn!(error = %err, "rule evaluation failed");
    EvaluationResponse::failed(format!("Error evaluating rules: {err}"), evaluated_at)
}

/// Reasons an evaluation call fails as a whole.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("rule engine is not initialized")]
    NotInitialized,
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("malformed provider facts: {0}")]
    Fact(#[from] FactError),
    #[error("rule '{rule}' failed: {source}")]
    Rule { rule: String, source: RuleError },
}
