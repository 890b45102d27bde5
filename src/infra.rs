use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use provider_rules::config::RulesConfig;
use provider_rules::providers::{InMemoryProviderRepository, ProviderService};
use provider_rules::rules::RuleEvaluationService;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Provider and rule services sharing one in-memory provider store.
#[derive(Clone)]
pub(crate) struct Services {
    pub(crate) repository: Arc<InMemoryProviderRepository>,
    pub(crate) providers: Arc<ProviderService<InMemoryProviderRepository>>,
    pub(crate) rules: Arc<RuleEvaluationService<InMemoryProviderRepository>>,
}

impl Services {
    /// Rules are not loaded yet; call `rules.initialize()` before evaluating.
    pub(crate) fn in_memory(config: &RulesConfig) -> Self {
        let repository = Arc::new(InMemoryProviderRepository::default());
        Self {
            providers: Arc::new(ProviderService::new(
                repository.clone(),
                config.expiring_soon_days,
            )),
            rules: Arc::new(RuleEvaluationService::new(repository.clone())),
            repository,
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
