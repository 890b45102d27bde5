use crate::cli::ServeArgs;
use crate::demo::{seed_samples, SeedOutcome};
use crate::infra::{AppState, Services};
use crate::routes::with_api_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use provider_rules::config::AppConfig;
use provider_rules::error::AppError;
use provider_rules::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let services = Services::in_memory(&config.rules);
    services.rules.initialize()?;

    if config.rules.seed_on_start {
        match seed_samples(&services)? {
            SeedOutcome::Created(records) => info!(count = records.len(), "sample providers seeded"),
            SeedOutcome::AlreadySeeded(records) => {
                info!(count = records.len(), "sample providers already present")
            }
        }
    }

    let app = with_api_routes(&services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        rules = ?services.rules.loaded_rules(),
        "provider rule engine ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
