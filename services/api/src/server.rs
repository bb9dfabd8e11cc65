use crate::cli::ServeArgs;
use crate::infra::{build_engine, AppState, ConfiguredStore};
use crate::routes::with_scorecard_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use kpi_scorecard::config::AppConfig;
use kpi_scorecard::error::AppError;
use kpi_scorecard::scorecard::ScorecardService;
use kpi_scorecard::telemetry;
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

    let engine = Arc::new(build_engine(&config.scoring)?);
    let store = Arc::new(ConfiguredStore::from_config(&config.storage));
    let scorecard_service = Arc::new(ScorecardService::load(store, engine)?);

    let app = with_scorecard_routes(scorecard_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        zero_value_policy = ?config.scoring.zero_value_policy,
        "kpi scorecard service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
