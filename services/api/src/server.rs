use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemorySessionStore};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use credit_desk::bureaus::catalog::sample_accounts;
use credit_desk::config::AppConfig;
use credit_desk::disputes::collaborator::Collaborator;
use credit_desk::disputes::comparator::ComparatorConfig;
use credit_desk::disputes::service::DisputeWizardService;
use credit_desk::error::AppError;
use credit_desk::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

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

    let collaborator = Collaborator::from_config(&config.collaborator)?;
    if !collaborator.is_active() {
        warn!("GEMINI_API_KEY is not set; AI analysis and letter drafting will return fallback text");
    }

    let store = Arc::new(InMemorySessionStore::default());
    let service = Arc::new(DisputeWizardService::new(
        store,
        Arc::new(collaborator),
        sample_accounts(),
        ComparatorConfig::default(),
        config.collaborator.request_timeout,
    ));

    let app = with_operational_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "credit desk ready");

    axum::serve(listener, app).await?;
    Ok(())
}
