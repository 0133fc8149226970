use crate::cli::ServeArgs;
use crate::infra::{build_service, AppState};
use crate::routes::with_listings_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use listings_gateway::config::AppConfig;
use listings_gateway::error::AppError;
use listings_gateway::telemetry;
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
    args.provider.apply(&mut config);

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let listings_service = build_service(&config)?;

    let app = with_listings_routes(listings_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        provider = %config.provider.base_url,
        "listings gateway ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
