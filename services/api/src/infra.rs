use listings_gateway::config::{AppConfig, RentalsConfig};
use listings_gateway::error::AppError;
use listings_gateway::listings::{
    HttpListingsClient, ListingsService, RentalRecord, RentalStoreError, StaticRentalStore,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type GatewayService = ListingsService<HttpListingsClient, StaticRentalStore>;

pub(crate) fn build_service(config: &AppConfig) -> Result<Arc<GatewayService>, AppError> {
    let client = HttpListingsClient::new(config.provider.clone())?;
    let rentals = load_rental_store(&config.rentals)?;
    Ok(Arc::new(ListingsService::new(
        Arc::new(client),
        Arc::new(rentals),
    )))
}

/// Rentals from `RENTALS_FILE`, read once at startup. No file means no rentals.
pub(crate) fn load_rental_store(
    config: &RentalsConfig,
) -> Result<StaticRentalStore, RentalStoreError> {
    match config.source.as_deref() {
        Some(path) => {
            let rentals = read_rentals(path)?;
            info!(path = %path.display(), count = rentals.len(), "rental list loaded");
            Ok(StaticRentalStore::new(rentals))
        }
        None => Ok(StaticRentalStore::default()),
    }
}

fn read_rentals(path: &Path) -> Result<Vec<RentalRecord>, RentalStoreError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| RentalStoreError::Unavailable(format!("{}: {err}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|err| RentalStoreError::Malformed(format!("{}: {err}", path.display())))
}
