//! Application state

use account_auth::{TokenSigner, TokenValidator};
use account_db::Database;
use std::sync::Arc;

/// Prometheus handle rendered by the metrics endpoint
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub signer: Arc<TokenSigner>,
    pub validator: Arc<TokenValidator>,
    pub users_per_page: i64,
}

impl AppState {
    pub fn new(
        db: Database,
        signer: TokenSigner,
        validator: TokenValidator,
        users_per_page: i64,
    ) -> Self {
        Self {
            db,
            signer: Arc::new(signer),
            validator: Arc::new(validator),
            users_per_page,
        }
    }
}
