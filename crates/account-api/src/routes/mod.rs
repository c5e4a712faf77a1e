//! API routes

mod auth;
mod health;
pub mod metrics;
mod profiles;
mod types;
mod validation;

use axum::{Router, extract::DefaultBodyLimit};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::state::{AppState, MetricsHandle};

pub use auth::RequireAuth;

/// Request bodies are small JSON documents
const MAX_BODY_SIZE: usize = 64 * 1024;

/// Create the main router
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let mut router = Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(profiles::routes())
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE));

    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router.layer(TraceLayer::new_for_http())
}
