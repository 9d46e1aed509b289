//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use edgecmd_app::ports::{DeviceRegistry, EventSink, ProfileRegistry, ProtocolDriver};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Serves the command API under `/api` and a liveness probe at `/health`.
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<DR, PR, D, S>(state: AppState<DR, PR, D, S>) -> Router
where
    DR: DeviceRegistry + Send + Sync + 'static,
    PR: ProfileRegistry + Send + Sync + 'static,
    D: ProtocolDriver + Send + Sync + 'static,
    S: EventSink + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
