//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod commands;

use axum::Router;
use axum::routing::get;

use edgecmd_app::ports::{DeviceRegistry, EventSink, ProfileRegistry, ProtocolDriver};

use crate::state::AppState;

/// Build the API sub-router, nested under `/api`.
pub fn routes<DR, PR, D, S>() -> Router<AppState<DR, PR, D, S>>
where
    DR: DeviceRegistry + Send + Sync + 'static,
    PR: ProfileRegistry + Send + Sync + 'static,
    D: ProtocolDriver + Send + Sync + 'static,
    S: EventSink + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/v1/device/all/{command}",
            get(commands::all::<DR, PR, D, S>).put(commands::all::<DR, PR, D, S>),
        )
        .route(
            "/v1/device/name/{name}/{command}",
            get(commands::by_name::<DR, PR, D, S>).put(commands::by_name::<DR, PR, D, S>),
        )
        .route(
            "/v1/device/{id}/{command}",
            get(commands::by_id::<DR, PR, D, S>).put(commands::by_id::<DR, PR, D, S>),
        )
}
