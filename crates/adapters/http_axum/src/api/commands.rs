//! JSON REST handlers for device commands.
//!
//! Every route answers both `GET` (read) and `PUT` (write); the HTTP method is
//! turned into a [`Method`] by [`Method::from_request`].

use std::str::FromStr;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http;
use axum::response::{IntoResponse, Response};

use edgecmd_app::ports::{DeviceRegistry, EventSink, ProfileRegistry, ProtocolDriver};
use edgecmd_domain::command::{DeviceSelector, Method};
use edgecmd_domain::error::{CommandError, NotFoundError};
use edgecmd_domain::event::Event;
use edgecmd_domain::id::DeviceId;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the single-device endpoints.
pub enum CommandResponse {
    Read(Json<Event>),
    Written,
}

impl IntoResponse for CommandResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Read(json) => json.into_response(),
            Self::Written => http::StatusCode::OK.into_response(),
        }
    }
}

/// Possible responses from the fan-out endpoint.
pub enum FanOutResponse {
    Ok(Json<Vec<Event>>),
}

impl IntoResponse for FanOutResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET|PUT /api/v1/device/{id}/{command}`
pub async fn by_id<DR, PR, D, S>(
    State(state): State<AppState<DR, PR, D, S>>,
    method: http::Method,
    Path((id, command)): Path<(String, String)>,
    body: Bytes,
) -> Result<CommandResponse, ApiError>
where
    DR: DeviceRegistry + Send + Sync + 'static,
    PR: ProfileRegistry + Send + Sync + 'static,
    D: ProtocolDriver + Send + Sync + 'static,
    S: EventSink + Send + Sync + 'static,
{
    let device_id = DeviceId::from_str(&id).map_err(|err| {
        tracing::debug!(%id, error = %err, "invalid device id");
        ApiError::from(CommandError::from(NotFoundError::Device(id.clone())))
    })?;
    dispatch(&state, &DeviceSelector::Id(device_id), &command, &method, &body).await
}

/// `GET|PUT /api/v1/device/name/{name}/{command}`
pub async fn by_name<DR, PR, D, S>(
    State(state): State<AppState<DR, PR, D, S>>,
    method: http::Method,
    Path((name, command)): Path<(String, String)>,
    body: Bytes,
) -> Result<CommandResponse, ApiError>
where
    DR: DeviceRegistry + Send + Sync + 'static,
    PR: ProfileRegistry + Send + Sync + 'static,
    D: ProtocolDriver + Send + Sync + 'static,
    S: EventSink + Send + Sync + 'static,
{
    dispatch(&state, &DeviceSelector::Name(name), &command, &method, &body).await
}

/// `GET|PUT /api/v1/device/all/{command}`
///
/// Answers with the events of every device that succeeded. Fails only when
/// every device failed.
pub async fn all<DR, PR, D, S>(
    State(state): State<AppState<DR, PR, D, S>>,
    method: http::Method,
    Path(command): Path<String>,
    body: Bytes,
) -> Result<FanOutResponse, ApiError>
where
    DR: DeviceRegistry + Send + Sync + 'static,
    PR: ProfileRegistry + Send + Sync + 'static,
    D: ProtocolDriver + Send + Sync + 'static,
    S: EventSink + Send + Sync + 'static,
{
    let outcome = state
        .command_service
        .handle_all(&command, Method::from_request(method.as_str()), &body)
        .await;
    match outcome.error {
        Some(err) => Err(err.into()),
        None => Ok(FanOutResponse::Ok(Json(outcome.events))),
    }
}

async fn dispatch<DR, PR, D, S>(
    state: &AppState<DR, PR, D, S>,
    selector: &DeviceSelector,
    command: &str,
    method: &http::Method,
    body: &[u8],
) -> Result<CommandResponse, ApiError>
where
    DR: DeviceRegistry + Send + Sync + 'static,
    PR: ProfileRegistry + Send + Sync + 'static,
    D: ProtocolDriver + Send + Sync + 'static,
    S: EventSink + Send + Sync + 'static,
{
    let event = state
        .command_service
        .handle(selector, command, Method::from_request(method.as_str()), body)
        .await?;
    Ok(match event {
        Some(event) => CommandResponse::Read(Json(event)),
        None => CommandResponse::Written,
    })
}
