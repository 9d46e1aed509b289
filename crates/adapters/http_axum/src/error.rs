//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use edgecmd_domain::error::{CommandError, ErrorKind};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    kind: String,
    error: String,
}

/// Maps [`CommandError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(CommandError);

impl From<CommandError> for ApiError {
    fn from(err: CommandError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let (status, message) = match kind {
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, self.0.to_string()),
            ErrorKind::Locked => (StatusCode::LOCKED, self.0.to_string()),
            ErrorKind::BadRequest => (StatusCode::BAD_REQUEST, self.0.to_string()),
            ErrorKind::ServerError => {
                tracing::error!(error = %self.0, "command failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = ErrorBody {
            kind: kind.to_string(),
            error: message,
        };
        (status, Json(body)).into_response()
    }
}
