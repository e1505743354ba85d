//! Mapping of library failures to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::library::{BridgeError, BridgeResult, LibraryService};

use super::state::GuardedLibraryService;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    kind: &'static str,
}

#[derive(Debug)]
pub enum ApiError {
    Bridge(BridgeError),
    BadRequest(&'static str),
    NotFound(&'static str),
    Internal(String),
}

impl From<BridgeError> for ApiError {
    fn from(err: BridgeError) -> Self {
        ApiError::Bridge(err)
    }
}

fn bridge_status(err: &BridgeError) -> StatusCode {
    if err.is_invalid_input() {
        return StatusCode::BAD_REQUEST;
    }
    match err {
        BridgeError::StoreNotFound(_) => StatusCode::NOT_FOUND,
        BridgeError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
        BridgeError::RemoteUnreachable { .. }
        | BridgeError::AuthenticationFailed { .. }
        | BridgeError::HostKeyRejected { .. }
        | BridgeError::RemoteDataUnavailable(_)
        | BridgeError::RemoteCommand(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Bridge(err) => {
                let status = bridge_status(&err);
                if status.is_server_error() {
                    error!("{} ({})", err, err.kind());
                } else {
                    warn!("{} ({})", err, err.kind());
                }
                (
                    status,
                    ErrorResponse {
                        error: err.to_string(),
                        kind: err.kind(),
                    },
                )
            }
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: message.to_string(),
                    kind: "BadRequest",
                },
            ),
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: message.to_string(),
                    kind: "NotFound",
                },
            ),
            ApiError::Internal(message) => {
                error!("{}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: message,
                        kind: "Internal",
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Runs a library operation on the blocking pool. Subprocesses and SSH
/// sessions must never block the async workers.
pub async fn run_blocking<T, F>(library: GuardedLibraryService, operation: F) -> Result<T, ApiError>
where
    F: FnOnce(&LibraryService) -> BridgeResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || operation(&library))
        .await
        .map_err(|e| ApiError::Internal(format!("Library task failed: {}", e)))?
        .map_err(ApiError::from)
}
