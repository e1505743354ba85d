//! Connection mode and remote configuration routes.
//!
//! Secrets of the remote config never leave the server: every response
//! carries the redacted copy.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::mode::{ConnectionMode, ModeInfo, RemoteConfig, RemoteConfigUpdate};

use super::error::ApiError;
use super::state::{GuardedLibraryService, ServerState};

#[derive(Debug, Deserialize)]
pub struct SetModeBody {
    #[serde(default)]
    pub mode: String,
}

#[derive(Serialize)]
struct SetModeResponse {
    mode: ConnectionMode,
}

#[derive(Serialize)]
struct RemoteConfigResponse {
    remote_config: RemoteConfig,
}

async fn get_mode(State(library): State<GuardedLibraryService>) -> Response {
    let info = library.modes().get_mode();
    Json(ModeInfo {
        mode: info.mode,
        remote_config: info.remote_config.map(|config| config.redacted()),
    })
    .into_response()
}

async fn set_mode(
    State(library): State<GuardedLibraryService>,
    Json(body): Json<SetModeBody>,
) -> Result<Response, ApiError> {
    let mode = library.modes().set_mode(&body.mode)?;
    Ok(Json(SetModeResponse { mode }).into_response())
}

async fn set_remote_config(
    State(library): State<GuardedLibraryService>,
    Json(update): Json<RemoteConfigUpdate>,
) -> Result<Response, ApiError> {
    let merged = library.modes().set_remote_config(update)?;
    Ok(Json(RemoteConfigResponse {
        remote_config: merged.redacted(),
    })
    .into_response())
}

pub fn make_mode_routes(state: ServerState) -> Router {
    Router::new()
        .route("/mode", get(get_mode).post(set_mode))
        .route("/remote/config", post(set_remote_config))
        .with_state(state)
}
