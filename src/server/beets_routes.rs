//! Beets installation, configuration and maintenance routes.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

use crate::library::{CommandResult, PathCheck};

use super::error::{run_blocking, ApiError};
use super::state::{GuardedLibraryService, ServerState};

#[derive(Serialize)]
struct PluginsResponse {
    plugins: Vec<String>,
}

#[derive(Serialize)]
struct PathsResponse {
    paths: Vec<PathCheck>,
}

#[derive(Serialize)]
struct ResetResponse {
    success: bool,
    backup_path: String,
}

#[derive(Serialize)]
struct InitializeResponse {
    success: bool,
    result: CommandResult,
}

async fn get_status(State(library): State<GuardedLibraryService>) -> Result<Response, ApiError> {
    let status = run_blocking(library, |library| library.check_config()).await?;
    Ok(Json(status).into_response())
}

async fn get_config(State(library): State<GuardedLibraryService>) -> Result<Response, ApiError> {
    let document = run_blocking(library, |library| library.read_config()).await?;
    Ok(Json(document).into_response())
}

async fn update_config(
    State(library): State<GuardedLibraryService>,
    Json(patch): Json<Value>,
) -> Result<Response, ApiError> {
    if patch.as_object().map_or(true, |patch| patch.is_empty()) {
        return Err(ApiError::BadRequest("No configuration provided"));
    }
    let document = run_blocking(library, move |library| library.update_config(patch)).await?;
    Ok(Json(document).into_response())
}

async fn get_plugins(State(library): State<GuardedLibraryService>) -> Result<Response, ApiError> {
    let plugins = run_blocking(library, |library| library.beets_plugins()).await?;
    Ok(Json(PluginsResponse { plugins }).into_response())
}

async fn get_info(State(library): State<GuardedLibraryService>) -> Result<Response, ApiError> {
    let info = run_blocking(library, |library| library.beets_info()).await?;
    Ok(Json(info).into_response())
}

async fn check_paths(State(library): State<GuardedLibraryService>) -> Result<Response, ApiError> {
    let paths = run_blocking(library, |library| library.check_paths()).await?;
    Ok(Json(PathsResponse { paths }).into_response())
}

async fn reset_database(
    State(library): State<GuardedLibraryService>,
) -> Result<Response, ApiError> {
    let backup_path = run_blocking(library, |library| library.reset_database()).await?;
    Ok(Json(ResetResponse {
        success: true,
        backup_path,
    })
    .into_response())
}

async fn initialize_database(
    State(library): State<GuardedLibraryService>,
) -> Result<Response, ApiError> {
    let result = run_blocking(library, |library| library.initialize_database()).await?;
    Ok(Json(InitializeResponse {
        success: result.success,
        result,
    })
    .into_response())
}

pub fn make_beets_routes(state: ServerState) -> Router {
    Router::new()
        .route("/status", get(get_status))
        .route("/config", get(get_config).post(update_config))
        .route("/plugins", get(get_plugins))
        .route("/info", get(get_info))
        .route("/check_paths", get(check_paths))
        .route("/reset", post(reset_database))
        .route("/initialize", post(initialize_database))
        .with_state(state)
}
