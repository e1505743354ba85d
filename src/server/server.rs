use anyhow::{Context, Result};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::info;

use crate::library::LibraryService;
use crate::mode::ConnectionMode;
use tower_http::services::ServeDir;

use axum::{
    extract::State,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::{
    log_requests, make_beets_routes, make_library_routes, make_mode_routes, state::*,
    ServerConfig,
};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub mode: ConnectionMode,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        mode: state.library.modes().get_mode().mode,
    };
    Json(stats)
}

impl ServerState {
    pub fn new(config: ServerConfig, library: LibraryService) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            library: Arc::new(library),
            hash: env!("GIT_HASH").to_owned(),
        }
    }
}

pub fn make_app(config: ServerConfig, library: LibraryService) -> Router {
    let state = ServerState::new(config.clone(), library);

    let api_routes: Router = make_library_routes(state.clone())
        .merge(make_mode_routes(state.clone()))
        .nest("/beets", make_beets_routes(state.clone()))
        .route("/status", get(home).with_state(state.clone()));

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    home_router
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            log_requests,
        ))
}

pub async fn run_server(config: ServerConfig, library: LibraryService) -> Result<()> {
    let address = format!("{}:{}", config.bind_address, config.port);
    let app = make_app(config, library);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on http://{}", address);

    Ok(axum::serve(listener, app).await?)
}
