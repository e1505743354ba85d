//! Library browsing, album art and beets command routes.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::library::{AlbumSummary, CommandResult, LibraryItem, SortKey};

use super::error::{run_blocking, ApiError};
use super::state::{GuardedLibraryService, ServerState};

const DEFAULT_PAGE_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct LibraryQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub sort: String,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct AlbumsQuery {
    pub artist: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommandBody {
    #[serde(default)]
    pub command: String,
}

#[derive(Debug, Deserialize)]
pub struct ImportBody {
    #[serde(default)]
    pub path: String,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<LibraryItem>,
}

#[derive(Serialize)]
struct ArtistsResponse {
    artists: Vec<String>,
}

#[derive(Serialize)]
struct AlbumsResponse {
    albums: Vec<AlbumSummary>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AlbumArtResponse {
    album_art: Option<String>,
    mime_type: Option<String>,
}

#[derive(Serialize)]
struct CommandResponse {
    result: CommandResult,
}

async fn get_library(
    State(library): State<GuardedLibraryService>,
    Query(query): Query<LibraryQuery>,
) -> Result<Response, ApiError> {
    let page = usize::try_from(query.page.max(1)).unwrap_or(usize::MAX);
    let limit = usize::try_from(query.limit.max(1)).unwrap_or(usize::MAX);
    let sort = SortKey::from_param(&query.sort);
    let items = run_blocking(library, move |library| library.list_items(page, limit, sort)).await?;
    Ok(Json(items).into_response())
}

async fn search(
    State(library): State<GuardedLibraryService>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, ApiError> {
    let results = run_blocking(library, move |library| library.search(&query.query)).await?;
    Ok(Json(SearchResponse { results }).into_response())
}

async fn get_artists(State(library): State<GuardedLibraryService>) -> Result<Response, ApiError> {
    let artists = run_blocking(library, |library| library.artists()).await?;
    Ok(Json(ArtistsResponse { artists }).into_response())
}

async fn get_albums(
    State(library): State<GuardedLibraryService>,
    Query(query): Query<AlbumsQuery>,
) -> Result<Response, ApiError> {
    let albums =
        run_blocking(library, move |library| library.albums(query.artist.as_deref())).await?;
    Ok(Json(AlbumsResponse { albums }).into_response())
}

async fn get_item(
    State(library): State<GuardedLibraryService>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    match run_blocking(library, move |library| library.item(id)).await? {
        Some(item) => Ok(Json(item).into_response()),
        None => Err(ApiError::NotFound("Item not found")),
    }
}

async fn get_album_art(
    State(library): State<GuardedLibraryService>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let art = run_blocking(library, move |library| library.album_art(id)).await?;
    let response = match art {
        Some(art) => AlbumArtResponse {
            album_art: Some(art.data),
            mime_type: art.mime_type,
        },
        None => AlbumArtResponse {
            album_art: None,
            mime_type: None,
        },
    };
    Ok(Json(response).into_response())
}

async fn post_command(
    State(library): State<GuardedLibraryService>,
    Json(body): Json<CommandBody>,
) -> Result<Response, ApiError> {
    if body.command.trim().is_empty() {
        return Err(ApiError::BadRequest("No command provided"));
    }
    let result = run_blocking(library, move |library| library.run_command(&body.command)).await?;
    Ok(Json(CommandResponse { result }).into_response())
}

async fn post_import(
    State(library): State<GuardedLibraryService>,
    Json(body): Json<ImportBody>,
) -> Result<Response, ApiError> {
    if body.path.trim().is_empty() {
        return Err(ApiError::BadRequest("No path provided"));
    }
    let result = run_blocking(library, move |library| library.import(&body.path)).await?;
    Ok(Json(CommandResponse { result }).into_response())
}

pub fn make_library_routes(state: ServerState) -> Router {
    Router::new()
        .route("/library", get(get_library))
        .route("/search", get(search))
        .route("/artists", get(get_artists))
        .route("/albums", get(get_albums))
        .route("/item/{id}", get(get_item))
        .route("/albumart/{id}", get(get_album_art))
        .route("/command", post(post_command))
        .route("/import", post(post_import))
        .with_state(state)
}
