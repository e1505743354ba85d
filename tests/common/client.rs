//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per API route.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("GET request failed")
    }

    async fn post(&self, path: &str, body: Value) -> Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await
            .expect("POST request failed")
    }

    // ========================================================================
    // Library
    // ========================================================================

    pub async fn get_library(&self, page: i64, limit: i64, sort: &str) -> Response {
        self.get(&format!(
            "/api/library?page={}&limit={}&sort={}",
            page, limit, sort
        ))
        .await
    }

    pub async fn search(&self, query: &str) -> Response {
        self.client
            .get(format!("{}/api/search", self.base_url))
            .query(&[("query", query)])
            .send()
            .await
            .expect("GET request failed")
    }

    pub async fn get_artists(&self) -> Response {
        self.get("/api/artists").await
    }

    pub async fn get_albums(&self, artist: Option<&str>) -> Response {
        let mut request = self.client.get(format!("{}/api/albums", self.base_url));
        if let Some(artist) = artist {
            request = request.query(&[("artist", artist)]);
        }
        request.send().await.expect("GET request failed")
    }

    pub async fn get_item(&self, id: i64) -> Response {
        self.get(&format!("/api/item/{}", id)).await
    }

    pub async fn get_album_art(&self, id: i64) -> Response {
        self.get(&format!("/api/albumart/{}", id)).await
    }

    // ========================================================================
    // Commands
    // ========================================================================

    pub async fn run_command(&self, command: &str) -> Response {
        self.post("/api/command", json!({ "command": command })).await
    }

    pub async fn import(&self, path: &str) -> Response {
        self.post("/api/import", json!({ "path": path })).await
    }

    // ========================================================================
    // Mode
    // ========================================================================

    pub async fn get_mode(&self) -> Response {
        self.get("/api/mode").await
    }

    pub async fn set_mode(&self, mode: &str) -> Response {
        self.post("/api/mode", json!({ "mode": mode })).await
    }

    pub async fn set_remote_config(&self, config: Value) -> Response {
        self.post("/api/remote/config", config).await
    }

    // ========================================================================
    // Beets maintenance
    // ========================================================================

    pub async fn get_beets_status(&self) -> Response {
        self.get("/api/beets/status").await
    }

    pub async fn get_beets_config(&self) -> Response {
        self.get("/api/beets/config").await
    }

    pub async fn update_beets_config(&self, patch: Value) -> Response {
        self.post("/api/beets/config", patch).await
    }

    pub async fn get_beets_plugins(&self) -> Response {
        self.get("/api/beets/plugins").await
    }

    pub async fn get_beets_info(&self) -> Response {
        self.get("/api/beets/info").await
    }

    pub async fn check_paths(&self) -> Response {
        self.get("/api/beets/check_paths").await
    }

    pub async fn reset_database(&self) -> Response {
        self.post("/api/beets/reset", json!({})).await
    }

    pub async fn initialize_database(&self) -> Response {
        self.post("/api/beets/initialize", json!({})).await
    }

    pub async fn get_status(&self) -> Response {
        self.get("/api/status").await
    }
}
