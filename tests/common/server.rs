//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own beets directory.

use super::constants::*;
use super::fixtures::{create_fake_beet, create_test_library};
use beets_web_bridge::backend::{BackendSettings, LocalSettings};
use beets_web_bridge::library::{BeetsPaths, LibraryService};
use beets_web_bridge::mode::ModeStore;
use beets_web_bridge::remote::SshOptions;
use beets_web_bridge::server::{make_app, RequestsLoggingLevel, ServerConfig};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated beets library and fake `beet`
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Directory holding config.yaml, library.db and the fake `beet`
    pub beets_dir: PathBuf,

    // Private fields - keep resources alive until drop
    _temp_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server in local mode on a random port
    pub async fn spawn() -> Self {
        Self::spawn_with_modes(ModeStore::default()).await
    }

    /// Spawns a new test server starting from the given mode state
    ///
    /// # Panics
    ///
    /// Panics if fixture creation, port binding or server startup fails.
    pub async fn spawn_with_modes(modes: ModeStore) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let beets_dir = temp_dir.path().to_path_buf();
        let db_path = beets_dir.join("library.db");
        create_test_library(&db_path).expect("Failed to create test library");
        let beet_binary = create_fake_beet(&beets_dir).expect("Failed to create fake beet");

        let settings = BackendSettings {
            local: LocalSettings {
                beet_binary: beet_binary.display().to_string(),
                paths: BeetsPaths {
                    config_path: beets_dir.join("config.yaml"),
                    db_path,
                },
            },
            remote_beet_binary: "beet".to_string(),
            ssh: SshOptions {
                connect_timeout: Some(Duration::from_secs(2)),
                ..Default::default()
            },
        };
        let library = LibraryService::new(modes, settings);

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            bind_address: "127.0.0.1".to_string(),
            frontend_dir_path: None,
        };
        let app = make_app(config, library);

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            beets_dir,
            _temp_dir: temp_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the /api/status endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client
                .get(format!("{}/api/status", self.base_url))
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
