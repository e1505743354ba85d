//! End-to-end tests for beets commands and maintenance routes
//!
//! The server runs a fake `beet` script, so these tests check how commands
//! are passed through and how their results come back.

#![cfg(unix)]

mod common;

use common::{TestClient, TestServer};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_command_result_is_returned() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.run_command("ls 'artist:Massive Attack'").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["result"]["stdout"], "ls artist:Massive Attack\n");
    assert_eq!(body["result"]["returncode"], 0);
    assert_eq!(body["result"]["success"], true);
}

#[tokio::test]
async fn test_failing_command_is_not_an_http_error() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.run_command("frobnicate").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["result"]["returncode"], 2);
    assert_eq!(body["result"]["success"], false);
    assert!(body["result"]["stderr"]
        .as_str()
        .unwrap()
        .contains("frobnicate"));
}

#[tokio::test]
async fn test_empty_command_is_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.run_command("  ").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No command provided");
}

#[tokio::test]
async fn test_unbalanced_quotes_are_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.run_command("ls 'artist:Portishead").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "InvalidCommand");
}

#[tokio::test]
async fn test_import_existing_directory() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let music = server.beets_dir.join("incoming");
    std::fs::create_dir(&music).unwrap();

    let response = client.import(music.to_str().unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["result"]["stdout"],
        format!("import {}\n", music.display())
    );
}

#[tokio::test]
async fn test_import_missing_path() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.import("/definitely/not/here").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "PathNotFound");

    let response = client.import("").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No path provided");
}

#[tokio::test]
async fn test_beets_status() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_beets_status().await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["mode"], "local");
    assert_eq!(body["db_exists"], true);
    assert_eq!(body["config_exists"], false);
    assert_eq!(body["beets_installed"], true);
}

#[tokio::test]
async fn test_beets_info_and_plugins() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let body: Value = client.get_beets_info().await.json().await.unwrap();
    assert_eq!(body["version"], "1.6.0");
    assert_eq!(body["python_version"], "3.11.2");
    assert_eq!(body["plugins"], json!(["fetchart", "lastgenre"]));

    let body: Value = client.get_beets_plugins().await.json().await.unwrap();
    assert_eq!(body["plugins"], json!(["fetchart", "lastgenre"]));
}

#[tokio::test]
async fn test_check_paths() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let body: Value = client.check_paths().await.json().await.unwrap();
    let paths = body["paths"].as_array().unwrap();
    assert_eq!(paths.len(), 3);

    let by_name = |name: &str| {
        paths
            .iter()
            .find(|p| p["name"] == name)
            .unwrap_or_else(|| panic!("missing check {}", name))
            .clone()
    };
    assert_eq!(by_name("config_dir")["exists"], true);
    assert_eq!(by_name("config_file")["exists"], false);
    assert_eq!(by_name("library_db")["exists"], true);
    assert_eq!(by_name("library_db")["writable"], true);
}

#[tokio::test]
async fn test_config_starts_empty_and_merges_updates() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let body: Value = client.get_beets_config().await.json().await.unwrap();
    assert_eq!(body, json!({}));

    let response = client
        .update_beets_config(json!({
            "directory": "/music",
            "import": { "copy": false }
        }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .update_beets_config(json!({ "import": { "write": true } }))
        .await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["directory"], "/music");
    assert_eq!(body["import"], json!({ "copy": false, "write": true }));

    let text = std::fs::read_to_string(server.beets_dir.join("config.yaml")).unwrap();
    assert!(text.contains("directory: /music"));

    let reread: Value = client.get_beets_config().await.json().await.unwrap();
    assert_eq!(reread, body);
}

#[tokio::test]
async fn test_empty_config_update_is_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.update_beets_config(json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No configuration provided");
}

#[tokio::test]
async fn test_reset_moves_library_aside() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.reset_database().await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    let backup = body["backup_path"].as_str().unwrap();
    assert!(backup.contains("library.db.bak-"));
    assert!(std::path::Path::new(backup).is_file());
    assert!(!server.beets_dir.join("library.db").exists());

    let response = client.reset_database().await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "StoreNotFound");
}

#[tokio::test]
async fn test_library_after_reset_is_not_found() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    client.reset_database().await;
    let response = client.get_library(1, 10, "artist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_initialize_runs_stats() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.initialize_database().await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["result"]["stdout"], "Tracks: 6\n");
}
