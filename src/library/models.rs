//! Result shapes returned by library operations, identical for local and remote runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::mode::ConnectionMode;

/// A row of the beets `items` table.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct LibraryItem {
    pub id: i64,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<i64>,
    /// Duration in seconds.
    pub length: Option<f64>,
    pub format: Option<String>,
    pub bitrate: Option<i64>,
    pub albumartist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_formatted: Option<String>,
    /// Every other column, only filled for item detail lookups.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AlbumSummary {
    pub album: String,
    pub artist: Option<String>,
    pub albumartist: Option<String>,
    pub year: Option<i64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ItemsPage {
    pub items: Vec<LibraryItem>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

/// Outcome of a `beet` invocation. A non-zero exit is a normal result.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    #[serde(rename = "returncode")]
    pub return_code: i32,
    pub success: bool,
}

impl CommandResult {
    pub fn new(stdout: String, stderr: String, return_code: i32) -> Self {
        Self {
            stdout,
            stderr,
            return_code,
            success: return_code == 0,
        }
    }

    /// Result of an empty command line: nothing was executed.
    pub fn noop() -> Self {
        Self::new(String::new(), String::new(), 0)
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct AlbumArt {
    /// Base64 encoded image bytes.
    pub data: String,
    pub mime_type: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortKey {
    Artist,
    Album,
    Title,
    Year,
    Added,
}

impl SortKey {
    /// Unknown keys fall back to [`SortKey::Artist`].
    pub fn from_param(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "album" => SortKey::Album,
            "title" => SortKey::Title,
            "year" => SortKey::Year,
            "added" => SortKey::Added,
            _ => SortKey::Artist,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortKey::Artist => "artist",
            SortKey::Album => "album",
            SortKey::Title => "title",
            SortKey::Year => "year",
            SortKey::Added => "added",
        }
    }
}

impl Default for SortKey {
    fn default() -> Self {
        Self::Artist
    }
}

/// Whether beets looks usable in the active environment.
#[derive(Clone, Debug, Serialize)]
pub struct ConfigStatus {
    pub mode: ConnectionMode,
    pub config_exists: bool,
    pub db_exists: bool,
    pub beets_installed: bool,
    pub config_path: String,
    pub db_path: String,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PathCheck {
    pub name: String,
    pub path: String,
    pub exists: bool,
    pub writable: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct BeetsInfo {
    pub mode: ConnectionMode,
    pub version: Option<String>,
    pub python_version: Option<String>,
    pub plugins: Vec<String>,
    pub config_path: String,
    pub db_path: String,
}
