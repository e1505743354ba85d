//! Public surface of library operations.
//!
//! Every operation takes one mode snapshot, resolves its backend from it and
//! runs to completion against that backend alone.

use serde_json::Value;
use tracing::{debug, info};

use super::adapter::{album_query_for, encode_album_art};
use super::error::{BridgeError, BridgeResult};
use super::models::{
    AlbumArt, AlbumSummary, BeetsInfo, CommandResult, ConfigStatus, ItemsPage, LibraryItem,
    PathCheck, SortKey,
};
use super::store::LibraryStore;
use crate::backend::{resolve_backend, BackendSettings, LibraryBackend};
use crate::beets_config::{deep_merge, parse_document, parse_version_output, render_document};
use crate::mode::ModeStore;

pub struct LibraryService {
    modes: ModeStore,
    settings: BackendSettings,
}

impl LibraryService {
    pub fn new(modes: ModeStore, settings: BackendSettings) -> Self {
        Self { modes, settings }
    }

    pub fn modes(&self) -> &ModeStore {
        &self.modes
    }

    fn backend(&self) -> BridgeResult<Box<dyn LibraryBackend>> {
        resolve_backend(self.modes.snapshot(), &self.settings)
    }

    /// Runs `query` against the active library. A staged remote copy is
    /// deleted before this returns, whether `query` succeeded or not.
    pub fn with_store<T, F>(&self, query: F) -> BridgeResult<T>
    where
        F: FnOnce(&LibraryStore) -> BridgeResult<T>,
    {
        let store = self.backend()?.open_store()?;
        query(&*store)
    }

    /// One page of items together with the library total, read from the same store.
    pub fn list_items(&self, page: usize, limit: usize, sort: SortKey) -> BridgeResult<ItemsPage> {
        let page = page.max(1);
        let limit = limit.max(1);
        self.with_store(|store| {
            Ok(ItemsPage {
                items: store.list_items(page, limit, sort)?,
                total: store.count_items()?,
                page,
                limit,
            })
        })
    }

    pub fn search(&self, query: &str) -> BridgeResult<Vec<LibraryItem>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.with_store(|store| store.search(query))
    }

    pub fn artists(&self) -> BridgeResult<Vec<String>> {
        self.with_store(|store| store.artists())
    }

    pub fn albums(&self, artist: Option<&str>) -> BridgeResult<Vec<AlbumSummary>> {
        let artist = artist.filter(|a| !a.is_empty());
        self.with_store(|store| store.albums(artist))
    }

    pub fn item(&self, id: i64) -> BridgeResult<Option<LibraryItem>> {
        self.with_store(|store| store.item(id))
    }

    /// Cover of the album `id` belongs to. Items without an album have no art.
    pub fn album_art(&self, id: i64) -> BridgeResult<Option<AlbumArt>> {
        let backend = self.backend()?;
        let item = {
            let store = backend.open_store()?;
            store.item(id)?
        };
        let Some(query) = item.as_ref().and_then(album_query_for) else {
            debug!("Item {} has no album, no art to fetch", id);
            return Ok(None);
        };
        let bytes = backend.fetch_album_art(&query)?;
        Ok(bytes.as_deref().and_then(encode_album_art))
    }

    /// Runs a beets command line such as `ls artist:Radiohead`. Blank input is a
    /// no-op that never reaches the backend.
    pub fn run_command(&self, command: &str) -> BridgeResult<CommandResult> {
        if command.trim().is_empty() {
            return Ok(CommandResult::noop());
        }
        let args = shlex::split(command)
            .ok_or_else(|| BridgeError::InvalidCommand(command.to_string()))?;
        self.backend()?.run_tool(&args)
    }

    pub fn import(&self, path: &str) -> BridgeResult<CommandResult> {
        if path.trim().is_empty() {
            return Err(BridgeError::PathNotFound(path.to_string()));
        }
        self.backend()?.import_path(path)
    }

    pub fn check_config(&self) -> BridgeResult<ConfigStatus> {
        self.backend()?.config_status()
    }

    pub fn check_paths(&self) -> BridgeResult<Vec<PathCheck>> {
        self.backend()?.check_paths()
    }

    pub fn read_config(&self) -> BridgeResult<Value> {
        match self.backend()?.read_config_document()? {
            Some(text) => parse_document(&text),
            None => parse_document(""),
        }
    }

    /// Deep-merges `patch` into the beets config and returns the merged document.
    pub fn update_config(&self, patch: Value) -> BridgeResult<Value> {
        if !patch.is_object() {
            return Err(BridgeError::InvalidConfig(
                "config update must be a JSON object".to_string(),
            ));
        }
        let backend = self.backend()?;
        let mut document = match backend.read_config_document()? {
            Some(text) => parse_document(&text)?,
            None => parse_document("")?,
        };
        deep_merge(&mut document, patch);
        backend.write_config_document(&render_document(&document)?)?;
        Ok(document)
    }

    pub fn beets_info(&self) -> BridgeResult<BeetsInfo> {
        let backend = self.backend()?;
        let result = backend.run_tool(&["version".to_string()])?;
        if !result.success {
            return Err(BridgeError::RemoteCommand(format!(
                "beet version exited with {}: {}",
                result.return_code,
                result.stderr.trim()
            )));
        }
        let version = parse_version_output(&result.stdout);
        Ok(BeetsInfo {
            mode: backend.mode(),
            version: version.version,
            python_version: version.python_version,
            plugins: version.plugins,
            config_path: backend.config_location(),
            db_path: backend.library_location(),
        })
    }

    pub fn beets_plugins(&self) -> BridgeResult<Vec<String>> {
        Ok(self.beets_info()?.plugins)
    }

    /// Moves the library aside so beets starts from an empty one. Returns the backup location.
    pub fn reset_database(&self) -> BridgeResult<String> {
        let backup = self.backend()?.backup_store()?;
        info!("Library reset, previous database kept at {}", backup);
        Ok(backup)
    }

    /// `beet stats` creates the library database when it is missing.
    pub fn initialize_database(&self) -> BridgeResult<CommandResult> {
        self.backend()?.run_tool(&["stats".to_string()])
    }
}
