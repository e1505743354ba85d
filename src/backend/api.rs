use super::{LibraryBackend, StoreHandle};
use crate::library::{BridgeError, BridgeResult, CommandResult, ConfigStatus, PathCheck};
use crate::mode::ConnectionMode;

const API_TRANSPORT: &str = "remote access over the beets web API";

/// Remote mode with `use_ssh` disabled. The API transport does not exist yet,
/// so every operation reports [`BridgeError::NotImplemented`].
pub struct ApiBackend {
    api_url: String,
}

impl ApiBackend {
    pub fn new(api_url: String) -> Self {
        Self { api_url }
    }
}

impl LibraryBackend for ApiBackend {
    fn mode(&self) -> ConnectionMode {
        ConnectionMode::Remote
    }

    fn config_location(&self) -> String {
        self.api_url.clone()
    }

    fn library_location(&self) -> String {
        self.api_url.clone()
    }

    fn open_store(&self) -> BridgeResult<StoreHandle> {
        Err(BridgeError::NotImplemented(API_TRANSPORT))
    }

    fn run_tool(&self, _args: &[String]) -> BridgeResult<CommandResult> {
        Err(BridgeError::NotImplemented(API_TRANSPORT))
    }

    fn fetch_album_art(&self, _album_query: &[String]) -> BridgeResult<Option<Vec<u8>>> {
        Err(BridgeError::NotImplemented(API_TRANSPORT))
    }

    fn import_path(&self, _path: &str) -> BridgeResult<CommandResult> {
        Err(BridgeError::NotImplemented(API_TRANSPORT))
    }

    fn config_status(&self) -> BridgeResult<ConfigStatus> {
        Err(BridgeError::NotImplemented(API_TRANSPORT))
    }

    fn check_paths(&self) -> BridgeResult<Vec<PathCheck>> {
        Err(BridgeError::NotImplemented(API_TRANSPORT))
    }

    fn read_config_document(&self) -> BridgeResult<Option<String>> {
        Err(BridgeError::NotImplemented(API_TRANSPORT))
    }

    fn write_config_document(&self, _contents: &str) -> BridgeResult<()> {
        Err(BridgeError::NotImplemented(API_TRANSPORT))
    }

    fn backup_store(&self) -> BridgeResult<String> {
        Err(BridgeError::NotImplemented(API_TRANSPORT))
    }
}
