use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

use super::{LibraryBackend, StoreHandle, CONFIG_DIR_CHECK, CONFIG_FILE_CHECK, LIBRARY_DB_CHECK};
use crate::library::adapter::command_result_from_output;
use crate::library::{
    BeetsPaths, BridgeError, BridgeResult, CommandResult, ConfigStatus, LibraryStore, PathCheck,
};
use crate::mode::ConnectionMode;

#[derive(Clone, Debug)]
pub struct LocalSettings {
    /// Name or path of the `beet` executable.
    pub beet_binary: String,
    pub paths: BeetsPaths,
}

/// Runs beets as a child process and reads the library from the local disk.
pub struct LocalBackend {
    settings: LocalSettings,
}

impl LocalBackend {
    pub fn new(settings: LocalSettings) -> Self {
        Self { settings }
    }

    fn command(&self, args: &[String]) -> Command {
        let mut command = Command::new(&self.settings.beet_binary);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }

    fn tool_unavailable(&self, err: std::io::Error) -> BridgeError {
        BridgeError::ToolUnavailable {
            binary: self.settings.beet_binary.clone(),
            reason: err.to_string(),
        }
    }

    fn beets_installed(&self) -> bool {
        match self.command(&["--version".to_string()]).output() {
            Ok(output) => output.status.success(),
            Err(e) => {
                debug!("{} is not runnable: {}", self.settings.beet_binary, e);
                false
            }
        }
    }
}

impl LibraryBackend for LocalBackend {
    fn mode(&self) -> ConnectionMode {
        ConnectionMode::Local
    }

    fn config_location(&self) -> String {
        self.settings.paths.config_path.display().to_string()
    }

    fn library_location(&self) -> String {
        self.settings.paths.db_path.display().to_string()
    }

    fn open_store(&self) -> BridgeResult<StoreHandle> {
        LibraryStore::open(&self.settings.paths.db_path).map(StoreHandle::Local)
    }

    fn run_tool(&self, args: &[String]) -> BridgeResult<CommandResult> {
        debug!("Running {} {:?}", self.settings.beet_binary, args);
        let output = self
            .command(args)
            .output()
            .map_err(|e| self.tool_unavailable(e))?;
        Ok(command_result_from_output(&output))
    }

    fn fetch_album_art(&self, album_query: &[String]) -> BridgeResult<Option<Vec<u8>>> {
        let mut args = vec!["albumart".to_string(), "-o".to_string(), "-".to_string()];
        args.extend_from_slice(album_query);
        let output = self
            .command(&args)
            .output()
            .map_err(|e| self.tool_unavailable(e))?;
        if !output.status.success() {
            debug!(
                "No album art for {:?}: {}",
                album_query,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(None);
        }
        Ok(Some(output.stdout))
    }

    fn import_path(&self, path: &str) -> BridgeResult<CommandResult> {
        if path.trim().is_empty() || !Path::new(path).exists() {
            return Err(BridgeError::PathNotFound(path.to_string()));
        }
        info!("Importing {}", path);
        self.run_tool(&["import".to_string(), path.to_string()])
    }

    fn config_status(&self) -> BridgeResult<ConfigStatus> {
        let paths = &self.settings.paths;
        Ok(ConfigStatus {
            mode: ConnectionMode::Local,
            config_exists: paths.config_path.exists(),
            db_exists: paths.db_path.exists(),
            beets_installed: self.beets_installed(),
            config_path: self.config_location(),
            db_path: self.library_location(),
        })
    }

    fn check_paths(&self) -> BridgeResult<Vec<PathCheck>> {
        let paths = &self.settings.paths;
        Ok(vec![
            path_check(CONFIG_DIR_CHECK, &paths.config_dir()),
            path_check(CONFIG_FILE_CHECK, &paths.config_path),
            path_check(LIBRARY_DB_CHECK, &paths.db_path),
        ])
    }

    fn read_config_document(&self) -> BridgeResult<Option<String>> {
        let path = &self.settings.paths.config_path;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn write_config_document(&self, contents: &str) -> BridgeResult<()> {
        std::fs::create_dir_all(self.settings.paths.config_dir())?;
        std::fs::write(&self.settings.paths.config_path, contents)?;
        info!("Wrote beets config to {:?}", self.settings.paths.config_path);
        Ok(())
    }

    fn backup_store(&self) -> BridgeResult<String> {
        let db_path = &self.settings.paths.db_path;
        if !db_path.is_file() {
            return Err(BridgeError::StoreNotFound(db_path.clone()));
        }
        let backup = backup_path_for(db_path, chrono::Utc::now().timestamp());
        std::fs::rename(db_path, &backup)?;
        warn!("Moved beets library {:?} to {:?}", db_path, backup);
        Ok(backup.display().to_string())
    }
}

pub(crate) fn backup_path_for(db_path: &Path, timestamp: i64) -> PathBuf {
    let mut name = db_path.as_os_str().to_owned();
    name.push(format!(".bak-{}", timestamp));
    PathBuf::from(name)
}

fn path_check(name: &str, path: &Path) -> PathCheck {
    let exists = path.exists();
    let writable = if path.is_dir() {
        tempfile::tempfile_in(path).is_ok()
    } else if path.is_file() {
        OpenOptions::new().append(true).open(path).is_ok()
    } else {
        false
    };
    PathCheck {
        name: name.to_string(),
        path: path.display().to_string(),
        exists,
        writable,
    }
}
