//! Execution targets of library operations.
//!
//! Every public operation resolves exactly one [`LibraryBackend`] from a mode
//! snapshot and runs start to finish against it.

mod api;
mod local;
mod ssh;

use std::ops::Deref;

pub use api::ApiBackend;
pub use local::{LocalBackend, LocalSettings};
pub use ssh::SshBackend;

use crate::library::{
    BridgeError, BridgeResult, CommandResult, ConfigStatus, LibraryStore, PathCheck,
};
use crate::mode::{ConnectionMode, ModeSnapshot};
use crate::remote::{SshOptions, StagedStore};

/// Names used for the entries of [`LibraryBackend::check_paths`].
pub const CONFIG_DIR_CHECK: &str = "config_dir";
pub const CONFIG_FILE_CHECK: &str = "config_file";
pub const LIBRARY_DB_CHECK: &str = "library_db";

/// A library store that is either the local file or a staged remote copy.
pub enum StoreHandle {
    Local(LibraryStore),
    Staged(StagedStore),
}

impl Deref for StoreHandle {
    type Target = LibraryStore;

    fn deref(&self) -> &LibraryStore {
        match self {
            StoreHandle::Local(store) => store,
            StoreHandle::Staged(staged) => staged,
        }
    }
}

pub trait LibraryBackend: Send {
    fn mode(&self) -> ConnectionMode;

    /// Display form of the beets config file location.
    fn config_location(&self) -> String;

    /// Display form of the library database location.
    fn library_location(&self) -> String;

    fn open_store(&self) -> BridgeResult<StoreHandle>;

    /// Runs the beets binary with `args`. A non-zero exit is not an error.
    fn run_tool(&self, args: &[String]) -> BridgeResult<CommandResult>;

    /// Image bytes of the album selected by `album_query`, `None` when beets
    /// has no art for it.
    fn fetch_album_art(&self, album_query: &[String]) -> BridgeResult<Option<Vec<u8>>>;

    fn import_path(&self, path: &str) -> BridgeResult<CommandResult>;

    fn config_status(&self) -> BridgeResult<ConfigStatus>;

    fn check_paths(&self) -> BridgeResult<Vec<PathCheck>>;

    /// Raw beets config document, `None` when the file does not exist.
    fn read_config_document(&self) -> BridgeResult<Option<String>>;

    fn write_config_document(&self, contents: &str) -> BridgeResult<()>;

    /// Moves the library database aside and returns where it went.
    fn backup_store(&self) -> BridgeResult<String>;
}

/// Everything besides the mode snapshot needed to build a backend.
#[derive(Clone, Debug)]
pub struct BackendSettings {
    pub local: LocalSettings,
    /// Name or path of `beet` on the remote host.
    pub remote_beet_binary: String,
    pub ssh: SshOptions,
}

pub fn resolve_backend(
    snapshot: ModeSnapshot,
    settings: &BackendSettings,
) -> BridgeResult<Box<dyn LibraryBackend>> {
    match snapshot.mode {
        ConnectionMode::Local => Ok(Box::new(LocalBackend::new(settings.local.clone()))),
        ConnectionMode::Remote if !snapshot.remote.use_ssh => {
            Ok(Box::new(ApiBackend::new(snapshot.remote.api_url)))
        }
        ConnectionMode::Remote => {
            if !snapshot.remote.is_valid() {
                return Err(BridgeError::MissingRequiredField("host"));
            }
            Ok(Box::new(SshBackend::new(
                snapshot.remote,
                settings.ssh.clone(),
                settings.remote_beet_binary.clone(),
            )))
        }
    }
}

/// Quotes `binary` and `args` into one POSIX shell command line.
pub(crate) fn shell_command_line(binary: &str, args: &[String]) -> BridgeResult<String> {
    let mut words = Vec::with_capacity(args.len() + 1);
    words.push(binary);
    words.extend(args.iter().map(String::as_str));
    shlex::try_join(words).map_err(|e| BridgeError::InvalidCommand(e.to_string()))
}

pub(crate) fn shell_quote(word: &str) -> BridgeResult<String> {
    shlex::try_quote(word)
        .map(|quoted| quoted.into_owned())
        .map_err(|e| BridgeError::InvalidCommand(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::BeetsPaths;
    use crate::mode::RemoteConfig;
    use std::path::Path;

    fn settings() -> BackendSettings {
        BackendSettings {
            local: LocalSettings {
                beet_binary: "beet".to_string(),
                paths: BeetsPaths::resolve(None, Path::new("/home/ana")),
            },
            remote_beet_binary: "beet".to_string(),
            ssh: SshOptions::default(),
        }
    }

    fn snapshot(mode: ConnectionMode, remote: RemoteConfig) -> ModeSnapshot {
        ModeSnapshot { mode, remote }
    }

    #[test]
    fn local_mode_resolves_local_backend() {
        let backend =
            resolve_backend(snapshot(ConnectionMode::Local, RemoteConfig::default()), &settings())
                .unwrap();
        assert_eq!(backend.mode(), ConnectionMode::Local);
        assert_eq!(
            backend.library_location(),
            "/home/ana/.config/beets/library.db"
        );
    }

    #[test]
    fn remote_mode_without_host_fails_before_connecting() {
        let result = resolve_backend(
            snapshot(ConnectionMode::Remote, RemoteConfig::default()),
            &settings(),
        );
        assert!(matches!(
            result.err(),
            Some(BridgeError::MissingRequiredField("host"))
        ));
    }

    #[test]
    fn remote_mode_over_api_is_not_implemented() {
        let remote = RemoteConfig {
            use_ssh: false,
            api_url: "http://nas:8337".to_string(),
            ..Default::default()
        };
        let backend = resolve_backend(snapshot(ConnectionMode::Remote, remote), &settings()).unwrap();
        assert_eq!(backend.mode(), ConnectionMode::Remote);
        assert!(matches!(
            backend.run_tool(&["ls".to_string()]),
            Err(BridgeError::NotImplemented(_))
        ));
    }

    #[test]
    fn remote_command_lines_are_shell_quoted() {
        let args = vec![
            "ls".to_string(),
            "artist:Sigur Rós".to_string(),
            "it's".to_string(),
        ];
        let line = shell_command_line("beet", &args).unwrap();
        assert_eq!(shlex::split(&line).unwrap(), vec!["beet", "ls", "artist:Sigur Rós", "it's"]);
        assert!(shell_command_line("beet", &["a\0b".to_string()]).is_err());
    }
}
