//! Local staging of a remote beets library.
//!
//! The remote `library.db` is downloaded into a temporary file and queried
//! with the regular [`LibraryStore`]. The copy lives exactly as long as the
//! [`StagedStore`] that owns it.

use std::ops::Deref;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

use super::session::{with_session, RemoteConnector, SshOptions, TransferDirection};
use crate::library::{BridgeError, BridgeResult, LibraryStore};
use crate::mode::RemoteConfig;

/// Read-only store backed by a temporary local copy.
pub struct StagedStore {
    // Field order matters: the connection must be closed before the file is removed.
    store: LibraryStore,
    copy: NamedTempFile,
}

impl StagedStore {
    /// Creates the temporary file and lets `fetch` fill it. On any failure the
    /// file is removed before the error is returned.
    pub fn stage_with<F>(fetch: F) -> BridgeResult<Self>
    where
        F: FnOnce(&Path) -> BridgeResult<()>,
    {
        let copy = tempfile::Builder::new()
            .prefix("beets-web-staged-")
            .suffix(".db")
            .tempfile()
            .map_err(|e| {
                BridgeError::RemoteDataUnavailable(format!("cannot create staging file: {}", e))
            })?;

        fetch(copy.path()).map_err(unavailable)?;
        let store = LibraryStore::open(copy.path()).map_err(unavailable)?;
        debug!("Staged remote library at {:?}", copy.path());
        Ok(Self { store, copy })
    }

    pub fn staged_path(&self) -> &Path {
        self.copy.path()
    }
}

impl Deref for StagedStore {
    type Target = LibraryStore;

    fn deref(&self) -> &LibraryStore {
        &self.store
    }
}

/// Downloads the remote library over a short-lived session.
pub fn stage_remote_store(
    connector: &dyn RemoteConnector,
    config: &RemoteConfig,
    options: &SshOptions,
) -> BridgeResult<StagedStore> {
    if config.db_path.trim().is_empty() {
        return Err(BridgeError::RemoteDataUnavailable(
            "no remote library path configured".to_string(),
        ));
    }
    StagedStore::stage_with(|local| {
        with_session(connector, config, options, |session| {
            session.transfer(&config.db_path, local, TransferDirection::Download)
        })
        .map(|_| ())
    })
}

fn unavailable(err: BridgeError) -> BridgeError {
    match err {
        BridgeError::RemoteDataUnavailable(_) => err,
        other => BridgeError::RemoteDataUnavailable(other.to_string()),
    }
}
