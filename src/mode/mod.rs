//! Process-wide connection mode and remote connection parameters.
//!
//! The state lives behind a single mutex. Operations take one [`ModeStore::snapshot`]
//! when they start, so a concurrent mode switch never changes the target of an
//! operation that is already running.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use tracing::info;

use crate::library::BridgeError;

pub const DEFAULT_SSH_PORT: u16 = 22;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMode {
    Local,
    Remote,
}

impl Default for ConnectionMode {
    fn default() -> Self {
        Self::Local
    }
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionMode::Local => write!(f, "local"),
            ConnectionMode::Remote => write!(f, "remote"),
        }
    }
}

impl FromStr for ConnectionMode {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(ConnectionMode::Local),
            "remote" => Ok(ConnectionMode::Remote),
            _ => Err(BridgeError::InvalidMode(s.to_string())),
        }
    }
}

/// Where and how to reach the remote beets library.
///
/// With `use_ssh` the host/port/username/password/db_path fields are used,
/// otherwise api_url/api_key are (the API transport has no implementation).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub db_path: String,
    pub use_ssh: bool,
    pub api_url: String,
    pub api_key: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_SSH_PORT,
            username: String::new(),
            password: String::new(),
            db_path: String::new(),
            use_ssh: true,
            api_url: String::new(),
            api_key: String::new(),
        }
    }
}

impl RemoteConfig {
    pub fn is_valid(&self) -> bool {
        !self.host.trim().is_empty()
    }

    /// Copy safe to show to API callers: secrets are masked.
    pub fn redacted(&self) -> Self {
        let mask = |s: &str| {
            if s.is_empty() {
                String::new()
            } else {
                "********".to_string()
            }
        };
        Self {
            password: mask(&self.password),
            api_key: mask(&self.api_key),
            ..self.clone()
        }
    }

    fn merge(&mut self, update: RemoteConfigUpdate) {
        if let Some(host) = update.host {
            self.host = host;
        }
        if let Some(port) = update.port {
            self.port = port;
        }
        if let Some(username) = update.username {
            self.username = username;
        }
        if let Some(password) = update.password {
            self.password = password;
        }
        if let Some(db_path) = update.db_path {
            self.db_path = db_path;
        }
        if let Some(use_ssh) = update.use_ssh {
            self.use_ssh = use_ssh;
        }
        if let Some(api_url) = update.api_url {
            self.api_url = api_url;
        }
        if let Some(api_key) = update.api_key {
            self.api_key = api_key;
        }
    }
}

/// Partial remote configuration; absent fields keep their current value.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RemoteConfigUpdate {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub db_path: Option<String>,
    pub use_ssh: Option<bool>,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
}

/// Answer of [`ModeStore::get_mode`]: the remote config only travels with remote mode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModeInfo {
    pub mode: ConnectionMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_config: Option<RemoteConfig>,
}

/// Consistent view of the state used by one operation.
#[derive(Clone, Debug)]
pub struct ModeSnapshot {
    pub mode: ConnectionMode,
    pub remote: RemoteConfig,
}

#[derive(Debug, Default)]
struct ModeState {
    mode: ConnectionMode,
    remote: RemoteConfig,
}

#[derive(Debug, Default)]
pub struct ModeStore {
    state: Mutex<ModeState>,
}

impl ModeStore {
    pub fn new(mode: ConnectionMode, remote: RemoteConfig) -> Self {
        Self {
            state: Mutex::new(ModeState { mode, remote }),
        }
    }

    pub fn snapshot(&self) -> ModeSnapshot {
        let state = self.lock();
        ModeSnapshot {
            mode: state.mode,
            remote: state.remote.clone(),
        }
    }

    pub fn get_mode(&self) -> ModeInfo {
        let state = self.lock();
        ModeInfo {
            mode: state.mode,
            remote_config: match state.mode {
                ConnectionMode::Remote => Some(state.remote.clone()),
                ConnectionMode::Local => None,
            },
        }
    }

    /// Parses and applies `mode`; an invalid value leaves the current mode untouched.
    pub fn set_mode(&self, mode: &str) -> Result<ConnectionMode, BridgeError> {
        let mode = ConnectionMode::from_str(mode)?;
        let mut state = self.lock();
        if state.mode != mode {
            info!("Switching connection mode from {} to {}", state.mode, mode);
        }
        state.mode = mode;
        Ok(mode)
    }

    /// Merges `update` into the remote config. The update may omit the host only
    /// when one is already configured, and may never blank it.
    pub fn set_remote_config(&self, update: RemoteConfigUpdate) -> Result<RemoteConfig, BridgeError> {
        let mut state = self.lock();
        let host_after_merge = update.host.as_deref().unwrap_or(&state.remote.host);
        if host_after_merge.trim().is_empty() {
            return Err(BridgeError::MissingRequiredField("host"));
        }
        state.remote.merge(update);
        info!(
            "Remote config updated: {}@{}:{} (ssh: {})",
            state.remote.username, state.remote.host, state.remote.port, state.remote.use_ssh
        );
        Ok(state.remote.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ModeState> {
        // The state is plain data, a panic while holding the lock cannot leave it torn.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
