//! Location of the local beets config file and library database.

use std::path::{Path, PathBuf};

/// Environment variable naming the beets config file to use.
pub const BEETS_CONFIG_ENV: &str = "BEETS_CONFIG";

pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const LIBRARY_FILE_NAME: &str = "library.db";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BeetsPaths {
    pub config_path: PathBuf,
    pub db_path: PathBuf,
}

impl BeetsPaths {
    /// Resolves the paths from the process environment.
    pub fn from_env() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::resolve(std::env::var(BEETS_CONFIG_ENV).ok().as_deref(), &home)
    }

    /// A config path override places the library next to it, otherwise the
    /// beets defaults under `~/.config/beets` are used.
    pub fn resolve(config_override: Option<&str>, home: &Path) -> Self {
        match config_override.map(str::trim).filter(|s| !s.is_empty()) {
            Some(config) => {
                let config_path = PathBuf::from(config);
                let db_path = config_path
                    .parent()
                    .map(|dir| dir.join(LIBRARY_FILE_NAME))
                    .unwrap_or_else(|| PathBuf::from(LIBRARY_FILE_NAME));
                Self {
                    config_path,
                    db_path,
                }
            }
            None => {
                let dir = home.join(".config").join("beets");
                Self {
                    config_path: dir.join(CONFIG_FILE_NAME),
                    db_path: dir.join(LIBRARY_FILE_NAME),
                }
            }
        }
    }

    /// Explicitly configured paths win over the resolved ones.
    pub fn with_overrides(mut self, config_path: Option<PathBuf>, db_path: Option<PathBuf>) -> Self {
        if let Some(config_path) = config_path {
            if db_path.is_none() {
                if let Some(dir) = config_path.parent() {
                    self.db_path = dir.join(LIBRARY_FILE_NAME);
                }
            }
            self.config_path = config_path;
        }
        if let Some(db_path) = db_path {
            self.db_path = db_path;
        }
        self
    }

    pub fn config_dir(&self) -> PathBuf {
        self.config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Remote counterpart of the config file: the sibling `config.yaml` of the remote library.
pub fn remote_config_path(remote_db_path: &str) -> String {
    match remote_db_path.rfind('/') {
        Some(idx) => format!("{}/{}", &remote_db_path[..idx], CONFIG_FILE_NAME),
        None => CONFIG_FILE_NAME.to_string(),
    }
}

pub fn remote_config_dir(remote_db_path: &str) -> String {
    match remote_db_path.rfind('/') {
        Some(0) => "/".to_string(),
        Some(idx) => remote_db_path[..idx].to_string(),
        None => ".".to_string(),
    }
}
