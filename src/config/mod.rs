mod file_config;

pub use file_config::{FileConfig, RemoteFileConfig, SshFileConfig};

use crate::backend::{BackendSettings, LocalSettings};
use crate::library::BeetsPaths;
use crate::mode::{ConnectionMode, ModeStore, RemoteConfig};
use crate::remote::{HostKeyPolicy, SshOptions};
use crate::server::RequestsLoggingLevel;
use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BEET_BINARY: &str = "beet";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub port: u16,
    pub bind_address: String,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub beet_binary: Option<String>,
    pub beets_config: Option<PathBuf>,
    pub beets_db: Option<PathBuf>,
    pub mode: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub port: u16,
    pub bind_address: String,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,

    // Beets
    pub beet_binary: String,
    pub remote_beet_binary: String,
    pub beets_paths: BeetsPaths,

    // Connection mode at startup
    pub mode: ConnectionMode,
    pub remote: RemoteConfig,
    pub ssh: SshOptions,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        Self::resolve_with_paths(cli, file_config, BeetsPaths::from_env())
    }

    /// Like [`AppConfig::resolve`], starting from `base_paths` instead of the
    /// environment-derived beets locations.
    pub fn resolve_with_paths(
        cli: &CliConfig,
        file_config: Option<FileConfig>,
        base_paths: BeetsPaths,
    ) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        // TOML overrides CLI for each field
        let port = file.port.unwrap_or(cli.port);
        let bind_address = file
            .bind_address
            .unwrap_or_else(|| cli.bind_address.clone());

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let beet_binary = file
            .beet_binary
            .or_else(|| cli.beet_binary.clone())
            .unwrap_or_else(|| DEFAULT_BEET_BINARY.to_string());
        let remote_beet_binary = file
            .remote_beet_binary
            .unwrap_or_else(|| DEFAULT_BEET_BINARY.to_string());

        let beets_paths = base_paths.with_overrides(
            file.beets_config
                .map(PathBuf::from)
                .or_else(|| cli.beets_config.clone()),
            file.beets_db.map(PathBuf::from).or_else(|| cli.beets_db.clone()),
        );

        let mode = match file.mode.or_else(|| cli.mode.clone()) {
            Some(mode) => mode
                .parse::<ConnectionMode>()
                .map_err(|e| anyhow!("Invalid startup mode: {}", e))?,
            None => ConnectionMode::Local,
        };

        let remote = remote_config(file.remote.unwrap_or_default());
        if mode == ConnectionMode::Remote && remote.use_ssh && !remote.is_valid() {
            bail!("Remote mode requires a host in the [remote] section");
        }

        let ssh = ssh_options(file.ssh.unwrap_or_default())?;

        Ok(Self {
            port,
            bind_address,
            logging_level,
            frontend_dir_path,
            beet_binary,
            remote_beet_binary,
            beets_paths,
            mode,
            remote,
            ssh,
        })
    }

    pub fn mode_store(&self) -> ModeStore {
        ModeStore::new(self.mode, self.remote.clone())
    }

    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            local: LocalSettings {
                beet_binary: self.beet_binary.clone(),
                paths: self.beets_paths.clone(),
            },
            remote_beet_binary: self.remote_beet_binary.clone(),
            ssh: self.ssh.clone(),
        }
    }
}

fn remote_config(file: RemoteFileConfig) -> RemoteConfig {
    let defaults = RemoteConfig::default();
    RemoteConfig {
        host: file.host.unwrap_or(defaults.host),
        port: file.port.unwrap_or(defaults.port),
        username: file.username.unwrap_or(defaults.username),
        password: file.password.unwrap_or(defaults.password),
        db_path: file.db_path.unwrap_or(defaults.db_path),
        use_ssh: file.use_ssh.unwrap_or(defaults.use_ssh),
        api_url: file.api_url.unwrap_or(defaults.api_url),
        api_key: file.api_key.unwrap_or(defaults.api_key),
    }
}

fn ssh_options(file: SshFileConfig) -> Result<SshOptions> {
    let host_key_policy = match file.host_key_policy.as_deref() {
        None | Some("trust_unknown") => HostKeyPolicy::TrustUnknown,
        Some("known_hosts") => {
            let path = match file.known_hosts_path {
                Some(path) => PathBuf::from(path),
                None => dirs::home_dir()
                    .map(|home| home.join(".ssh").join("known_hosts"))
                    .ok_or_else(|| {
                        anyhow!("known_hosts_path must be set when the home directory is unknown")
                    })?,
            };
            HostKeyPolicy::KnownHosts(path)
        }
        Some(other) => bail!(
            "Invalid host_key_policy '{}', expected 'trust_unknown' or 'known_hosts'",
            other
        ),
    };

    let timeout_secs = file
        .connect_timeout_secs
        .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);
    let connect_timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

    Ok(SshOptions {
        host_key_policy,
        connect_timeout,
    })
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
