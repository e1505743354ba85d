use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub logging_level: Option<String>,
    pub frontend_dir_path: Option<String>,
    pub beet_binary: Option<String>,
    pub remote_beet_binary: Option<String>,
    pub beets_config: Option<String>,
    pub beets_db: Option<String>,
    /// Connection mode at startup: "local" or "remote".
    pub mode: Option<String>,

    pub remote: Option<RemoteFileConfig>,
    pub ssh: Option<SshFileConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct RemoteFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub db_path: Option<String>,
    pub use_ssh: Option<bool>,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SshFileConfig {
    /// "trust_unknown" or "known_hosts"
    pub host_key_policy: Option<String>,
    pub known_hosts_path: Option<String>,
    pub connect_timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn loads_sections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
port = 8337
mode = "remote"

[remote]
host = "nas.local"
username = "pi"
db_path = "/home/pi/.config/beets/library.db"

[ssh]
host_key_policy = "known_hosts"
connect_timeout_secs = 5
"#,
        )
        .unwrap();

        let config = FileConfig::load(&path).unwrap();
        assert_eq!(config.port, Some(8337));
        assert_eq!(config.mode.as_deref(), Some("remote"));
        let remote = config.remote.unwrap();
        assert_eq!(remote.host.as_deref(), Some("nas.local"));
        assert_eq!(remote.port, None);
        let ssh = config.ssh.unwrap();
        assert_eq!(ssh.host_key_policy.as_deref(), Some("known_hosts"));
        assert_eq!(ssh.connect_timeout_secs, Some(5));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = FileConfig::load(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "port = \"not a number\"").unwrap();
        let err = FileConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
