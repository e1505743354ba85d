use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    shell_command_line, shell_quote, LibraryBackend, StoreHandle, CONFIG_DIR_CHECK,
    CONFIG_FILE_CHECK, LIBRARY_DB_CHECK,
};
use crate::library::paths::{remote_config_dir, remote_config_path};
use crate::library::{BridgeError, BridgeResult, CommandResult, ConfigStatus, PathCheck};
use crate::mode::{ConnectionMode, RemoteConfig};
use crate::remote::{
    stage_remote_store, with_session, RemoteConnector, RemoteShell, SshConnector, SshOptions,
    TransferDirection,
};

/// Runs beets on a remote host over SSH. Library reads go through a staged
/// copy of the remote database. Each call opens and closes its own session.
pub struct SshBackend {
    remote: RemoteConfig,
    options: SshOptions,
    beet_binary: String,
    connector: Arc<dyn RemoteConnector>,
}

impl SshBackend {
    pub fn new(remote: RemoteConfig, options: SshOptions, beet_binary: String) -> Self {
        Self {
            remote,
            options,
            beet_binary,
            connector: Arc::new(SshConnector),
        }
    }

    /// Replaces the SSH connector, e.g. with one that never leaves the process.
    pub fn with_connector(mut self, connector: Arc<dyn RemoteConnector>) -> Self {
        self.connector = connector;
        self
    }

    fn session<T, F>(&self, f: F) -> BridgeResult<T>
    where
        F: FnOnce(&dyn RemoteShell) -> BridgeResult<T>,
    {
        with_session(self.connector.as_ref(), &self.remote, &self.options, f)
    }

    fn config_path(&self) -> String {
        remote_config_path(&self.remote.db_path)
    }
}

impl LibraryBackend for SshBackend {
    fn mode(&self) -> ConnectionMode {
        ConnectionMode::Remote
    }

    fn config_location(&self) -> String {
        format!("{}:{}", self.remote.host, self.config_path())
    }

    fn library_location(&self) -> String {
        format!("{}:{}", self.remote.host, self.remote.db_path)
    }

    fn open_store(&self) -> BridgeResult<StoreHandle> {
        stage_remote_store(self.connector.as_ref(), &self.remote, &self.options)
            .map(StoreHandle::Staged)
    }

    fn run_tool(&self, args: &[String]) -> BridgeResult<CommandResult> {
        let command_line = shell_command_line(&self.beet_binary, args)?;
        self.session(|session| session.exec(&command_line))
    }

    fn fetch_album_art(&self, album_query: &[String]) -> BridgeResult<Option<Vec<u8>>> {
        let remote_file = format!("/tmp/beets-web-art-{}", Uuid::new_v4());
        let mut args = vec!["albumart".to_string(), "-o".to_string(), remote_file.clone()];
        args.extend_from_slice(album_query);
        let command_line = shell_command_line(&self.beet_binary, &args)?;

        self.session(|session| {
            let result = session.exec(&command_line)?;
            let fetched = if result.success {
                download_bytes(session, &remote_file).map(Some)
            } else {
                debug!("No album art for {:?}: {}", album_query, result.stderr.trim());
                Ok(None)
            };
            // beets may leave a partial file behind even when it fails
            session.remove_remote(&remote_file);
            fetched
        })
    }

    fn import_path(&self, path: &str) -> BridgeResult<CommandResult> {
        info!("Importing {} on {}", path, self.remote.host);
        self.run_tool(&["import".to_string(), path.to_string()])
    }

    fn config_status(&self) -> BridgeResult<ConfigStatus> {
        let check_script = format!(
            "test -e {db} && echo db; test -e {config} && echo config; {beet} --version >/dev/null 2>&1 && echo beets; true",
            db = shell_quote(&self.remote.db_path)?,
            config = shell_quote(&self.config_path())?,
            beet = shell_quote(&self.beet_binary)?,
        );
        let result = self.session(|session| session.exec(&check_script))?;
        let found: Vec<&str> = result.stdout.lines().map(str::trim).collect();
        Ok(ConfigStatus {
            mode: ConnectionMode::Remote,
            config_exists: found.contains(&"config"),
            db_exists: found.contains(&"db"),
            beets_installed: found.contains(&"beets"),
            config_path: self.config_path(),
            db_path: self.remote.db_path.clone(),
        })
    }

    fn check_paths(&self) -> BridgeResult<Vec<PathCheck>> {
        let targets = [
            (CONFIG_DIR_CHECK, remote_config_dir(&self.remote.db_path)),
            (CONFIG_FILE_CHECK, self.config_path()),
            (LIBRARY_DB_CHECK, self.remote.db_path.clone()),
        ];
        let mut check_script = String::new();
        for (_, path) in &targets {
            let quoted = shell_quote(path)?;
            check_script.push_str(&format!(
                "if [ -e {p} ]; then printf '1 '; else printf '0 '; fi; if [ -w {p} ]; then echo 1; else echo 0; fi; ",
                p = quoted
            ));
        }
        let result = self.session(|session| session.exec(&check_script))?;
        parse_path_checks(&result.stdout, &targets)
    }

    fn read_config_document(&self) -> BridgeResult<Option<String>> {
        let config_path = self.config_path();
        let check_script = format!("test -f {}", shell_quote(&config_path)?);
        self.session(|session| {
            if !session.exec(&check_script)?.success {
                return Ok(None);
            }
            let bytes = download_bytes(session, &config_path)?;
            Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
        })
    }

    fn write_config_document(&self, contents: &str) -> BridgeResult<()> {
        let config_path = self.config_path();
        let mut local = NamedTempFile::new()?;
        local.write_all(contents.as_bytes())?;
        local.flush()?;

        let mkdir = format!(
            "mkdir -p {}",
            shell_quote(&remote_config_dir(&self.remote.db_path))?
        );
        self.session(|session| {
            let result = session.exec(&mkdir)?;
            if !result.success {
                return Err(BridgeError::RemoteCommand(result.stderr.trim().to_string()));
            }
            session.transfer(&config_path, local.path(), TransferDirection::Upload)?;
            Ok(())
        })?;
        info!("Wrote beets config to {}", self.config_location());
        Ok(())
    }

    fn backup_store(&self) -> BridgeResult<String> {
        let backup = format!(
            "{}.bak-{}",
            self.remote.db_path,
            chrono::Utc::now().timestamp()
        );
        let command_line = format!(
            "mv -- {} {}",
            shell_quote(&self.remote.db_path)?,
            shell_quote(&backup)?
        );
        let result = self.session(|session| session.exec(&command_line))?;
        if !result.success {
            return Err(BridgeError::RemoteCommand(result.stderr.trim().to_string()));
        }
        warn!(
            "Moved remote beets library {} to {}",
            self.library_location(),
            backup
        );
        Ok(backup)
    }
}

fn download_bytes(session: &dyn RemoteShell, remote_path: &str) -> BridgeResult<Vec<u8>> {
    let local = NamedTempFile::new()?;
    session.transfer(remote_path, local.path(), TransferDirection::Download)?;
    Ok(std::fs::read(local.path())?)
}

/// Parses one `<exists> <writable>` line per target, in target order.
fn parse_path_checks(stdout: &str, targets: &[(&str, String)]) -> BridgeResult<Vec<PathCheck>> {
    let lines: Vec<&str> = stdout.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() != targets.len() {
        return Err(BridgeError::RemoteCommand(format!(
            "unexpected path check output: {:?}",
            stdout
        )));
    }
    Ok(targets
        .iter()
        .zip(lines)
        .map(|((name, path), line)| {
            let mut flags = line.split_whitespace();
            PathCheck {
                name: name.to_string(),
                path: path.clone(),
                exists: flags.next() == Some("1"),
                writable: flags.next() == Some("1"),
            }
        })
        .collect())
}
