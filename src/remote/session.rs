//! Authenticated SSH sessions with an SFTP side channel.
//!
//! A session belongs to the single call that opened it. [`with_session`] closes
//! it when the call is done, and the `Drop` impl disconnects sessions whose owner
//! bailed out early, so every session is disconnected exactly once.
//!
//! Backends only see the [`RemoteShell`] and [`RemoteConnector`] traits.

use ssh2::{CheckResult, KnownHostFileKind, Session};
use std::fs::File;
use std::io::Read;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::library::{BridgeError, BridgeResult, CommandResult};
use crate::mode::RemoteConfig;

/// What to do with the host key presented by the remote server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostKeyPolicy {
    /// Accept any host key.
    TrustUnknown,
    /// Only accept hosts listed in an OpenSSH `known_hosts` file.
    KnownHosts(PathBuf),
}

impl Default for HostKeyPolicy {
    fn default() -> Self {
        Self::TrustUnknown
    }
}

#[derive(Clone, Debug, Default)]
pub struct SshOptions {
    pub host_key_policy: HostKeyPolicy,
    /// Applies to the TCP connect only; remote commands run to completion.
    pub connect_timeout: Option<Duration>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferDirection {
    Download,
    Upload,
}

/// What a backend can do with an open remote session.
#[cfg_attr(test, mockall::automock)]
pub trait RemoteShell {
    /// Runs `command_line` through the remote shell and waits for it to exit.
    fn exec(&self, command_line: &str) -> BridgeResult<CommandResult>;

    /// Copies a file over SFTP, returning the number of bytes transferred.
    fn transfer(
        &self,
        remote_path: &str,
        local_path: &Path,
        direction: TransferDirection,
    ) -> BridgeResult<u64>;

    /// Best-effort delete of a remote file. Failures are only logged.
    fn remove_remote(&self, remote_path: &str);

    /// Disconnects. Calling it again is a no-op.
    fn close(&mut self);
}

/// Opens authenticated sessions to a remote host.
#[cfg_attr(test, mockall::automock)]
pub trait RemoteConnector: Send + Sync {
    fn connect(
        &self,
        config: &RemoteConfig,
        options: &SshOptions,
    ) -> BridgeResult<Box<dyn RemoteShell>>;
}

/// Connector for real SSH sessions.
#[derive(Clone, Copy, Debug, Default)]
pub struct SshConnector;

impl RemoteConnector for SshConnector {
    fn connect(
        &self,
        config: &RemoteConfig,
        options: &SshOptions,
    ) -> BridgeResult<Box<dyn RemoteShell>> {
        Ok(Box::new(RemoteSession::open(config, options)?))
    }
}

pub struct RemoteSession {
    session: Session,
    label: String,
    closed: bool,
}

impl RemoteSession {
    pub fn open(config: &RemoteConfig, options: &SshOptions) -> BridgeResult<Self> {
        let label = format!("{}@{}:{}", config.username, config.host, config.port);
        let unreachable = |reason: String| BridgeError::RemoteUnreachable {
            host: config.host.clone(),
            port: config.port,
            reason,
        };

        let tcp = connect_tcp(&config.host, config.port, options.connect_timeout)
            .map_err(|e| unreachable(e.to_string()))?;

        let mut session = Session::new().map_err(|e| unreachable(e.to_string()))?;
        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|e| unreachable(format!("SSH handshake failed: {}", e)))?;

        verify_host_key(&session, config, &options.host_key_policy)?;

        session
            .userauth_password(&config.username, &config.password)
            .map_err(|e| {
                debug!("Password authentication for {} failed: {}", label, e);
                BridgeError::AuthenticationFailed {
                    username: config.username.clone(),
                    host: config.host.clone(),
                }
            })?;
        if !session.authenticated() {
            return Err(BridgeError::AuthenticationFailed {
                username: config.username.clone(),
                host: config.host.clone(),
            });
        }

        info!("Opened SSH session to {}", label);
        Ok(Self {
            session,
            label,
            closed: false,
        })
    }
}

impl RemoteShell for RemoteSession {
    fn exec(&self, command_line: &str) -> BridgeResult<CommandResult> {
        debug!("[{}] exec: {}", self.label, command_line);
        let remote_err = |e: ssh2::Error| BridgeError::RemoteCommand(e.to_string());

        let mut channel = self.session.channel_session().map_err(remote_err)?;
        channel.exec(command_line).map_err(remote_err)?;

        let mut stdout = Vec::new();
        channel.read_to_end(&mut stdout)?;
        let mut stderr = Vec::new();
        channel.stderr().read_to_end(&mut stderr)?;

        channel.wait_close().map_err(remote_err)?;
        let exit_status = channel.exit_status().map_err(remote_err)?;

        Ok(CommandResult::new(
            String::from_utf8_lossy(&stdout).into_owned(),
            String::from_utf8_lossy(&stderr).into_owned(),
            exit_status,
        ))
    }

    fn transfer(
        &self,
        remote_path: &str,
        local_path: &Path,
        direction: TransferDirection,
    ) -> BridgeResult<u64> {
        let sftp = self
            .session
            .sftp()
            .map_err(|e| BridgeError::RemoteCommand(format!("SFTP unavailable: {}", e)))?;

        let bytes = match direction {
            TransferDirection::Download => {
                let mut remote = sftp.open(Path::new(remote_path)).map_err(|e| {
                    BridgeError::RemoteCommand(format!("cannot open remote {}: {}", remote_path, e))
                })?;
                let mut local = File::create(local_path)?;
                std::io::copy(&mut remote, &mut local)?
            }
            TransferDirection::Upload => {
                let mut local = File::open(local_path)?;
                let mut remote = sftp.create(Path::new(remote_path)).map_err(|e| {
                    BridgeError::RemoteCommand(format!(
                        "cannot create remote {}: {}",
                        remote_path, e
                    ))
                })?;
                std::io::copy(&mut local, &mut remote)?
            }
        };
        debug!(
            "[{}] {:?} {} <-> {:?} ({:#})",
            self.label,
            direction,
            remote_path,
            local_path,
            byte_unit::Byte::from(bytes)
        );
        Ok(bytes)
    }

    fn remove_remote(&self, remote_path: &str) {
        let result = self
            .session
            .sftp()
            .and_then(|sftp| sftp.unlink(Path::new(remote_path)));
        if let Err(e) = result {
            warn!(
                "[{}] Could not remove remote file {}: {}",
                self.label, remote_path, e
            );
        }
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.session.disconnect(None, "closing", None) {
            debug!("[{}] Disconnect failed: {}", self.label, e);
        }
        info!("Closed SSH session to {}", self.label);
    }
}

impl Drop for RemoteSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Opens a session, hands it to `f` and closes it whatever `f` returns.
pub fn with_session<T, F>(
    connector: &dyn RemoteConnector,
    config: &RemoteConfig,
    options: &SshOptions,
    f: F,
) -> BridgeResult<T>
where
    F: FnOnce(&dyn RemoteShell) -> BridgeResult<T>,
{
    let mut session = connector.connect(config, options)?;
    let result = f(session.as_ref());
    session.close();
    result
}

fn connect_tcp(host: &str, port: u16, timeout: Option<Duration>) -> std::io::Result<TcpStream> {
    let timeout = match timeout {
        Some(timeout) => timeout,
        None => return TcpStream::connect((host, port)),
    };
    let mut last_err = None;
    for addr in (host, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no address found for {}", host),
        )
    }))
}

fn verify_host_key(
    session: &Session,
    config: &RemoteConfig,
    policy: &HostKeyPolicy,
) -> BridgeResult<()> {
    let rejected = |reason: String| BridgeError::HostKeyRejected {
        host: config.host.clone(),
        reason,
    };
    let (key, _key_type) = session
        .host_key()
        .ok_or_else(|| rejected("server presented no host key".to_string()))?;

    match policy {
        HostKeyPolicy::TrustUnknown => {
            debug!("Accepting host key of {} without verification", config.host);
            Ok(())
        }
        HostKeyPolicy::KnownHosts(path) => {
            let mut known_hosts = session
                .known_hosts()
                .map_err(|e| rejected(e.to_string()))?;
            known_hosts
                .read_file(path, KnownHostFileKind::OpenSSH)
                .map_err(|e| rejected(format!("cannot read {:?}: {}", path, e)))?;
            match known_hosts.check_port(&config.host, config.port, key) {
                CheckResult::Match => Ok(()),
                CheckResult::NotFound => Err(rejected(format!("host not listed in {:?}", path))),
                CheckResult::Mismatch => Err(rejected("host key mismatch".to_string())),
                CheckResult::Failure => Err(rejected("host key check failed".to_string())),
            }
        }
    }
}
