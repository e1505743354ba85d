mod session;
mod staging;

pub use session::{
    with_session, HostKeyPolicy, RemoteConnector, RemoteSession, RemoteShell, SshConnector,
    SshOptions, TransferDirection,
};
pub use staging::{stage_remote_store, StagedStore};

#[cfg(test)]
pub(crate) use session::{MockRemoteConnector, MockRemoteShell};
