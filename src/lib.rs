//! Web bridge to a beets music library, local or on a remote host over SSH.
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod backend;
pub mod beets_config;
pub mod config;
pub mod library;
pub mod mode;
pub mod remote;
pub mod server;

// Re-export commonly used types for convenience
pub use library::{BridgeError, BridgeResult, LibraryService};
pub use mode::{ConnectionMode, ModeStore, RemoteConfig};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
