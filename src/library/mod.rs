pub mod adapter;
mod error;
mod models;
pub mod paths;
mod service;
pub mod store;

pub use error::{BridgeError, BridgeResult};
pub use models::{
    AlbumArt, AlbumSummary, BeetsInfo, CommandResult, ConfigStatus, ItemsPage, LibraryItem,
    PathCheck, SortKey,
};
pub use paths::BeetsPaths;
pub use service::LibraryService;
pub use store::LibraryStore;
