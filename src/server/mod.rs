mod beets_routes;
pub mod config;
mod error;
mod http_layers;
mod library_routes;
mod mode_routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use http_layers::*;
pub(self) use beets_routes::make_beets_routes;
pub(self) use library_routes::make_library_routes;
pub(self) use mode_routes::make_mode_routes;
pub use server::{make_app, run_server};
