use anyhow::{Context, Result};
use clap::Parser;
use std::{fmt::Debug, path::PathBuf};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use beets_web_bridge::config;
use beets_web_bridge::library::LibraryService;
use beets_web_bridge::server::{run_server, RequestsLoggingLevel, ServerConfig};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[clap(about = "Web front-end for a local or remote beets music library")]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 5000)]
    pub port: u16,

    /// The address to bind to.
    #[clap(long, default_value = "127.0.0.1")]
    pub bind_address: String,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Name or path of the local `beet` executable.
    #[clap(long)]
    pub beet_binary: Option<String>,

    /// Path to the beets config.yaml. Defaults to $BEETS_CONFIG or ~/.config/beets/config.yaml.
    #[clap(long, value_parser = parse_path)]
    pub beets_config: Option<PathBuf>,

    /// Path to the beets library database. Defaults to library.db next to the config.
    #[clap(long, value_parser = parse_path)]
    pub beets_db: Option<PathBuf>,

    /// Connection mode at startup: local or remote.
    #[clap(long)]
    pub mode: Option<String>,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            port: args.port,
            bind_address: args.bind_address.clone(),
            logging_level: args.logging_level.clone(),
            frontend_dir_path: args.frontend_dir_path.clone(),
            beet_binary: args.beet_binary.clone(),
            beets_config: args.beets_config.clone(),
            beets_db: args.beets_db.clone(),
            mode: args.mode.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  beets config: {:?}", app_config.beets_paths.config_path);
    info!("  beets library: {:?}", app_config.beets_paths.db_path);
    info!("  beet binary: {}", app_config.beet_binary);
    info!("  mode: {}", app_config.mode);
    if !app_config.remote.host.is_empty() {
        info!(
            "  remote: {}@{}:{} ({})",
            app_config.remote.username,
            app_config.remote.host,
            app_config.remote.port,
            app_config.remote.db_path
        );
    }

    let library = LibraryService::new(app_config.mode_store(), app_config.backend_settings());

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level.clone(),
        port: app_config.port,
        bind_address: app_config.bind_address.clone(),
        frontend_dir_path: app_config.frontend_dir_path.clone(),
    };

    info!("Ready to serve at port {}!", app_config.port);
    run_server(server_config, library).await
}
