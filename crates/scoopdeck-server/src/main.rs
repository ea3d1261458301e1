//! Scoopdeck server - HTTP/WebSocket front door for Scoop.

use anyhow::Result;
use clap::Parser;
use scoopdeck_core::{Dispatcher, FavoriteBucket, FavoriteStore};
use scoopdeck_server::{config, logging, routes, state, table_processor};
use scoopdeck_types::ScoopRequest;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use config::Config;
use logging::{LogConfig, LogFormat};
use state::AppState;

/// Scoopdeck server - live view and control of a Scoop installation.
#[derive(Parser, Debug)]
#[command(name = "scoopdeck-server")]
#[command(about = "HTTP/WebSocket server driving the Scoop package manager")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override port from config
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the Scoop installation root from config
    #[arg(long, value_name = "DIR")]
    scoop_root: Option<PathBuf>,

    /// Enable verbose logging (INFO level for most targets)
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace logging (includes raw process output)
    #[arg(long)]
    trace: bool,

    /// Quiet mode (WARN and ERROR only)
    #[arg(short, long)]
    quiet: bool,

    /// Set log level for specific targets (e.g., "parser=trace").
    /// Can be specified multiple times. Targets are prefixed with "scoopdeck::" automatically.
    #[arg(long = "log", value_name = "TARGET=LEVEL")]
    log_overrides: Vec<String>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", value_enum, default_value = "text")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig::from_cli(
        cli.verbose,
        cli.debug,
        cli.trace,
        cli.quiet,
        cli.log_overrides,
        cli.log_format,
    );
    logging::init(&log_config);

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(scoop_root) = cli.scoop_root {
        config.scoop_root = scoop_root;
    }

    tracing::info!(
        target: "scoopdeck::startup",
        "Loaded configuration (port: {}, scoop root: {:?})",
        config.port, config.scoop_root
    );

    // an unreadable favorite store is fatal
    let favorite = FavoriteBucket::restore(FavoriteStore::in_dir(&config.data_dir))?;
    let dispatcher = Dispatcher::new(config.scoop_paths(), favorite);

    let state = Arc::new(AppState::new(config.clone(), dispatcher.handle()));
    table_processor::spawn_table_processor(state.clone());
    tracing::info!(target: "scoopdeck::startup", "Started table processor");

    let mut dispatcher_task = tokio::spawn(dispatcher.run());

    // initial load, as a freshly opened app table would request it
    for request in [ScoopRequest::List, ScoopRequest::Status, ScoopRequest::BucketList] {
        state.dispatch.submit(request)?;
    }

    let app = routes::router(state)
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!(target: "scoopdeck::startup", "Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tokio::select! {
        result = axum::serve(listener, app).into_future() => result?,
        result = &mut dispatcher_task => {
            // the dispatcher only stops on a persistence failure
            result??;
            tracing::warn!(target: "scoopdeck::startup", "Dispatcher stopped");
        }
    }

    Ok(())
}
