//! PlaceHub Q&A service - Main entry point
//!
//! Hosts the anonymous Q&A REST surface, the shared realtime channel and the
//! archive sweeper in one process.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use placehub_common::config;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use placehub_qa::archiver::{ArchiveConfig, ArchiveService};
use placehub_qa::{build_router, AppState};

/// Command-line arguments for placehub-qa
#[derive(Parser, Debug)]
#[command(name = "placehub-qa")]
#[command(about = "Anonymous Q&A service for PlaceHub")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5760", env = "PLACEHUB_QA_PORT")]
    port: u16,

    /// Data folder holding the database (falls back to env/config/default)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "placehub_qa=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!(
        "Starting PlaceHub Q&A service v{} on port {}",
        env!("CARGO_PKG_VERSION"),
        args.port
    );

    // Resolve data folder and open the database
    let root_folder = config::resolve_root_folder(args.root_folder.as_deref());
    config::ensure_root_folder(&root_folder).context("Failed to create data folder")?;
    info!("Data folder: {}", root_folder.display());

    let db_path = config::database_path(&root_folder);
    let pool = placehub_common::db::init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let state = AppState::new(pool.clone());

    // Start the archive sweeper for the lifetime of the process
    let archive_config = ArchiveConfig::from_database(&pool).await;
    Arc::new(ArchiveService::new(archive_config, pool)).run();

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
