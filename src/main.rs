use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use steeple::config::Config;
use steeple::{content, visitor, AppState};

#[derive(Parser, Debug)]
#[command(name = "steeple")]
#[command(author, version, about = "Client data core for a church community website", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "steeple.toml")]
    config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting steeple v{}", env!("CARGO_PKG_VERSION"));

    let state = Arc::new(AppState::new(config)?);

    // Restore a stored admin session, if any
    state.auth.load();
    if state.auth.is_authenticated() {
        tracing::info!("Restored admin session");
    }

    // Register the visitor before polling starts; a failure here degrades to
    // running without a visitor profile
    state.visitor.initialize(&state.active).await;
    if let Some(error) = state.visitor.last_error() {
        tracing::warn!(error = %error, "Continuing without a visitor profile");
    }

    // Background polling
    content::spawn_content_task(state.content.clone(), state.active.clone());
    visitor::spawn_refresh_task(
        state.visitor.clone(),
        state.config.polling.visitor_refresh_secs,
        state.active.clone(),
    );

    shutdown_signal().await;

    // Stop the pollers before exit; late responses are dropped
    state.active.shutdown();

    tracing::info!("Stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
