//! podium-pc - Practice Coach service
//!
//! Presentation practice session lifecycle: sessions with retryable
//! attempts, an asynchronous analysis job and a self-evaluation form per
//! attempt, and an atomic commit once both are done. REST + SSE surface
//! for the Podium frontend.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use podium_common::config::ServiceConfig;
use podium_common::events::EventBus;
use podium_pc::{build_router, AppState};

/// Command-line arguments for podium-pc
#[derive(Parser, Debug)]
#[command(name = "podium-pc")]
#[command(about = "Practice Coach service for Podium")]
#[command(version)]
struct Args {
    /// Host to bind (overrides PODIUM_HOST and the config file)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PODIUM_PORT and the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to a podium.toml config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed the store with demo sessions on startup
    #[arg(long)]
    seed_demo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "podium_pc=debug,podium_common=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Podium Practice Coach (podium-pc) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();

    // Resolve listen address: CLI > environment > config file > default
    let config = ServiceConfig::resolve(args.host.as_deref(), args.port, args.config.as_deref())?;

    // One analysis run emits ~100 progress events between SSE reads
    let event_bus = EventBus::new(256);
    let state = AppState::new(event_bus);

    if args.seed_demo {
        state.store.seed_demo().await?;
        info!(
            "Seeded {} demo sessions",
            state.store.session_count().await
        );
    }

    let app = build_router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("podium-pc listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated abnormally")?;

    info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM so axum can drain in-flight requests
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Ctrl+C handler registration failed");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler registration failed")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl+C received, stopping"),
        _ = terminate => info!("SIGTERM received, stopping"),
    }
}
