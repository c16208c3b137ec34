//! Bluesky digest service: binary entrypoint.
//! Loads config once, wires the feed + Gemini clients, and serves the Axum router.

use anyhow::Context;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bluesky_digest::ServiceConfig;

/// Compact logs filtered by RUST_LOG (default `bluesky_digest=info,warn`).
/// Shuttle may already have installed a subscriber; that one wins.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bluesky_digest=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = ServiceConfig::load().context("loading digest config")?;
    let router = bluesky_digest::app(config).context("building digest service")?;

    Ok(router.into())
}
