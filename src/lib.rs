// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod feed;
pub mod interpret;
pub mod llm;
pub mod metrics;
pub mod prompt;

// Convenient access to the router: `crate_root::api::router` or `crate_root::router`
pub use crate::api::{router, AppState};
pub use crate::config::ServiceConfig;
pub use crate::error::ApiError;

/// Build the production router from a loaded config (HTTP feed + Gemini).
pub fn app(config: ServiceConfig) -> anyhow::Result<axum::Router> {
    let state = AppState::from_config(config)?;
    Ok(router(state))
}
