//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - Level from config; RUST_LOG takes precedence when set

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::{DeploymentMode, ObservabilityConfig};

/// Initialize the global tracing subscriber. Call once at startup.
pub fn init_logging(config: &ObservabilityConfig, mode: DeploymentMode) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    match mode {
        DeploymentMode::Production => {
            registry.with(tracing_subscriber::fmt::layer().json()).init();
        }
        DeploymentMode::Development => {
            registry.with(tracing_subscriber::fmt::layer().pretty()).init();
        }
    }
}
