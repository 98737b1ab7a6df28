// ABOUTME: Library half of the opsdesk binary
// ABOUTME: Configuration, logging setup, server assembly, and maintenance commands

pub mod commands;
pub mod config;
pub mod server;

use tracing_subscriber::EnvFilter;

pub use config::{Config, ConfigError};

/// Install the global tracing subscriber. `RUST_LOG` wins over the
/// configured default filter.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
