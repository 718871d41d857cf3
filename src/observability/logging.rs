//! # Structured Logging
//!
//! Subscriber initialization and startup logging. `RUST_LOG` overrides the
//! configured default filter; JSON output is available for log shippers.

use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, ObservabilityConfig};
use crate::errors::{Error, Result};

/// Initialize the global tracing subscriber.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let result = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|err| Error::config(format!("Failed to initialize tracing: {}", err)))
}

/// Log configuration at startup
pub fn log_config_info(config: &AppConfig) {
    tracing::info!(
        server_address = %config.server.bind_address(),
        database_url = %config.database.url,
        blob_root = %config.blobs.root.display(),
        bcrypt_cost = config.auth.bcrypt_cost,
        access_token_ttl_hours = config.auth.access_token_ttl_hours,
        refresh_token_ttl_hours = config.auth.refresh_token_ttl_hours,
        "Civita backend configuration"
    );
}
