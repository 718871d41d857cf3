//! # Observability Infrastructure
//!
//! Structured logging for the Civita backend via the tracing ecosystem.

mod logging;

pub use logging::{init_tracing, log_config_info};
