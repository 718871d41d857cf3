//! # Configuration Management
//!
//! Typed configuration for the Civita backend, loaded from the environment by
//! the bootstrap layer and handed to the core as opaque inputs.

mod settings;

pub use settings::{
    AppConfig, AuthConfig, BlobStoreConfig, DatabaseConfig, ObservabilityConfig, ServerConfig,
};
