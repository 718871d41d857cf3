//! # Civita
//!
//! Civita is the backend for an NGO-listing platform: individuals register as
//! users, organizations apply for listing, administrators approve or reject
//! applications, and approved organizations upload verification documents.
//!
//! ## Architecture
//!
//! The system follows a layered architecture pattern:
//!
//! ```text
//! REST API Layer → Services → Repositories / Blob Store
//!      ↓              ↓               ↓
//! Access Gate    Token/Login     SQLite (sqlx) + filesystem blobs
//! ```
//!
//! ## Core Components
//!
//! - **Access Control Gate**: Axum middleware validating stateless JWT bearer
//!   credentials and enforcing per-route role allow-lists
//! - **Token Service**: Issues access (24h) and refresh (168h) tokens signed
//!   with independent keys
//! - **Registries**: User and organization services over sqlx repositories,
//!   with the organization approval state machine
//! - **Document Ingestion Pipeline**: Authorizes, validates, and streams
//!   uploads into the blob store, then records the reference
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use civita::{api, blobs::FsBlobStore, auth::TokenService, config::AppConfig, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::from_env()?;
//!     let pool = civita::storage::create_pool(&config.database).await?;
//!     let state = api::ApiState {
//!         pool,
//!         token_service: Arc::new(TokenService::new(&config.auth)),
//!         blob_store: Arc::new(FsBlobStore::new(&config.blobs.root)),
//!         bcrypt_cost: config.auth.bcrypt_cost,
//!         max_upload_bytes: config.server.max_upload_bytes,
//!     };
//!     api::start_api_server(&config.server, state).await
//! }
//! ```

pub mod api;
pub mod auth;
pub mod blobs;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod services;
pub mod storage;

// Re-export commonly used types and traits
pub use config::AppConfig;
pub use errors::{Error, Result};
pub use observability::init_tracing;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
