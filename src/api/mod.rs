//! # HTTP API
//!
//! Router assembly, handlers, transport error mapping, and the API server.

pub mod docs;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use routes::{build_router, ApiState};
pub use server::start_api_server;
