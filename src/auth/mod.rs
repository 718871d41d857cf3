//! Authentication and authorization: credential hashing, stateless bearer
//! tokens, the login service, and the request gate middleware.

pub mod hashing;
pub mod login_service;
pub mod middleware;
pub mod models;
pub mod token_service;

pub use login_service::LoginService;
pub use models::{AuthContext, AuthError, LoginRequest, RefreshRequest, TokenPair};
pub use token_service::{AccessClaims, RefreshClaims, TokenService};
