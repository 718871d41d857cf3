//! Login service for email/password authentication.

use std::sync::{Arc, LazyLock};

use tracing::{info, instrument, warn};

use crate::auth::hashing;
use crate::auth::models::LoginRequest;
use crate::domain::User;
use crate::errors::{AuthErrorType, Error, Result};
use crate::storage::repositories::{SqlxUserRepository, UserRepository};

/// Pre-computed dummy hash for timing-safe user enumeration prevention.
/// When a non-existent email is used, we still run bcrypt verification against
/// this hash so the response time matches real verification.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    hashing::hash_password("dummy_startup_value", bcrypt::DEFAULT_COST).unwrap_or_else(|_| {
        "$2b$12$abcdefghijklmnopqrstuvABCDEFGHIJKLMNOPQRSTUVWXYZabcde".to_string()
    })
});

/// Service for handling email/password authentication.
#[derive(Clone)]
pub struct LoginService {
    user_repository: Arc<dyn UserRepository>,
}

impl LoginService {
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    pub fn with_sqlx(pool: crate::storage::DbPool) -> Self {
        Self::new(Arc::new(SqlxUserRepository::new(pool)))
    }

    /// Authenticate a user with email and password.
    ///
    /// Any registered user with matching credentials may log in; there is no
    /// approval-state filter on user records. The email match is exact
    /// (case-sensitive as stored).
    ///
    /// # Errors
    ///
    /// Returns an `InvalidCredentials` auth error for both unknown emails and
    /// wrong passwords so callers cannot enumerate accounts.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<User> {
        let (user, password_hash) =
            match self.user_repository.get_user_with_password(&request.email).await? {
                Some(result) => result,
                None => {
                    // Prevent timing-based user enumeration: perform dummy hash
                    // verification so response time matches real verification
                    if let Err(e) =
                        hashing::verify_password_async(request.password.clone(), DUMMY_HASH.clone())
                            .await
                    {
                        warn!(error = %e, "dummy hash verification failed unexpectedly");
                    }
                    warn!("login attempt for non-existent user");
                    return Err(invalid_credentials());
                }
            };

        let password_matches =
            hashing::verify_password_async(request.password.clone(), password_hash).await?;
        if !password_matches {
            warn!(user_id = %user.id, "login attempt with incorrect password");
            return Err(invalid_credentials());
        }

        info!(user_id = %user.id, role = %user.role, "user logged in successfully");
        Ok(user)
    }
}

fn invalid_credentials() -> Error {
    Error::auth("You provided wrong set of credentials.", AuthErrorType::InvalidCredentials)
}
