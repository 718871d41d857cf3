//! Stateless bearer credential issuance and validation.
//!
//! Two independent signing keys: access tokens carry `{sub, role}` and expire
//! after 24 hours; refresh tokens carry `{sub}` only and expire after 168
//! hours. Both are self-contained — there is no server-side session store, so
//! expiry (or key rotation) is the only way a credential becomes invalid.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::models::{AuthError, TokenPair};
use crate::config::AuthConfig;
use crate::domain::{Role, UserId};
use crate::errors::{Error, Result};

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Claims carried by a refresh token. Deliberately role-free: the role is
/// re-read from the user record when the pair is refreshed.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Service issuing and validating the access/refresh token pair.
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    /// Create a token service from the configured signing keys and lifetimes.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_token_key.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_token_key.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_token_key.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_token_key.as_bytes()),
            validation: Validation::default(),
            access_ttl: Duration::hours(config.access_token_ttl_hours),
            refresh_ttl: Duration::hours(config.refresh_token_ttl_hours),
        }
    }

    /// Issue an access/refresh pair for the given user.
    pub fn issue(&self, user_id: &UserId, role: Role) -> Result<TokenPair> {
        let now = Utc::now();
        let iat = now.timestamp();

        let access_claims = AccessClaims {
            sub: user_id.to_string(),
            role,
            iat,
            exp: (now + self.access_ttl).timestamp(),
        };
        let refresh_claims = RefreshClaims {
            sub: user_id.to_string(),
            iat,
            exp: (now + self.refresh_ttl).timestamp(),
        };

        let access_token = encode(&Header::default(), &access_claims, &self.access_encoding)
            .map_err(|err| Error::internal(format!("Failed to sign access token: {}", err)))?;
        let refresh_token = encode(&Header::default(), &refresh_claims, &self.refresh_encoding)
            .map_err(|err| Error::internal(format!("Failed to sign refresh token: {}", err)))?;

        Ok(TokenPair { access_token, refresh_token })
    }

    /// Validate an access token and return its claims.
    pub fn validate_access(&self, token: &str) -> std::result::Result<AccessClaims, AuthError> {
        decode::<AccessClaims>(token, &self.access_decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(map_jwt_error)
    }

    /// Validate a refresh token and return its claims.
    pub fn validate_refresh(&self, token: &str) -> std::result::Result<RefreshClaims, AuthError> {
        decode::<RefreshClaims>(token, &self.refresh_decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(map_jwt_error)
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        ErrorKind::InvalidSignature => AuthError::SignatureInvalid,
        _ => AuthError::MalformedToken,
    }
}
