//! Axum middleware for authentication and authorization.
//!
//! Two-stage gate: [`authenticate`] validates the bearer access token and
//! injects an [`AuthContext`] into the request extensions; [`ensure_roles`]
//! checks the carried role against a per-route allow-list.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Extension, State},
    http::{header::AUTHORIZATION, Method, Request},
    middleware::Next,
    response::Response,
};
use tracing::{info_span, warn};

use crate::api::error::ApiError;
use crate::auth::models::{AuthContext, AuthError};
use crate::auth::token_service::TokenService;
use crate::domain::{Role, UserId};

pub type TokenServiceState = Arc<TokenService>;
pub type RoleState = Arc<Vec<Role>>;

/// Middleware entry point that authenticates requests using the configured
/// [`TokenService`].
pub async fn authenticate(
    State(token_service): State<TokenServiceState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let span = info_span!(
        "auth_middleware.authenticate",
        http.method = %method,
        http.path = %path,
    );
    let _guard = span.enter();

    let header =
        request.headers().get(AUTHORIZATION).and_then(|value| value.to_str().ok()).unwrap_or("");

    match validate_bearer(&token_service, header) {
        Ok(context) => {
            request.extensions_mut().insert(context);
            drop(_guard);
            Ok(next.run(request).await)
        }
        Err(err) => {
            warn!(error = %err, "authentication failed");
            Err(ApiError::from(err))
        }
    }
}

/// Middleware entry point that verifies the caller's role is in the route's
/// allow-list.
pub async fn ensure_roles(
    State(allowed_roles): State<RoleState>,
    Extension(context): Extension<AuthContext>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if allowed_roles.contains(&context.role) {
        return Ok(next.run(request).await);
    }

    let allowed_summary =
        allowed_roles.iter().map(Role::as_str).collect::<Vec<_>>().join(" ");
    warn!(
        user_id = %context.user_id,
        role = %context.role,
        allowed = %allowed_summary,
        http.path = %request.uri().path(),
        "role check failed"
    );
    Err(ApiError::from(AuthError::Forbidden))
}

fn validate_bearer(
    token_service: &TokenService,
    header: &str,
) -> Result<AuthContext, AuthError> {
    if header.is_empty() {
        return Err(AuthError::MissingBearer);
    }
    let token = header.strip_prefix("Bearer ").ok_or(AuthError::MalformedBearer)?;
    if token.is_empty() {
        return Err(AuthError::MalformedBearer);
    }

    let claims = token_service.validate_access(token)?;
    Ok(AuthContext::new(UserId::from_string(claims.sub), claims.role))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;

    fn token_service() -> TokenService {
        TokenService::new(&AuthConfig {
            access_token_key: "access-signing-key-for-tests-0123456789".to_string(),
            refresh_token_key: "refresh-signing-key-for-tests-0123456789".to_string(),
            ..AuthConfig::default()
        })
    }

    #[test]
    fn bearer_extraction_errors() {
        let service = token_service();

        assert!(matches!(validate_bearer(&service, ""), Err(AuthError::MissingBearer)));
        assert!(matches!(
            validate_bearer(&service, "Basic dXNlcjpwdw=="),
            Err(AuthError::MalformedBearer)
        ));
        assert!(matches!(validate_bearer(&service, "Bearer "), Err(AuthError::MalformedBearer)));
        assert!(matches!(
            validate_bearer(&service, "Bearer not-a-jwt"),
            Err(AuthError::MalformedToken)
        ));
    }

    #[test]
    fn valid_bearer_yields_context() {
        let service = token_service();
        let user_id = UserId::new();
        let pair = service.issue(&user_id, Role::Admin).unwrap();

        let context =
            validate_bearer(&service, &format!("Bearer {}", pair.access_token)).unwrap();
        assert_eq!(context.user_id, user_id);
        assert_eq!(context.role, Role::Admin);
    }
}
