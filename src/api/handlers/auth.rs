//! Login and token refresh handlers.

use axum::{extract::State, Json};
use tracing::instrument;
use validator::Validate;

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::auth::models::{LoginRequest, RefreshRequest, TokenPair};
use crate::auth::LoginService;
use crate::domain::UserId;
use crate::storage::repositories::{SqlxUserRepository, UserRepository};

/// Authenticate with email and password.
///
/// Issues a stateless access/refresh token pair on success.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = TokenPair),
        (status = 401, description = "Wrong credentials")
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login_handler(
    State(state): State<ApiState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    payload.validate().map_err(|err| ApiError::bad_request(err.to_string()))?;

    let service = LoginService::with_sqlx(state.pool.clone());
    let user = service.login(&payload).await?;

    let pair = state.token_service.issue(&user.id, user.role)?;
    Ok(Json(pair))
}

/// Exchange a refresh token for a new token pair.
///
/// The refresh token carries identity only; the role is re-read from the user
/// record so a role change takes effect on the next refresh.
#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair issued", body = TokenPair),
        (status = 401, description = "Invalid or expired refresh token")
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload))]
pub async fn refresh_handler(
    State(state): State<ApiState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    payload.validate().map_err(|err| ApiError::bad_request(err.to_string()))?;

    let claims = state.token_service.validate_refresh(&payload.refresh_token)?;

    let repository = SqlxUserRepository::new(state.pool.clone());
    let user = repository
        .get_user(&UserId::from_string(claims.sub))
        .await?
        .ok_or_else(|| ApiError::unauthorized("unauthorized: unknown user"))?;

    let pair = state.token_service.issue(&user.id, user.role)?;
    Ok(Json(pair))
}
