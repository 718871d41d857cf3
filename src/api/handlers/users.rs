//! User registry API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::domain::user::{CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::domain::UserId;
use crate::services::UserService;

fn user_service_for_state(state: &ApiState) -> UserService {
    UserService::with_sqlx(state.pool.clone(), state.bcrypt_cost)
}

/// Response wrapping a single user.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserEnvelope {
    pub user: UserResponse,
}

/// Response wrapping the full user listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListUsersResponse {
    pub users: Vec<UserResponse>,
}

/// Response returned by update operations.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdatedResponse {
    #[serde(rename = "_id")]
    pub id: String,
}

/// Register a new user (public).
///
/// The stored record holds only the bcrypt hash of the password.
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserEnvelope),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    ),
    tag = "users"
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn register_user_handler(
    State(state): State<ApiState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserEnvelope>), ApiError> {
    payload.validate().map_err(|err| ApiError::bad_request(err.to_string()))?;

    let service = user_service_for_state(&state);
    let user = service.register(payload).await?;

    Ok((StatusCode::CREATED, Json(UserEnvelope { user: user.into() })))
}

/// List all users.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Users list", body = ListUsersResponse)
    ),
    security(("bearerAuth" = [])),
    tag = "users"
)]
pub async fn list_users_handler(
    State(state): State<ApiState>,
) -> Result<Json<ListUsersResponse>, ApiError> {
    let service = user_service_for_state(&state);
    let users = service.list_users().await?;

    Ok(Json(ListUsersResponse { users: users.into_iter().map(Into::into).collect() }))
}

/// Get a single user by id. The password hash is stripped.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User found", body = UserEnvelope),
        (status = 404, description = "User not found")
    ),
    security(("bearerAuth" = [])),
    tag = "users"
)]
#[instrument(skip(state), fields(user_id = %id))]
pub async fn get_user_handler(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let service = user_service_for_state(&state);
    let user = service.get_user(&UserId::from_string(id)).await?;

    Ok(Json(UserEnvelope { user: user.into() }))
}

/// Update a user (admin only). Only whitelisted fields are mutable; unknown
/// fields are rejected.
#[utoipa::path(
    put,
    path = "/users/{id}",
    request_body = UpdateUserRequest,
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User updated", body = UpdatedResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearerAuth" = [])),
    tag = "users"
)]
#[instrument(skip(state, payload), fields(user_id = %id))]
pub async fn update_user_handler(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UpdatedResponse>, ApiError> {
    let service = user_service_for_state(&state);
    let user = service.update_user(&UserId::from_string(id), payload).await?;

    Ok(Json(UpdatedResponse { id: user.id.into_string() }))
}
