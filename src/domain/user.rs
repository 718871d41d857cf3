//! User domain models and data structures.
//!
//! Defines the user account entity, its role enumeration, and the associated
//! request/response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{OrgId, UserId};

/// Role carried by every user account. Allow-list membership is a typed
/// containment check, never a string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Admin,
    OrgAffiliated,
    Independent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::OrgAffiliated => "org-affiliated",
            Role::Independent => "independent",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Independent
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "org-affiliated" => Ok(Role::OrgAffiliated),
            "independent" => Ok(Role::Independent),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

/// Error returned when role parsing fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid role: {0}")]
pub struct RoleParseError(pub String);

/// Stored representation of a user account.
///
/// The password hash never leaves the storage/service layers; responses use
/// [`UserResponse`], which omits it.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub affiliated_org: Option<OrgId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// New user creation payload (password already hashed).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub affiliated_org: Option<OrgId>,
}

/// Update payload for an existing user. Only these fields are mutable via the
/// admin update operation; anything else in a request is rejected.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub role: Option<Role>,
    pub affiliated_org: Option<OrgId>,
}

/// Request to register a new user account.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub affiliated_org: Option<OrgId>,
}

/// Request to update an existing user account (admin only). Unknown fields are
/// rejected rather than merged.
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub role: Option<Role>,
    pub affiliated_org: Option<OrgId>,
}

impl From<UpdateUserRequest> for UpdateUser {
    fn from(request: UpdateUserRequest) -> Self {
        Self {
            email: request.email,
            role: request.role,
            affiliated_org: request.affiliated_org,
        }
    }
}

/// User representation returned by the API. The password hash is stripped.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    pub affiliated_org: Option<OrgId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            affiliated_org: user.affiliated_org,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
