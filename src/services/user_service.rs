//! Business logic for the user registry.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::auth::hashing;
use crate::domain::user::{CreateUserRequest, UpdateUserRequest};
use crate::domain::{NewUser, UpdateUser, User, UserId};
use crate::errors::{Error, Result};
use crate::storage::repositories::{SqlxUserRepository, UserRepository};

/// Service for user registration, lookup, and admin updates.
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, bcrypt_cost: u32) -> Self {
        Self { repository, bcrypt_cost }
    }

    pub fn with_sqlx(pool: crate::storage::DbPool, bcrypt_cost: u32) -> Self {
        Self::new(Arc::new(SqlxUserRepository::new(pool)), bcrypt_cost)
    }

    /// Register a new user. Only the bcrypt hash of the password is stored.
    ///
    /// The email pre-check gives a friendly conflict error; the UNIQUE index
    /// on `users.email` remains the authority if two registrations race.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: CreateUserRequest) -> Result<User> {
        if self.repository.get_user_by_email(&request.email).await?.is_some() {
            return Err(Error::conflict(
                "Could not create user. The email already exists.",
                "user",
            ));
        }

        let password_hash =
            hashing::hash_password_async(request.password, self.bcrypt_cost).await?;

        let new_user = NewUser {
            id: UserId::new(),
            email: request.email,
            password_hash,
            role: request.role,
            affiliated_org: request.affiliated_org,
        };

        let user = self.repository.create_user(new_user).await?;
        info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    /// Fetch a single user by id.
    pub async fn get_user(&self, id: &UserId) -> Result<User> {
        self.repository
            .get_user(id)
            .await?
            .ok_or_else(|| Error::not_found("User", id.to_string()))
    }

    /// List all users.
    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.repository.list_users().await
    }

    /// Apply an admin update. Only the whitelisted fields of
    /// [`UpdateUserRequest`] are mutable; the request type rejects anything
    /// else at deserialization time.
    #[instrument(skip(self, request), fields(user_id = %id))]
    pub async fn update_user(&self, id: &UserId, request: UpdateUserRequest) -> Result<User> {
        let update: UpdateUser = request.into();
        let user = self.repository.update_user(id, update).await?;
        info!(user_id = %user.id, "user updated");
        Ok(user)
    }
}
