//! User repository: CRUD over user records.
//!
//! Email uniqueness is enforced by the UNIQUE index on `users.email`; a
//! constraint violation on insert or update surfaces as a `Conflict`, which
//! closes the check-then-insert race at the storage layer.

use crate::domain::{NewUser, OrgId, Role, UpdateUser, User, UserId};
use crate::errors::{Error, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct UserRow {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub affiliated_org: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const USER_COLUMNS: &str =
    "id, email, password_hash, role, affiliated_org, created_at, updated_at";

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create_user(&self, user: NewUser) -> Result<User>;

    /// Get a user by ID
    async fn get_user(&self, id: &UserId) -> Result<Option<User>>;

    /// Get a user by email (exact, case-sensitive match)
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Get a user with their password hash for authentication
    async fn get_user_with_password(&self, email: &str) -> Result<Option<(User, String)>>;

    /// List all users
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Update a user's whitelisted fields
    async fn update_user(&self, id: &UserId, update: UpdateUser) -> Result<User>;
}

#[derive(Debug, Clone)]
pub struct SqlxUserRepository {
    pool: DbPool,
}

impl SqlxUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_user(&self, row: UserRow) -> Result<User> {
        let role = Role::from_str(&row.role)
            .map_err(|_| Error::validation(format!("Unknown user role '{}'", row.role)))?;

        Ok(User {
            id: UserId::from_string(row.id),
            email: row.email,
            password_hash: row.password_hash,
            role,
            affiliated_org: row.affiliated_org.map(OrgId::from_string),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn map_unique_violation(err: sqlx::Error, context: &str) -> Error {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return Error::conflict("A user with this email already exists.", "user");
        }
    }
    Error::Database { source: err, context: context.to_string() }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id), name = "db_create_user")]
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let role = user.role.to_string();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, role, affiliated_org, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&role)
        .bind(user.affiliated_org.as_ref().map(OrgId::as_str))
        .bind(Utc::now())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| map_unique_violation(err, "Failed to create user"))?;

        self.get_user(&user.id)
            .await?
            .ok_or_else(|| Error::internal("User not found after creation"))
    }

    #[instrument(skip(self), fields(user_id = %id), name = "db_get_user")]
    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch user".to_string(),
        })?;

        row.map(|r| self.row_to_user(r)).transpose()
    }

    #[instrument(skip(self, email), name = "db_get_user_by_email")]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch user by email".to_string(),
        })?;

        row.map(|r| self.row_to_user(r)).transpose()
    }

    #[instrument(skip(self, email), name = "db_get_user_with_password")]
    async fn get_user_with_password(&self, email: &str) -> Result<Option<(User, String)>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch user with password".to_string(),
        })?;

        if let Some(row) = row {
            let password_hash = row.password_hash.clone();
            let user = self.row_to_user(row)?;
            Ok(Some((user, password_hash)))
        } else {
            Ok(None)
        }
    }

    #[instrument(skip(self), name = "db_list_users")]
    async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY created_at",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to list users".to_string(),
        })?;

        rows.into_iter().map(|r| self.row_to_user(r)).collect()
    }

    #[instrument(skip(self, update), fields(user_id = %id), name = "db_update_user")]
    async fn update_user(&self, id: &UserId, update: UpdateUser) -> Result<User> {
        let current = self
            .get_user(id)
            .await?
            .ok_or_else(|| Error::not_found("User", id.to_string()))?;

        let email = update.email.unwrap_or(current.email);
        let role = update.role.unwrap_or(current.role).to_string();
        let affiliated_org = update.affiliated_org.or(current.affiliated_org);

        sqlx::query(
            r#"
            UPDATE users
            SET email = $1, role = $2, affiliated_org = $3, updated_at = $4
            WHERE id = $5
            "#,
        )
        .bind(&email)
        .bind(&role)
        .bind(affiliated_org.as_ref().map(OrgId::as_str))
        .bind(Utc::now())
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| map_unique_violation(err, "Failed to update user"))?;

        self.get_user(id)
            .await?
            .ok_or_else(|| Error::internal("User not found after update"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_repo() -> SqlxUserRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("create sqlite pool");
        crate::storage::migrations::run_migrations(&pool).await.expect("run migrations");
        SqlxUserRepository::new(pool)
    }

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            id: UserId::new(),
            email: email.to_string(),
            password_hash: "$2b$04$hash".to_string(),
            role,
            affiliated_org: None,
        }
    }

    #[tokio::test]
    async fn create_and_get_user() {
        let repo = test_repo().await;
        let user = new_user("test@example.com", Role::Independent);
        let id = user.id.clone();

        let created = repo.create_user(user).await.unwrap();
        assert_eq!(created.email, "test@example.com");
        assert_eq!(created.role, Role::Independent);

        let fetched = repo.get_user(&id).await.unwrap().unwrap();
        assert_eq!(fetched.id, id);
        assert_eq!(fetched.email, created.email);
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let repo = test_repo().await;
        repo.create_user(new_user("dup@example.com", Role::Independent)).await.unwrap();

        let err = repo
            .create_user(new_user("dup@example.com", Role::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));
    }

    #[tokio::test]
    async fn email_lookup_is_case_sensitive() {
        let repo = test_repo().await;
        repo.create_user(new_user("Case@Example.com", Role::Independent)).await.unwrap();

        assert!(repo.get_user_by_email("Case@Example.com").await.unwrap().is_some());
        assert!(repo.get_user_by_email("case@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_whitelisted_fields_only() {
        let repo = test_repo().await;
        let created =
            repo.create_user(new_user("update@example.com", Role::Independent)).await.unwrap();

        let org = OrgId::new();
        let updated = repo
            .update_user(
                &created.id,
                UpdateUser {
                    role: Some(Role::OrgAffiliated),
                    affiliated_org: Some(org.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.role, Role::OrgAffiliated);
        assert_eq!(updated.affiliated_org, Some(org));
        assert_eq!(updated.email, "update@example.com");
        // Password hash untouched by the update operation
        assert_eq!(updated.password_hash, created.password_hash);
    }

    #[tokio::test]
    async fn update_missing_user_is_not_found() {
        let repo = test_repo().await;
        let err = repo.update_user(&UserId::new(), UpdateUser::default()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
