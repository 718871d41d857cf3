//! # Database Migration Management
//!
//! Handles database schema evolution using embedded SQL migrations. The
//! migration set is compiled into the binary and executed on startup when
//! `auto_migrate` is enabled; applied migrations are recorded in the
//! `schema_migrations` table and never re-run.

use crate::errors::{Error, Result};
use chrono::Utc;
use tracing::{debug, info};

/// Ordered embedded migrations: (name, SQL). Names sort lexicographically by
/// timestamp prefix.
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "20250810120000_create_users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL,
            affiliated_org TEXT,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users (email);
        "#,
    ),
    (
        "20250810120001_create_organizations",
        r#"
        CREATE TABLE IF NOT EXISTS organizations (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            image TEXT NOT NULL DEFAULT '',
            webpage TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            main_representative TEXT NOT NULL DEFAULT '',
            affinities TEXT NOT NULL DEFAULT '[]',
            contact_address TEXT NOT NULL DEFAULT '',
            contact_phone TEXT NOT NULL DEFAULT '',
            contact_hours TEXT NOT NULL DEFAULT '',
            document_state TEXT NOT NULL DEFAULT 'Pending',
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_organizations_state ON organizations (document_state);
        "#,
    ),
    (
        "20250810120002_create_organization_documents",
        r#"
        CREATE TABLE IF NOT EXISTS organization_documents (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            org_id TEXT NOT NULL REFERENCES organizations (id),
            blob_id TEXT NOT NULL,
            filename TEXT NOT NULL,
            content_type TEXT NOT NULL,
            size_bytes INTEGER NOT NULL,
            created_at TIMESTAMP NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_organization_documents_org
            ON organization_documents (org_id);
        "#,
    ),
];

/// Run all pending migrations against the given pool.
pub async fn run_migrations(pool: &crate::storage::DbPool) -> Result<()> {
    sqlx::raw_sql(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            name TEXT PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await
    .map_err(|err| Error::Database {
        source: err,
        context: "Failed to create schema_migrations table".to_string(),
    })?;

    let mut applied = 0usize;
    for (name, sql) in MIGRATIONS {
        let already_applied = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM schema_migrations WHERE name = $1",
        )
        .bind(name)
        .fetch_one(pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: format!("Failed to check migration '{}'", name),
        })?;

        if already_applied > 0 {
            debug!(migration = name, "migration already applied, skipping");
            continue;
        }

        sqlx::raw_sql(sql).execute(pool).await.map_err(|err| Error::Database {
            source: err,
            context: format!("Failed to apply migration '{}'", name),
        })?;

        sqlx::query("INSERT INTO schema_migrations (name, applied_at) VALUES ($1, $2)")
            .bind(name)
            .bind(Utc::now())
            .execute(pool)
            .await
            .map_err(|err| Error::Database {
                source: err,
                context: format!("Failed to record migration '{}'", name),
            })?;

        applied += 1;
        info!(migration = name, "applied database migration");
    }

    if applied == 0 {
        debug!("database schema is up to date");
    } else {
        info!(count = applied, "database migrations complete");
    }

    Ok(())
}
