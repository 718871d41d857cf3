//! Organization repository: CRUD, the approval state machine, and the
//! document reference list.
//!
//! Document references live in `organization_documents`, keyed by an
//! AUTOINCREMENT sequence. Appending a reference is a single INSERT, so two
//! concurrent uploads to the same organization can never drop each other's
//! entry; the sequence preserves order.

use crate::domain::{
    BlobId, ContactInfo, DocumentRef, DocumentState, NewOrganization, OrgId, Organization,
    OrganizationSummary, UpdateOrganization,
};
use crate::errors::{Error, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct OrganizationRow {
    pub id: String,
    pub name: String,
    pub image: String,
    pub webpage: String,
    pub description: String,
    pub main_representative: String,
    pub affinities: String, // JSON array stored as string
    pub contact_address: String,
    pub contact_phone: String,
    pub contact_hours: String,
    pub document_state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
struct DocumentRow {
    pub blob_id: String,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
struct SummaryRow {
    pub name: String,
    pub image: String,
    pub description: String,
    pub affinities: String,
}

const ORG_COLUMNS: &str = "id, name, image, webpage, description, main_representative, \
                           affinities, contact_address, contact_phone, contact_hours, \
                           document_state, created_at, updated_at";

/// New document reference payload for the atomic append.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub blob_id: BlobId,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
}

#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Create a new organization; the record always starts in `Pending`
    async fn create_organization(&self, organization: NewOrganization) -> Result<Organization>;

    /// Get a full organization record including its document references
    async fn get_organization(&self, id: &OrgId) -> Result<Option<Organization>>;

    /// List approved organizations, projected for the public listing
    async fn list_approved(&self) -> Result<Vec<OrganizationSummary>>;

    /// Update an organization's whitelisted fields, including state transitions
    async fn update_organization(
        &self,
        id: &OrgId,
        update: UpdateOrganization,
    ) -> Result<Organization>;

    /// Atomically append a document reference to the organization's list
    async fn append_document(&self, id: &OrgId, document: NewDocument) -> Result<DocumentRef>;

    /// List an organization's document references in append order
    async fn list_documents(&self, id: &OrgId) -> Result<Vec<DocumentRef>>;
}

#[derive(Debug, Clone)]
pub struct SqlxOrganizationRepository {
    pool: DbPool,
}

impl SqlxOrganizationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_organization(
        &self,
        row: OrganizationRow,
        documents: Vec<DocumentRef>,
    ) -> Result<Organization> {
        let document_state = DocumentState::from_str(&row.document_state).map_err(|_| {
            Error::validation(format!("Unknown document state '{}'", row.document_state))
        })?;
        let affinities: Vec<String> = serde_json::from_str(&row.affinities).map_err(|err| {
            Error::internal(format!("Failed to parse affinities JSON: {}", err))
        })?;

        Ok(Organization {
            id: OrgId::from_string(row.id),
            name: row.name,
            image: row.image,
            webpage: row.webpage,
            description: row.description,
            main_representative: row.main_representative,
            affinities,
            contact: ContactInfo {
                address: row.contact_address,
                phone: row.contact_phone,
                hours: row.contact_hours,
            },
            document_state,
            documents,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    async fn fetch_row(&self, id: &OrgId) -> Result<Option<OrganizationRow>> {
        sqlx::query_as::<_, OrganizationRow>(&format!(
            "SELECT {} FROM organizations WHERE id = $1",
            ORG_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch organization".to_string(),
        })
    }
}

fn row_to_document(row: DocumentRow) -> DocumentRef {
    DocumentRef {
        blob_id: BlobId::from_string(row.blob_id),
        filename: row.filename,
        content_type: row.content_type,
        size_bytes: row.size_bytes,
        created_at: row.created_at,
    }
}

#[async_trait]
impl OrganizationRepository for SqlxOrganizationRepository {
    #[instrument(skip(self, organization), fields(org_id = %organization.id), name = "db_create_organization")]
    async fn create_organization(&self, organization: NewOrganization) -> Result<Organization> {
        let affinities = serde_json::to_string(&organization.affinities).map_err(|err| {
            Error::internal(format!("Failed to serialize affinities: {}", err))
        })?;

        sqlx::query(
            r#"
            INSERT INTO organizations (
                id, name, image, webpage, description, main_representative,
                affinities, contact_address, contact_phone, contact_hours,
                document_state, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(organization.id.as_str())
        .bind(&organization.name)
        .bind(&organization.image)
        .bind(&organization.webpage)
        .bind(&organization.description)
        .bind(&organization.main_representative)
        .bind(&affinities)
        .bind(&organization.contact.address)
        .bind(&organization.contact.phone)
        .bind(&organization.contact.hours)
        .bind(DocumentState::Pending.as_str())
        .bind(Utc::now())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to create organization".to_string(),
        })?;

        self.get_organization(&organization.id)
            .await?
            .ok_or_else(|| Error::internal("Organization not found after creation"))
    }

    #[instrument(skip(self), fields(org_id = %id), name = "db_get_organization")]
    async fn get_organization(&self, id: &OrgId) -> Result<Option<Organization>> {
        let row = match self.fetch_row(id).await? {
            Some(row) => row,
            None => return Ok(None),
        };
        let documents = self.list_documents(id).await?;
        self.row_to_organization(row, documents).map(Some)
    }

    #[instrument(skip(self), name = "db_list_approved_organizations")]
    async fn list_approved(&self) -> Result<Vec<OrganizationSummary>> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            "SELECT name, image, description, affinities FROM organizations \
             WHERE document_state = $1 ORDER BY created_at",
        )
        .bind(DocumentState::Approved.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to list approved organizations".to_string(),
        })?;

        rows.into_iter()
            .map(|row| {
                let affinities: Vec<String> =
                    serde_json::from_str(&row.affinities).map_err(|err| {
                        Error::internal(format!("Failed to parse affinities JSON: {}", err))
                    })?;
                Ok(OrganizationSummary {
                    name: row.name,
                    image: row.image,
                    description: row.description,
                    affinities,
                })
            })
            .collect()
    }

    #[instrument(skip(self, update), fields(org_id = %id), name = "db_update_organization")]
    async fn update_organization(
        &self,
        id: &OrgId,
        update: UpdateOrganization,
    ) -> Result<Organization> {
        let row = self
            .fetch_row(id)
            .await?
            .ok_or_else(|| Error::not_found("Organization", id.to_string()))?;
        let current = self.row_to_organization(row, Vec::new())?;

        let name = update.name.unwrap_or(current.name);
        let image = update.image.unwrap_or(current.image);
        let webpage = update.webpage.unwrap_or(current.webpage);
        let description = update.description.unwrap_or(current.description);
        let main_representative =
            update.main_representative.unwrap_or(current.main_representative);
        let affinities = update.affinities.unwrap_or(current.affinities);
        let contact = update.contact.unwrap_or(current.contact);
        let document_state = update.document_state.unwrap_or(current.document_state);

        let affinities_json = serde_json::to_string(&affinities).map_err(|err| {
            Error::internal(format!("Failed to serialize affinities: {}", err))
        })?;

        sqlx::query(
            r#"
            UPDATE organizations
            SET name = $1, image = $2, webpage = $3, description = $4,
                main_representative = $5, affinities = $6, contact_address = $7,
                contact_phone = $8, contact_hours = $9, document_state = $10,
                updated_at = $11
            WHERE id = $12
            "#,
        )
        .bind(&name)
        .bind(&image)
        .bind(&webpage)
        .bind(&description)
        .bind(&main_representative)
        .bind(&affinities_json)
        .bind(&contact.address)
        .bind(&contact.phone)
        .bind(&contact.hours)
        .bind(document_state.as_str())
        .bind(Utc::now())
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to update organization".to_string(),
        })?;

        self.get_organization(id)
            .await?
            .ok_or_else(|| Error::internal("Organization not found after update"))
    }

    #[instrument(skip(self, document), fields(org_id = %id, blob_id = %document.blob_id), name = "db_append_document")]
    async fn append_document(&self, id: &OrgId, document: NewDocument) -> Result<DocumentRef> {
        let created_at = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO organization_documents
                (org_id, blob_id, filename, content_type, size_bytes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id.as_str())
        .bind(document.blob_id.as_str())
        .bind(&document.filename)
        .bind(&document.content_type)
        .bind(document.size_bytes)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to record document reference".to_string(),
        })?;

        Ok(DocumentRef {
            blob_id: document.blob_id,
            filename: document.filename,
            content_type: document.content_type,
            size_bytes: document.size_bytes,
            created_at,
        })
    }

    #[instrument(skip(self), fields(org_id = %id), name = "db_list_documents")]
    async fn list_documents(&self, id: &OrgId) -> Result<Vec<DocumentRef>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            "SELECT blob_id, filename, content_type, size_bytes, created_at \
             FROM organization_documents WHERE org_id = $1 ORDER BY seq",
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to list document references".to_string(),
        })?;

        Ok(rows.into_iter().map(row_to_document).collect())
    }
}
