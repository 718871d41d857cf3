//! Document ingestion pipeline.
//!
//! Single end-to-end operation: authorize the upload against ownership,
//! validate the file type, stream the bytes to the blob store, and record the
//! resulting reference on the organization. Failures before the record step
//! mutate nothing; a record failure after streaming leaves an orphaned blob,
//! which is logged and surfaced to the caller.

use std::path::Path;
use std::sync::Arc;

use tokio::io::AsyncRead;
use tracing::{info, instrument, warn};

use crate::auth::models::AuthContext;
use crate::blobs::BlobStore;
use crate::domain::{DocumentRef, OrgId};
use crate::errors::{AuthErrorType, Error, Result};
use crate::storage::repositories::{
    NewDocument, OrganizationRepository, SqlxOrganizationRepository, SqlxUserRepository,
    UserRepository,
};

/// Allowed file extensions for uploaded documents.
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "pdf"];

/// Service implementing the upload pipeline.
#[derive(Clone)]
pub struct DocumentService {
    users: Arc<dyn UserRepository>,
    organizations: Arc<dyn OrganizationRepository>,
    blobs: Arc<dyn BlobStore>,
}

impl DocumentService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        organizations: Arc<dyn OrganizationRepository>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self { users, organizations, blobs }
    }

    pub fn with_sqlx(pool: crate::storage::DbPool, blobs: Arc<dyn BlobStore>) -> Self {
        Self::new(
            Arc::new(SqlxUserRepository::new(pool.clone())),
            Arc::new(SqlxOrganizationRepository::new(pool)),
            blobs,
        )
    }

    /// Upload a document for an organization.
    ///
    /// # Errors
    ///
    /// - `Forbidden` when the requester is neither admin nor affiliated with
    ///   the target organization
    /// - `Validation` when extension or declared content type is outside the
    ///   allow-list
    /// - `NotFound` when the organization does not exist
    /// - `Io`/`Database` when the blob store or record store fails
    #[instrument(
        skip(self, requester, reader),
        fields(user_id = %requester.user_id, org_id = %org_id, filename = %filename)
    )]
    pub async fn upload(
        &self,
        requester: &AuthContext,
        org_id: &OrgId,
        filename: &str,
        content_type: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<DocumentRef> {
        self.authorize(requester, org_id).await?;
        validate_document_type(filename, content_type)?;

        // Resolve the target before streaming so an unknown id cannot orphan
        // a blob.
        if self.organizations.get_organization(org_id).await?.is_none() {
            return Err(Error::not_found("Organization", org_id.to_string()));
        }

        let stored_name = format!("file_{}", filename);
        let blob = self.blobs.put(&stored_name, content_type, reader).await?;

        let document = self
            .organizations
            .append_document(
                org_id,
                NewDocument {
                    blob_id: blob.id.clone(),
                    filename: blob.filename,
                    content_type: blob.content_type,
                    size_bytes: blob.size_bytes,
                },
            )
            .await
            .map_err(|err| {
                warn!(blob_id = %blob.id, error = %err, "record step failed; blob left orphaned");
                err
            })?;

        info!(blob_id = %document.blob_id, size_bytes = document.size_bytes, "document uploaded");
        Ok(document)
    }

    /// An upload is authorized when the requester's affiliated organization is
    /// the target, or the requester is admin.
    async fn authorize(&self, requester: &AuthContext, org_id: &OrgId) -> Result<()> {
        if requester.is_admin() {
            return Ok(());
        }

        let user = self
            .users
            .get_user(&requester.user_id)
            .await?
            .ok_or_else(|| forbidden())?;

        match user.affiliated_org {
            Some(ref affiliated) if affiliated == org_id => Ok(()),
            _ => Err(forbidden()),
        }
    }
}

fn forbidden() -> Error {
    Error::auth("Error during image/document upload.", AuthErrorType::InsufficientPermissions)
}

/// Both the extension and the declared content type must be in the allow-list;
/// a matching extension with a mismatched type is rejected.
fn validate_document_type(filename: &str, content_type: &str) -> Result<()> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let extension_allowed = extension
        .as_deref()
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext));

    let mime_allowed = content_type
        .parse::<mime::Mime>()
        .map(|m| {
            m == mime::IMAGE_JPEG
                || m == mime::IMAGE_PNG
                || m == mime::IMAGE_GIF
                || m == mime::APPLICATION_PDF
        })
        .unwrap_or(false);

    if extension_allowed && mime_allowed {
        Ok(())
    } else {
        Err(Error::validation("Only images or pdf documents."))
    }
}
