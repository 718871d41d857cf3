//! Business logic for the organization registry.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::domain::organization::{CreateOrganizationRequest, UpdateOrganizationRequest};
use crate::domain::{NewOrganization, OrgId, Organization, OrganizationSummary, UpdateOrganization};
use crate::errors::{Error, Result};
use crate::storage::repositories::{OrganizationRepository, SqlxOrganizationRepository};

/// Service for organization creation, listing, lookup, and admin updates.
#[derive(Clone)]
pub struct OrganizationService {
    repository: Arc<dyn OrganizationRepository>,
}

impl OrganizationService {
    pub fn new(repository: Arc<dyn OrganizationRepository>) -> Self {
        Self { repository }
    }

    pub fn with_sqlx(pool: crate::storage::DbPool) -> Self {
        Self::new(Arc::new(SqlxOrganizationRepository::new(pool)))
    }

    /// Create an organization. The record starts in `Pending` no matter what
    /// the caller supplied; approval happens through an admin update.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(&self, request: CreateOrganizationRequest) -> Result<Organization> {
        let new_organization = NewOrganization {
            id: OrgId::new(),
            name: request.name,
            image: request.image,
            webpage: request.webpage.unwrap_or_default(),
            description: request.description,
            main_representative: request.main_representative,
            affinities: request.affinities,
            contact: request.contact,
        };

        let organization = self.repository.create_organization(new_organization).await?;
        info!(org_id = %organization.id, "organization created");
        Ok(organization)
    }

    /// List approved organizations, projected for the public listing.
    pub async fn list_approved(&self) -> Result<Vec<OrganizationSummary>> {
        self.repository.list_approved().await
    }

    /// Fetch a full organization record, including document references.
    pub async fn get(&self, id: &OrgId) -> Result<Organization> {
        self.repository
            .get_organization(id)
            .await?
            .ok_or_else(|| Error::not_found("Organization", id.to_string()))
    }

    /// Apply an admin update, including document-state transitions.
    #[instrument(skip(self, request), fields(org_id = %id))]
    pub async fn update(
        &self,
        id: &OrgId,
        request: UpdateOrganizationRequest,
    ) -> Result<Organization> {
        let update: UpdateOrganization = request.into();
        let organization = self.repository.update_organization(id, update).await?;
        info!(org_id = %organization.id, state = %organization.document_state, "organization updated");
        Ok(organization)
    }
}
