//! Organization (NGO) domain models and data structures.
//!
//! Defines the organization entity, its approval state machine, the document
//! reference type appended by the ingestion pipeline, and request/response
//! DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{BlobId, OrgId};

/// Lifecycle stage of an organization record. Controls visibility in the
/// public listing: only `Approved` records are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DocumentState {
    Pending,
    Approved,
    Rejected,
}

impl DocumentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentState::Pending => "Pending",
            DocumentState::Approved => "Approved",
            DocumentState::Rejected => "Rejected",
        }
    }
}

impl Display for DocumentState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DocumentState {
    type Err = DocumentStateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(DocumentState::Pending),
            "Approved" => Ok(DocumentState::Approved),
            "Rejected" => Ok(DocumentState::Rejected),
            other => Err(DocumentStateParseError(other.to_string())),
        }
    }
}

/// Error returned when document state parsing fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid document state: {0}")]
pub struct DocumentStateParseError(pub String);

/// Contact details nested in the organization record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub hours: String,
}

/// Reference to an uploaded document. The bytes live in the blob store; the
/// organization record carries only this reference.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    pub blob_id: BlobId,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

/// Stored representation of an organization, including its ordered document
/// reference list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: OrgId,
    pub name: String,
    pub image: String,
    pub webpage: String,
    pub description: String,
    pub main_representative: String,
    pub affinities: Vec<String>,
    pub contact: ContactInfo,
    pub document_state: DocumentState,
    pub documents: Vec<DocumentRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Projection of an approved organization for the public listing. Contact and
/// document details never appear here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSummary {
    pub name: String,
    pub image: String,
    pub description: String,
    pub affinities: Vec<String>,
}

/// New organization creation payload. The document state is not part of this
/// payload: records always start in `Pending`.
#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub id: OrgId,
    pub name: String,
    pub image: String,
    pub webpage: String,
    pub description: String,
    pub main_representative: String,
    pub affinities: Vec<String>,
    pub contact: ContactInfo,
}

/// Update payload for an existing organization.
#[derive(Debug, Clone, Default)]
pub struct UpdateOrganization {
    pub name: Option<String>,
    pub image: Option<String>,
    pub webpage: Option<String>,
    pub description: Option<String>,
    pub main_representative: Option<String>,
    pub affinities: Option<Vec<String>>,
    pub contact: Option<ContactInfo>,
    pub document_state: Option<DocumentState>,
}

/// Request to create an organization. Caller-supplied document state is
/// ignored, so unknown fields are tolerated here rather than rejected.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationRequest {
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    #[validate(length(max = 2048, message = "must be at most 2048 characters"))]
    pub webpage: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub main_representative: String,
    #[serde(default)]
    pub affinities: Vec<String>,
    #[serde(default)]
    pub contact: ContactInfo,
}

/// Request to update an organization (admin only), including approval
/// transitions. Unknown fields are rejected rather than merged.
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateOrganizationRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    pub webpage: Option<String>,
    pub description: Option<String>,
    pub main_representative: Option<String>,
    pub affinities: Option<Vec<String>>,
    pub contact: Option<ContactInfo>,
    pub document_state: Option<DocumentState>,
}

impl From<UpdateOrganizationRequest> for UpdateOrganization {
    fn from(request: UpdateOrganizationRequest) -> Self {
        Self {
            name: request.name,
            image: request.image,
            webpage: request.webpage,
            description: request.description,
            main_representative: request.main_representative,
            affinities: request.affinities,
            contact: request.contact,
            document_state: request.document_state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_state_round_trip() {
        for (input, expected) in [
            ("Pending", DocumentState::Pending),
            ("Approved", DocumentState::Approved),
            ("Rejected", DocumentState::Rejected),
        ] {
            let parsed = input.parse::<DocumentState>().unwrap();
            assert_eq!(parsed, expected);
            assert_eq!(parsed.to_string(), input);
        }

        let err = "approved".parse::<DocumentState>().unwrap_err();
        assert_eq!(err.0, "approved");
    }

    #[test]
    fn create_request_tolerates_caller_supplied_state() {
        // The original API ignored a documentState in the creation body; the
        // request type keeps that behavior by not modeling the field.
        let json = r#"{
            "name": "Helping Hands",
            "documentState": "Approved",
            "contact": {"address": "1 Main St", "phone": "555", "hours": "9-5"}
        }"#;

        let request: CreateOrganizationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.name, "Helping Hands");
        assert_eq!(request.contact.address, "1 Main St");
    }

    #[test]
    fn update_request_rejects_unknown_fields() {
        let json = r#"{"name": "New Name", "documents": []}"#;
        assert!(serde_json::from_str::<UpdateOrganizationRequest>(json).is_err());
    }

    #[test]
    fn update_request_allows_state_transition() {
        let json = r#"{"documentState": "Approved"}"#;
        let request: UpdateOrganizationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.document_state, Some(DocumentState::Approved));
    }

    #[test]
    fn summary_has_no_contact_or_documents() {
        let summary = OrganizationSummary {
            name: "Org".to_string(),
            image: "img.png".to_string(),
            description: "desc".to_string(),
            affinities: vec!["education".to_string()],
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("contact").is_none());
        assert!(json.get("documents").is_none());
        assert!(json.get("documentState").is_none());
    }
}
