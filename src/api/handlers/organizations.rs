//! Organization registry and document upload API handlers.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use tokio_util::io::StreamReader;
use tracing::instrument;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::auth::models::AuthContext;
use crate::domain::organization::{CreateOrganizationRequest, UpdateOrganizationRequest};
use crate::domain::{DocumentRef, OrgId, Organization, OrganizationSummary};
use crate::services::{DocumentService, OrganizationService};

fn organization_service_for_state(state: &ApiState) -> OrganizationService {
    OrganizationService::with_sqlx(state.pool.clone())
}

fn document_service_for_state(state: &ApiState) -> DocumentService {
    DocumentService::with_sqlx(state.pool.clone(), state.blob_store.clone())
}

/// Response wrapping a single organization.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrganizationEnvelope {
    pub ngo: Organization,
}

/// Response wrapping the public listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListOrganizationsResponse {
    pub ngos: Vec<OrganizationSummary>,
}

/// Response returned by create and update operations.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrganizationIdResponse {
    #[serde(rename = "_id")]
    pub id: String,
}

/// Response returned by a successful document upload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    pub file: DocumentRef,
}

/// Create an organization. The record starts in `Pending` regardless of any
/// caller-supplied state.
#[utoipa::path(
    post,
    path = "/ngos",
    request_body = CreateOrganizationRequest,
    responses(
        (status = 201, description = "Organization created", body = OrganizationIdResponse),
        (status = 400, description = "Validation error")
    ),
    security(("bearerAuth" = [])),
    tag = "ngos"
)]
#[instrument(skip(state, payload), fields(name = %payload.name))]
pub async fn create_organization_handler(
    State(state): State<ApiState>,
    Json(payload): Json<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<OrganizationIdResponse>), ApiError> {
    payload.validate().map_err(|err| ApiError::bad_request(err.to_string()))?;

    let service = organization_service_for_state(&state);
    let organization = service.create(payload).await?;

    Ok((StatusCode::CREATED, Json(OrganizationIdResponse { id: organization.id.into_string() })))
}

/// List approved organizations, projected to the public fields.
#[utoipa::path(
    get,
    path = "/ngos",
    responses(
        (status = 200, description = "Approved organizations", body = ListOrganizationsResponse)
    ),
    security(("bearerAuth" = [])),
    tag = "ngos"
)]
pub async fn list_organizations_handler(
    State(state): State<ApiState>,
) -> Result<Json<ListOrganizationsResponse>, ApiError> {
    let service = organization_service_for_state(&state);
    let ngos = service.list_approved().await?;

    Ok(Json(ListOrganizationsResponse { ngos }))
}

/// Get a full organization record, including document state and references.
#[utoipa::path(
    get,
    path = "/ngos/{id}",
    params(("id" = String, Path, description = "Organization identifier")),
    responses(
        (status = 200, description = "Organization found", body = OrganizationEnvelope),
        (status = 404, description = "Organization not found")
    ),
    security(("bearerAuth" = [])),
    tag = "ngos"
)]
#[instrument(skip(state), fields(org_id = %id))]
pub async fn get_organization_handler(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<OrganizationEnvelope>, ApiError> {
    let service = organization_service_for_state(&state);
    let ngo = service.get(&OrgId::from_string(id)).await?;

    Ok(Json(OrganizationEnvelope { ngo }))
}

/// Update an organization (admin only), including approval transitions.
#[utoipa::path(
    put,
    path = "/ngos/{id}",
    request_body = UpdateOrganizationRequest,
    params(("id" = String, Path, description = "Organization identifier")),
    responses(
        (status = 200, description = "Organization updated", body = OrganizationIdResponse),
        (status = 404, description = "Organization not found")
    ),
    security(("bearerAuth" = [])),
    tag = "ngos"
)]
#[instrument(skip(state, payload), fields(org_id = %id))]
pub async fn update_organization_handler(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateOrganizationRequest>,
) -> Result<Json<OrganizationIdResponse>, ApiError> {
    let service = organization_service_for_state(&state);
    let organization = service.update(&OrgId::from_string(id), payload).await?;

    Ok(Json(OrganizationIdResponse { id: organization.id.into_string() }))
}

/// Upload a verification document for an organization.
///
/// The multipart `file` field is streamed straight into the blob store; the
/// resulting reference is appended to the organization's document list.
#[utoipa::path(
    post,
    path = "/ngos/{id}/upload",
    params(("id" = String, Path, description = "Organization identifier")),
    responses(
        (status = 201, description = "Document uploaded", body = UploadResponse),
        (status = 400, description = "Disallowed file type or malformed body"),
        (status = 403, description = "Requester not affiliated with the organization")
    ),
    security(("bearerAuth" = [])),
    tag = "ngos"
)]
#[instrument(skip(state, context, multipart), fields(org_id = %id, user_id = %context.user_id))]
pub async fn upload_document_handler(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let service = document_service_for_state(&state);
    let org_id = OrgId::from_string(id);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(format!("Malformed multipart body: {}", err)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request("File field is missing a filename"))?;
        let content_type = field
            .content_type()
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request("File field is missing a content type"))?;

        let stream = field.map_err(|err| std::io::Error::other(err));
        let reader = StreamReader::new(stream);
        futures::pin_mut!(reader);

        let file = service
            .upload(&context, &org_id, &filename, &content_type, &mut reader)
            .await?;

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse { message: "Success".to_string(), file }),
        ));
    }

    Err(ApiError::bad_request("Missing multipart field 'file'"))
}
