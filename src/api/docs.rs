use axum::Router;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[allow(unused_imports)]
use crate::api::handlers::organizations::{
    ListOrganizationsResponse, OrganizationEnvelope, OrganizationIdResponse, UploadResponse,
};
#[allow(unused_imports)]
use crate::api::handlers::users::{ListUsersResponse, UpdatedResponse, UserEnvelope};
#[allow(unused_imports)]
use crate::auth::models::{LoginRequest, RefreshRequest, TokenPair};
#[allow(unused_imports)]
use crate::blobs::BlobRef;
#[allow(unused_imports)]
use crate::domain::organization::{
    ContactInfo, CreateOrganizationRequest, DocumentRef, DocumentState, Organization,
    OrganizationSummary, UpdateOrganizationRequest,
};
#[allow(unused_imports)]
use crate::domain::user::{CreateUserRequest, Role, UpdateUserRequest, UserResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::health_handler,
        crate::api::handlers::auth::login_handler,
        crate::api::handlers::auth::refresh_handler,
        crate::api::handlers::users::register_user_handler,
        crate::api::handlers::users::list_users_handler,
        crate::api::handlers::users::get_user_handler,
        crate::api::handlers::users::update_user_handler,
        crate::api::handlers::organizations::create_organization_handler,
        crate::api::handlers::organizations::list_organizations_handler,
        crate::api::handlers::organizations::get_organization_handler,
        crate::api::handlers::organizations::update_organization_handler,
        crate::api::handlers::organizations::upload_document_handler
    ),
    components(
        schemas(
            crate::api::handlers::health::HealthResponse,
            LoginRequest,
            RefreshRequest,
            TokenPair,
            CreateUserRequest,
            UpdateUserRequest,
            UserResponse,
            UserEnvelope,
            ListUsersResponse,
            UpdatedResponse,
            Role,
            CreateOrganizationRequest,
            UpdateOrganizationRequest,
            Organization,
            OrganizationSummary,
            OrganizationEnvelope,
            ListOrganizationsResponse,
            OrganizationIdResponse,
            ContactInfo,
            DocumentRef,
            DocumentState,
            BlobRef,
            UploadResponse
        )
    ),
    tags(
        (name = "auth", description = "Login and token refresh"),
        (name = "users", description = "User registry operations"),
        (name = "ngos", description = "Organization registry and document upload"),
        (name = "health", description = "Service health")
    ),
    security(
        ("bearerAuth" = [])
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

pub fn docs_router() -> Router {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_all_operations() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;

        for path in
            ["/auth/login", "/users", "/users/{id}", "/ngos", "/ngos/{id}", "/ngos/{id}/upload"]
        {
            assert!(paths.contains_key(path), "missing path {}", path);
        }
    }

    #[test]
    fn openapi_declares_bearer_scheme() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.expect("components");
        assert!(components.security_schemes.contains_key("bearerAuth"));
    }
}
