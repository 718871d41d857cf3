use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::auth::{
    middleware::{authenticate, ensure_roles, RoleState},
    TokenService,
};
use crate::blobs::BlobStore;
use crate::domain::Role;
use crate::storage::DbPool;

use super::{
    docs,
    handlers::{
        create_organization_handler, get_organization_handler, get_user_handler, health_handler,
        list_organizations_handler, list_users_handler, login_handler, refresh_handler,
        register_user_handler, update_organization_handler, update_user_handler,
        upload_document_handler,
    },
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct ApiState {
    pub pool: DbPool,
    pub token_service: Arc<TokenService>,
    pub blob_store: Arc<dyn BlobStore>,
    pub bcrypt_cost: u32,
    pub max_upload_bytes: usize,
}

/// Every role known to the platform; the allow-list for operations open to any
/// authenticated user.
const ANY_REGISTERED: &[Role] = &[Role::Admin, Role::OrgAffiliated, Role::Independent];

/// Assemble the full router. Protected methods carry a role allow-list layer
/// (inner) and the authentication layer (outer); public methods are merged in
/// alongside them without either.
pub fn build_router(state: ApiState) -> Router {
    let token_service = state.token_service.clone();
    let auth_layer = move || middleware::from_fn_with_state(token_service.clone(), authenticate);

    let role_layer = |roles: &[Role]| {
        let allowed: RoleState = Arc::new(roles.to_vec());
        middleware::from_fn_with_state(allowed, ensure_roles)
    };

    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        .route(
            "/users",
            get(list_users_handler)
                .route_layer(role_layer(ANY_REGISTERED))
                .route_layer(auth_layer())
                .merge(post(register_user_handler)),
        )
        .route(
            "/users/{id}",
            get(get_user_handler)
                .route_layer(role_layer(ANY_REGISTERED))
                .merge(put(update_user_handler).route_layer(role_layer(&[Role::Admin])))
                .route_layer(auth_layer()),
        )
        .route(
            "/ngos",
            get(list_organizations_handler)
                .route_layer(role_layer(ANY_REGISTERED))
                .merge(
                    post(create_organization_handler)
                        .route_layer(role_layer(&[Role::OrgAffiliated, Role::Admin])),
                )
                .route_layer(auth_layer()),
        )
        .route(
            "/ngos/{id}",
            get(get_organization_handler)
                .route_layer(role_layer(ANY_REGISTERED))
                .merge(
                    put(update_organization_handler).route_layer(role_layer(&[Role::Admin])),
                )
                .route_layer(auth_layer()),
        )
        .route(
            "/ngos/{id}/upload",
            post(upload_document_handler)
                .route_layer(role_layer(ANY_REGISTERED))
                .route_layer(auth_layer()),
        )
        .route("/auth/login", post(login_handler))
        .route("/auth/refresh", post(refresh_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .merge(docs::docs_router())
}
