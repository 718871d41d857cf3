//! HTTP handlers for the Civita API.

pub mod auth;
pub mod health;
pub mod organizations;
pub mod users;

pub use auth::{login_handler, refresh_handler};
pub use health::health_handler;
pub use organizations::{
    create_organization_handler, get_organization_handler, list_organizations_handler,
    update_organization_handler, upload_document_handler,
};
pub use users::{
    get_user_handler, list_users_handler, register_user_handler, update_user_handler,
};
