//! Service layer sitting between the HTTP handlers and the repositories.

pub mod document_service;
pub mod organization_service;
pub mod user_service;

pub use document_service::DocumentService;
pub use organization_service::OrganizationService;
pub use user_service::UserService;
