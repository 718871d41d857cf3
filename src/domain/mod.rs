//! Core domain types: identifiers and the user/organization entities.

mod id;
pub mod organization;
pub mod user;

pub use id::{BlobId, OrgId, UserId};
pub use organization::{
    ContactInfo, DocumentRef, DocumentState, NewOrganization, Organization, OrganizationSummary,
    UpdateOrganization,
};
pub use user::{NewUser, Role, UpdateUser, User};
