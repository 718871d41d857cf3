//! Repository traits and their sqlx implementations.

pub mod organization;
pub mod user;

pub use organization::{NewDocument, OrganizationRepository, SqlxOrganizationRepository};
pub use user::{SqlxUserRepository, UserRepository};
