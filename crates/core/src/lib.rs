//! `portal-core` — shared domain model for the portal.
//!
//! This crate contains **pure domain** types (no infrastructure concerns):
//! identifiers, the role vocabulary, and the user/company records that the
//! directory and auth layers operate on.

pub mod company;
pub mod id;
pub mod role;
pub mod user;

pub use company::{Company, CompanyType};
pub use id::{CompanyId, UserId};
pub use role::Role;
pub use user::{User, UserPatch, UserStatus};
