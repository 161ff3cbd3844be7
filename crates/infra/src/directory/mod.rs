//! User directory: durable storage of application-level user records,
//! keyed by the identity provider's stable id.

use async_trait::async_trait;
use thiserror::Error;

use portal_core::{CompanyId, Role, User, UserId, UserPatch};

use crate::identity::Identity;

mod in_memory;

pub use in_memory::InMemoryUserDirectory;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The record a write expected to exist was not there. Reads signal
    /// "not found" with an empty `Option`, not with this error.
    #[error("user record not found")]
    NotFound,

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Fields the caller may pin when materializing a record, beyond what the
/// identity itself carries. `None` leaves the field to its default (on
/// create) or its stored value (on update).
#[derive(Debug, Clone, Default)]
pub struct UserOverrides {
    pub role: Option<Role>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_id: Option<CompanyId>,
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_by_id(&self, id: &UserId) -> Result<Option<User>, DirectoryError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError>;

    /// Upsert the record for `identity.id`.
    ///
    /// An existing record gets its identity-mirrored fields refreshed
    /// (email, email_verified, and any of display name / phone / photo the
    /// identity actually carries) plus the supplied overrides; optional
    /// fields the identity omits keep their stored values. A new record
    /// defaults to `Role::ClientUser` and `UserStatus::Active`. Both paths
    /// stamp `updated_at` and `last_login_at`.
    async fn create_or_update(
        &self,
        identity: &Identity,
        overrides: UserOverrides,
    ) -> Result<User, DirectoryError>;

    /// Apply a profile patch; only set fields are written.
    async fn update_profile(&self, id: &UserId, patch: UserPatch) -> Result<User, DirectoryError>;

    /// All records, optionally restricted to one company.
    async fn list(&self, company: Option<&CompanyId>) -> Result<Vec<User>, DirectoryError>;

    /// Best-effort last-login stamp: failures are logged, never surfaced,
    /// so an authentication flow cannot fail on this write.
    async fn touch_last_login(&self, id: &UserId);
}
