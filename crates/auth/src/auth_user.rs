use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use portal_core::{Company, CompanyId, CompanyType, Role, User, UserId, UserStatus};

use crate::claims::TokenSubject;
use crate::permissions::{Permission, permissions_for};

/// Authenticated-user projection.
///
/// Combines the directory record with resolved company display fields and
/// the resolved permission set. Built fresh per request/flow — never
/// persisted or cached beyond the request lifetime, so role and company
/// changes take effect on the next authentication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    pub email_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<CompanyId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_type: Option<CompanyType>,
    pub permissions: Vec<Permission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl AuthUser {
    /// Project a directory record (plus its resolved company, when any)
    /// into the transient authenticated-user shape.
    pub fn from_user(user: &User, company: Option<&Company>) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            email_verified: user.email_verified,
            display_name: user.display_name.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            photo_url: user.photo_url.clone(),
            role: user.role,
            status: user.status,
            company_id: user.company_id.clone(),
            company_name: company.map(|c| c.name.clone()),
            company_type: company.map(|c| c.company_type),
            permissions: permissions_for(user.role).to_vec(),
            last_login_at: user.last_login_at,
        }
    }

    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
    }

    pub fn has_any_permission(&self, permissions: &[Permission]) -> bool {
        permissions.iter().any(|p| self.has_permission(p))
    }

    pub fn has_all_permissions(&self, permissions: &[Permission]) -> bool {
        permissions.iter().all(|p| self.has_permission(p))
    }

    /// The claims to mint tokens for this user.
    pub fn token_subject(&self) -> TokenSubject {
        TokenSubject {
            id: self.id.clone(),
            email: self.email.clone(),
            role: self.role,
            company_id: self.company_id.clone(),
        }
    }
}
