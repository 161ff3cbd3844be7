//! Pure access guards, checked after authentication.
//!
//! Each guard takes the already-built [`AuthUser`] and returns
//! `Result<(), AuthzError>`, so a route can chain guards with `?` in the
//! order it declares them and the first failure short-circuits.
//!
//! - No IO
//! - No panics
//! - No business logic

use thiserror::Error;

use portal_core::{CompanyId, Role, UserId};

use crate::auth_user::AuthUser;
use crate::permissions::Permission;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("required role(s): {required}; current role: {current}")]
    InsufficientPrivileges { required: String, current: Role },

    #[error("required permission(s): {0}")]
    InsufficientPermissions(String),

    #[error("{0}")]
    AccessDenied(&'static str),
}

/// The user's role must be in the allow-list.
pub fn require_role(user: &AuthUser, allowed: &[Role]) -> Result<(), AuthzError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(AuthzError::InsufficientPrivileges {
            required: allowed
                .iter()
                .map(Role::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            current: user.role,
        })
    }
}

pub fn require_permission(user: &AuthUser, permission: &Permission) -> Result<(), AuthzError> {
    if user.has_permission(permission) {
        Ok(())
    } else {
        Err(AuthzError::InsufficientPermissions(permission.to_string()))
    }
}

pub fn require_any_permission(user: &AuthUser, permissions: &[Permission]) -> Result<(), AuthzError> {
    if user.has_any_permission(permissions) {
        Ok(())
    } else {
        Err(AuthzError::InsufficientPermissions(joined(permissions)))
    }
}

pub fn require_all_permissions(user: &AuthUser, permissions: &[Permission]) -> Result<(), AuthzError> {
    if user.has_all_permissions(permissions) {
        Ok(())
    } else {
        Err(AuthzError::InsufficientPermissions(joined(permissions)))
    }
}

/// Company-scoped access.
///
/// System admins reach any company. Business and partner admins reach only
/// their own company. Everyone else must belong to exactly the requested
/// company.
pub fn require_company_access(user: &AuthUser, company_id: &CompanyId) -> Result<(), AuthzError> {
    match user.role {
        Role::SystemAdmin => Ok(()),
        // TODO: let business/partner admins reach their client companies
        // once the company graph is queryable from here.
        _ if user.company_id.as_ref() == Some(company_id) => Ok(()),
        _ => Err(AuthzError::AccessDenied(
            "you can only access resources from your own company",
        )),
    }
}

/// Self-scoped access.
///
/// System, business, and partner admins reach any user; everyone else only
/// themselves.
pub fn require_self_access(user: &AuthUser, user_id: &UserId) -> Result<(), AuthzError> {
    match user.role {
        Role::SystemAdmin | Role::BusinessAdmin | Role::PartnerAdmin => Ok(()),
        _ if user.id == *user_id => Ok(()),
        _ => Err(AuthzError::AccessDenied("you can only access your own resources")),
    }
}

fn joined(permissions: &[Permission]) -> String {
    permissions
        .iter()
        .map(Permission::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
