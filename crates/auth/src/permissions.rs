//! Permission vocabulary and the static role→permission table.
//!
//! Permissions are `resource:action` strings with a finite, statically
//! enumerable universe. The role mapping is process-wide configuration:
//! built into the binary, never mutated at runtime.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use portal_core::Role;

/// Permission identifier in `resource:action` form (e.g. `"tickets:create"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

// User management
pub const USERS_READ: Permission = Permission::from_static("users:read");
pub const USERS_CREATE: Permission = Permission::from_static("users:create");
pub const USERS_UPDATE: Permission = Permission::from_static("users:update");
pub const USERS_DELETE: Permission = Permission::from_static("users:delete");

// Company management
pub const COMPANIES_READ: Permission = Permission::from_static("companies:read");
pub const COMPANIES_CREATE: Permission = Permission::from_static("companies:create");
pub const COMPANIES_UPDATE: Permission = Permission::from_static("companies:update");
pub const COMPANIES_DELETE: Permission = Permission::from_static("companies:delete");

// Project management
pub const PROJECTS_READ: Permission = Permission::from_static("projects:read");
pub const PROJECTS_CREATE: Permission = Permission::from_static("projects:create");
pub const PROJECTS_UPDATE: Permission = Permission::from_static("projects:update");
pub const PROJECTS_DELETE: Permission = Permission::from_static("projects:delete");

// Ticket management
pub const TICKETS_READ: Permission = Permission::from_static("tickets:read");
pub const TICKETS_CREATE: Permission = Permission::from_static("tickets:create");
pub const TICKETS_UPDATE: Permission = Permission::from_static("tickets:update");
pub const TICKETS_DELETE: Permission = Permission::from_static("tickets:delete");
pub const TICKETS_ASSIGN: Permission = Permission::from_static("tickets:assign");

// Invoice management
pub const INVOICES_READ: Permission = Permission::from_static("invoices:read");
pub const INVOICES_CREATE: Permission = Permission::from_static("invoices:create");
pub const INVOICES_UPDATE: Permission = Permission::from_static("invoices:update");
pub const INVOICES_DELETE: Permission = Permission::from_static("invoices:delete");
pub const INVOICES_SEND: Permission = Permission::from_static("invoices:send");
pub const INVOICES_PAY: Permission = Permission::from_static("invoices:pay");

// Document management
pub const DOCUMENTS_READ: Permission = Permission::from_static("documents:read");
pub const DOCUMENTS_UPLOAD: Permission = Permission::from_static("documents:upload");
pub const DOCUMENTS_UPDATE: Permission = Permission::from_static("documents:update");
pub const DOCUMENTS_DELETE: Permission = Permission::from_static("documents:delete");
pub const DOCUMENTS_DOWNLOAD: Permission = Permission::from_static("documents:download");

// Admin functions
pub const ADMIN_PANEL: Permission = Permission::from_static("admin:panel");
pub const ADMIN_USERS: Permission = Permission::from_static("admin:users");
pub const ADMIN_COMPANIES: Permission = Permission::from_static("admin:companies");
pub const ADMIN_SETTINGS: Permission = Permission::from_static("admin:settings");
pub const ADMIN_REPORTS: Permission = Permission::from_static("admin:reports");

/// The full permission universe.
pub const ALL_PERMISSIONS: &[Permission] = &[
    USERS_READ,
    USERS_CREATE,
    USERS_UPDATE,
    USERS_DELETE,
    COMPANIES_READ,
    COMPANIES_CREATE,
    COMPANIES_UPDATE,
    COMPANIES_DELETE,
    PROJECTS_READ,
    PROJECTS_CREATE,
    PROJECTS_UPDATE,
    PROJECTS_DELETE,
    TICKETS_READ,
    TICKETS_CREATE,
    TICKETS_UPDATE,
    TICKETS_DELETE,
    TICKETS_ASSIGN,
    INVOICES_READ,
    INVOICES_CREATE,
    INVOICES_UPDATE,
    INVOICES_DELETE,
    INVOICES_SEND,
    INVOICES_PAY,
    DOCUMENTS_READ,
    DOCUMENTS_UPLOAD,
    DOCUMENTS_UPDATE,
    DOCUMENTS_DELETE,
    DOCUMENTS_DOWNLOAD,
    ADMIN_PANEL,
    ADMIN_USERS,
    ADMIN_COMPANIES,
    ADMIN_SETTINGS,
    ADMIN_REPORTS,
];

const BUSINESS_ADMIN_PERMISSIONS: &[Permission] = &[
    USERS_READ,
    USERS_CREATE,
    USERS_UPDATE,
    COMPANIES_READ,
    COMPANIES_UPDATE,
    PROJECTS_READ,
    PROJECTS_CREATE,
    PROJECTS_UPDATE,
    PROJECTS_DELETE,
    TICKETS_READ,
    TICKETS_CREATE,
    TICKETS_UPDATE,
    TICKETS_ASSIGN,
    INVOICES_READ,
    INVOICES_CREATE,
    INVOICES_UPDATE,
    INVOICES_SEND,
    DOCUMENTS_READ,
    DOCUMENTS_UPLOAD,
    DOCUMENTS_UPDATE,
    DOCUMENTS_DELETE,
    DOCUMENTS_DOWNLOAD,
];

const BUSINESS_USER_PERMISSIONS: &[Permission] = &[
    PROJECTS_READ,
    TICKETS_READ,
    TICKETS_CREATE,
    TICKETS_UPDATE,
    INVOICES_READ,
    DOCUMENTS_READ,
    DOCUMENTS_UPLOAD,
    DOCUMENTS_DOWNLOAD,
];

const CLIENT_ADMIN_PERMISSIONS: &[Permission] = &[
    USERS_READ,
    USERS_CREATE,
    USERS_UPDATE,
    COMPANIES_READ,
    COMPANIES_UPDATE,
    PROJECTS_READ,
    TICKETS_READ,
    TICKETS_CREATE,
    TICKETS_UPDATE,
    INVOICES_READ,
    INVOICES_PAY,
    DOCUMENTS_READ,
    DOCUMENTS_UPLOAD,
    DOCUMENTS_DOWNLOAD,
];

const CLIENT_USER_PERMISSIONS: &[Permission] = &[
    PROJECTS_READ,
    TICKETS_READ,
    TICKETS_CREATE,
    INVOICES_READ,
    DOCUMENTS_READ,
    DOCUMENTS_UPLOAD,
    DOCUMENTS_DOWNLOAD,
];

const PARTNER_ADMIN_PERMISSIONS: &[Permission] = &[
    USERS_READ,
    USERS_CREATE,
    USERS_UPDATE,
    COMPANIES_READ,
    COMPANIES_CREATE,
    COMPANIES_UPDATE,
    PROJECTS_READ,
    PROJECTS_CREATE,
    PROJECTS_UPDATE,
    TICKETS_READ,
    TICKETS_CREATE,
    TICKETS_UPDATE,
    INVOICES_READ,
    INVOICES_CREATE,
    INVOICES_UPDATE,
    DOCUMENTS_READ,
    DOCUMENTS_UPLOAD,
    DOCUMENTS_UPDATE,
    DOCUMENTS_DOWNLOAD,
];

// Same floor as client users.
const PARTNER_USER_PERMISSIONS: &[Permission] = CLIENT_USER_PERMISSIONS;

/// Permission set granted by a role.
///
/// `SystemAdmin` maps to the complete universe; every other role maps to a
/// fixed strict subset. Exhaustive over the closed role enum, so a new role
/// cannot be added without deciding its permissions here.
pub fn permissions_for(role: Role) -> &'static [Permission] {
    match role {
        Role::SystemAdmin => ALL_PERMISSIONS,
        Role::BusinessAdmin => BUSINESS_ADMIN_PERMISSIONS,
        Role::BusinessUser => BUSINESS_USER_PERMISSIONS,
        Role::ClientAdmin => CLIENT_ADMIN_PERMISSIONS,
        Role::ClientUser => CLIENT_USER_PERMISSIONS,
        Role::PartnerAdmin => PARTNER_ADMIN_PERMISSIONS,
        Role::PartnerUser => PARTNER_USER_PERMISSIONS,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn universe_has_no_duplicates() {
        let unique: HashSet<&str> = ALL_PERMISSIONS.iter().map(|p| p.as_str()).collect();
        assert_eq!(unique.len(), ALL_PERMISSIONS.len());
    }

    #[test]
    fn system_admin_gets_the_full_universe() {
        assert_eq!(permissions_for(Role::SystemAdmin), ALL_PERMISSIONS);
    }

    #[test]
    fn every_role_maps_into_the_universe() {
        let universe: HashSet<&str> = ALL_PERMISSIONS.iter().map(|p| p.as_str()).collect();
        for role in Role::ALL {
            for permission in permissions_for(role) {
                assert!(
                    universe.contains(permission.as_str()),
                    "{role} grants {permission}, which is not in the universe"
                );
            }
        }
    }

    #[test]
    fn non_admin_roles_get_strict_subsets() {
        for role in Role::ALL {
            if role == Role::SystemAdmin {
                continue;
            }
            assert!(
                permissions_for(role).len() < ALL_PERMISSIONS.len(),
                "{role} must not hold the full universe"
            );
        }
    }

    #[test]
    fn partner_users_share_the_client_user_floor() {
        assert_eq!(
            permissions_for(Role::PartnerUser),
            permissions_for(Role::ClientUser)
        );
    }

    #[test]
    fn representative_grants() {
        assert!(permissions_for(Role::ClientAdmin).contains(&INVOICES_PAY));
        assert!(!permissions_for(Role::BusinessAdmin).contains(&INVOICES_DELETE));
        assert!(!permissions_for(Role::PartnerAdmin).contains(&TICKETS_ASSIGN));
        assert!(!permissions_for(Role::ClientUser).contains(&TICKETS_UPDATE));
    }
}
