use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role granted to a user.
///
/// The role vocabulary is closed: authorization is a role→permission-set
/// lookup, never per-user grants, and a user holds exactly one role.
/// Wire form is the SCREAMING_SNAKE name (e.g. `"BUSINESS_ADMIN"`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SystemAdmin,
    BusinessAdmin,
    BusinessUser,
    ClientAdmin,
    ClientUser,
    PartnerAdmin,
    PartnerUser,
}

impl Role {
    /// All roles, in a stable order.
    pub const ALL: [Role; 7] = [
        Role::SystemAdmin,
        Role::BusinessAdmin,
        Role::BusinessUser,
        Role::ClientAdmin,
        Role::ClientUser,
        Role::PartnerAdmin,
        Role::PartnerUser,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SystemAdmin => "SYSTEM_ADMIN",
            Role::BusinessAdmin => "BUSINESS_ADMIN",
            Role::BusinessUser => "BUSINESS_USER",
            Role::ClientAdmin => "CLIENT_ADMIN",
            Role::ClientUser => "CLIENT_USER",
            Role::PartnerAdmin => "PARTNER_ADMIN",
            Role::PartnerUser => "PARTNER_USER",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_form_is_screaming_snake() {
        let json = serde_json::to_string(&Role::BusinessAdmin).unwrap();
        assert_eq!(json, "\"BUSINESS_ADMIN\"");

        let parsed: Role = serde_json::from_str("\"CLIENT_USER\"").unwrap();
        assert_eq!(parsed, Role::ClientUser);
    }

    #[test]
    fn from_str_round_trips_all_roles() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("SUPER_ADMIN".parse::<Role>().is_err());
    }
}
