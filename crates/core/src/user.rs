//! User directory record and the patch structure used to update it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CompanyId, Role, UserId};

/// Account status.
///
/// Anything other than `Active` blocks token refresh and authenticated
/// access.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
    PendingVerification,
}

impl UserStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, UserStatus::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "ACTIVE",
            UserStatus::Inactive => "INACTIVE",
            UserStatus::Suspended => "SUSPENDED",
            UserStatus::PendingVerification => "PENDING_VERIFICATION",
        }
    }
}

impl core::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-level user record, keyed by the identity provider's id.
///
/// # Invariants
/// - `id` never changes after creation.
/// - `email`/`email_verified` mirror the identity provider and are refreshed
///   on every authenticated write.
/// - `metadata` is an opaque bag; the directory never interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub email_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<CompanyId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Profile update patch.
///
/// `None` means "leave the stored field untouched" — a patch can never
/// clear a field to an undefined sentinel, only set it to a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub display_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub photo_url: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone_number.is_none()
            && self.photo_url.is_none()
    }

    /// Apply the set fields to `user`, leaving unset fields alone.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(v) = &self.display_name {
            user.display_name = Some(v.clone());
        }
        if let Some(v) = &self.first_name {
            user.first_name = Some(v.clone());
        }
        if let Some(v) = &self.last_name {
            user.last_name = Some(v.clone());
        }
        if let Some(v) = &self.phone_number {
            user.phone_number = Some(v.clone());
        }
        if let Some(v) = &self.photo_url {
            user.photo_url = Some(v.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: UserId::new("u-1"),
            email: "alice@example.com".to_string(),
            email_verified: true,
            display_name: Some("Alice".to_string()),
            first_name: Some("Alice".to_string()),
            last_name: Some("Smith".to_string()),
            phone_number: None,
            photo_url: Some("https://cdn.example.com/alice.png".to_string()),
            role: Role::ClientUser,
            status: UserStatus::Active,
            company_id: None,
            created_at: now,
            updated_at: now,
            last_login_at: None,
            metadata: None,
        }
    }

    #[test]
    fn patch_only_touches_set_fields() {
        let mut user = sample_user();
        let patch = UserPatch {
            first_name: Some("Alicia".to_string()),
            ..Default::default()
        };

        patch.apply_to(&mut user);

        assert_eq!(user.first_name.as_deref(), Some("Alicia"));
        // Unset fields keep their stored values.
        assert_eq!(user.photo_url.as_deref(), Some("https://cdn.example.com/alice.png"));
        assert_eq!(user.display_name.as_deref(), Some("Alice"));
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(UserPatch::default().is_empty());
        assert!(
            !UserPatch {
                photo_url: Some("https://example.com/p.png".to_string()),
                ..Default::default()
            }
            .is_empty()
        );
    }

    #[test]
    fn absent_optionals_are_omitted_from_wire_form() {
        let user = sample_user();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("phoneNumber").is_none());
        assert_eq!(json["status"], "ACTIVE");
        assert_eq!(json["role"], "CLIENT_USER");
    }
}
