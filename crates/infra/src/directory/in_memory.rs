use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use portal_core::{CompanyId, Role, User, UserId, UserPatch, UserStatus};

use super::{DirectoryError, UserDirectory, UserOverrides};
use crate::identity::Identity;

/// In-memory user directory.
///
/// Intended for tests/dev. Upserts are atomic per id: the whole
/// read-modify-write happens under one write lock.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing the upsert path.
    pub fn put(&self, user: User) {
        if let Ok(mut users) = self.users.write() {
            users.insert(user.id.clone(), user);
        }
    }

    /// Flip a record's status (admin tooling / tests).
    pub fn set_status(&self, id: &UserId, status: UserStatus) -> bool {
        match self.users.write() {
            Ok(mut users) => match users.get_mut(id) {
                Some(user) => {
                    user.status = status;
                    user.updated_at = Utc::now();
                    true
                }
                None => false,
            },
            Err(_) => false,
        }
    }
}

#[async_trait::async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get_by_id(&self, id: &UserId) -> Result<Option<User>, DirectoryError> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.get(id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_or_update(
        &self,
        identity: &Identity,
        overrides: UserOverrides,
    ) -> Result<User, DirectoryError> {
        let now = Utc::now();
        let mut users = self.users.write().map_err(poisoned)?;

        let user = match users.get_mut(&identity.id) {
            Some(existing) => {
                existing.email = identity.email.clone();
                existing.email_verified = identity.email_verified;
                // Optional fields the identity omits keep their stored
                // values; a provider that drops photo_url for one login
                // must not erase it here.
                if let Some(v) = &identity.display_name {
                    existing.display_name = Some(v.clone());
                }
                if let Some(v) = &identity.phone_number {
                    existing.phone_number = Some(v.clone());
                }
                if let Some(v) = &identity.photo_url {
                    existing.photo_url = Some(v.clone());
                }
                apply_overrides(existing, overrides);
                existing.updated_at = now;
                existing.last_login_at = Some(now);
                existing.clone()
            }
            None => {
                let mut user = User {
                    id: identity.id.clone(),
                    email: identity.email.clone(),
                    email_verified: identity.email_verified,
                    display_name: identity.display_name.clone(),
                    first_name: None,
                    last_name: None,
                    phone_number: identity.phone_number.clone(),
                    photo_url: identity.photo_url.clone(),
                    role: overrides.role.unwrap_or(Role::ClientUser),
                    status: UserStatus::Active,
                    company_id: None,
                    created_at: now,
                    updated_at: now,
                    last_login_at: Some(now),
                    metadata: None,
                };
                apply_overrides(&mut user, overrides);
                users.insert(user.id.clone(), user.clone());
                user
            }
        };

        Ok(user)
    }

    async fn update_profile(&self, id: &UserId, patch: UserPatch) -> Result<User, DirectoryError> {
        let mut users = self.users.write().map_err(poisoned)?;
        let user = users.get_mut(id).ok_or(DirectoryError::NotFound)?;
        patch.apply_to(user);
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn list(&self, company: Option<&CompanyId>) -> Result<Vec<User>, DirectoryError> {
        let users = self.users.read().map_err(poisoned)?;
        let mut result: Vec<User> = users
            .values()
            .filter(|u| match company {
                Some(company_id) => u.company_id.as_ref() == Some(company_id),
                None => true,
            })
            .cloned()
            .collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(result)
    }

    async fn touch_last_login(&self, id: &UserId) {
        match self.users.write() {
            Ok(mut users) => {
                if let Some(user) = users.get_mut(id) {
                    let now = Utc::now();
                    user.last_login_at = Some(now);
                    user.updated_at = now;
                }
            }
            Err(e) => {
                tracing::warn!(user_id = %id, error = %e, "last-login stamp skipped");
            }
        }
    }
}

fn apply_overrides(user: &mut User, overrides: UserOverrides) {
    if let Some(role) = overrides.role {
        user.role = role;
    }
    if let Some(v) = overrides.first_name {
        user.first_name = Some(v);
    }
    if let Some(v) = overrides.last_name {
        user.last_name = Some(v);
    }
    if let Some(v) = overrides.company_id {
        user.company_id = Some(v);
    }
    if let Some(v) = overrides.metadata {
        user.metadata = Some(v);
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> DirectoryError {
    DirectoryError::Storage("user store lock poisoned".to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn identity(id: &str) -> Identity {
        Identity {
            id: UserId::new(id),
            email: format!("{id}@example.com"),
            email_verified: true,
            display_name: Some("Alice".to_string()),
            phone_number: None,
            photo_url: Some("https://cdn.example.com/a.png".to_string()),
        }
    }

    #[tokio::test]
    async fn first_login_creates_a_defaulted_record() {
        let dir = InMemoryUserDirectory::new();
        let user = dir
            .create_or_update(&identity("u1"), UserOverrides::default())
            .await
            .unwrap();

        assert_eq!(user.role, Role::ClientUser);
        assert_eq!(user.status, UserStatus::Active);
        assert!(user.last_login_at.is_some());
    }

    #[tokio::test]
    async fn upsert_is_idempotent_on_the_id() {
        let dir = InMemoryUserDirectory::new();
        dir.create_or_update(&identity("u1"), UserOverrides::default()).await.unwrap();
        dir.create_or_update(&identity("u1"), UserOverrides::default()).await.unwrap();

        let all = dir.list(None).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn omitted_identity_fields_do_not_clobber_stored_values() {
        let dir = InMemoryUserDirectory::new();
        dir.create_or_update(&identity("u1"), UserOverrides::default()).await.unwrap();

        // Second login: the provider happens not to return a photo this time.
        let mut second = identity("u1");
        second.photo_url = None;
        second.display_name = None;
        let user = dir.create_or_update(&second, UserOverrides::default()).await.unwrap();

        assert_eq!(user.photo_url.as_deref(), Some("https://cdn.example.com/a.png"));
        assert_eq!(user.display_name.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn overrides_pin_role_and_names_on_create() {
        let dir = InMemoryUserDirectory::new();
        let user = dir
            .create_or_update(
                &identity("u1"),
                UserOverrides {
                    role: Some(Role::BusinessUser),
                    first_name: Some("Alice".to_string()),
                    last_name: Some("Smith".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(user.role, Role::BusinessUser);
        assert_eq!(user.first_name.as_deref(), Some("Alice"));
        assert_eq!(user.last_name.as_deref(), Some("Smith"));
    }

    #[tokio::test]
    async fn update_profile_requires_an_existing_record() {
        let dir = InMemoryUserDirectory::new();
        let err = dir
            .update_profile(&UserId::new("ghost"), UserPatch::default())
            .await
            .unwrap_err();
        assert_eq!(err, DirectoryError::NotFound);
    }

    #[tokio::test]
    async fn update_profile_writes_only_set_fields() {
        let dir = InMemoryUserDirectory::new();
        dir.create_or_update(&identity("u1"), UserOverrides::default()).await.unwrap();

        let updated = dir
            .update_profile(
                &UserId::new("u1"),
                UserPatch {
                    first_name: Some("Alicia".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.first_name.as_deref(), Some("Alicia"));
        assert_eq!(updated.photo_url.as_deref(), Some("https://cdn.example.com/a.png"));
    }

    #[tokio::test]
    async fn concurrent_first_logins_produce_one_record() {
        let dir = Arc::new(InMemoryUserDirectory::new());

        let a = {
            let dir = Arc::clone(&dir);
            tokio::spawn(async move {
                dir.create_or_update(&identity("u1"), UserOverrides::default()).await
            })
        };
        let b = {
            let dir = Arc::clone(&dir);
            tokio::spawn(async move {
                dir.create_or_update(&identity("u1"), UserOverrides::default()).await
            })
        };

        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        assert_eq!(dir.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_filters_by_company() {
        let dir = InMemoryUserDirectory::new();
        dir.create_or_update(
            &identity("u1"),
            UserOverrides {
                company_id: Some(CompanyId::new("company-a")),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        dir.create_or_update(&identity("u2"), UserOverrides::default()).await.unwrap();

        let company_a = dir.list(Some(&CompanyId::new("company-a"))).await.unwrap();
        assert_eq!(company_a.len(), 1);
        assert_eq!(company_a[0].id, UserId::new("u1"));

        assert_eq!(dir.list(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn touch_last_login_stamps_existing_records() {
        let dir = InMemoryUserDirectory::new();
        dir.create_or_update(&identity("u1"), UserOverrides::default()).await.unwrap();
        let before = dir.get_by_id(&UserId::new("u1")).await.unwrap().unwrap();

        dir.touch_last_login(&UserId::new("u1")).await;
        let after = dir.get_by_id(&UserId::new("u1")).await.unwrap().unwrap();
        assert!(after.last_login_at >= before.last_login_at);

        // Unknown ids are a no-op, not an error.
        dir.touch_last_login(&UserId::new("ghost")).await;
    }

    #[tokio::test]
    async fn get_by_email_is_case_insensitive() {
        let dir = InMemoryUserDirectory::new();
        dir.create_or_update(&identity("u1"), UserOverrides::default()).await.unwrap();

        let found = dir.get_by_email("U1@EXAMPLE.COM").await.unwrap();
        assert!(found.is_some());
        assert!(dir.get_by_email("nobody@example.com").await.unwrap().is_none());
    }
}
