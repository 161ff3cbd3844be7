use std::collections::HashMap;
use std::sync::RwLock;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use password_hash::SaltString;
use uuid::Uuid;

use portal_core::UserId;

use super::{Identity, IdentityProvider, NewAccount, ProviderError};

struct StoredAccount {
    identity: Identity,
    password_hash: String,
}

/// In-memory identity provider.
///
/// Intended for tests/dev. Accounts live in a map keyed by id; bearer
/// tokens are opaque strings mapped back to account ids (mirroring a
/// provider session token, without the cryptography).
#[derive(Default)]
pub struct InMemoryIdentityProvider {
    accounts: RwLock<HashMap<UserId, StoredAccount>>,
    tokens: RwLock<HashMap<String, UserId>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a provider bearer token for an existing account.
    pub fn issue_token(&self, id: &UserId) -> Result<String, ProviderError> {
        let accounts = self.accounts.read().map_err(poisoned)?;
        if !accounts.contains_key(id) {
            return Err(ProviderError::NotFound);
        }
        drop(accounts);

        let token = Uuid::now_v7().simple().to_string();
        self.tokens
            .write()
            .map_err(poisoned)?
            .insert(token.clone(), id.clone());
        Ok(token)
    }

    /// Check a password against the stored hash.
    pub fn verify_password(&self, email: &str, password: &str) -> Result<bool, ProviderError> {
        let accounts = self.accounts.read().map_err(poisoned)?;
        let account = accounts
            .values()
            .find(|a| a.identity.email.eq_ignore_ascii_case(email))
            .ok_or(ProviderError::NotFound)?;

        let parsed = PasswordHash::new(&account.password_hash)
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[async_trait::async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn verify_bearer_token(&self, token: &str) -> Result<Identity, ProviderError> {
        let id = self
            .tokens
            .read()
            .map_err(poisoned)?
            .get(token)
            .cloned()
            .ok_or(ProviderError::InvalidToken)?;

        let accounts = self.accounts.read().map_err(poisoned)?;
        accounts
            .get(&id)
            .map(|a| a.identity.clone())
            // The account was deleted after the token was minted.
            .ok_or(ProviderError::InvalidToken)
    }

    async fn get_by_email(&self, email: &str) -> Result<Identity, ProviderError> {
        let accounts = self.accounts.read().map_err(poisoned)?;
        accounts
            .values()
            .find(|a| a.identity.email.eq_ignore_ascii_case(email))
            .map(|a| a.identity.clone())
            .ok_or(ProviderError::NotFound)
    }

    async fn create_account(&self, account: NewAccount) -> Result<Identity, ProviderError> {
        let email = account.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(ProviderError::InvalidEmail);
        }
        if account.password.len() < 6 {
            return Err(ProviderError::WeakPassword);
        }

        let password_hash = hash_password(&account.password)?;

        let mut accounts = self.accounts.write().map_err(poisoned)?;
        if accounts
            .values()
            .any(|a| a.identity.email.eq_ignore_ascii_case(&email))
        {
            return Err(ProviderError::EmailExists);
        }

        let identity = Identity {
            id: UserId::new(Uuid::now_v7().to_string()),
            email,
            email_verified: account.email_verified,
            display_name: account.display_name,
            phone_number: account.phone_number,
            photo_url: None,
        };
        accounts.insert(
            identity.id.clone(),
            StoredAccount {
                identity: identity.clone(),
                password_hash,
            },
        );
        Ok(identity)
    }

    async fn delete_account(&self, id: &UserId) -> Result<(), ProviderError> {
        let mut accounts = self.accounts.write().map_err(poisoned)?;
        if accounts.remove(id).is_none() {
            return Err(ProviderError::NotFound);
        }
        drop(accounts);

        self.tokens
            .write()
            .map_err(poisoned)?
            .retain(|_, owner| owner != id);
        Ok(())
    }

    async fn update_password(&self, id: &UserId, new_password: &str) -> Result<(), ProviderError> {
        if new_password.len() < 6 {
            return Err(ProviderError::WeakPassword);
        }
        let password_hash = hash_password(new_password)?;

        let mut accounts = self.accounts.write().map_err(poisoned)?;
        let account = accounts.get_mut(id).ok_or(ProviderError::NotFound)?;
        account.password_hash = password_hash;
        Ok(())
    }

    async fn generate_password_reset_link(&self, email: &str) -> Result<String, ProviderError> {
        let identity = self.get_by_email(email).await?;
        let code = Uuid::now_v7().simple().to_string();
        Ok(format!(
            "https://portal.example/reset-password?uid={}&oob={}",
            identity.id, code
        ))
    }
}

/// Argon2id with default params; the salt comes straight from the OS.
fn hash_password(password: &str) -> Result<String, ProviderError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes)
        .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| ProviderError::Unavailable(e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ProviderError::Unavailable(e.to_string()))
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> ProviderError {
    ProviderError::Unavailable("account store lock poisoned".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            password: "correct horse battery".to_string(),
            display_name: Some("Test User".to_string()),
            phone_number: None,
            email_verified: false,
        }
    }

    #[tokio::test]
    async fn create_then_look_up_by_email() {
        let provider = InMemoryIdentityProvider::new();
        let created = provider.create_account(new_account("Alice@Example.com")).await.unwrap();

        // Emails are normalized and matched case-insensitively.
        assert_eq!(created.email, "alice@example.com");
        let found = provider.get_by_email("alice@EXAMPLE.com").await.unwrap();
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let provider = InMemoryIdentityProvider::new();
        provider.create_account(new_account("alice@example.com")).await.unwrap();

        let err = provider
            .create_account(new_account("alice@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::EmailExists);
    }

    #[tokio::test]
    async fn rejects_malformed_email_and_weak_password() {
        let provider = InMemoryIdentityProvider::new();

        let err = provider.create_account(new_account("not-an-email")).await.unwrap_err();
        assert_eq!(err, ProviderError::InvalidEmail);

        let mut weak = new_account("bob@example.com");
        weak.password = "short".to_string();
        assert_eq!(
            provider.create_account(weak).await.unwrap_err(),
            ProviderError::WeakPassword
        );
    }

    #[tokio::test]
    async fn bearer_tokens_resolve_to_identities() {
        let provider = InMemoryIdentityProvider::new();
        let created = provider.create_account(new_account("alice@example.com")).await.unwrap();

        let token = provider.issue_token(&created.id).unwrap();
        let identity = provider.verify_bearer_token(&token).await.unwrap();
        assert_eq!(identity.id, created.id);

        assert_eq!(
            provider.verify_bearer_token("bogus").await.unwrap_err(),
            ProviderError::InvalidToken
        );
    }

    #[tokio::test]
    async fn deleting_an_account_invalidates_its_tokens() {
        let provider = InMemoryIdentityProvider::new();
        let created = provider.create_account(new_account("alice@example.com")).await.unwrap();
        let token = provider.issue_token(&created.id).unwrap();

        provider.delete_account(&created.id).await.unwrap();

        assert_eq!(
            provider.verify_bearer_token(&token).await.unwrap_err(),
            ProviderError::InvalidToken
        );
        assert_eq!(
            provider.get_by_email("alice@example.com").await.unwrap_err(),
            ProviderError::NotFound
        );
    }

    #[tokio::test]
    async fn passwords_are_hashed_and_updatable() {
        let provider = InMemoryIdentityProvider::new();
        let created = provider.create_account(new_account("alice@example.com")).await.unwrap();

        assert!(provider.verify_password("alice@example.com", "correct horse battery").unwrap());
        assert!(!provider.verify_password("alice@example.com", "wrong").unwrap());

        provider.update_password(&created.id, "new password 42").await.unwrap();
        assert!(provider.verify_password("alice@example.com", "new password 42").unwrap());
    }

    #[tokio::test]
    async fn reset_link_requires_a_known_email() {
        let provider = InMemoryIdentityProvider::new();
        provider.create_account(new_account("alice@example.com")).await.unwrap();

        let link = provider
            .generate_password_reset_link("alice@example.com")
            .await
            .unwrap();
        assert!(link.starts_with("https://"));

        assert_eq!(
            provider
                .generate_password_reset_link("ghost@example.com")
                .await
                .unwrap_err(),
            ProviderError::NotFound
        );
    }
}
