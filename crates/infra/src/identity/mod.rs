//! Identity provider contract.
//!
//! The external identity system is the system of record for credentials:
//! it hashes passwords, verifies emails, and issues its own bearer tokens.
//! This module only defines the seam; the portal never sees a password
//! hash from a real provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use portal_core::UserId;

mod in_memory;

pub use in_memory::InMemoryIdentityProvider;

/// An account as the identity provider reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    pub email_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// Request to create a provider account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
    pub phone_number: Option<String>,
    pub email_verified: bool,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("invalid identity token")]
    InvalidToken,

    #[error("no account found")]
    NotFound,

    #[error("an account with this email already exists")]
    EmailExists,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("password does not meet provider requirements")]
    WeakPassword,

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// The only component allowed to create/verify externally-issued identity
/// credentials and manage user passwords.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify a provider-issued bearer token and return the identity it
    /// belongs to.
    async fn verify_bearer_token(&self, token: &str) -> Result<Identity, ProviderError>;

    async fn get_by_email(&self, email: &str) -> Result<Identity, ProviderError>;

    async fn create_account(&self, account: NewAccount) -> Result<Identity, ProviderError>;

    async fn delete_account(&self, id: &UserId) -> Result<(), ProviderError>;

    async fn update_password(&self, id: &UserId, new_password: &str) -> Result<(), ProviderError>;

    /// Generate (but do not deliver) a password reset link.
    async fn generate_password_reset_link(&self, email: &str) -> Result<String, ProviderError>;
}
