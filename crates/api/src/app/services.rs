//! Service wiring.
//!
//! Everything a handler needs is constructed once at process startup and
//! handed to the router behind an `Arc` — no module-level singletons, so
//! tests wire in their own stores and doubles.

use std::sync::Arc;

use portal_auth::{AuthUser, TokenService};
use portal_core::User;
use portal_infra::companies::{CompanyStore, InMemoryCompanyStore};
use portal_infra::directory::{InMemoryUserDirectory, UserDirectory};
use portal_infra::identity::{IdentityProvider, InMemoryIdentityProvider};

use crate::app::errors::ApiError;
use crate::config::Config;

pub struct AppServices {
    pub tokens: TokenService,
    pub directory: Arc<dyn UserDirectory>,
    pub companies: Arc<dyn CompanyStore>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppServices {
    pub fn new(
        tokens: TokenService,
        directory: Arc<dyn UserDirectory>,
        companies: Arc<dyn CompanyStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            tokens,
            directory,
            companies,
            identity,
        }
    }

    /// Wiring for single-process dev runs: in-memory stores, token service
    /// from config.
    pub fn in_memory(config: &Config) -> Self {
        Self::new(
            TokenService::new(
                &config.access_token_secret,
                &config.refresh_token_secret,
                &config.access_token_expiry,
                &config.refresh_token_expiry,
            ),
            Arc::new(InMemoryUserDirectory::new()),
            Arc::new(InMemoryCompanyStore::new()),
            Arc::new(InMemoryIdentityProvider::new()),
        )
    }

    /// Build the authenticated-user projection for a directory record.
    ///
    /// Company resolution is display-only enrichment: a failed company
    /// lookup is logged and degrades to "no company fields", it does not
    /// fail the surrounding flow.
    pub async fn build_auth_user(&self, user: &User) -> AuthUser {
        let company = match &user.company_id {
            Some(company_id) => match self.companies.get(company_id).await {
                Ok(company) => company,
                Err(e) => {
                    tracing::warn!(company_id = %company_id, error = %e, "company lookup failed");
                    None
                }
            },
            None => None,
        };
        AuthUser::from_user(user, company.as_ref())
    }

    /// Mint the access+refresh pair for a login/register response.
    pub fn issue_token_pair(&self, user: &AuthUser) -> Result<(String, String), ApiError> {
        let subject = user.token_subject();
        let access = self.tokens.issue_access_token(&subject)?;
        let refresh = self.tokens.issue_refresh_token(&subject)?;
        Ok((access, refresh))
    }

    /// Stamp last-login without blocking the response path.
    pub fn touch_last_login(self: &Arc<Self>, user: &AuthUser) {
        let directory = Arc::clone(&self.directory);
        let id = user.id.clone();
        tokio::spawn(async move {
            directory.touch_last_login(&id).await;
        });
    }
}
