//! Company store: read-only lookups used to enrich the authenticated-user
//! projection with company display fields.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use portal_core::{Company, CompanyId};

use crate::directory::DirectoryError;

#[async_trait]
pub trait CompanyStore: Send + Sync {
    async fn get(&self, id: &CompanyId) -> Result<Option<Company>, DirectoryError>;
}

/// In-memory company store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCompanyStore {
    companies: RwLock<HashMap<CompanyId, Company>>,
}

impl InMemoryCompanyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, company: Company) {
        if let Ok(mut companies) = self.companies.write() {
            companies.insert(company.id.clone(), company);
        }
    }
}

#[async_trait]
impl CompanyStore for InMemoryCompanyStore {
    async fn get(&self, id: &CompanyId) -> Result<Option<Company>, DirectoryError> {
        let companies = self
            .companies
            .read()
            .map_err(|_| DirectoryError::Storage("company store lock poisoned".to_string()))?;
        Ok(companies.get(id).cloned())
    }
}
