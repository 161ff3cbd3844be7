//! `portal-infra` — external collaborators behind narrow traits.
//!
//! The user directory, company store, and identity provider are all
//! consumed through `dyn` traits so handlers receive them by reference
//! (constructed once at startup) and tests can substitute doubles. The
//! in-memory implementations here back tests and single-process dev runs.

pub mod companies;
pub mod directory;
pub mod identity;

pub use companies::{CompanyStore, InMemoryCompanyStore};
pub use directory::{DirectoryError, InMemoryUserDirectory, UserDirectory, UserOverrides};
pub use identity::{Identity, IdentityProvider, InMemoryIdentityProvider, NewAccount, ProviderError};
