//! `portal-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: token
//! minting/verification, the static role→permission table, the
//! authenticated-user projection, and the pure access guards live here.

pub mod auth_user;
pub mod authorize;
pub mod claims;
pub mod permissions;
pub mod token;

pub use auth_user::AuthUser;
pub use authorize::AuthzError;
pub use claims::{TokenClaims, TokenKind, TokenSubject};
pub use permissions::{ALL_PERMISSIONS, Permission, permissions_for};
pub use token::{TokenError, TokenService, parse_authorization_header};
