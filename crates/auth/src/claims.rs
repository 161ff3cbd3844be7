use serde::{Deserialize, Serialize};

use portal_core::{CompanyId, Role, UserId};

/// Discriminates access tokens from refresh tokens.
///
/// A token presented where the other kind is required must be rejected,
/// even when its signature and expiry are valid.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by a signed bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user's identity-provider id.
    pub sub: UserId,
    pub email: String,
    pub role: Role,
    #[serde(rename = "companyId", skip_serializing_if = "Option::is_none", default)]
    pub company_id: Option<CompanyId>,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiration, unix seconds.
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// The identity a token is minted for.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSubject {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    pub company_id: Option<CompanyId>,
}
