//! Token service: mints and verifies stateless bearer tokens.
//!
//! No persistence and no external calls — the only cryptography is HMAC
//! signing via `jsonwebtoken`. Access and refresh tokens are signed with
//! **distinct** secrets, so a leaked access secret cannot be used to mint
//! refresh tokens.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use thiserror::Error;

use crate::claims::{TokenClaims, TokenKind, TokenSubject};

pub const ISSUER: &str = "portal";
pub const AUDIENCE: &str = "portal-users";

/// Default access-token lifetime: 15 minutes.
pub const DEFAULT_ACCESS_TTL_SECS: u64 = 900;
/// Default refresh-token lifetime: 7 days.
pub const DEFAULT_REFRESH_TTL_SECS: u64 = 604_800;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid or malformed token")]
    InvalidToken,

    #[error("token has expired")]
    ExpiredToken,

    #[error("wrong token type for this operation")]
    WrongTokenType,

    #[error("failed to sign token")]
    Signing,
}

/// Mints and verifies the portal's own access/refresh tokens.
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
    validation: Validation,
}

impl TokenService {
    /// Build a token service from two secrets and two expiry strings
    /// (`"15m"`, `"12h"`, `"7d"`, or plain seconds).
    ///
    /// Unrecognized expiry strings fall back to the defaults with a warning
    /// instead of failing, so a typo in deployment config cannot prevent
    /// boot.
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_expiry: &str,
        refresh_expiry: &str,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_audience(&[AUDIENCE]);
        // Expiry is exact: a token past `exp` is rejected with no leeway.
        validation.leeway = 0;

        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
            access_ttl_secs: parse_expiry(access_expiry, DEFAULT_ACCESS_TTL_SECS),
            refresh_ttl_secs: parse_expiry(refresh_expiry, DEFAULT_REFRESH_TTL_SECS),
            validation,
        }
    }

    /// Access-token lifetime in seconds (the `expiresIn` reported to clients).
    pub fn access_ttl_secs(&self) -> u64 {
        self.access_ttl_secs
    }

    pub fn refresh_ttl_secs(&self) -> u64 {
        self.refresh_ttl_secs
    }

    pub fn issue_access_token(&self, subject: &TokenSubject) -> Result<String, TokenError> {
        self.issue(subject, TokenKind::Access, self.access_ttl_secs, &self.access_encoding)
    }

    pub fn issue_refresh_token(&self, subject: &TokenSubject) -> Result<String, TokenError> {
        self.issue(subject, TokenKind::Refresh, self.refresh_ttl_secs, &self.refresh_encoding)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify(token, TokenKind::Access, &self.access_decoding)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify(token, TokenKind::Refresh, &self.refresh_decoding)
    }

    fn issue(
        &self,
        subject: &TokenSubject,
        kind: TokenKind,
        ttl_secs: u64,
        key: &EncodingKey,
    ) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: subject.id.clone(),
            email: subject.email.clone(),
            role: subject.role,
            company_id: subject.company_id.clone(),
            kind,
            iat: now,
            exp: now + ttl_secs as i64,
            iss: ISSUER.to_string(),
            aud: AUDIENCE.to_string(),
        };

        jsonwebtoken::encode(&Header::default(), &claims, key).map_err(|e| {
            tracing::error!(error = %e, "token signing failed");
            TokenError::Signing
        })
    }

    fn verify(
        &self,
        token: &str,
        expected: TokenKind,
        key: &DecodingKey,
    ) -> Result<TokenClaims, TokenError> {
        let data =
            jsonwebtoken::decode::<TokenClaims>(token, key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::ExpiredToken,
                    _ => TokenError::InvalidToken,
                }
            })?;

        if data.claims.kind != expected {
            return Err(TokenError::WrongTokenType);
        }

        Ok(data.claims)
    }
}

/// Extract a bearer token from an `Authorization` header value.
///
/// Returns `None` for a missing header, a non-bearer scheme, or an empty
/// token; never errors.
pub fn parse_authorization_header(header: Option<&str>) -> Option<&str> {
    let token = header?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

/// Convert an expiry string to seconds.
///
/// Supports `Nm` (minutes), `Nh` (hours), `Nd` (days), and a bare number of
/// seconds. Anything else falls back to `default_secs` with a warning.
fn parse_expiry(raw: &str, default_secs: u64) -> u64 {
    let raw = raw.trim();

    let parsed = match raw.as_bytes().last() {
        Some(b'm') => raw[..raw.len() - 1].parse::<u64>().ok().map(|n| n * 60),
        Some(b'h') => raw[..raw.len() - 1].parse::<u64>().ok().map(|n| n * 3600),
        Some(b'd') => raw[..raw.len() - 1].parse::<u64>().ok().map(|n| n * 86_400),
        Some(b'0'..=b'9') => raw.parse::<u64>().ok(),
        _ => None,
    };

    match parsed {
        Some(secs) if secs > 0 => secs,
        _ => {
            tracing::warn!(expiry = raw, default_secs, "unrecognized expiry string; using default");
            default_secs
        }
    }
}

#[cfg(test)]
mod tests {
    use portal_core::{CompanyId, Role, UserId};

    use super::*;

    fn service() -> TokenService {
        TokenService::new("access-secret", "refresh-secret", "15m", "7d")
    }

    fn subject() -> TokenSubject {
        TokenSubject {
            id: UserId::new("user-1"),
            email: "alice@example.com".to_string(),
            role: Role::BusinessAdmin,
            company_id: Some(CompanyId::new("company-1")),
        }
    }

    #[test]
    fn access_token_round_trips() {
        let svc = service();
        let token = svc.issue_access_token(&subject()).unwrap();
        let claims = svc.verify_access_token(&token).unwrap();

        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.sub, UserId::new("user-1"));
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, Role::BusinessAdmin);
        assert_eq!(claims.company_id, Some(CompanyId::new("company-1")));
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.aud, AUDIENCE);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn refresh_token_round_trips() {
        let svc = service();
        let token = svc.issue_refresh_token(&subject()).unwrap();
        let claims = svc.verify_refresh_token(&token).unwrap();

        assert_eq!(claims.kind, TokenKind::Refresh);
        assert_eq!(claims.exp - claims.iat, 604_800);
    }

    #[test]
    fn access_token_is_not_a_refresh_token() {
        let svc = service();
        let token = svc.issue_access_token(&subject()).unwrap();
        // Same shape, same subject — but the kind and the secret both differ.
        assert_eq!(svc.verify_refresh_token(&token), Err(TokenError::InvalidToken));
    }

    #[test]
    fn wrong_kind_is_rejected_even_under_the_right_secret() {
        // Shared secrets isolate the type check from the signature check.
        let svc = TokenService::new("shared", "shared", "15m", "7d");
        let token = svc.issue_access_token(&subject()).unwrap();
        assert_eq!(svc.verify_refresh_token(&token), Err(TokenError::WrongTokenType));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let svc = service();
        let other = TokenService::new("other-secret", "refresh-secret", "15m", "7d");
        let token = other.issue_access_token(&subject()).unwrap();
        assert_eq!(svc.verify_access_token(&token), Err(TokenError::InvalidToken));
    }

    #[test]
    fn expired_token_is_rejected_despite_valid_signature() {
        let svc = service();
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: UserId::new("user-1"),
            email: "alice@example.com".to_string(),
            role: Role::ClientUser,
            company_id: None,
            kind: TokenKind::Access,
            iat: now - 7200,
            exp: now - 3600,
            iss: ISSUER.to_string(),
            aud: AUDIENCE.to_string(),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"access-secret"),
        )
        .unwrap();

        assert_eq!(svc.verify_access_token(&token), Err(TokenError::ExpiredToken));
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let svc = service();
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: UserId::new("user-1"),
            email: "alice@example.com".to_string(),
            role: Role::ClientUser,
            company_id: None,
            kind: TokenKind::Access,
            iat: now,
            exp: now + 900,
            iss: "someone-else".to_string(),
            aud: AUDIENCE.to_string(),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"access-secret"),
        )
        .unwrap();

        assert_eq!(svc.verify_access_token(&token), Err(TokenError::InvalidToken));
    }

    #[test]
    fn authorization_header_parsing() {
        assert_eq!(parse_authorization_header(Some("Bearer abc")), Some("abc"));
        assert_eq!(parse_authorization_header(Some("Bearer   abc  ")), Some("abc"));
        assert_eq!(parse_authorization_header(Some("Bearer ")), None);
        assert_eq!(parse_authorization_header(Some("Basic abc")), None);
        assert_eq!(parse_authorization_header(None), None);
    }

    #[test]
    fn expiry_strings() {
        assert_eq!(parse_expiry("15m", 900), 900);
        assert_eq!(parse_expiry("2h", 900), 7200);
        assert_eq!(parse_expiry("7d", 604_800), 604_800);
        assert_eq!(parse_expiry("45", 900), 45);
        // Misconfiguration falls back instead of failing boot.
        assert_eq!(parse_expiry("soon", 900), 900);
        assert_eq!(parse_expiry("", 900), 900);
        assert_eq!(parse_expiry("0m", 900), 900);
    }
}
