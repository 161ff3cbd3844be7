//! Error taxonomy and the response envelope.
//!
//! Every response — success or failure — uses the same envelope:
//! `{success, data?, message?, error?, errors?, timestamp}`. Provider and
//! storage internals are logged with full context and sanitized before
//! they reach a client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use portal_auth::authorize::AuthzError;
use portal_auth::token::TokenError;
use portal_core::UserStatus;
use portal_infra::directory::DirectoryError;
use portal_infra::identity::ProviderError;

use crate::app::validation::FieldError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("authorization header with bearer token required")]
    MissingToken,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Authz(#[from] AuthzError),

    #[error("account status: {0}")]
    AccountInactive(UserStatus),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("an account with this email already exists")]
    UserExists,

    #[error(transparent)]
    Provider(ProviderError),

    #[error(transparent)]
    Storage(#[from] DirectoryError),

    #[error("too many requests, please try again later")]
    RateLimited,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidCredentials | ApiError::MissingToken => StatusCode::UNAUTHORIZED,
            ApiError::Token(TokenError::Signing) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Token(_) => StatusCode::UNAUTHORIZED,
            ApiError::Authz(_) | ApiError::AccountInactive(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UserExists => StatusCode::CONFLICT,
            ApiError::Provider(e) => match e {
                ProviderError::EmailExists => StatusCode::CONFLICT,
                ProviderError::InvalidEmail | ProviderError::WeakPassword => StatusCode::BAD_REQUEST,
                ProviderError::NotFound => StatusCode::NOT_FOUND,
                ProviderError::InvalidToken => StatusCode::UNAUTHORIZED,
                ProviderError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Storage(DirectoryError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Storage(DirectoryError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Stable machine-readable code for the envelope's `error` field.
    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::MissingToken => "missing_token",
            ApiError::Token(TokenError::ExpiredToken) => "expired_token",
            ApiError::Token(TokenError::WrongTokenType) => "wrong_token_type",
            ApiError::Token(TokenError::Signing) => "internal_error",
            ApiError::Token(TokenError::InvalidToken) => "invalid_token",
            ApiError::Authz(AuthzError::InsufficientPrivileges { .. }) => "insufficient_privileges",
            ApiError::Authz(AuthzError::InsufficientPermissions(_)) => "insufficient_permissions",
            ApiError::Authz(AuthzError::AccessDenied(_)) => "access_denied",
            ApiError::AccountInactive(_) => "account_inactive",
            ApiError::NotFound(_) => "not_found",
            ApiError::UserExists => "user_exists",
            ApiError::Provider(e) => match e {
                ProviderError::EmailExists => "user_exists",
                ProviderError::InvalidEmail => "invalid_email",
                ProviderError::WeakPassword => "weak_password",
                ProviderError::NotFound => "not_found",
                ProviderError::InvalidToken => "invalid_token",
                ProviderError::Unavailable(_) => "provider_error",
            },
            ApiError::Storage(DirectoryError::NotFound) => "not_found",
            ApiError::Storage(DirectoryError::Storage(_)) => "storage_error",
            ApiError::RateLimited => "rate_limited",
        }
    }

    /// Message safe to show a client.
    fn message(&self) -> String {
        match self {
            // Internal detail stays in the logs.
            ApiError::Storage(DirectoryError::Storage(_)) => "storage failure".to_string(),
            ApiError::Provider(ProviderError::Unavailable(_)) => {
                "identity provider unavailable".to_string()
            }
            ApiError::Token(TokenError::Signing) => "internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Storage(DirectoryError::Storage(detail)) => {
                tracing::error!(%detail, "directory storage failure");
            }
            ApiError::Provider(ProviderError::Unavailable(detail)) => {
                tracing::error!(%detail, "identity provider failure");
            }
            _ => {}
        }

        let mut body = json!({
            "success": false,
            "error": self.code(),
            "message": self.message(),
            "timestamp": Utc::now().to_rfc3339(),
        });
        if let ApiError::Validation(errors) = &self {
            body["errors"] = json!(errors);
        }

        (self.status(), Json(body)).into_response()
    }
}

/// Success envelope with a data payload.
pub fn ok_data(status: StatusCode, data: impl Serialize, message: &str) -> Response {
    (
        status,
        Json(json!({
            "success": true,
            "data": data,
            "message": message,
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
        .into_response()
}

/// Success envelope without a data payload.
pub fn ok(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "success": true,
            "message": message,
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_code_mapping() {
        assert_eq!(ApiError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::UserExists.status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Token(TokenError::WrongTokenType).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::AccountInactive(UserStatus::Suspended).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Provider(ProviderError::WeakPassword).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Storage(DirectoryError::Storage("boom".into())).code(),
            "storage_error"
        );
        assert_eq!(ApiError::Validation(vec![]).status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn storage_detail_is_not_leaked() {
        let err = ApiError::Storage(DirectoryError::Storage("connection refused".into()));
        assert!(!err.message().contains("connection refused"));
    }
}
