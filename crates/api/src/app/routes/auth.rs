//! Authentication flows: register, login, refresh, logout, profile,
//! password management, token verification.
//!
//! Each flow is a single request/response cycle. External calls run
//! strictly in the order written; the only deliberately unawaited call is
//! the last-login stamp.

use std::sync::Arc;

use axum::Json;
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::Response;

use portal_auth::{AuthUser, TokenSubject};
use portal_core::Role;
use portal_infra::directory::UserOverrides;
use portal_infra::identity::{NewAccount, ProviderError};

use crate::app::errors::{self, ApiError};
use crate::app::services::AppServices;
use crate::app::{dto, validation};

/// POST /auth/register
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> Result<Response, ApiError> {
    validation::validate_register(&body).map_err(ApiError::Validation)?;

    // Pre-check the provider; "not found" is the success path. The
    // provider still enforces uniqueness itself, so a racing registration
    // surfaces as EmailExists from create_account below.
    match services.identity.get_by_email(&body.email).await {
        Err(ProviderError::NotFound) => {}
        Ok(_) => return Err(ApiError::UserExists),
        Err(e) => return Err(ApiError::Provider(e)),
    }

    let identity = services
        .identity
        .create_account(NewAccount {
            email: body.email.clone(),
            password: body.password.clone(),
            display_name: Some(format!(
                "{} {}",
                body.first_name.trim(),
                body.last_name.trim()
            )),
            phone_number: body.phone_number.clone(),
            email_verified: false,
        })
        .await
        .map_err(ApiError::Provider)?;

    let overrides = UserOverrides {
        role: Some(role_for_user_type(&body.user_type)),
        first_name: Some(body.first_name.trim().to_string()),
        last_name: Some(body.last_name.trim().to_string()),
        company_id: None,
        metadata: body.company_name.as_deref().map(|name| {
            let mut metadata = serde_json::Map::new();
            metadata.insert("companyName".to_string(), name.trim().into());
            metadata
        }),
    };

    let user = match services.directory.create_or_update(&identity, overrides).await {
        Ok(user) => user,
        Err(e) => {
            // Compensate: without a directory record the provider account
            // is an orphan. The delete is best-effort; a failure here is
            // logged for reconciliation, never escalated over the
            // original error.
            tracing::error!(user_id = %identity.id, error = %e, "directory write failed after account creation; rolling back");
            if let Err(rollback) = services.identity.delete_account(&identity.id).await {
                tracing::error!(user_id = %identity.id, error = %rollback, "rollback of orphaned provider account failed");
            }
            return Err(ApiError::Storage(e));
        }
    };

    let auth_user = services.build_auth_user(&user).await;
    let (access_token, refresh_token) = services.issue_token_pair(&auth_user)?;
    services.touch_last_login(&auth_user);

    Ok(errors::ok_data(
        StatusCode::CREATED,
        dto::TokenBundle {
            user: auth_user,
            access_token,
            refresh_token,
            expires_in: services.tokens.access_ttl_secs(),
        },
        "Registration successful",
    ))
}

/// POST /auth/login
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> Result<Response, ApiError> {
    validation::validate_login(&body).map_err(ApiError::Validation)?;

    // Whether the email is unknown or the provider hiccuped, the client
    // learns only "invalid credentials".
    let identity = services.identity.get_by_email(&body.email).await.map_err(|e| {
        if !matches!(e, ProviderError::NotFound) {
            tracing::warn!(error = %e, "identity lookup failed during login");
        }
        ApiError::InvalidCredentials
    })?;

    // Backfills a record on first login and refreshes mirrored fields on
    // every later one.
    let user = services
        .directory
        .create_or_update(&identity, UserOverrides::default())
        .await?;

    let auth_user = services.build_auth_user(&user).await;
    let (access_token, refresh_token) = services.issue_token_pair(&auth_user)?;
    services.touch_last_login(&auth_user);

    Ok(errors::ok_data(
        StatusCode::OK,
        dto::TokenBundle {
            user: auth_user,
            access_token,
            refresh_token,
            expires_in: services.tokens.access_ttl_secs(),
        },
        "Login successful",
    ))
}

/// POST /auth/refresh
///
/// Issues a new access token only; the refresh token itself is not
/// rotated. Role/company changes take effect here because the new token is
/// minted from the current directory record, not the stale claims.
pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RefreshRequest>,
) -> Result<Response, ApiError> {
    let claims = services.tokens.verify_refresh_token(&body.refresh_token)?;

    let user = services
        .directory
        .get_by_id(&claims.sub)
        .await?
        .ok_or(ApiError::NotFound("User profile not found"))?;

    if !user.status.is_active() {
        return Err(ApiError::AccountInactive(user.status));
    }

    let subject = TokenSubject {
        id: user.id.clone(),
        email: user.email.clone(),
        role: user.role,
        company_id: user.company_id.clone(),
    };
    let access_token = services.tokens.issue_access_token(&subject)?;

    Ok(errors::ok_data(
        StatusCode::OK,
        dto::RefreshResponse {
            access_token,
            expires_in: services.tokens.access_ttl_secs(),
        },
        "Token refreshed successfully",
    ))
}

/// POST /auth/logout
///
/// Stateless tokens: nothing to revoke server-side, the client discards
/// its pair. The handler exists so logout still requires a valid session.
pub async fn logout(Extension(_user): Extension<AuthUser>) -> Result<Response, ApiError> {
    Ok(errors::ok(StatusCode::OK, "Logout successful"))
}

/// GET /auth/profile
pub async fn get_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, ApiError> {
    // Re-read so the response reflects writes that landed after the token
    // was minted.
    let fresh = services
        .directory
        .get_by_id(&user.id)
        .await?
        .ok_or(ApiError::NotFound("User profile not found"))?;

    let auth_user = services.build_auth_user(&fresh).await;
    Ok(errors::ok_data(StatusCode::OK, auth_user, "Profile retrieved successfully"))
}

/// PUT /auth/profile
pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<dto::UpdateProfileRequest>,
) -> Result<Response, ApiError> {
    validation::validate_update_profile(&body).map_err(ApiError::Validation)?;

    let updated = services
        .directory
        .update_profile(&user.id, body.into_patch())
        .await?;

    // Rebuild the projection so permission/company fields stay consistent
    // with whatever just changed.
    let auth_user = services.build_auth_user(&updated).await;
    Ok(errors::ok_data(StatusCode::OK, auth_user, "Profile updated successfully"))
}

/// POST /auth/change-password
pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<dto::ChangePasswordRequest>,
) -> Result<Response, ApiError> {
    validation::validate_change_password(&body).map_err(ApiError::Validation)?;

    services
        .identity
        .update_password(&user.id, &body.new_password)
        .await
        .map_err(ApiError::Provider)?;

    Ok(errors::ok(StatusCode::OK, "Password updated successfully"))
}

/// POST /auth/reset-password
///
/// The response is identical whether or not the email exists, so the
/// endpoint cannot be used to probe for accounts.
pub async fn reset_password(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ResetPasswordRequest>,
) -> Result<Response, ApiError> {
    validation::validate_reset_password(&body).map_err(ApiError::Validation)?;

    match services.identity.generate_password_reset_link(&body.email).await {
        Ok(link) => {
            // TODO: hand the link to the notification service once email
            // delivery lands; until then it is only logged.
            tracing::info!(email = %body.email, link = %link, "password reset link generated");
        }
        Err(ProviderError::NotFound) => {
            tracing::debug!(email = %body.email, "password reset requested for unknown email");
        }
        Err(e) => return Err(ApiError::Provider(e)),
    }

    Ok(errors::ok(
        StatusCode::OK,
        "If an account exists for this email, a password reset link has been sent",
    ))
}

/// GET /auth/verify-token
pub async fn verify_token(Extension(user): Extension<AuthUser>) -> Result<Response, ApiError> {
    Ok(errors::ok_data(
        StatusCode::OK,
        dto::VerifyTokenResponse { valid: true, user },
        "Token is valid",
    ))
}

/// GET /auth/session
///
/// Optional-auth probe: reports whether the caller presented a usable
/// identity, without ever rejecting.
pub async fn session(user: Option<Extension<AuthUser>>) -> Result<Response, ApiError> {
    let user = user.map(|Extension(user)| user);
    Ok(errors::ok_data(
        StatusCode::OK,
        dto::SessionResponse {
            authenticated: user.is_some(),
            user,
        },
        "Session state",
    ))
}

fn role_for_user_type(user_type: &str) -> Role {
    match user_type {
        "BUSINESS_USER" => Role::BusinessUser,
        _ => Role::ClientUser,
    }
}
