//! Authentication middlewares.
//!
//! Three interchangeable strategies, selected per route group:
//!
//! - [`provider_auth`] verifies the bearer token against the external
//!   identity provider (for clients that authenticate with the provider's
//!   SDK directly);
//! - [`service_auth`] verifies the portal's own access tokens (stateless,
//!   no provider round trip);
//! - [`optional_auth`] behaves like `provider_auth` but never rejects.
//!
//! All of them attach an [`AuthUser`] to the request extensions; guards
//! and handlers downstream only ever see that projection.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use portal_auth::{AuthUser, token};
use portal_core::User;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub async fn provider_auth(
    State(services): State<Arc<AppServices>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = authenticate_provider(&services, req.headers()).await?;
    req.extensions_mut().insert(auth_user);
    Ok(next.run(req).await)
}

pub async fn service_auth(
    State(services): State<Arc<AppServices>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer(req.headers())?;
    let claims = services.tokens.verify_access_token(token)?;
    let user = services
        .directory
        .get_by_id(&claims.sub)
        .await?
        .ok_or(ApiError::NotFound("User profile not found"))?;

    let auth_user = attach(&services, user).await?;
    req.extensions_mut().insert(auth_user);
    Ok(next.run(req).await)
}

/// Attach an identity when a valid token is presented; proceed anonymously
/// otherwise. Never rejects.
pub async fn optional_auth(
    State(services): State<Arc<AppServices>>,
    mut req: Request,
    next: Next,
) -> Response {
    match authenticate_provider(&services, req.headers()).await {
        Ok(auth_user) => {
            req.extensions_mut().insert(auth_user);
        }
        Err(e) => {
            tracing::debug!(error = %e, "optional auth: proceeding unauthenticated");
        }
    }
    next.run(req).await
}

async fn authenticate_provider(
    services: &Arc<AppServices>,
    headers: &HeaderMap,
) -> Result<AuthUser, ApiError> {
    let token = bearer(headers)?;
    let identity = services
        .identity
        .verify_bearer_token(token)
        .await
        .map_err(ApiError::Provider)?;

    let user = services
        .directory
        .get_by_id(&identity.id)
        .await?
        .ok_or(ApiError::NotFound("User profile not found"))?;

    attach(services, user).await
}

/// Shared tail of both strict strategies: enforce ACTIVE status, build the
/// projection, and fire the last-login stamp without blocking.
async fn attach(services: &Arc<AppServices>, user: User) -> Result<AuthUser, ApiError> {
    if !user.status.is_active() {
        return Err(ApiError::AccountInactive(user.status));
    }

    let auth_user = services.build_auth_user(&user).await;
    services.touch_last_login(&auth_user);
    Ok(auth_user)
}

fn bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    token::parse_authorization_header(header).ok_or(ApiError::MissingToken)
}
