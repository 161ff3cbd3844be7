//! HTTP application wiring (Axum router + service wiring).
//!
//! Folder map:
//! - `services.rs`: explicit service construction (token service, stores)
//! - `routes/`: HTTP handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `validation.rs`: request validation with field-level errors
//! - `errors.rs`: error taxonomy + response envelope
//! - `rate_limit.rs`: injected best-effort throttling

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::{Extension, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod rate_limit;
pub mod routes;
pub mod services;
pub mod validation;

use rate_limit::{RateLimiter, rate_limit};
use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(services: Arc<AppServices>, cors_origin: Option<HeaderValue>) -> Router {
    // Per-route-group limiters, stricter where credentials are involved.
    let register_limit = Arc::new(RateLimiter::new(3, Duration::from_secs(3600)));
    let login_limit = Arc::new(RateLimiter::new(5, Duration::from_secs(900)));
    let refresh_limit = Arc::new(RateLimiter::new(10, Duration::from_secs(900)));
    let password_limit = Arc::new(RateLimiter::new(3, Duration::from_secs(3600)));

    let public = Router::new()
        .route(
            "/auth/register",
            post(routes::auth::register)
                .layer(axum::middleware::from_fn_with_state(register_limit, rate_limit)),
        )
        .route(
            "/auth/login",
            post(routes::auth::login)
                .layer(axum::middleware::from_fn_with_state(login_limit, rate_limit)),
        )
        .route(
            "/auth/refresh",
            post(routes::auth::refresh)
                .layer(axum::middleware::from_fn_with_state(refresh_limit, rate_limit)),
        )
        .route(
            "/auth/reset-password",
            post(routes::auth::reset_password)
                .layer(axum::middleware::from_fn_with_state(password_limit.clone(), rate_limit)),
        );

    // Portal-issued access tokens (stateless verification).
    let service_protected = Router::new()
        .route("/auth/logout", post(routes::auth::logout))
        .route(
            "/auth/profile",
            get(routes::auth::get_profile).put(routes::auth::update_profile),
        )
        .route(
            "/auth/change-password",
            post(routes::auth::change_password)
                .layer(axum::middleware::from_fn_with_state(password_limit, rate_limit)),
        )
        .route("/auth/verify-token", get(routes::auth::verify_token))
        .layer(axum::middleware::from_fn_with_state(
            services.clone(),
            middleware::service_auth,
        ));

    // Provider-issued bearer tokens (clients on the provider SDK).
    let provider_protected = Router::new()
        .route("/users", get(routes::users::list_users))
        .route("/users/:user_id", get(routes::users::get_user))
        .route("/companies/:company_id", get(routes::companies::get_company))
        .layer(axum::middleware::from_fn_with_state(
            services.clone(),
            middleware::provider_auth,
        ));

    let session = Router::new()
        .route("/auth/session", get(routes::auth::session))
        .layer(axum::middleware::from_fn_with_state(
            services.clone(),
            middleware::optional_auth,
        ));

    let mut app = Router::new()
        .route("/health", get(routes::system::health))
        .merge(public)
        .merge(service_protected)
        .merge(provider_protected)
        .merge(session)
        .layer(Extension(services))
        .layer(TraceLayer::new_for_http());

    if let Some(origin) = cors_origin {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    app
}
