//! User lookups, guarded by role/permission and self-scope checks.

use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::response::Response;

use portal_auth::{AuthUser, authorize, permissions};
use portal_core::{Role, UserId};

use crate::app::errors::{self, ApiError};
use crate::app::services::AppServices;

/// GET /users
///
/// Admin-only listing. Non-system admins see only their own company's
/// users; an admin with no company association sees nothing.
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, ApiError> {
    authorize::require_role(
        &user,
        &[
            Role::SystemAdmin,
            Role::BusinessAdmin,
            Role::ClientAdmin,
            Role::PartnerAdmin,
        ],
    )?;
    authorize::require_permission(&user, &permissions::USERS_READ)?;

    let users = match (user.role, &user.company_id) {
        (Role::SystemAdmin, _) => services.directory.list(None).await?,
        (_, Some(company_id)) => services.directory.list(Some(company_id)).await?,
        (_, None) => Vec::new(),
    };

    Ok(errors::ok_data(StatusCode::OK, users, "Users retrieved successfully"))
}

/// GET /users/:user_id
pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
    let target = UserId::new(user_id);
    authorize::require_self_access(&user, &target)?;

    let record = services
        .directory
        .get_by_id(&target)
        .await?
        .ok_or(ApiError::NotFound("User profile not found"))?;

    Ok(errors::ok_data(StatusCode::OK, record, "User retrieved successfully"))
}
