//! Company lookups, guarded by the company-scope check.

use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::response::Response;

use portal_auth::{AuthUser, authorize};
use portal_core::CompanyId;

use crate::app::errors::{self, ApiError};
use crate::app::services::AppServices;

/// GET /companies/:company_id
pub async fn get_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthUser>,
    Path(company_id): Path<String>,
) -> Result<Response, ApiError> {
    let target = CompanyId::new(company_id);
    authorize::require_company_access(&user, &target)?;

    let company = services
        .companies
        .get(&target)
        .await?
        .ok_or(ApiError::NotFound("Company not found"))?;

    Ok(errors::ok_data(StatusCode::OK, company, "Company retrieved successfully"))
}
