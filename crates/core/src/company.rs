use serde::{Deserialize, Serialize};

use crate::CompanyId;

/// Kind of company a user can be associated with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompanyType {
    Business,
    Client,
    Partner,
}

/// Company record, read-only from the auth layer's perspective.
///
/// Only used to enrich the authenticated-user projection with display
/// fields; company lifecycle management lives elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    #[serde(rename = "type")]
    pub company_type: CompanyType,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_company_id: Option<CompanyId>,
}
