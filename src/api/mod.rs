//! JSON API consumed by the launcher page and external tooling
//!
//! - `GET /api/apps/config`: the application catalog
//! - `GET /api/frontegg/vendor-token`: the cached vendor token
//! - `GET /api/frontegg/user-apps?tenantId=`: a tenant's assigned app ids

pub mod error;

pub use error::ApiError;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{auth::SessionCookie, catalog::AppDescriptor, AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct AppsConfigResponse {
    pub apps: Vec<AppDescriptor>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VendorTokenResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct UserAppsQuery {
    #[serde(rename = "tenantId")]
    pub tenant_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAppsResponse {
    pub app_ids: Vec<String>,
}

pub async fn apps_config_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AppsConfigResponse>, ApiError> {
    if state.catalog.is_empty() {
        tracing::error!("App config requested but no application is configured");
        return Err(ApiError::no_apps_configured());
    }

    Ok(Json(AppsConfigResponse {
        apps: state.catalog.clone(),
    }))
}

pub async fn vendor_token_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<VendorTokenResponse>, ApiError> {
    let token = state
        .entitlements
        .vendor_token()
        .await
        .map_err(ApiError::from_vendor_token_error)?;

    Ok(Json(VendorTokenResponse { token }))
}

pub async fn user_apps_handler(
    State(state): State<Arc<AppState>>,
    _session: SessionCookie,
    Query(query): Query<UserAppsQuery>,
) -> Result<Json<UserAppsResponse>, ApiError> {
    let tenant_id = query
        .tenant_id
        .filter(|t| !t.is_empty())
        .ok_or_else(ApiError::missing_tenant)?;

    let app_ids = state
        .entitlements
        .tenant_app_ids(&tenant_id)
        .await
        .map_err(|e| {
            tracing::error!(tenant_id = %tenant_id, error = %e, "Failed to get user apps");
            ApiError::from_entitlement_error(e)
        })?;

    Ok(Json(UserAppsResponse { app_ids }))
}
