//! Assignment state of the launcher page
//!
//! Resolves which catalog apps the signed-in tenant may open. Results are kept
//! in session storage under `assignedApps_{tenantId}` and reused verbatim until
//! sign-out.

use crate::api::ApiError;
use crate::catalog::map_to_catalog_ids;
use crate::web::session_storage::assigned_apps_key;
use crate::AppState;

/// Message shown when the access token carries no tenant
pub const MISSING_TENANT_MESSAGE: &str = "Tenant ID not available. Please sign in again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentState {
    /// Waiting for the catalog; nothing to match entitlements against yet
    Loading,
    /// Resolution failed; the message is shown in an error banner
    Failed(String),
    /// Catalog ids the tenant is entitled to
    Loaded(Vec<String>),
}

/// Resolve the catalog ids assigned to `tenant_id`
///
/// Reads session storage first; on a miss asks the entitlement resolver,
/// maps provider ids onto the catalog and stores the result.
pub async fn resolve_assignments(
    state: &AppState,
    session_id: Option<&str>,
    tenant_id: Option<&str>,
) -> AssignmentState {
    if state.catalog.is_empty() {
        return AssignmentState::Loading;
    }

    let Some(tenant_id) = tenant_id.filter(|t| !t.is_empty()) else {
        return AssignmentState::Failed(MISSING_TENANT_MESSAGE.to_string());
    };

    let cache_key = assigned_apps_key(tenant_id);

    if let Some(session_id) = session_id {
        if let Some(cached) = state.session_storage.get_item(session_id, &cache_key).await {
            match serde_json::from_str::<Vec<String>>(&cached) {
                Ok(app_ids) => {
                    tracing::debug!(tenant_id = %tenant_id, "Using cached assigned apps");
                    return AssignmentState::Loaded(app_ids);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding invalid assigned apps cache entry");
                    state.session_storage.remove_item(session_id, &cache_key).await;
                }
            }
        }
    }

    let provider_ids = match state.entitlements.tenant_app_ids(tenant_id).await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::error!(tenant_id = %tenant_id, error = %e, "Error fetching user apps");
            return AssignmentState::Failed(ApiError::from_entitlement_error(e).error);
        }
    };

    let app_ids = map_to_catalog_ids(&provider_ids, &state.catalog);

    if let Some(session_id) = session_id {
        match serde_json::to_string(&app_ids) {
            Ok(json) => {
                state
                    .session_storage
                    .set_item(session_id, &cache_key, &json)
                    .await
            }
            Err(e) => tracing::warn!(error = %e, "Failed to cache assigned apps"),
        }
    }

    AssignmentState::Loaded(app_ids)
}
