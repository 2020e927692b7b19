use super::launcher::{resolve_assignments, AssignmentState};
use super::templates::{LauncherTemplate, Workspace};
use crate::{auth::MaybeSessionUser, catalog::partition_catalog, AppState};
use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use std::sync::Arc;

/// Liveness probe - always returns OK if the process is running
pub async fn healthz_handler() -> impl IntoResponse {
    StatusCode::OK
}

/// Readiness probe
///
/// Returns 200 once the JWKS has been cached (Frontegg reachable), 503 before.
/// The vendor token is fetched lazily, so its state is only reported.
pub async fn readyz_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.jwt_validator.is_jwks_cached().await {
        let vendor_token_cached = state.entitlements.has_vendor_token().await;
        let active_sessions = state.session_storage.session_count().await;
        tracing::debug!(
            vendor_token_cached = vendor_token_cached,
            active_sessions = active_sessions,
            "Readiness check passed"
        );
        (StatusCode::OK, "ready")
    } else {
        tracing::warn!("Readiness check failed: JWKS not cached");
        (StatusCode::SERVICE_UNAVAILABLE, "not ready: JWKS not cached")
    }
}

/// Launcher page for visitors and signed-in users
pub async fn launcher_handler(
    State(state): State<Arc<AppState>>,
    MaybeSessionUser(user): MaybeSessionUser,
) -> Response {
    let template = match user {
        None => LauncherTemplate {
            greeting: "Welcome to App Launcher".to_string(),
            subtitle: "Sign in to access your apps and launch them from one convenient place"
                .to_string(),
            available: state.catalog.clone(),
            workspace: None,
        },
        Some(user) => {
            let assignment = resolve_assignments(
                &state,
                user.session_id.as_deref(),
                user.claims.tenant_id.as_deref(),
            )
            .await;

            let greeting = match user.claims.greeting_name() {
                Some(name) => format!("Welcome back, {}!", name),
                None => "Welcome back!".to_string(),
            };

            LauncherTemplate {
                greeting,
                subtitle: "Launch your apps from one place".to_string(),
                available: Vec::new(),
                workspace: Some(build_workspace(
                    &state,
                    user.claims.display_name(),
                    assignment,
                )),
            }
        }
    };

    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render launcher template");
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

fn build_workspace(state: &AppState, display_name: String, assignment: AssignmentState) -> Workspace {
    let (loading, error, assigned_ids) = match assignment {
        AssignmentState::Loading => (true, None, Vec::new()),
        AssignmentState::Failed(message) => (false, Some(message), Vec::new()),
        AssignmentState::Loaded(ids) => (false, None, ids),
    };

    let (assigned, unassigned) = partition_catalog(&state.catalog, &assigned_ids);

    tracing::debug!(
        total_apps = state.catalog.len(),
        assigned_apps = assigned.len(),
        loading = loading,
        failed = error.is_some(),
        "Built launcher workspace"
    );

    Workspace {
        display_name,
        loading,
        error,
        assigned,
        unassigned,
    }
}
