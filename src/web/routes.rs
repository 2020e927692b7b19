use super::handlers::{healthz_handler, launcher_handler, readyz_handler};
use crate::{
    api::{apps_config_handler, user_apps_handler, vendor_token_handler},
    auth::{callback_handler, login_handler, logout_handler},
    AppState,
};
use axum::{routing::get, Extension, Router};
use std::sync::Arc;
use tower_http::services::ServeDir;

pub fn create_router(state: Arc<AppState>) -> Router {
    let jwt_validator = state.jwt_validator.clone();

    Router::new()
        .route("/", get(launcher_handler))
        .route("/healthz", get(healthz_handler))
        .route("/readyz", get(readyz_handler))
        .route("/api/apps/config", get(apps_config_handler))
        .route("/api/frontegg/vendor-token", get(vendor_token_handler))
        .route("/api/frontegg/user-apps", get(user_apps_handler))
        .route("/account/login", get(login_handler))
        .route("/oauth/callback", get(callback_handler))
        .route("/account/logout", get(logout_handler))
        .nest_service("/static", ServeDir::new("static"))
        .layer(Extension(jwt_validator))
        .with_state(state)
}
