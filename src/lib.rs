//! App launcher service library
//!
//! Lists the applications a tenant is entitled to, as reported by Frontegg,
//! and upsells the rest of the configured catalog.

#![deny(dead_code)]

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod frontegg;
pub mod web;

use auth::jwt::JwtValidator;
use catalog::AppDescriptor;
use config::Config;
use frontegg::EntitlementResolver;
use std::sync::Arc;
use web::SessionStorage;

pub struct AppState {
    /// Application catalog, fixed at startup
    pub catalog: Vec<AppDescriptor>,
    pub config: Arc<Config>,
    pub jwt_validator: Arc<JwtValidator>,
    pub entitlements: Arc<EntitlementResolver>,
    /// Per-session cache of resolved entitlements
    pub session_storage: Arc<SessionStorage>,
}
