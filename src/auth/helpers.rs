//! Pure helper functions for authentication
//!
//! URL building, cookie handling, HTTP client construction and session id
//! generation. Nothing here performs network I/O.

use axum::http::HeaderMap;
use std::time::Duration;

use crate::config::Config;

/// Cookie holding the Frontegg access token
pub const SESSION_COOKIE: &str = "fe_session";

/// Cookie holding the opaque id of the launcher's server-side session storage
pub const SESSION_ID_COOKIE: &str = "launcher_sid";

/// CSRF state cookie for the hosted-login round trip
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

/// PKCE verifier cookie for the hosted-login round trip
pub const PKCE_VERIFIER_COOKIE: &str = "oauth_pkce";

/// Random bytes in a generated session id
const SESSION_ID_BYTES: u32 = 32;

// =============================================================================
// HTTP Client Builders
// =============================================================================

/// Create a reqwest client for OAuth2 HTTP requests using config timeouts
pub fn create_http_client(
    connect_timeout_secs: u64,
    request_timeout_secs: u64,
) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none()) // Security: prevent SSRF
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .timeout(Duration::from_secs(request_timeout_secs))
        .build()
}

// =============================================================================
// URL Builders
// =============================================================================

/// Build the Frontegg hosted logout URL returning to the launcher
pub fn build_frontegg_logout_url(frontegg_base_url: &str, portal_public_url: &str) -> String {
    let post_logout_redirect = format!("{}/", portal_public_url.trim_end_matches('/'));
    format!(
        "{}/oauth/logout?post_logout_redirect_uri={}",
        frontegg_base_url.trim_end_matches('/'),
        urlencoding::encode(&post_logout_redirect)
    )
}

// =============================================================================
// Cookies
// =============================================================================

/// Extract a cookie value from headers
///
/// Handles multiple Cookie headers (some proxies fold/duplicate headers).
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);

    for header_value in headers.get_all("cookie") {
        if let Ok(cookie_str) = header_value.to_str() {
            if let Some(value) = cookie_str
                .split(';')
                .map(|c| c.trim())
                .find(|c| c.starts_with(&prefix))
                .and_then(|c| c.strip_prefix(&prefix))
            {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Check whether any cookie name starts with `prefix`
///
/// Frontegg session cookies may carry a suffix (`fe_session-<suffix>`).
pub fn has_cookie_with_prefix(headers: &HeaderMap, prefix: &str) -> bool {
    headers
        .get_all("cookie")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookie_str| cookie_str.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .any(|(name, value)| name.starts_with(prefix) && !value.is_empty())
}

/// Build a `Set-Cookie` value with the launcher's standard attributes
pub fn build_cookie(config: &Config, name: &str, value: &str, path: &str, max_age: u64) -> String {
    format!(
        "{}={}; HttpOnly; Path={}; Max-Age={}; SameSite=Lax{}{}",
        name,
        value,
        path,
        max_age,
        config.cookie_domain_attr(),
        config.cookie_secure_flag()
    )
}

/// Build a `Set-Cookie` value that removes the cookie
pub fn clear_cookie(config: &Config, name: &str, path: &str) -> String {
    build_cookie(config, name, "", path, 0)
}

// =============================================================================
// Session ids
// =============================================================================

/// Generate an opaque session id for the launcher's session storage
///
/// Drawn from the OS CSPRNG and base64url encoded.
pub fn generate_session_id() -> String {
    oauth2::CsrfToken::new_random_len(SESSION_ID_BYTES)
        .secret()
        .to_string()
}

// =============================================================================
// Tests
// =============================================================================
