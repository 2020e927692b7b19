//! Authentication handlers for the Frontegg hosted-login flow
//!
//! - `login_handler`: starts the authorization code flow (with PKCE)
//! - `callback_handler`: validates state, exchanges the code, opens a session
//! - `logout_handler`: clears the session and signs out of Frontegg

use axum::{
    extract::{Query, State},
    http::{header::InvalidHeaderValue, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, CsrfToken, EndpointNotSet,
    EndpointSet, PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use serde::Deserialize;
use std::sync::Arc;

use super::helpers::{
    build_cookie, build_frontegg_logout_url, clear_cookie, create_http_client, extract_cookie,
    generate_session_id, OAUTH_STATE_COOKIE, PKCE_VERIFIER_COOKIE, SESSION_COOKIE,
    SESSION_ID_COOKIE,
};
use crate::config::Config;
use crate::AppState;

// =============================================================================
// Types
// =============================================================================

type ConfiguredOAuthClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Lifetime of the CSRF state and PKCE verifier cookies (10 minutes)
const LOGIN_COOKIE_MAX_AGE: u64 = 600;

/// Path scoping the login round-trip cookies to the callback
const LOGIN_COOKIE_PATH: &str = "/oauth";

#[derive(Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

// =============================================================================
// Internal Helpers
// =============================================================================

/// Create a HeaderValue from a string, returning an error response if invalid.
fn header_value(s: &str) -> Result<HeaderValue, Box<Response>> {
    HeaderValue::from_str(s).map_err(|e: InvalidHeaderValue| {
        tracing::error!(
            error = %e,
            value_len = s.len(),
            "Failed to create header value - possible malformed token"
        );
        Box::new(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Internal error setting response headers"})),
            )
                .into_response(),
        )
    })
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Initialize the OAuth2 client for the Frontegg hosted login
fn create_oauth_client(config: &Config) -> Result<ConfiguredOAuthClient, String> {
    let auth_url = AuthUrl::new(format!("{}/oauth/authorize", config.frontegg_base_url))
        .map_err(|e| format!("Invalid auth URL: {}", e))?;

    let token_url = TokenUrl::new(format!("{}/oauth/token", config.frontegg_base_url))
        .map_err(|e| format!("Invalid token URL: {}", e))?;

    let redirect_url = RedirectUrl::new(config.redirect_uri.clone())
        .map_err(|e| format!("Invalid redirect URL: {}", e))?;

    Ok(
        BasicClient::new(ClientId::new(config.frontegg_app_client_id.clone()))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url)
            .set_redirect_uri(redirect_url),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Login handler - redirects to the Frontegg hosted login
pub async fn login_handler(State(state): State<Arc<AppState>>) -> Response {
    tracing::info!("Login requested");

    let oauth_client = match create_oauth_client(&state.config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create OAuth client");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "OAuth configuration error");
        }
    };

    let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

    let (auth_url, csrf_token) = oauth_client
        .authorize_url(CsrfToken::new_random)
        .add_scope(Scope::new("openid".to_string()))
        .add_scope(Scope::new("profile".to_string()))
        .add_scope(Scope::new("email".to_string()))
        .set_pkce_challenge(pkce_challenge)
        .url();

    tracing::info!(
        frontegg_base_url = %state.config.frontegg_base_url,
        "Redirecting to Frontegg hosted login"
    );

    let state_cookie = build_cookie(
        &state.config,
        OAUTH_STATE_COOKIE,
        csrf_token.secret(),
        LOGIN_COOKIE_PATH,
        LOGIN_COOKIE_MAX_AGE,
    );
    let verifier_cookie = build_cookie(
        &state.config,
        PKCE_VERIFIER_COOKIE,
        pkce_verifier.secret(),
        LOGIN_COOKIE_PATH,
        LOGIN_COOKIE_MAX_AGE,
    );

    let mut response = Redirect::to(auth_url.as_str()).into_response();
    for cookie in [state_cookie, verifier_cookie] {
        match header_value(&cookie) {
            Ok(h) => {
                response
                    .headers_mut()
                    .append(axum::http::header::SET_COOKIE, h);
            }
            Err(e) => return *e,
        }
    }

    response
}

/// Callback handler - validates state, exchanges the code and opens a session
pub async fn callback_handler(
    Query(params): Query<CallbackParams>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    tracing::info!("OAuth callback received");

    if let Some(error) = params.error {
        tracing::warn!(
            error = %error,
            description = ?params.error_description,
            "OAuth authorization failed"
        );
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": error,
                "details": params.error_description
            })),
        )
            .into_response();
    }

    let Some(state_from_callback) = params.state else {
        tracing::warn!("CSRF validation failed: No state parameter in callback");
        return json_error(StatusCode::BAD_REQUEST, "Missing state parameter");
    };

    let Some(stored_state) = extract_cookie(&headers, OAUTH_STATE_COOKIE) else {
        tracing::warn!("CSRF validation failed: No oauth_state cookie found");
        return json_error(
            StatusCode::UNAUTHORIZED,
            "CSRF validation failed: missing state cookie",
        );
    };

    if state_from_callback != stored_state {
        tracing::warn!("CSRF validation failed: State mismatch (callback vs cookie)");
        return json_error(StatusCode::UNAUTHORIZED, "CSRF validation failed: state mismatch");
    }

    let Some(pkce_verifier) = extract_cookie(&headers, PKCE_VERIFIER_COOKIE) else {
        tracing::warn!("No PKCE verifier cookie found");
        return json_error(StatusCode::UNAUTHORIZED, "Missing PKCE verifier");
    };

    let Some(code) = params.code else {
        tracing::warn!("No authorization code received");
        return json_error(StatusCode::BAD_REQUEST, "Missing authorization code");
    };

    let oauth_client = match create_oauth_client(&state.config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create OAuth client");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "OAuth configuration error");
        }
    };

    let http_client = match create_http_client(
        state.config.http_connect_timeout_secs,
        state.config.http_request_timeout_secs,
    ) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP client for token exchange");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };

    tracing::info!("Exchanging authorization code for tokens");

    let token_response = match oauth_client
        .exchange_code(AuthorizationCode::new(code))
        .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier))
        .request_async(&http_client)
        .await
    {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "Failed to exchange code for tokens");
            return json_error(StatusCode::UNAUTHORIZED, "Token exchange failed");
        }
    };

    let expires_in = token_response
        .expires_in()
        .map(|d| d.as_secs())
        .unwrap_or(state.config.session_max_age_secs);

    let session_id = generate_session_id();

    let cookies = [
        build_cookie(
            &state.config,
            SESSION_COOKIE,
            token_response.access_token().secret(),
            "/",
            expires_in,
        ),
        build_cookie(
            &state.config,
            SESSION_ID_COOKIE,
            &session_id,
            "/",
            state.config.session_max_age_secs,
        ),
        clear_cookie(&state.config, OAUTH_STATE_COOKIE, LOGIN_COOKIE_PATH),
        clear_cookie(&state.config, PKCE_VERIFIER_COOKIE, LOGIN_COOKIE_PATH),
    ];

    let mut response = Redirect::to("/").into_response();
    for cookie in cookies {
        match header_value(&cookie) {
            Ok(h) => {
                response
                    .headers_mut()
                    .append(axum::http::header::SET_COOKIE, h);
            }
            Err(e) => return *e,
        }
    }

    tracing::info!(expires_in_secs = expires_in, "Authentication successful, session opened");
    response
}

/// Logout handler - drops cached entitlements and signs out of Frontegg
pub async fn logout_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(session_id) = extract_cookie(&headers, SESSION_ID_COOKIE).filter(|s| !s.is_empty())
    {
        state.session_storage.clear_session(&session_id).await;
        tracing::info!(event = "session_storage_cleared", "Cleared cached entitlements");
    }

    let logout_url =
        build_frontegg_logout_url(&state.config.frontegg_base_url, &state.config.portal_public_url);

    let mut response = Redirect::to(&logout_url).into_response();

    // Clearing cookies is best-effort; never block the logout redirect
    for cookie in [
        clear_cookie(&state.config, SESSION_COOKIE, "/"),
        clear_cookie(&state.config, SESSION_ID_COOKIE, "/"),
    ] {
        if let Ok(h) = header_value(&cookie) {
            response
                .headers_mut()
                .append(axum::http::header::SET_COOKIE, h);
        }
    }

    tracing::info!(event = "logout_redirect", "Redirecting to Frontegg logout");
    response
}
