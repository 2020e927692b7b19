use crate::auth::helpers::{extract_cookie, has_cookie_with_prefix, SESSION_COOKIE, SESSION_ID_COOKIE};
use crate::auth::jwt::{Claims, JwtValidator};
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;

/// Custom authentication error type
#[derive(Debug)]
pub enum AuthError {
    Unauthenticated(String),
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Unauthenticated(msg) => (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "Not authenticated. Please sign in.",
                    "details": msg,
                    "code": "UNAUTHENTICATED"
                })),
            )
                .into_response(),

            AuthError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error",
                    "details": msg
                })),
            )
                .into_response(),
        }
    }
}

/// Signed-in user, validated from the Frontegg access token cookie
///
/// Usage:
/// ```rust,ignore
/// async fn handler(SessionUser { claims, session_id }: SessionUser) {
///     println!("User: {}, tenant: {:?}", claims.sub, claims.tenant_id);
/// }
/// ```
pub struct SessionUser {
    pub claims: Claims,
    /// Launcher session id, absent for sessions created elsewhere
    pub session_id: Option<String>,
}

impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_cookie(&parts.headers, SESSION_COOKIE)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::Unauthenticated("Missing session cookie".to_string()))?;

        let validator = parts
            .extensions
            .get::<Arc<JwtValidator>>()
            .ok_or_else(|| AuthError::Internal("Missing JwtValidator extension".to_string()))?;

        let claims = validator
            .validate_async(&token)
            .await
            .map_err(|e| AuthError::Unauthenticated(format!("Invalid token: {}", e)))?;

        if claims.tenant_id.is_none() {
            tracing::warn!(
                user = %claims.sub,
                "Access token has no tenantId claim - entitlements cannot be resolved"
            );
        }

        let session_id = extract_cookie(&parts.headers, SESSION_ID_COOKIE).filter(|s| !s.is_empty());

        Ok(SessionUser { claims, session_id })
    }
}

/// Optional variant of [`SessionUser`] for pages that also serve visitors
pub struct MaybeSessionUser(pub Option<SessionUser>);

impl<S> FromRequestParts<S> for MaybeSessionUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match SessionUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(MaybeSessionUser(Some(user))),
            Err(AuthError::Unauthenticated(reason)) => {
                tracing::debug!(reason = %reason, "Serving launcher to anonymous visitor");
                Ok(MaybeSessionUser(None))
            }
            Err(AuthError::Internal(reason)) => {
                tracing::error!(reason = %reason, "Session extraction failed");
                Ok(MaybeSessionUser(None))
            }
        }
    }
}

/// Proof that the request carries a Frontegg session cookie
///
/// Only checks presence; the API handlers behind it take the tenant from the
/// query string.
pub struct SessionCookie;

impl<S> FromRequestParts<S> for SessionCookie
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if has_cookie_with_prefix(&parts.headers, SESSION_COOKIE) {
            Ok(SessionCookie)
        } else {
            Err(AuthError::Unauthenticated(
                "No session cookie found".to_string(),
            ))
        }
    }
}
