use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use super::{IdentityProvider, IssuedToken, ProviderError};
use crate::auth::helpers::create_http_client;
use crate::config::VendorCredentials;

/// Path of the tenant-assignment endpoint, relative to the API URL
const TENANT_ASSIGNMENTS_PATH: &str =
    "/applications/resources/applications/tenant-assignments/v1";

/// Frontegg vendor API client
pub struct FronteggClient {
    api_url: String,
    client: reqwest::Client,
}

impl FronteggClient {
    /// Create a client for `api_url` (e.g. https://api.frontegg.com)
    pub fn new(
        api_url: &str,
        connect_timeout_secs: u64,
        request_timeout_secs: u64,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            client: create_http_client(connect_timeout_secs, request_timeout_secs)?,
        })
    }
}

#[async_trait]
impl IdentityProvider for FronteggClient {
    async fn issue_vendor_token(
        &self,
        credentials: &VendorCredentials,
    ) -> Result<IssuedToken, ProviderError> {
        let url = format!("{}/auth/vendor/", self.api_url);
        tracing::info!(url = %url, "Requesting vendor token");

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "clientId": credentials.client_id,
                "secret": credentials.secret,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                body = %body,
                "Failed to get vendor token"
            );
            return Err(ProviderError::VendorTokenRejected {
                status: status.as_u16(),
                body,
            });
        }

        let data: Value = response.json().await?;
        parse_vendor_token(&data)
    }

    async fn tenant_assignments(
        &self,
        vendor_token: &str,
        tenant_id: &str,
    ) -> Result<Value, ProviderError> {
        let url = format!("{}{}", self.api_url, TENANT_ASSIGNMENTS_PATH);
        tracing::debug!(url = %url, tenant_id = %tenant_id, "Fetching tenant assignments");

        let response = self
            .client
            .get(&url)
            .bearer_auth(vendor_token)
            .header("frontegg-tenant-id", tenant_id)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = status.as_u16(),
                tenant_id = %tenant_id,
                body = %body,
                "Failed to get tenant assignments"
            );
            return Err(ProviderError::AssignmentsRejected {
                status: status.as_u16(),
                details: error_details(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, "Tenant assignment response is not valid JSON");
            ProviderError::InvalidJson
        })
    }
}

/// Read the token and its lifetime from a vendor-auth response
///
/// The token is the first non-empty of `token` and `accessToken`;
/// `expiresIn` is in seconds and only honoured when numeric.
pub fn parse_vendor_token(data: &Value) -> Result<IssuedToken, ProviderError> {
    let token = ["token", "accessToken"]
        .iter()
        .find_map(|key| {
            data.get(*key)
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
        })
        .ok_or(ProviderError::MissingToken)?;

    // Lifetimes too large for a Duration saturate; the cache caps them
    let expires_in = data
        .get("expiresIn")
        .and_then(Value::as_f64)
        .filter(|secs| secs.is_finite() && *secs > 0.0)
        .map(|secs| Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX));

    Ok(IssuedToken {
        token: token.to_string(),
        expires_in,
    })
}

/// Human-readable details from an upstream error body
///
/// Prefers the JSON `message`, then `error`, then the raw text.
pub fn error_details(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            ["message", "error"]
                .iter()
                .find_map(|key| json.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};

    #[test]
    fn test_parse_vendor_token_prefers_token() {
        let issued =
            parse_vendor_token(&json!({ "token": "a", "accessToken": "b", "expiresIn": 120 }))
                .unwrap();
        assert_eq!(issued.token, "a");
        assert_eq!(issued.expires_in, Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_parse_vendor_token_falls_back_to_access_token() {
        let issued = parse_vendor_token(&json!({ "accessToken": "b" })).unwrap();
        assert_eq!(issued.token, "b");
        assert_eq!(issued.expires_in, None);
    }

    #[test]
    fn test_parse_vendor_token_ignores_non_numeric_expiry() {
        let issued = parse_vendor_token(&json!({ "token": "a", "expiresIn": "3600" })).unwrap();
        assert_eq!(issued.expires_in, None);
    }

    #[test]
    fn test_parse_vendor_token_missing() {
        assert!(matches!(
            parse_vendor_token(&json!({ "expiresIn": 10 })),
            Err(ProviderError::MissingToken)
        ));
        assert!(matches!(
            parse_vendor_token(&json!({ "token": "" })),
            Err(ProviderError::MissingToken)
        ));
    }

    #[test]
    fn test_parse_vendor_token_skips_empty_token() {
        let issued = parse_vendor_token(&json!({ "token": "", "accessToken": "b" })).unwrap();
        assert_eq!(issued.token, "b");
    }

    #[test]
    fn test_parse_vendor_token_saturates_huge_expiry() {
        let issued = parse_vendor_token(&json!({ "token": "a", "expiresIn": 1e30 })).unwrap();
        assert_eq!(issued.expires_in, Some(Duration::MAX));

        let issued = parse_vendor_token(&json!({ "token": "a", "expiresIn": 1e19 })).unwrap();
        assert_eq!(issued.expires_in, Some(Duration::from_secs_f64(1e19)));
    }

    #[test]
    fn test_error_details_from_json_message() {
        assert_eq!(
            error_details(r#"{"message":"Tenant not found","error":"x"}"#),
            "Tenant not found"
        );
        assert_eq!(error_details(r#"{"error":"Forbidden"}"#), "Forbidden");
    }

    #[test]
    fn test_error_details_raw_text() {
        assert_eq!(error_details("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_details(r#"{"status":500}"#), r#"{"status":500}"#);
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = FronteggClient::new("https://api.frontegg.com/", 1, 1).unwrap();
        assert_eq!(client.api_url, "https://api.frontegg.com");
    }

    async fn serve_upstream(router: Router) -> FronteggClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        FronteggClient::new(&format!("http://{}/", addr), 1, 5).unwrap()
    }

    fn credentials() -> VendorCredentials {
        VendorCredentials {
            client_id: "vendor-client".to_string(),
            secret: "vendor-secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_vendor_token_request_posts_credentials() {
        let router = Router::new().route(
            "/auth/vendor/",
            post(|Json(body): Json<Value>| async move {
                let field = |key: &str| body[key].as_str().unwrap_or_default().to_string();
                Json(json!({
                    "token": format!("{}:{}", field("clientId"), field("secret")),
                    "expiresIn": 60
                }))
            }),
        );
        let client = serve_upstream(router).await;

        let issued = client.issue_vendor_token(&credentials()).await.unwrap();
        assert_eq!(issued.token, "vendor-client:vendor-secret");
        assert_eq!(issued.expires_in, Some(Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn test_vendor_token_rejection_keeps_status_and_body() {
        let router = Router::new().route(
            "/auth/vendor/",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad credentials") }),
        );
        let client = serve_upstream(router).await;

        let result = client.issue_vendor_token(&credentials()).await;
        assert!(matches!(
            &result,
            Err(ProviderError::VendorTokenRejected { status: 401, body }) if body == "bad credentials"
        ));
    }

    #[tokio::test]
    async fn test_tenant_assignments_sends_bearer_and_tenant_headers() {
        let router = Router::new().route(
            TENANT_ASSIGNMENTS_PATH,
            get(|headers: HeaderMap| async move {
                let header = |name: &str| {
                    headers
                        .get(name)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string()
                };
                Json(json!([{
                    "tenantId": header("frontegg-tenant-id"),
                    "appIds": [header("authorization")]
                }]))
            }),
        );
        let client = serve_upstream(router).await;

        let payload = client.tenant_assignments("vendor-token", "t-1").await.unwrap();
        assert_eq!(
            payload,
            json!([{ "tenantId": "t-1", "appIds": ["Bearer vendor-token"] }])
        );
    }

    #[tokio::test]
    async fn test_tenant_assignments_rejection_keeps_status_and_details() {
        let router = Router::new().route(
            TENANT_ASSIGNMENTS_PATH,
            get(|| async {
                (
                    StatusCode::FORBIDDEN,
                    Json(json!({ "message": "Tenant not found" })),
                )
            }),
        );
        let client = serve_upstream(router).await;

        let result = client.tenant_assignments("vendor-token", "t-1").await;
        assert!(matches!(
            &result,
            Err(ProviderError::AssignmentsRejected { status: 403, details }) if details == "Tenant not found"
        ));
    }

    #[tokio::test]
    async fn test_tenant_assignments_non_json_body() {
        let router = Router::new().route(
            TENANT_ASSIGNMENTS_PATH,
            get(|| async { "<html>maintenance</html>" }),
        );
        let client = serve_upstream(router).await;

        let result = client.tenant_assignments("vendor-token", "t-1").await;
        assert!(matches!(result, Err(ProviderError::InvalidJson)));
    }
}
