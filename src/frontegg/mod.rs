//! Frontegg integration
//!
//! ## Structure
//!
//! - `client`: reqwest implementation of [`IdentityProvider`]
//! - `vendor_token`: process-wide vendor token cache
//! - `entitlements`: normalization of tenant-assignment payloads
//!
//! [`EntitlementResolver`] ties them together: it obtains the vendor token,
//! asks Frontegg for a tenant's assignments and flattens the answer into
//! application ids.

pub mod client;
pub mod entitlements;
pub mod vendor_token;

pub use client::FronteggClient;
pub use entitlements::extract_app_ids;
pub use vendor_token::VendorTokenCache;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::VendorCredentials;

/// A vendor token as issued by the identity provider
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// Lifetime reported by the provider, if any
    pub expires_in: Option<Duration>,
}

/// Failures talking to the identity provider
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Frontegg credentials not configured")]
    CredentialsMissing,

    #[error("vendor token request rejected with status {status}")]
    VendorTokenRejected { status: u16, body: String },

    #[error("No token in response")]
    MissingToken,

    #[error("tenant assignment request rejected with status {status}: {details}")]
    AssignmentsRejected { status: u16, details: String },

    #[error("Response is not valid JSON")]
    InvalidJson,

    #[error("request to Frontegg failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ProviderError {
    /// True when the failure happened while obtaining the vendor token
    pub fn is_vendor_token_failure(&self) -> bool {
        matches!(
            self,
            ProviderError::CredentialsMissing
                | ProviderError::VendorTokenRejected { .. }
                | ProviderError::MissingToken
        )
    }
}

/// Calls the launcher makes against the identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange vendor credentials for a bearer token
    async fn issue_vendor_token(
        &self,
        credentials: &VendorCredentials,
    ) -> Result<IssuedToken, ProviderError>;

    /// Fetch the raw tenant-assignment payload for `tenant_id`
    async fn tenant_assignments(
        &self,
        vendor_token: &str,
        tenant_id: &str,
    ) -> Result<serde_json::Value, ProviderError>;
}

/// Resolves which applications a tenant is entitled to
pub struct EntitlementResolver {
    provider: Arc<dyn IdentityProvider>,
    credentials: Option<VendorCredentials>,
    tokens: VendorTokenCache,
}

impl EntitlementResolver {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        credentials: Option<VendorCredentials>,
        default_token_ttl: Duration,
    ) -> Self {
        Self {
            provider,
            credentials,
            tokens: VendorTokenCache::new(default_token_ttl),
        }
    }

    /// Current vendor token, refreshed when missing or expired
    pub async fn vendor_token(&self) -> Result<String, ProviderError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(ProviderError::CredentialsMissing)?;

        self.tokens
            .get_or_refresh(|| self.provider.issue_vendor_token(credentials))
            .await
    }

    /// Provider application ids assigned to `tenant_id`
    pub async fn tenant_app_ids(&self, tenant_id: &str) -> Result<Vec<String>, ProviderError> {
        let vendor_token = self.vendor_token().await?;
        let payload = self
            .provider
            .tenant_assignments(&vendor_token, tenant_id)
            .await?;

        let app_ids = extract_app_ids(&payload, tenant_id);
        tracing::info!(
            tenant_id = %tenant_id,
            app_count = app_ids.len(),
            "Resolved tenant entitlements"
        );

        Ok(app_ids)
    }

    /// Check if a vendor token is currently cached, reported by `/readyz`
    pub async fn has_vendor_token(&self) -> bool {
        self.tokens.has_valid_token().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeProvider;
    use serde_json::json;

    fn credentials() -> Option<VendorCredentials> {
        Some(VendorCredentials {
            client_id: "vendor".to_string(),
            secret: "secret".to_string(),
        })
    }

    #[tokio::test]
    async fn test_tenant_app_ids_normalizes_payload() {
        let provider = Arc::new(FakeProvider::new(json!([
            { "tenantId": "t-1", "appIds": ["fe-travel", null, "fe-fintech"] }
        ])));
        let resolver =
            EntitlementResolver::new(provider.clone(), credentials(), Duration::from_secs(60));

        let ids = resolver.tenant_app_ids("t-1").await.unwrap();
        assert_eq!(ids, vec!["fe-travel", "fe-fintech"]);
        assert_eq!(provider.last_tenant().as_deref(), Some("t-1"));
    }

    #[tokio::test]
    async fn test_vendor_token_fetched_once_across_lookups() {
        let provider = Arc::new(FakeProvider::new(json!({ "appIds": [] })));
        let resolver =
            EntitlementResolver::new(provider.clone(), credentials(), Duration::from_secs(60));

        resolver.tenant_app_ids("t-1").await.unwrap();
        resolver.tenant_app_ids("t-2").await.unwrap();

        assert_eq!(provider.token_calls(), 1);
        assert_eq!(provider.assignment_calls(), 2);
        assert!(resolver.has_vendor_token().await);
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let provider = Arc::new(FakeProvider::new(json!([])));
        let resolver = EntitlementResolver::new(provider.clone(), None, Duration::from_secs(60));

        let err = resolver.tenant_app_ids("t-1").await.unwrap_err();
        assert!(matches!(err, ProviderError::CredentialsMissing));
        assert!(err.is_vendor_token_failure());
        assert_eq!(provider.token_calls(), 0);
        assert_eq!(provider.assignment_calls(), 0);
    }

    #[test]
    fn test_is_vendor_token_failure() {
        assert!(ProviderError::MissingToken.is_vendor_token_failure());
        assert!(ProviderError::VendorTokenRejected {
            status: 401,
            body: String::new()
        }
        .is_vendor_token_failure());
        assert!(!ProviderError::InvalidJson.is_vendor_token_failure());
        assert!(!ProviderError::AssignmentsRejected {
            status: 403,
            details: "nope".to_string()
        }
        .is_vendor_token_failure());
    }
}
