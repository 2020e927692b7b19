use anyhow::{Context, Result};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Claims of a Frontegg user access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    /// Active tenant of the user
    #[serde(default, rename = "tenantId")]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Claims {
    /// Name shown in the navigation bar
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .filter(|n| !n.is_empty())
            .or_else(|| self.email.clone().filter(|e| !e.is_empty()))
            .unwrap_or_else(|| "User".to_string())
    }

    /// Name used in the welcome line: the full name, else the email's local part
    pub fn greeting_name(&self) -> Option<String> {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return Some(name.to_string());
        }
        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|local| !local.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    n: String,
    e: String,
}

struct JwksCache {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

pub struct JwtValidator {
    frontegg_base_url: String,
    /// Expected issuer (the Frontegg workspace URL)
    expected_issuer: String,
    /// Expected audience (the application client id)
    expected_audience: String,
    client: reqwest::Client,
    jwks_cache: RwLock<Option<JwksCache>>,
    cache_ttl: Duration,
}

impl JwtValidator {
    /// Create a Frontegg JWT validator (RS256 with JWKS)
    ///
    /// # Arguments
    /// * `frontegg_base_url` - Workspace URL; issuer and JWKS host
    /// * `expected_audience` - Expected audience claim (application client id)
    /// * `connect_timeout_secs` - HTTP connect timeout
    /// * `request_timeout_secs` - HTTP request timeout
    /// * `jwks_cache_ttl_secs` - JWKS cache TTL
    pub fn new(
        frontegg_base_url: String,
        expected_audience: String,
        connect_timeout_secs: u64,
        request_timeout_secs: u64,
        jwks_cache_ttl_secs: u64,
    ) -> Result<Self, String> {
        let frontegg_base_url = frontegg_base_url.trim_end_matches('/').to_string();
        let expected_issuer = frontegg_base_url.clone();

        tracing::info!(
            expected_issuer = %expected_issuer,
            expected_audience = %expected_audience,
            jwks_cache_ttl_secs = jwks_cache_ttl_secs,
            "JWT validator initialized with issuer and audience validation"
        );

        let client = reqwest::ClientBuilder::new()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(request_timeout_secs))
            .build()
            .map_err(|e| format!("Failed to build HTTP client for JWKS: {}", e))?;

        Ok(Self {
            frontegg_base_url,
            expected_issuer,
            expected_audience,
            client,
            jwks_cache: RwLock::new(None),
            cache_ttl: Duration::from_secs(jwks_cache_ttl_secs),
        })
    }

    /// Validate JWT token asynchronously (fetches JWKS if not cached or expired)
    pub async fn validate_async(&self, token: &str) -> Result<Claims> {
        let header = decode_header(token).context("Invalid token header")?;
        let kid = header.kid.context("Token missing kid")?;

        let decoding_key = match self.get_cached_key(&kid).await? {
            Some(key) => key,
            None => {
                // Frontegg may have rotated keys
                tracing::warn!(kid = %kid, "Key ID not found in cache, forcing JWKS refresh");
                self.refresh_jwks().await?;

                match self.get_cached_key(&kid).await? {
                    Some(key) => key,
                    None => {
                        tracing::error!(kid = %kid, "Unknown key ID after JWKS refresh");
                        anyhow::bail!("Unknown key ID: {}", kid);
                    }
                }
            }
        };

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;
        validation.set_issuer(&[&self.expected_issuer]);
        validation.set_audience(&[&self.expected_audience]);

        let token_data = match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(data) => data,
            Err(e) => {
                // Log a hash, never the token itself
                let token_hash = format!("{:x}", md5::compute(token));
                tracing::warn!(
                    error = ?e,
                    kid = %kid,
                    token_hash = %token_hash,
                    token_len = token.len(),
                    "JWT validation failed"
                );
                anyhow::bail!("Token validation failed: {}", e);
            }
        };

        tracing::debug!(
            sub = %token_data.claims.sub,
            tenant_id = ?token_data.claims.tenant_id,
            "Token validated"
        );

        Ok(token_data.claims)
    }

    /// Check if JWKS is cached (for health checks)
    pub async fn is_jwks_cached(&self) -> bool {
        self.jwks_cache.read().await.is_some()
    }

    /// Prefetch JWKS at startup so readiness passes immediately
    pub async fn prefetch_jwks(&self) -> Result<()> {
        tracing::info!("Prefetching JWKS at startup for readiness");
        self.refresh_jwks().await
    }

    /// Get cached key if available and not expired
    async fn get_cached_key(&self, kid: &str) -> Result<Option<DecodingKey>> {
        {
            let cache = self.jwks_cache.read().await;
            if let Some(jwks_cache) = cache.as_ref() {
                if jwks_cache.fetched_at.elapsed() < self.cache_ttl {
                    return Ok(jwks_cache.keys.get(kid).cloned());
                }
                tracing::info!(
                    elapsed_secs = jwks_cache.fetched_at.elapsed().as_secs(),
                    ttl_secs = self.cache_ttl.as_secs(),
                    "JWKS cache expired, will refresh"
                );
            }
        } // Lock is dropped here

        self.refresh_jwks().await?;

        let cache = self.jwks_cache.read().await;
        Ok(cache.as_ref().and_then(|c| c.keys.get(kid).cloned()))
    }

    /// Refresh JWKS cache from Frontegg
    async fn refresh_jwks(&self) -> Result<()> {
        let url = format!("{}/.well-known/jwks.json", self.frontegg_base_url);

        tracing::info!(url = %url, "Fetching JWKS from Frontegg");

        let response: JwksResponse = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch JWKS")?
            .json()
            .await
            .context("Failed to parse JWKS")?;

        let mut keys = HashMap::new();
        for jwk in response.keys {
            let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
                .context("Failed to create decoding key")?;
            keys.insert(jwk.kid, key);
        }

        tracing::info!(key_count = keys.len(), "JWKS fetched successfully");

        let mut cache = self.jwks_cache.write().await;
        *cache = Some(JwksCache {
            keys,
            fetched_at: Instant::now(),
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(name: Option<&str>, email: Option<&str>) -> Claims {
        Claims {
            sub: "user-1".to_string(),
            exp: 0,
            tenant_id: Some("t-1".to_string()),
            name: name.map(str::to_string),
            email: email.map(str::to_string),
        }
    }

    #[test]
    fn test_claims_deserialize_frontegg_token_payload() {
        let claims: Claims = serde_json::from_str(
            r#"{"sub":"u1","exp":4102444800,"tenantId":"t-9","name":"Ada","email":"ada@example.com","roles":["Admin"]}"#,
        )
        .unwrap();
        assert_eq!(claims.tenant_id.as_deref(), Some("t-9"));
        assert_eq!(claims.name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_claims_without_tenant() {
        let claims: Claims = serde_json::from_str(r#"{"sub":"u1","exp":1}"#).unwrap();
        assert!(claims.tenant_id.is_none());
        assert_eq!(claims.display_name(), "User");
        assert_eq!(claims.greeting_name(), None);
    }

    #[test]
    fn test_display_name_prefers_name_then_email() {
        assert_eq!(claims(Some("Ada"), Some("ada@x.io")).display_name(), "Ada");
        assert_eq!(claims(None, Some("ada@x.io")).display_name(), "ada@x.io");
        assert_eq!(claims(Some(""), None).display_name(), "User");
    }

    #[test]
    fn test_greeting_name_uses_email_local_part() {
        assert_eq!(
            claims(None, Some("grace@example.com")).greeting_name().as_deref(),
            Some("grace")
        );
        assert_eq!(
            claims(Some("Grace Hopper"), Some("grace@example.com"))
                .greeting_name()
                .as_deref(),
            Some("Grace Hopper")
        );
    }

    #[tokio::test]
    async fn test_new_validator_has_empty_cache() {
        let validator = JwtValidator::new(
            "https://app.frontegg.test/".to_string(),
            "client".to_string(),
            1,
            1,
            60,
        )
        .unwrap();
        assert_eq!(validator.expected_issuer, "https://app.frontegg.test");
        assert!(!validator.is_jwks_cached().await);
    }

    #[tokio::test]
    async fn test_validate_rejects_malformed_token() {
        let validator = JwtValidator::new(
            "https://app.frontegg.test".to_string(),
            "client".to_string(),
            1,
            1,
            60,
        )
        .unwrap();
        assert!(validator.validate_async("not-a-jwt").await.is_err());
    }
}
