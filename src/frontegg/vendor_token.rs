use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{IssuedToken, ProviderError};

/// Upper bound on how long a vendor token is reused (30 days)
const MAX_TOKEN_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Process-wide cache for the Frontegg vendor token
///
/// Holds at most one token. The mutex is held across a refresh so callers
/// arriving while a refresh is in flight wait for it instead of issuing their
/// own upstream request.
pub struct VendorTokenCache {
    cached: Mutex<Option<CachedToken>>,
    default_ttl: Duration,
}

impl VendorTokenCache {
    /// `default_ttl` applies when the provider does not report a lifetime
    ///
    /// Both the default and reported lifetimes are capped at 30 days.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            cached: Mutex::new(None),
            default_ttl: default_ttl.min(MAX_TOKEN_TTL),
        }
    }

    /// Return the cached token, calling `refresh` when it is missing or expired
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Result<String, ProviderError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<IssuedToken, ProviderError>>,
    {
        let mut cached = self.cached.lock().await;

        if let Some(entry) = cached.as_ref() {
            if entry.expires_at > Instant::now() {
                tracing::debug!("Reusing cached vendor token");
                return Ok(entry.token.clone());
            }
            tracing::info!("Vendor token expired, refreshing");
        }

        let issued = refresh().await?;
        let ttl = issued
            .expires_in
            .unwrap_or(self.default_ttl)
            .min(MAX_TOKEN_TTL);

        tracing::info!(ttl_secs = ttl.as_secs(), "Vendor token refreshed");

        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .or_else(|| now.checked_add(self.default_ttl))
            .unwrap_or(now);

        let token = issued.token.clone();
        *cached = Some(CachedToken {
            token: issued.token,
            expires_at,
        });

        Ok(token)
    }

    /// Check if a token is cached and still valid
    pub async fn has_valid_token(&self) -> bool {
        self.cached
            .lock()
            .await
            .as_ref()
            .is_some_and(|entry| entry.expires_at > Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn issue(
        counter: &AtomicUsize,
        expires_in: Option<Duration>,
    ) -> impl Future<Output = Result<IssuedToken, ProviderError>> {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            Ok(IssuedToken {
                token: format!("vendor-token-{}", n),
                expires_in,
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_reused_until_expiry_then_refreshed_once() {
        let cache = VendorTokenCache::new(Duration::from_secs(3600));
        let calls = AtomicUsize::new(0);
        let ttl = Some(Duration::from_secs(60));

        let first = cache.get_or_refresh(|| issue(&calls, ttl)).await.unwrap();
        assert_eq!(first, "vendor-token-1");

        tokio::time::advance(Duration::from_secs(59)).await;
        let reused = cache.get_or_refresh(|| issue(&calls, ttl)).await.unwrap();
        assert_eq!(reused, "vendor-token-1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(2)).await;
        let refreshed = cache.get_or_refresh(|| issue(&calls, ttl)).await.unwrap();
        let again = cache.get_or_refresh(|| issue(&calls, ttl)).await.unwrap();
        assert_eq!(refreshed, "vendor-token-2");
        assert_eq!(again, "vendor-token-2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_ttl_applies_without_expires_in() {
        let cache = VendorTokenCache::new(Duration::from_secs(100));
        let calls = AtomicUsize::new(0);

        cache.get_or_refresh(|| issue(&calls, None)).await.unwrap();
        tokio::time::advance(Duration::from_secs(99)).await;
        assert!(cache.has_valid_token().await);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!cache.has_valid_token().await);
        let token = cache.get_or_refresh(|| issue(&calls, None)).await.unwrap();
        assert_eq!(token, "vendor-token-2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_reported_lifetime_is_capped() {
        let cache = VendorTokenCache::new(Duration::from_secs(3600));
        let calls = AtomicUsize::new(0);

        for expires_in in [Duration::from_secs_f64(1e19), Duration::MAX] {
            let token = cache
                .get_or_refresh(|| issue(&calls, Some(expires_in)))
                .await
                .unwrap();
            assert_eq!(token, format!("vendor-token-{}", calls.load(Ordering::SeqCst)));

            tokio::time::advance(MAX_TOKEN_TTL - Duration::from_secs(1)).await;
            assert!(cache.has_valid_token().await);
            tokio::time::advance(Duration::from_secs(1)).await;
            assert!(!cache.has_valid_token().await);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_default_lifetime_is_capped() {
        let cache = VendorTokenCache::new(Duration::from_secs(u64::MAX));
        let calls = AtomicUsize::new(0);

        cache.get_or_refresh(|| issue(&calls, None)).await.unwrap();
        tokio::time::advance(MAX_TOKEN_TTL).await;
        assert!(!cache.has_valid_token().await);
    }

    #[tokio::test]
    async fn test_refresh_failure_leaves_cache_empty() {
        let cache = VendorTokenCache::new(Duration::from_secs(100));

        let result = cache
            .get_or_refresh(|| async { Err(ProviderError::MissingToken) })
            .await;
        assert!(matches!(result, Err(ProviderError::MissingToken)));
        assert!(!cache.has_valid_token().await);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_refresh() {
        let cache = Arc::new(VendorTokenCache::new(Duration::from_secs(3600)));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_refresh(|| async move {
                        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                        tokio::task::yield_now().await;
                        Ok(IssuedToken {
                            token: format!("vendor-token-{}", n),
                            expires_in: None,
                        })
                    })
                    .await
                    .unwrap()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), "vendor-token-1");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
