use std::env;

/// Application types read from the environment when `APP_TYPES` is unset
pub const DEFAULT_APP_TYPES: [&str; 4] = ["TRAVEL", "FINTECH", "BIOPHARMA", "LOGISTICS"];

/// Public Frontegg API host used for vendor and entitlement calls
pub const DEFAULT_FRONTEGG_API_URL: &str = "https://api.frontegg.com";

/// Vendor token lifetime when the provider does not report `expiresIn` (23 hours)
pub const DEFAULT_VENDOR_TOKEN_TTL_SECS: u64 = 23 * 60 * 60;

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Production,
}

/// Vendor API credentials used by the backend to talk to Frontegg
#[derive(Clone)]
pub struct VendorCredentials {
    pub client_id: String,
    pub secret: String,
}

// Manual Debug so the secret never lands in logs
impl std::fmt::Debug for VendorCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VendorCredentials")
            .field("client_id", &self.client_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Environment configuration
    pub environment: Environment,

    // Server configuration
    pub server_host: String,
    pub server_port: u16,

    // Launcher public URL (for post-logout redirects)
    pub portal_public_url: String,

    // Frontegg hosted login
    pub frontegg_base_url: String, // Workspace domain (https://app-xxxx.frontegg.com)
    pub frontegg_app_client_id: String,
    pub redirect_uri: String,

    // Frontegg vendor API
    pub frontegg_api_url: String,
    // None = credentials not configured; surfaced per request, not at startup
    pub vendor_credentials: Option<VendorCredentials>,
    pub vendor_token_default_ttl_secs: u64,

    // Cookie configuration (None = host-only cookie, Some = domain cookie)
    pub cookie_domain: Option<String>,
    pub session_max_age_secs: u64,

    // HTTP client timeout configuration (in seconds)
    pub http_connect_timeout_secs: u64,
    pub http_request_timeout_secs: u64,

    // JWKS cache configuration (in seconds)
    pub jwks_cache_ttl_secs: u64,

    // Application types making up the catalog, in display order
    pub app_types: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables using std::env::var
    pub fn load() -> anyhow::Result<Self> {
        let environment = match env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
            .as_str()
        {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        };

        // Required variables
        let frontegg_base_url = env::var("FRONTEGG_BASE_URL")
            .map_err(|_| anyhow::anyhow!("FRONTEGG_BASE_URL environment variable is required"))?
            .trim_end_matches('/')
            .to_string();

        let frontegg_app_client_id = env::var("FRONTEGG_APP_CLIENT_ID").map_err(|_| {
            anyhow::anyhow!("FRONTEGG_APP_CLIENT_ID environment variable is required")
        })?;

        let redirect_uri = env::var("REDIRECT_URI")
            .map_err(|_| anyhow::anyhow!("REDIRECT_URI environment variable is required"))?;
        url::Url::parse(&redirect_uri)
            .map_err(|e| anyhow::anyhow!("REDIRECT_URI is not a valid URL: {}", e))?;

        // e.g., http://apps.localhost/oauth/callback -> http://apps.localhost
        let portal_public_url = env::var("PORTAL_PUBLIC_URL")
            .unwrap_or_else(|_| origin_of(&redirect_uri))
            .trim_end_matches('/')
            .to_string();

        let frontegg_api_url = env::var("FRONTEGG_API_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_FRONTEGG_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let vendor_credentials = match (
            non_empty_var("FRONTEGG_CLIENT_ID"),
            non_empty_var("FRONTEGG_SECRET"),
        ) {
            (Some(client_id), Some(secret)) => Some(VendorCredentials { client_id, secret }),
            _ => None,
        };

        // Optional variables with defaults
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let server_port = env::var("SERVER_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(3000);

        let cookie_domain = env::var("COOKIE_DOMAIN").ok().filter(|s| !s.is_empty());

        let app_types = env::var("APP_TYPES")
            .ok()
            .map(|raw| parse_app_types(&raw))
            .filter(|types| !types.is_empty())
            .unwrap_or_else(|| DEFAULT_APP_TYPES.iter().map(|t| t.to_string()).collect());

        Ok(Config {
            environment,
            server_host,
            server_port,
            portal_public_url,
            frontegg_base_url,
            frontegg_app_client_id,
            redirect_uri,
            frontegg_api_url,
            vendor_credentials,
            vendor_token_default_ttl_secs: u64_var(
                "VENDOR_TOKEN_DEFAULT_TTL_SECS",
                DEFAULT_VENDOR_TOKEN_TTL_SECS,
            ),
            cookie_domain,
            session_max_age_secs: u64_var("SESSION_MAX_AGE_SECS", 86400),
            http_connect_timeout_secs: u64_var("HTTP_CONNECT_TIMEOUT_SECS", 10),
            http_request_timeout_secs: u64_var("HTTP_REQUEST_TIMEOUT_SECS", 30),
            jwks_cache_ttl_secs: u64_var("JWKS_CACHE_TTL_SECS", 3600),
            app_types,
        })
    }

    /// Check if running in production mode
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Get cookie security flags based on environment
    pub fn cookie_secure_flag(&self) -> &str {
        if self.is_production() {
            "; Secure"
        } else {
            ""
        }
    }

    /// Get cookie domain attribute string (empty if host-only cookie)
    pub fn cookie_domain_attr(&self) -> String {
        match &self.cookie_domain {
            Some(domain) => format!("; Domain={}", domain),
            None => String::new(),
        }
    }

    /// Get bind address for server
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.is_empty())
}

fn u64_var(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(default)
}

/// Split a comma separated `APP_TYPES` value into upper-cased type names
pub fn parse_app_types(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Strip the path from a URL, keeping scheme and authority
fn origin_of(uri: &str) -> String {
    url::Url::parse(uri)
        .ok()
        .map(|parsed| parsed.origin())
        .filter(|origin| origin.is_tuple())
        .map(|origin| origin.ascii_serialization())
        .unwrap_or_else(|| uri.to_string())
}
