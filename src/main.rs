use anyhow::Result;
use launcher::{
    auth::jwt::JwtValidator, catalog, config::Config, frontegg::EntitlementResolver,
    frontegg::FronteggClient, web, AppState,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting app launcher");

    let config = Config::load()?;
    tracing::info!(
        environment = ?config.environment,
        frontegg_base_url = %config.frontegg_base_url,
        frontegg_api_url = %config.frontegg_api_url,
        vendor_credentials_configured = config.vendor_credentials.is_some(),
        "Configuration loaded"
    );

    if config.vendor_credentials.is_none() {
        tracing::warn!(
            "FRONTEGG_CLIENT_ID/FRONTEGG_SECRET not set - entitlement lookups will fail"
        );
    }

    let jwt_validator = Arc::new(
        JwtValidator::new(
            config.frontegg_base_url.clone(),
            config.frontegg_app_client_id.clone(),
            config.http_connect_timeout_secs,
            config.http_request_timeout_secs,
            config.jwks_cache_ttl_secs,
        )
        .map_err(|e| anyhow::anyhow!("Failed to initialize JWT validator: {}", e))?,
    );

    // Prefetch JWKS at startup so /readyz returns 200 immediately
    jwt_validator
        .prefetch_jwks()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to prefetch JWKS at startup: {}", e))?;

    let frontegg = FronteggClient::new(
        &config.frontegg_api_url,
        config.http_connect_timeout_secs,
        config.http_request_timeout_secs,
    )
    .map_err(|e| anyhow::anyhow!("Failed to build Frontegg client: {}", e))?;

    let entitlements = EntitlementResolver::new(
        Arc::new(frontegg),
        config.vendor_credentials.clone(),
        Duration::from_secs(config.vendor_token_default_ttl_secs),
    );

    let catalog = catalog::load_catalog_from_env(&config.app_types);

    let session_storage =
        web::SessionStorage::new(Duration::from_secs(config.session_max_age_secs));

    let bind_address = config.bind_address();
    let state = Arc::new(AppState {
        catalog,
        config: Arc::new(config),
        jwt_validator,
        entitlements: Arc::new(entitlements),
        session_storage: Arc::new(session_storage),
    });

    let app = web::create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("App launcher listening on {}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
