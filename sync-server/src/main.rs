//! sync-server: storefront/backoffice commerce sync bridge
//!
//! Long-running service that:
//! - Receives storefront product webhooks and syncs variants to the backoffice
//! - Receives backoffice order events and syncs orders to the storefront

use sync_server::{AppState, Config, api};
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const DEFAULT_LOG_FILTER: &str = "sync_server=info,store_client=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = Config::from_env()?;
    tracing::info!(
        environment = %config.environment,
        backoffice = %config.backoffice.base_url,
        storefront = %config.storefront.base_url,
        max_concurrency = config.max_concurrency,
        reconcile_on_create = config.reconcile_on_create,
        require_published = config.require_published,
        signature_check = config.webhook_secret.is_some(),
        "Starting sync-server"
    );
    if config.webhook_secret.is_none() && !config.is_development() {
        tracing::warn!("SHOPIFY_WEBHOOK_SECRET not set, product webhooks are not verified");
    }

    let state = AppState::new(&config)?;
    let app = api::create_router(state);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("sync-server HTTP listening on {http_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("sync-server stopped");
    Ok(())
}

/// `RUST_LOG` filter; `LOG_FORMAT=json` switches to JSON lines
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
