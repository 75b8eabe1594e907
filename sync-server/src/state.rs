//! Application state for the sync server

use std::sync::Arc;

use store_client::{BackofficeStore, StorefrontStore};

use crate::config::Config;
use crate::mapper::{MapperConfig, SchemaMapper};
use crate::sync::Reconciler;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Which events are synchronized at all
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncPolicy {
    pub reconcile_on_create: bool,
    pub require_published: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub mapper: Arc<SchemaMapper>,
    /// Products → backoffice
    pub product_sync: Arc<Reconciler>,
    /// Orders → storefront, status read back from the backoffice
    pub order_sync: Arc<Reconciler>,
    /// Storefront client, used for the publish gate
    pub storefront: Arc<StorefrontStore>,
    pub webhook_secret: Option<String>,
    pub policy: SyncPolicy,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, BoxError> {
        let backoffice = Arc::new(BackofficeStore::new(&config.backoffice)?);
        let storefront = Arc::new(StorefrontStore::new(&config.storefront)?);

        let product_sync =
            Reconciler::new(backoffice.clone()).with_max_concurrency(config.max_concurrency);
        let order_sync = Reconciler::new(storefront.clone())
            .with_fulfillment(backoffice)
            .with_max_concurrency(config.max_concurrency);

        Ok(Self {
            mapper: Arc::new(SchemaMapper::new(MapperConfig {
                attribute_set_id: config.attribute_set_id,
            })),
            product_sync: Arc::new(product_sync),
            order_sync: Arc::new(order_sync),
            storefront,
            webhook_secret: config.webhook_secret.clone(),
            policy: SyncPolicy {
                reconcile_on_create: config.reconcile_on_create,
                require_published: config.require_published,
            },
        })
    }
}
