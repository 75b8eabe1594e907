//! RemoteStore capability

use crate::{StoreError, StoreResult};
use async_trait::async_trait;
use shared::NormalizedRecord;

/// Which platform a store talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Storefront,
    Backoffice,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Storefront => "storefront",
            Self::Backoffice => "backoffice",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a remote resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResource {
    /// Id to address the resource by on update
    pub id: String,
}

impl RemoteResource {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Get/create/update a resource on one remote platform
///
/// Implementations must be safe for concurrent use; the reconciler shares a
/// single instance across all workers of an event.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    fn platform(&self) -> Platform;

    /// Direct fetch by key; `Ok(None)` means the remote answered "not found"
    async fn fetch_by_key(&self, key: &str) -> StoreResult<Option<RemoteResource>>;

    /// Search by correlation tag; matches are returned in remote order
    async fn search_by_tag(&self, _tag: &str) -> StoreResult<Vec<RemoteResource>> {
        Err(StoreError::Unsupported("search_by_tag"))
    }

    async fn create(&self, record: &NormalizedRecord) -> StoreResult<RemoteResource>;

    async fn update(&self, remote_id: &str, record: &NormalizedRecord) -> StoreResult<RemoteResource>;
}

/// Source of an order's current fulfillment status
#[async_trait]
pub trait FulfillmentSource: Send + Sync {
    /// `Ok(None)` when the order has no status yet
    async fn fulfillment_status(&self, order_id: &str) -> StoreResult<Option<String>>;
}
