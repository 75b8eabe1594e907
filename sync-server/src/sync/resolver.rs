//! Existence resolution
//!
//! "Not found" is a verdict, not an error. Any other failure of the remote
//! call becomes a lookup error for that one record.

use shared::{ExistenceVerdict, NormalizedRecord, RecordKey, SyncError};
use std::sync::Arc;
use store_client::{RemoteStore, StoreError};

/// How a record is located on the remote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStrategy {
    /// Direct fetch addressed by the key (backoffice products by SKU)
    DirectKey,
    /// Search for resources tagged with the key (storefront orders)
    CorrelationTag,
}

impl LookupStrategy {
    pub fn for_record(record: &NormalizedRecord) -> Self {
        match record {
            NormalizedRecord::Product(_) => Self::DirectKey,
            NormalizedRecord::Order(_) => Self::CorrelationTag,
        }
    }
}

#[derive(Clone)]
pub struct ExistenceResolver {
    store: Arc<dyn RemoteStore>,
}

impl ExistenceResolver {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Resolve a record with the strategy its kind calls for
    pub async fn resolve_record(
        &self,
        record: &NormalizedRecord,
    ) -> Result<ExistenceVerdict, SyncError> {
        self.resolve(record.key(), LookupStrategy::for_record(record))
            .await
    }

    pub async fn resolve(
        &self,
        key: &RecordKey,
        strategy: LookupStrategy,
    ) -> Result<ExistenceVerdict, SyncError> {
        let verdict = match strategy {
            LookupStrategy::DirectKey => self
                .store
                .fetch_by_key(key.as_str())
                .await
                .map(|found| match found {
                    Some(resource) => ExistenceVerdict::found(resource.id),
                    None => ExistenceVerdict::missing(),
                }),
            // several tagged matches are possible; the first one wins
            LookupStrategy::CorrelationTag => self
                .store
                .search_by_tag(key.as_str())
                .await
                .map(|matches| match matches.into_iter().next() {
                    Some(resource) => ExistenceVerdict::found(resource.id),
                    None => ExistenceVerdict::missing(),
                }),
        }
        .map_err(StoreError::into_lookup_error)?;

        tracing::debug!(
            key = %key,
            platform = %self.store.platform(),
            exists = verdict.exists,
            "Existence resolved"
        );
        Ok(verdict)
    }
}
