//! Shared types for the commerce sync bridge
//!
//! Typed source schemas, normalized target records, outbound wire payloads,
//! and the sync error taxonomy used by both the store clients and the
//! sync server.

pub mod error;
pub mod models;

// Re-exports
pub use error::{ErrorKind, SyncError};
pub use models::{
    BackofficeOrder, ExistenceVerdict, NormalizedRecord, OrderRecord, Price, ProductRecord,
    RecordKey, ShopifyProduct, ShopifyVariant, SourceEvent, SyncFailure, SyncOutcome,
};
pub use serde::{Deserialize, Serialize};
