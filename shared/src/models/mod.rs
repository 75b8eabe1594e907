//! Domain models
//!
//! - [`source`]: typed inbound event schemas (decoded once at the boundary)
//! - [`record`]: normalized target records, one per synchronizable unit
//! - [`payload`]: outbound wire bodies for each platform
//! - [`outcome`]: existence verdicts and aggregated sync results

pub mod outcome;
pub mod payload;
pub mod price;
pub mod record;
pub mod source;

pub use outcome::{ExistenceVerdict, OutcomeStatus, SyncFailure, SyncOutcome};
pub use price::{Price, PriceError};
pub use record::{
    AddressRecord, LineItemRecord, NormalizedRecord, OrderRecord, ProductRecord,
    ProductStatus, ProductVisibility, RecordKey,
};
pub use source::{
    BackofficeAddress, BackofficeLineItem, BackofficeOrder, LooseNumber, ShopifyProduct,
    ShopifyVariant, SourceEvent, VariantEntry,
};
