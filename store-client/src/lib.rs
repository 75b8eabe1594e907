//! Store Client - HTTP clients for the storefront and backoffice platforms
//!
//! Both platforms are exposed through the [`RemoteStore`] capability
//! (fetch by key, search by tag, create, update). Clients are cheap to clone
//! and safe to share across concurrent sync workers.

pub mod backoffice;
pub mod config;
pub mod error;
pub mod http;
pub mod storefront;
pub mod store;

pub use backoffice::BackofficeStore;
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use store::{FulfillmentSource, Platform, RemoteResource, RemoteStore};
pub use storefront::StorefrontStore;
