//! sync-server: storefront/backoffice commerce sync bridge
//!
//! Receives webhook events, maps them into normalized records, checks each
//! record's existence on the target platform and creates or updates it.
//! Records of one event are synced concurrently and fail independently.

pub mod api;
pub mod config;
pub mod error;
pub mod mapper;
pub mod state;
pub mod sync;

pub use config::Config;
pub use mapper::{MapperConfig, MappingResult, MappingWarning, SchemaMapper};
pub use state::AppState;
pub use sync::{ExistenceResolver, Reconciler, sync_event};
