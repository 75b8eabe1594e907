//! SchemaMapper: source events → normalized records
//!
//! Pure and deterministic. A source element that cannot be shaped into a
//! record becomes a [`MappingWarning`] instead of aborting the event.

mod order;
mod product;

use shared::{NormalizedRecord, SourceEvent, SyncError};

/// Joins a product handle and a variant SKU into a variant key
pub const KEY_SEPARATOR: &str = "-";

/// Attribute set sent with every backoffice product
pub const DEFAULT_ATTRIBUTE_SET_ID: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapperConfig {
    pub attribute_set_id: u32,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            attribute_set_id: DEFAULT_ATTRIBUTE_SET_ID,
        }
    }
}

/// A source element dropped during mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingWarning {
    /// Best available identification of the dropped element
    pub key: String,
    pub reason: String,
}

impl MappingWarning {
    pub fn new(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn to_error(&self) -> SyncError {
        SyncError::mapping(self.reason.clone())
    }
}

/// Records ready for dispatch plus everything that was dropped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingResult {
    pub records: Vec<NormalizedRecord>,
    pub warnings: Vec<MappingWarning>,
}

#[derive(Debug, Clone, Default)]
pub struct SchemaMapper {
    config: MapperConfig,
}

impl SchemaMapper {
    pub fn new(config: MapperConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn map(&self, event: &SourceEvent) -> MappingResult {
        match event {
            SourceEvent::Product(product) => product::map_product(product, &self.config),
            SourceEvent::Order(order) => order::map_order(order),
        }
    }
}

/// Trimmed, non-empty text
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
