//! Normalized target records
//!
//! One record per synchronizable unit: a product variant (target: backoffice)
//! or an order (target: storefront). Records are built fresh for every event
//! and never cached.

use super::price::Price;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-empty key used for existence lookup (SKU or order correlation id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordKey(String);

impl RecordKey {
    /// Returns `None` for empty or whitespace-only keys
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RecordKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RecordKey {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).ok_or("record key must not be empty")
    }
}

impl From<RecordKey> for String {
    fn from(key: RecordKey) -> Self {
        key.0
    }
}

/// Product status on the backoffice (fixed for this integration)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProductStatus {
    #[default]
    Enabled,
    Disabled,
}

impl ProductStatus {
    pub fn code(&self) -> u8 {
        match self {
            Self::Enabled => 1,
            Self::Disabled => 2,
        }
    }
}

/// Product visibility on the backoffice (fixed for this integration)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProductVisibility {
    NotVisible,
    Catalog,
    Search,
    #[default]
    CatalogAndSearch,
}

impl ProductVisibility {
    pub fn code(&self) -> u8 {
        match self {
            Self::NotVisible => 1,
            Self::Catalog => 2,
            Self::Search => 3,
            Self::CatalogAndSearch => 4,
        }
    }
}

/// One product variant in backoffice terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// `handle + separator + variant sku`
    pub key: RecordKey,
    pub display_name: String,
    pub price: Price,
    pub quantity_on_hand: Option<u32>,
    /// Always `quantity_on_hand > 0`
    pub in_stock: bool,
    pub status: ProductStatus,
    pub visibility: ProductVisibility,
    pub attribute_set_id: u32,
    pub description: Option<String>,
}

/// Fulfillment status given to orders that do not exist remotely yet
pub const DEFAULT_FULFILLMENT_STATUS: &str = "unfulfilled";

/// One order in storefront terms; line items travel inside it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Source order id, also the correlation tag on the storefront
    pub key: RecordKey,
    pub display_name: String,
    pub email: Option<String>,
    pub fulfillment_status: String,
    pub line_items: Vec<LineItemRecord>,
    pub total: Price,
    pub shipping: Option<AddressRecord>,
    pub billing: Option<AddressRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemRecord {
    pub title: String,
    pub quantity: u32,
    pub price: Price,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address1: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

/// Target-schema unit of synchronization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NormalizedRecord {
    Product(ProductRecord),
    Order(OrderRecord),
}

impl NormalizedRecord {
    pub fn key(&self) -> &RecordKey {
        match self {
            Self::Product(p) => &p.key,
            Self::Order(o) => &o.key,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Product(p) => &p.display_name,
            Self::Order(o) => &o.display_name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Product(_) => "product",
            Self::Order(_) => "order",
        }
    }

    pub fn as_product(&self) -> Option<&ProductRecord> {
        match self {
            Self::Product(p) => Some(p),
            Self::Order(_) => None,
        }
    }

    pub fn as_order(&self) -> Option<&OrderRecord> {
        match self {
            Self::Order(o) => Some(o),
            Self::Product(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_key_rejects_blank() {
        assert!(RecordKey::new("").is_none());
        assert!(RecordKey::new("   ").is_none());
        assert_eq!(RecordKey::new("shirt-S").unwrap().as_str(), "shirt-S");
    }

    #[test]
    fn record_key_deserialize_enforces_non_empty() {
        assert!(serde_json::from_str::<RecordKey>("\"\"").is_err());
        let key: RecordKey = serde_json::from_str("\"1001\"").unwrap();
        assert_eq!(key.to_string(), "1001");
    }

    #[test]
    fn fixed_codes() {
        assert_eq!(ProductStatus::default().code(), 1);
        assert_eq!(ProductVisibility::default().code(), 4);
    }
}
