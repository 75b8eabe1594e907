//! Inbound event schemas
//!
//! Product events originate from the storefront, order events from the
//! backoffice. Both are decoded once at the ingress boundary. Fields whose
//! type cannot be trusted (prices, inventory counts, variant entries) decode
//! into tolerant enums so one malformed variant never fails the whole event;
//! the mapper decides what to do with them.

use serde::{Deserialize, Deserializer, Serialize};

/// A classified inbound event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum SourceEvent {
    Product(ShopifyProduct),
    Order(BackofficeOrder),
}

impl SourceEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Product(_) => "product",
            Self::Order(_) => "order",
        }
    }
}

// ========== Untyped scalars ==========

/// A JSON value that should be numeric but arrives untyped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(serde_json::Number),
    Text(String),
    Other(serde_json::Value),
}

impl LooseNumber {
    /// Decimal text of the value, if it is a number or a string
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Number(n) => Some(n.to_string()),
            Self::Text(s) => Some(s.clone()),
            Self::Other(_) => None,
        }
    }

    /// Whole-number value; fractional or non-numeric input yields `None`
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Other(_) => None,
        }
    }
}

impl From<i64> for LooseNumber {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for LooseNumber {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Accept identifiers encoded either as JSON strings or numbers
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => Some(s),
        Some(Raw::Number(n)) => Some(n.to_string()),
        None => None,
    })
}

// ========== Storefront product ==========

/// Storefront product event body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShopifyProduct {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// URL slug, used as the prefix of every variant key
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub body_html: Option<String>,
    /// `None` when the event carries no variant list at all
    #[serde(default)]
    pub variants: Option<Vec<VariantEntry>>,
}

/// One element of the variant list; anything that is not an object is kept
/// as-is so the mapper can report it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariantEntry {
    Variant(ShopifyVariant),
    Malformed(serde_json::Value),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShopifyVariant {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<LooseNumber>,
    #[serde(default)]
    pub inventory_quantity: Option<LooseNumber>,
}

// ========== Backoffice order ==========

/// Backoffice order event body
///
/// Field aliases accept the legacy PascalCase payload shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackofficeOrder {
    #[serde(
        default,
        alias = "OrderID",
        alias = "increment_id",
        deserialize_with = "string_or_number"
    )]
    pub order_id: Option<String>,
    #[serde(default, alias = "CustomerEmail")]
    pub customer_email: Option<String>,
    #[serde(default, alias = "Items")]
    pub items: Vec<BackofficeLineItem>,
    #[serde(default, alias = "Shipping")]
    pub shipping: Option<BackofficeAddress>,
    #[serde(default, alias = "Billing")]
    pub billing: Option<BackofficeAddress>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackofficeLineItem {
    #[serde(default, alias = "Name")]
    pub name: Option<String>,
    #[serde(default, alias = "Quantity")]
    pub quantity: Option<LooseNumber>,
    #[serde(default, alias = "Price")]
    pub price: Option<LooseNumber>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackofficeAddress {
    #[serde(default, alias = "Firstname")]
    pub firstname: Option<String>,
    #[serde(default, alias = "Lastname")]
    pub lastname: Option<String>,
    #[serde(default, alias = "Street")]
    pub street: Option<String>,
    #[serde(default, alias = "City")]
    pub city: Option<String>,
    #[serde(default, alias = "Region")]
    pub region: Option<String>,
    #[serde(default, alias = "Postcode")]
    pub postcode: Option<String>,
    #[serde(default, alias = "CountryID")]
    pub country_id: Option<String>,
}
