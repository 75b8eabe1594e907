//! Outbound wire bodies
//!
//! Backoffice products are wrapped in `{"product": {...}}`, storefront
//! orders in `{"order": {...}}`.

use super::price::Price;
use super::record::{AddressRecord, OrderRecord, ProductRecord};
use serde::{Deserialize, Serialize};

/// Backoffice product type sent with every variant
pub const PRODUCT_TYPE_ID: &str = "simple";
/// Backoffice product weight sent with every variant
pub const PRODUCT_WEIGHT: f64 = 1.0;
/// Custom attribute carrying the product description
pub const DESCRIPTION_ATTRIBUTE: &str = "description";

// ========== Backoffice product ==========

#[derive(Debug, Clone, Serialize)]
pub struct BackofficeProductEnvelope<'a> {
    pub product: BackofficeProductBody<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackofficeProductBody<'a> {
    pub sku: &'a str,
    pub name: &'a str,
    pub price: Price,
    pub status: u8,
    pub visibility: u8,
    pub type_id: &'static str,
    pub weight: f64,
    pub attribute_set_id: u32,
    pub extension_attributes: ExtensionAttributes,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_attributes: Vec<CustomAttribute<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtensionAttributes {
    pub stock_item: StockItem,
}

#[derive(Debug, Clone, Serialize)]
pub struct StockItem {
    pub qty: u32,
    pub is_in_stock: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomAttribute<'a> {
    pub attribute_code: &'static str,
    pub value: &'a str,
}

impl<'a> From<&'a ProductRecord> for BackofficeProductEnvelope<'a> {
    fn from(record: &'a ProductRecord) -> Self {
        let custom_attributes = record
            .description
            .as_deref()
            .map(|value| CustomAttribute {
                attribute_code: DESCRIPTION_ATTRIBUTE,
                value,
            })
            .into_iter()
            .collect();

        Self {
            product: BackofficeProductBody {
                sku: record.key.as_str(),
                name: &record.display_name,
                price: record.price,
                status: record.status.code(),
                visibility: record.visibility.code(),
                type_id: PRODUCT_TYPE_ID,
                weight: PRODUCT_WEIGHT,
                attribute_set_id: record.attribute_set_id,
                extension_attributes: ExtensionAttributes {
                    stock_item: StockItem {
                        qty: record.quantity_on_hand.unwrap_or(0),
                        is_in_stock: record.in_stock,
                    },
                },
                custom_attributes,
            },
        }
    }
}

/// Backoffice product as returned by create/update
#[derive(Debug, Clone, Deserialize)]
pub struct BackofficeProductResponse {
    #[serde(default)]
    pub id: Option<serde_json::Number>,
    pub sku: String,
}

/// Backoffice order status, either a bare JSON string or an object
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BackofficeOrderStatus {
    Plain(String),
    Detailed {
        status: Option<String>,
        #[serde(default)]
        status_label: Option<String>,
    },
}

impl BackofficeOrderStatus {
    pub fn into_status(self) -> Option<String> {
        let status = match self {
            Self::Plain(s) => Some(s),
            Self::Detailed { status, .. } => status,
        };
        status.filter(|s| !s.trim().is_empty())
    }
}

// ========== Storefront order ==========

#[derive(Debug, Clone, Serialize)]
pub struct StorefrontOrderEnvelope<'a> {
    pub order: StorefrontOrderBody<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorefrontOrderBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    pub fulfillment_status: &'a str,
    /// Correlation tag, equal to the source order id
    pub tags: &'a str,
    pub line_items: Vec<StorefrontLineItem<'a>>,
    pub total_price: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<&'a AddressRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<&'a AddressRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorefrontLineItem<'a> {
    pub title: &'a str,
    pub quantity: u32,
    pub price: Price,
}

impl<'a> From<&'a OrderRecord> for StorefrontOrderEnvelope<'a> {
    fn from(record: &'a OrderRecord) -> Self {
        Self {
            order: StorefrontOrderBody {
                email: record.email.as_deref(),
                fulfillment_status: &record.fulfillment_status,
                tags: record.key.as_str(),
                line_items: record
                    .line_items
                    .iter()
                    .map(|item| StorefrontLineItem {
                        title: &item.title,
                        quantity: item.quantity,
                        price: item.price,
                    })
                    .collect(),
                total_price: record.total,
                shipping_address: record.shipping.as_ref(),
                billing_address: record.billing.as_ref(),
            },
        }
    }
}

/// Storefront order search result (`orders.json?tag=...`)
#[derive(Debug, Clone, Deserialize)]
pub struct StorefrontOrderList {
    pub orders: Vec<StorefrontOrderSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorefrontOrderSummary {
    pub id: serde_json::Number,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
}

/// Storefront single-order response (create/update)
#[derive(Debug, Clone, Deserialize)]
pub struct StorefrontOrderResponse {
    pub order: StorefrontOrderSummary,
}

/// Storefront product metafields (`products/{id}/metafields.json`)
#[derive(Debug, Clone, Deserialize)]
pub struct StorefrontMetafieldList {
    #[serde(default)]
    pub metafields: Vec<StorefrontMetafield>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorefrontMetafield {
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl StorefrontMetafield {
    /// `true` for a boolean `true` or the string `"true"`
    pub fn is_truthy(&self) -> bool {
        match &self.value {
            serde_json::Value::Bool(b) => *b,
            serde_json::Value::String(s) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{
        LineItemRecord, ProductStatus, ProductVisibility, RecordKey,
    };
    use serde_json::json;

    fn product() -> ProductRecord {
        ProductRecord {
            key: RecordKey::new("tee-S").unwrap(),
            display_name: "Tee Small".into(),
            price: Price::parse("9.1").unwrap(),
            quantity_on_hand: Some(3),
            in_stock: true,
            status: ProductStatus::Enabled,
            visibility: ProductVisibility::CatalogAndSearch,
            attribute_set_id: 4,
            description: Some("<p>Soft</p>".into()),
        }
    }

    #[test]
    fn backoffice_product_shape() {
        let record = product();
        let body = serde_json::to_value(BackofficeProductEnvelope::from(&record)).unwrap();
        assert_eq!(
            body,
            json!({
                "product": {
                    "sku": "tee-S",
                    "name": "Tee Small",
                    "price": "9.10",
                    "status": 1,
                    "visibility": 4,
                    "type_id": "simple",
                    "weight": 1.0,
                    "attribute_set_id": 4,
                    "extension_attributes": {"stock_item": {"qty": 3, "is_in_stock": true}},
                    "custom_attributes": [{"attribute_code": "description", "value": "<p>Soft</p>"}]
                }
            })
        );
    }

    #[test]
    fn storefront_order_shape() {
        let record = OrderRecord {
            key: RecordKey::new("1001").unwrap(),
            display_name: "Order 1001".into(),
            email: Some("jane@example.com".into()),
            fulfillment_status: "unfulfilled".into(),
            line_items: vec![LineItemRecord {
                title: "Mug".into(),
                quantity: 2,
                price: Price::parse("4.5").unwrap(),
            }],
            total: Price::parse("9").unwrap(),
            shipping: None,
            billing: None,
        };
        let body = serde_json::to_value(StorefrontOrderEnvelope::from(&record)).unwrap();
        assert_eq!(body["order"]["tags"], "1001");
        assert_eq!(body["order"]["line_items"][0]["price"], "4.50");
        assert_eq!(body["order"]["total_price"], "9.00");
        assert!(body["order"].get("shipping_address").is_none());
    }

    #[test]
    fn order_status_variants() {
        let plain: BackofficeOrderStatus = serde_json::from_value(json!("processing")).unwrap();
        assert_eq!(plain.into_status().as_deref(), Some("processing"));

        let detailed: BackofficeOrderStatus =
            serde_json::from_value(json!({"status": "complete", "status_label": "Complete"}))
                .unwrap();
        assert_eq!(detailed.into_status().as_deref(), Some("complete"));

        let empty: BackofficeOrderStatus = serde_json::from_value(json!({"status": ""})).unwrap();
        assert_eq!(empty.into_status(), None);
    }
}
