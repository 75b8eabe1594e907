//! Backoffice order → a single storefront order record
//!
//! Line items are not synchronized on their own; they travel inside the
//! order record. Any malformed line item drops the whole order.

use super::{MappingResult, MappingWarning, non_empty};
use shared::models::record::DEFAULT_FULFILLMENT_STATUS;
use shared::models::{AddressRecord, BackofficeAddress, BackofficeLineItem, LineItemRecord};
use shared::{BackofficeOrder, NormalizedRecord, OrderRecord, Price, RecordKey};

pub(super) fn map_order(order: &BackofficeOrder) -> MappingResult {
    let mut result = MappingResult::default();

    let Some(key) = non_empty(order.order_id.as_deref()).and_then(RecordKey::new) else {
        result.warnings.push(MappingWarning::new(
            "<unidentified order>",
            "order has no id",
        ));
        return result;
    };

    match build_order(key.clone(), order) {
        Ok(record) => result.records.push(NormalizedRecord::Order(record)),
        Err(reason) => result.warnings.push(MappingWarning::new(key.as_str(), reason)),
    }
    result
}

fn build_order(key: RecordKey, order: &BackofficeOrder) -> Result<OrderRecord, String> {
    let line_items = order
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| map_line_item(index, item))
        .collect::<Result<Vec<_>, _>>()?;

    let total = line_items
        .iter()
        .try_fold(Price::ZERO, |total, item| {
            item.price
                .times(item.quantity)
                .and_then(|line| total.checked_add(line))
        })
        .map_err(|e| format!("order total: {e}"))?;

    Ok(OrderRecord {
        display_name: format!("Order {key}"),
        key,
        email: non_empty(order.customer_email.as_deref()).map(str::to_string),
        fulfillment_status: DEFAULT_FULFILLMENT_STATUS.to_string(),
        line_items,
        total,
        shipping: order.shipping.as_ref().map(map_address),
        billing: order.billing.as_ref().map(map_address),
    })
}

fn map_line_item(index: usize, item: &BackofficeLineItem) -> Result<LineItemRecord, String> {
    let price = item
        .price
        .as_ref()
        .ok_or_else(|| format!("line item {index} has no price"))?;
    let price = price
        .as_text()
        .ok_or_else(|| format!("line item {index} price is not numeric: {price:?}"))
        .and_then(|text| Price::parse(&text).map_err(|e| format!("line item {index} {e}")))?;

    // a missing quantity means one unit
    let quantity = match &item.quantity {
        None => 1,
        Some(raw) => raw
            .as_integer()
            .and_then(|q| u32::try_from(q).ok())
            .ok_or_else(|| format!("line item {index} quantity is invalid: {raw:?}"))?,
    };

    Ok(LineItemRecord {
        title: non_empty(item.name.as_deref()).unwrap_or_default().to_string(),
        quantity,
        price,
    })
}

fn map_address(address: &BackofficeAddress) -> AddressRecord {
    let text = |v: &Option<String>| non_empty(v.as_deref()).map(str::to_string);
    AddressRecord {
        first_name: text(&address.firstname),
        last_name: text(&address.lastname),
        address1: text(&address.street),
        city: text(&address.city),
        province: text(&address.region),
        zip: text(&address.postcode),
        country: text(&address.country_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: serde_json::Value) -> MappingResult {
        map_order(&serde_json::from_value(value).unwrap())
    }

    #[test]
    fn order_maps_to_exactly_one_record() {
        let result = map(json!({
            "OrderID": "1001",
            "CustomerEmail": "jane@example.com",
            "Items": [
                {"Name": "Mug", "Quantity": 2, "Price": "4.5"},
                {"Name": "Tee", "Quantity": "1", "Price": 12}
            ],
            "Shipping": {"Firstname": "Jane", "Lastname": "Doe", "Street": "1 Main St",
                         "City": "Springfield", "Region": "IL", "Postcode": "62701",
                         "CountryID": "US"}
        }));

        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
        assert_eq!(result.records.len(), 1);

        let order = result.records[0].as_order().unwrap();
        assert_eq!(order.key.as_str(), "1001");
        assert_eq!(order.email.as_deref(), Some("jane@example.com"));
        assert_eq!(order.fulfillment_status, "unfulfilled");
        assert_eq!(order.line_items.len(), 2);
        assert_eq!(order.line_items[0].price.to_string(), "4.50");
        assert_eq!(order.total.to_string(), "21.00");

        let shipping = order.shipping.as_ref().unwrap();
        assert_eq!(shipping.address1.as_deref(), Some("1 Main St"));
        assert_eq!(shipping.province.as_deref(), Some("IL"));
        assert_eq!(shipping.country.as_deref(), Some("US"));
        assert!(order.billing.is_none());
    }

    #[test]
    fn numeric_order_id_is_accepted() {
        let result = map(json!({"order_id": 1001, "items": []}));
        let order = result.records[0].as_order().unwrap();
        assert_eq!(order.key.as_str(), "1001");
        assert_eq!(order.total, Price::ZERO);
    }

    #[test]
    fn missing_order_id_is_a_warning() {
        let result = map(json!({"CustomerEmail": "jane@example.com"}));
        assert!(result.records.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].reason, "order has no id");

        let blank = map(json!({"OrderID": " "}));
        assert!(blank.records.is_empty());
    }

    #[test]
    fn malformed_line_item_price_drops_the_order() {
        let result = map(json!({
            "OrderID": "1001",
            "Items": [{"Name": "Mug", "Quantity": 1, "Price": "cheap"}]
        }));
        assert!(result.records.is_empty());
        assert_eq!(result.warnings[0].key, "1001");
        assert!(result.warnings[0].reason.contains("line item 0"));
    }

    #[test]
    fn line_item_quantity_rules() {
        let defaulted = map(json!({"OrderID": "1", "Items": [{"Name": "Mug", "Price": "3"}]}));
        assert_eq!(defaulted.records[0].as_order().unwrap().line_items[0].quantity, 1);

        let negative = map(json!({
            "OrderID": "1",
            "Items": [{"Name": "Mug", "Quantity": -1, "Price": "3"}]
        }));
        assert!(negative.records.is_empty());
        assert_eq!(negative.warnings.len(), 1);
    }

    #[test]
    fn overflowing_total_drops_the_order() {
        let result = map(json!({
            "OrderID": "1001",
            "Items": [{"Quantity": 4000000000u32, "Price": "100000000000000000000"}]
        }));
        assert!(result.records.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].key, "1001");
        assert!(result.warnings[0].reason.starts_with("order total"));
    }
}
