//! Storefront product → one backoffice record per variant

use super::{KEY_SEPARATOR, MapperConfig, MappingResult, MappingWarning, non_empty};
use shared::models::{LooseNumber, ProductStatus, ProductVisibility, VariantEntry};
use shared::{NormalizedRecord, Price, ProductRecord, RecordKey, ShopifyProduct, ShopifyVariant};

pub(super) fn map_product(product: &ShopifyProduct, config: &MapperConfig) -> MappingResult {
    let mut result = MappingResult::default();

    let Some(variants) = product.variants.as_deref() else {
        result.warnings.push(MappingWarning::new(
            product_label(product),
            "product event carries no variant list",
        ));
        return result;
    };

    let Some(handle) = non_empty(product.handle.as_deref()) else {
        // without a handle no variant key can be built
        for (index, _) in variants.iter().enumerate() {
            result.warnings.push(MappingWarning::new(
                format!("{}/variants[{index}]", product_label(product)),
                "product has no handle",
            ));
        }
        return result;
    };

    for (index, entry) in variants.iter().enumerate() {
        let variant = match entry {
            VariantEntry::Variant(v) => v,
            VariantEntry::Malformed(_) => {
                result.warnings.push(MappingWarning::new(
                    format!("{handle}/variants[{index}]"),
                    "variant entry is not an object",
                ));
                continue;
            }
        };

        match map_variant(product, handle, variant, config) {
            Ok(record) => result.records.push(NormalizedRecord::Product(record)),
            Err(reason) => {
                let key = match non_empty(variant.sku.as_deref()) {
                    Some(sku) => format!("{handle}{KEY_SEPARATOR}{sku}"),
                    None => format!("{handle}/variants[{index}]"),
                };
                result.warnings.push(MappingWarning::new(key, reason));
            }
        }
    }

    result
}

fn map_variant(
    product: &ShopifyProduct,
    handle: &str,
    variant: &ShopifyVariant,
    config: &MapperConfig,
) -> Result<ProductRecord, String> {
    let sku = non_empty(variant.sku.as_deref()).ok_or("variant has no sku")?;
    let key = RecordKey::new(format!("{handle}{KEY_SEPARATOR}{sku}"))
        .ok_or("variant key is empty")?;

    let price = parse_price(variant.price.as_ref())?;
    let quantity_on_hand = parse_inventory(variant.inventory_quantity.as_ref())?;

    Ok(ProductRecord {
        key,
        display_name: display_name(product, variant, sku),
        price,
        quantity_on_hand,
        in_stock: quantity_on_hand.is_some_and(|q| q > 0),
        status: ProductStatus::Enabled,
        visibility: ProductVisibility::CatalogAndSearch,
        attribute_set_id: config.attribute_set_id,
        description: non_empty(product.body_html.as_deref()).map(str::to_string),
    })
}

fn parse_price(raw: Option<&LooseNumber>) -> Result<Price, String> {
    let raw = raw.ok_or("variant has no price")?;
    let text = raw
        .as_text()
        .ok_or_else(|| format!("price is not numeric: {raw:?}"))?;
    Price::parse(&text).map_err(|e| e.to_string())
}

/// Absent stays absent; negative counts clamp to zero
fn parse_inventory(raw: Option<&LooseNumber>) -> Result<Option<u32>, String> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let count = raw
        .as_integer()
        .ok_or_else(|| format!("inventory quantity is not a whole number: {raw:?}"))?;
    Ok(Some(u32::try_from(count.max(0)).unwrap_or(u32::MAX)))
}

/// "{product title} {variant title}", falling back to the SKU
fn display_name(product: &ShopifyProduct, variant: &ShopifyVariant, sku: &str) -> String {
    let parts: Vec<&str> = [product.title.as_deref(), variant.title.as_deref()]
        .into_iter()
        .filter_map(non_empty)
        .collect();

    if parts.is_empty() {
        sku.to_string()
    } else {
        parts.join(" ")
    }
}

fn product_label(product: &ShopifyProduct) -> String {
    non_empty(product.handle.as_deref())
        .or(non_empty(product.id.as_deref()))
        .unwrap_or("<unidentified product>")
        .to_string()
}
