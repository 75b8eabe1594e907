//! Storefront Admin REST client (orders, product metafields)
//!
//! Endpoints live under `{base}/admin/api/{version}/`. Orders created here
//! carry the source order id as a tag, which is how they are found again.

use crate::http::{AuthScheme, HttpReply, HttpTransport};
use crate::store::{Platform, RemoteResource, RemoteStore};
use crate::{StoreConfig, StoreError, StoreResult};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use shared::{NormalizedRecord, OrderRecord};
use shared::models::payload::{
    StorefrontMetafieldList, StorefrontOrderEnvelope, StorefrontOrderList,
    StorefrontOrderResponse, StorefrontOrderSummary,
};

/// Header carrying the storefront access token
pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";
/// Metafield that marks a product as ready to sync
pub const PUBLISHED_METAFIELD: &str = "is_published";

const CREATE_ALLOWED: &[StatusCode] = &[StatusCode::OK, StatusCode::CREATED];
const UPDATE_ALLOWED: &[StatusCode] = &[StatusCode::OK];

#[derive(Debug, Clone)]
pub struct StorefrontStore {
    transport: HttpTransport,
    api_version: String,
}

impl StorefrontStore {
    pub fn new(config: &StoreConfig) -> StoreResult<Self> {
        Ok(Self {
            transport: HttpTransport::new(config, AuthScheme::Header(ACCESS_TOKEN_HEADER))?,
            api_version: config.api_version.clone(),
        })
    }

    /// `https://{store}.myshopify.com`
    pub fn base_url_for(store_name: &str) -> String {
        format!("https://{store_name}.myshopify.com")
    }

    fn endpoint(&self, path: &[&str]) -> StoreResult<reqwest::Url> {
        let mut segments = vec!["admin", "api", self.api_version.as_str()];
        segments.extend_from_slice(path);
        self.transport.url(&segments)
    }

    fn order(record: &NormalizedRecord) -> StoreResult<&OrderRecord> {
        record
            .as_order()
            .ok_or(StoreError::Unsupported("storefront only stores order records"))
    }

    fn decode_order(reply: &HttpReply) -> StoreResult<RemoteResource> {
        let response: StorefrontOrderResponse = reply.json("storefront order")?;
        Ok(RemoteResource::new(response.order.id.to_string()))
    }

    /// Whether the product carries a truthy `is_published` metafield
    pub async fn is_published(&self, product_id: &str) -> StoreResult<bool> {
        let url = self.endpoint(&["products", product_id, "metafields.json"])?;
        let reply = self
            .transport
            .send(self.transport.request(Method::GET, url), &[StatusCode::OK])
            .await?;

        let list: StorefrontMetafieldList = reply.json("storefront metafields")?;
        Ok(list
            .metafields
            .iter()
            .any(|m| m.key == PUBLISHED_METAFIELD && m.is_truthy()))
    }
}

/// Tag lists are comma separated; an order without a tag list is trusted
fn carries_tag(order: &StorefrontOrderSummary, tag: &str) -> bool {
    match order.tags.as_deref() {
        Some(tags) => tags.split(',').any(|t| t.trim() == tag),
        None => true,
    }
}

#[async_trait]
impl RemoteStore for StorefrontStore {
    fn platform(&self) -> Platform {
        Platform::Storefront
    }

    async fn fetch_by_key(&self, key: &str) -> StoreResult<Option<RemoteResource>> {
        let file = format!("{key}.json");
        let url = self.endpoint(&["orders", &file])?;
        let reply = self
            .transport
            .send_lookup(self.transport.request(Method::GET, url))
            .await?;

        match reply {
            Some(reply) => Self::decode_order(&reply).map(Some),
            None => Ok(None),
        }
    }

    async fn search_by_tag(&self, tag: &str) -> StoreResult<Vec<RemoteResource>> {
        let mut url = self.endpoint(&["orders.json"])?;
        url.query_pairs_mut()
            .append_pair("tag", tag)
            .append_pair("status", "any");

        let reply = self
            .transport
            .send(self.transport.request(Method::GET, url), &[StatusCode::OK])
            .await?;

        let list: StorefrontOrderList = reply.json("storefront order search")?;
        Ok(list
            .orders
            .iter()
            .filter(|order| carries_tag(order, tag))
            .map(|order| RemoteResource::new(order.id.to_string()))
            .collect())
    }

    async fn create(&self, record: &NormalizedRecord) -> StoreResult<RemoteResource> {
        let order = Self::order(record)?;
        let url = self.endpoint(&["orders.json"])?;
        let request = self
            .transport
            .request(Method::POST, url)
            .json(&StorefrontOrderEnvelope::from(order));

        let reply = self.transport.send(request, CREATE_ALLOWED).await?;
        let created = Self::decode_order(&reply)?;
        tracing::info!(order_id = %order.key, remote_id = %created.id, "Storefront order created");
        Ok(created)
    }

    async fn update(&self, remote_id: &str, record: &NormalizedRecord) -> StoreResult<RemoteResource> {
        let order = Self::order(record)?;
        let file = format!("{remote_id}.json");
        let url = self.endpoint(&["orders", &file])?;
        let request = self
            .transport
            .request(Method::PUT, url)
            .json(&StorefrontOrderEnvelope::from(order));

        let reply = self.transport.send(request, UPDATE_ALLOWED).await?;
        let updated = Self::decode_order(&reply)?;
        tracing::info!(order_id = %order.key, remote_id = %updated.id, "Storefront order updated");
        Ok(updated)
    }
}
