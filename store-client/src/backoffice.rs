//! Backoffice REST client (products, order status)
//!
//! Endpoints live under `{base}/rest/{version}/`. Products are addressed by
//! SKU, so the remote id of a product is its key.

use crate::http::{AuthScheme, HttpTransport};
use crate::store::{FulfillmentSource, Platform, RemoteResource, RemoteStore};
use crate::{StoreConfig, StoreError, StoreResult};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use shared::NormalizedRecord;
use shared::ProductRecord;
use shared::models::payload::{
    BackofficeOrderStatus, BackofficeProductEnvelope, BackofficeProductResponse,
};

const CREATE_ALLOWED: &[StatusCode] = &[StatusCode::OK, StatusCode::CREATED];
const UPDATE_ALLOWED: &[StatusCode] = &[StatusCode::OK];

#[derive(Debug, Clone)]
pub struct BackofficeStore {
    transport: HttpTransport,
    api_version: String,
}

impl BackofficeStore {
    pub fn new(config: &StoreConfig) -> StoreResult<Self> {
        Ok(Self {
            transport: HttpTransport::new(config, AuthScheme::Bearer)?,
            api_version: config.api_version.clone(),
        })
    }

    fn endpoint(&self, path: &[&str]) -> StoreResult<reqwest::Url> {
        let mut segments = vec!["rest", self.api_version.as_str()];
        segments.extend_from_slice(path);
        self.transport.url(&segments)
    }

    fn product(record: &NormalizedRecord) -> StoreResult<&ProductRecord> {
        record
            .as_product()
            .ok_or(StoreError::Unsupported("backoffice only stores product records"))
    }

    fn decode_product(reply: &crate::http::HttpReply, fallback_sku: &str) -> StoreResult<RemoteResource> {
        let product: BackofficeProductResponse = reply.json("backoffice product")?;
        if product.sku.is_empty() {
            return Ok(RemoteResource::new(fallback_sku));
        }
        Ok(RemoteResource::new(product.sku))
    }
}

#[async_trait]
impl RemoteStore for BackofficeStore {
    fn platform(&self) -> Platform {
        Platform::Backoffice
    }

    async fn fetch_by_key(&self, key: &str) -> StoreResult<Option<RemoteResource>> {
        let url = self.endpoint(&["products", key])?;
        let reply = self
            .transport
            .send_lookup(self.transport.request(Method::GET, url))
            .await?;

        // existence alone decides, the body is not inspected
        Ok(reply.map(|_| RemoteResource::new(key)))
    }

    async fn create(&self, record: &NormalizedRecord) -> StoreResult<RemoteResource> {
        let product = Self::product(record)?;
        let url = self.endpoint(&["products"])?;
        let request = self
            .transport
            .request(Method::POST, url)
            .json(&BackofficeProductEnvelope::from(product));

        let reply = self.transport.send(request, CREATE_ALLOWED).await?;
        tracing::info!(sku = %product.key, "Backoffice product created");
        Self::decode_product(&reply, product.key.as_str())
    }

    async fn update(&self, remote_id: &str, record: &NormalizedRecord) -> StoreResult<RemoteResource> {
        let product = Self::product(record)?;
        let url = self.endpoint(&["products", remote_id])?;
        let request = self
            .transport
            .request(Method::PUT, url)
            .json(&BackofficeProductEnvelope::from(product));

        let reply = self.transport.send(request, UPDATE_ALLOWED).await?;
        tracing::info!(sku = %product.key, "Backoffice product updated");
        Self::decode_product(&reply, remote_id)
    }
}

#[async_trait]
impl FulfillmentSource for BackofficeStore {
    async fn fulfillment_status(&self, order_id: &str) -> StoreResult<Option<String>> {
        let url = self.endpoint(&["orders", order_id, "status"])?;
        let reply = self
            .transport
            .send_lookup(self.transport.request(Method::GET, url))
            .await?;

        match reply {
            Some(reply) => Ok(reply
                .json::<BackofficeOrderStatus>("backoffice order status")?
                .into_status()),
            None => Ok(None),
        }
    }
}
