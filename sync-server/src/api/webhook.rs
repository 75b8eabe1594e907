//! Webhook handlers
//!
//! POST /webhooks/products: storefront product events (raw body for signature verification)
//! POST /webhooks/orders:   backoffice order events
//!
//! Every request that decodes answers 200 with the sync outcome in the body,
//! including partial and total failures.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;

use shared::models::OutcomeStatus;
use shared::{BackofficeOrder, ShopifyProduct, SourceEvent, SyncOutcome};

use super::signature::{HMAC_HEADER, verify_webhook_signature};
use crate::error::{ServiceError, ServiceResult};
use crate::state::AppState;
use crate::sync::sync_event;

/// Header naming the storefront webhook topic
pub const TOPIC_HEADER: &str = "x-shopify-topic";

/// Product webhook topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductTopic {
    Create,
    Update,
    Other(String),
}

impl ProductTopic {
    /// `products/create`, `products/update` or the bare verbs; a missing
    /// topic is treated as an update
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
            return Self::Update;
        };
        match raw.strip_prefix("products/").unwrap_or(raw) {
            "create" => Self::Create,
            "update" => Self::Update,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "products/create",
            Self::Update => "products/update",
            Self::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookStatus {
    Ok,
    Partial,
    Failed,
    /// Valid event that policy chose not to sync
    Skipped,
    /// Topic this endpoint does not handle
    Ignored,
}

impl From<OutcomeStatus> for WebhookStatus {
    fn from(status: OutcomeStatus) -> Self {
        match status {
            OutcomeStatus::Ok => Self::Ok,
            OutcomeStatus::Partial => Self::Partial,
            OutcomeStatus::Failed => Self::Failed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookResponse {
    pub status: WebhookStatus,
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<SyncOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WebhookResponse {
    fn synced(topic: &str, outcome: SyncOutcome) -> Self {
        Self {
            status: outcome.status().into(),
            topic: topic.to_string(),
            outcome: Some(outcome),
            message: None,
        }
    }

    fn without_sync(status: WebhookStatus, topic: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            topic: topic.to_string(),
            outcome: None,
            message: Some(message.into()),
        }
    }
}

/// Handle storefront product events
pub async fn handle_product_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ServiceResult<Json<WebhookResponse>> {
    verify_signature(&state, &headers, &body)?;

    let topic = ProductTopic::parse(header(&headers, TOPIC_HEADER));
    match &topic {
        ProductTopic::Other(raw) => {
            tracing::debug!(topic = %raw, "Unhandled product webhook topic");
            return Ok(Json(WebhookResponse::without_sync(
                WebhookStatus::Ignored,
                topic.as_str(),
                "topic not handled",
            )));
        }
        ProductTopic::Create if !state.policy.reconcile_on_create => {
            return Ok(Json(WebhookResponse::without_sync(
                WebhookStatus::Skipped,
                topic.as_str(),
                "create events are not reconciled",
            )));
        }
        _ => {}
    }

    let product: ShopifyProduct = decode_envelope(&body, "product")?;
    tracing::info!(
        topic = topic.as_str(),
        product_id = product.id.as_deref().unwrap_or("-"),
        handle = product.handle.as_deref().unwrap_or("-"),
        "Received product webhook"
    );

    if state.policy.require_published {
        if let Some(response) = publish_gate(&state, &topic, &product).await {
            return Ok(Json(response));
        }
    }

    let outcome = sync_event(&state.mapper, &state.product_sync, &SourceEvent::Product(product)).await;
    log_outcome(topic.as_str(), &outcome);
    Ok(Json(WebhookResponse::synced(topic.as_str(), outcome)))
}

/// Handle backoffice order events
pub async fn handle_order_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> ServiceResult<Json<WebhookResponse>> {
    const TOPIC: &str = "orders/sync";

    let order: BackofficeOrder = decode_envelope(&body, "order")?;
    tracing::info!(
        order_id = order.order_id.as_deref().unwrap_or("-"),
        items = order.items.len(),
        "Received order webhook"
    );

    let outcome = sync_event(&state.mapper, &state.order_sync, &SourceEvent::Order(order)).await;
    log_outcome(TOPIC, &outcome);
    Ok(Json(WebhookResponse::synced(TOPIC, outcome)))
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn verify_signature(state: &AppState, headers: &HeaderMap, body: &[u8]) -> ServiceResult<()> {
    let Some(secret) = state.webhook_secret.as_deref() else {
        return Ok(());
    };

    let Some(signature) = header(headers, HMAC_HEADER) else {
        tracing::warn!("Missing webhook signature header");
        return Err(ServiceError::Unauthorized);
    };

    verify_webhook_signature(body, signature, secret).map_err(|e| {
        tracing::warn!(error = e, "Webhook signature verification failed");
        ServiceError::Unauthorized
    })
}

/// Accepts the bare document or one wrapped as `{"<wrapper>": {...}}`
fn decode_envelope<T: DeserializeOwned>(body: &[u8], wrapper: &str) -> ServiceResult<T> {
    let mut value: serde_json::Value = serde_json::from_slice(body)?;

    let wrapped = value
        .as_object_mut()
        .filter(|obj| obj.len() == 1)
        .and_then(|obj| obj.remove(wrapper));
    let document = match wrapped {
        Some(inner) => inner,
        None => value,
    };

    if !document.is_object() {
        return Err(ServiceError::BadRequest(format!("{wrapper} must be a JSON object")));
    }
    Ok(serde_json::from_value(document)?)
}

/// `Some` when the product must not be synced
async fn publish_gate(
    state: &AppState,
    topic: &ProductTopic,
    product: &ShopifyProduct,
) -> Option<WebhookResponse> {
    let Some(product_id) = product.id.as_deref() else {
        return Some(WebhookResponse::without_sync(
            WebhookStatus::Failed,
            topic.as_str(),
            "product has no id, publish state unknown",
        ));
    };

    match state.storefront.is_published(product_id).await {
        Ok(true) => None,
        Ok(false) => {
            tracing::info!(product_id, "Product not published, skipping sync");
            Some(WebhookResponse::without_sync(
                WebhookStatus::Skipped,
                topic.as_str(),
                "product is not published",
            ))
        }
        Err(e) => {
            tracing::warn!(product_id, error = %e, "Publish state check failed");
            Some(WebhookResponse::without_sync(
                WebhookStatus::Failed,
                topic.as_str(),
                format!("publish state check failed: {e}"),
            ))
        }
    }
}

fn log_outcome(topic: &str, outcome: &SyncOutcome) {
    if outcome.is_total_failure() {
        tracing::error!(
            topic,
            attempted = outcome.attempted,
            "Sync failed for every record"
        );
    } else {
        tracing::info!(
            topic,
            attempted = outcome.attempted,
            succeeded = outcome.succeeded,
            failed = outcome.failed(),
            "Sync finished"
        );
    }
}
