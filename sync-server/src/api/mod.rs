//! API routes for the sync server

pub mod health;
pub mod signature;
pub mod webhook;

use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use http::HeaderName;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// Upper bound on webhook requests processed at once
const MAX_CONCURRENT_REQUESTS: usize = 64;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Create the router
pub fn create_router(state: AppState) -> Router {
    // Webhooks (raw body, product events optionally signature-verified)
    let webhooks = Router::new()
        .route("/webhooks/products", post(webhook::handle_product_webhook))
        .route("/webhooks/orders", post(webhook::handle_order_webhook))
        .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(webhooks)
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        // Request ID - Generate unique ID for each request
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            MakeRequestUuid,
        ))
        // Propagate request ID to response
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .with_state(state)
}
