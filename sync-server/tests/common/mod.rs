//! Shared helpers: app wired against mock remotes

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use std::time::Duration;
use store_client::StoreConfig;
use sync_server::{AppState, Config, api};
use tower::ServiceExt;
use wiremock::MockServer;

pub const BACKOFFICE_PREFIX: &str = "/rest/V1";
pub const STOREFRONT_PREFIX: &str = "/admin/api/2023-04";

pub struct Remotes {
    pub backoffice: MockServer,
    pub storefront: MockServer,
}

impl Remotes {
    pub async fn start() -> Self {
        Self {
            backoffice: MockServer::start().await,
            storefront: MockServer::start().await,
        }
    }

    pub fn config(&self) -> Config {
        Config::new(
            StoreConfig::new(self.backoffice.uri(), "bo-token", "V1")
                .with_timeout(Duration::from_secs(2)),
            StoreConfig::new(self.storefront.uri(), "sf-token", "2023-04")
                .with_timeout(Duration::from_secs(2)),
        )
    }

    pub fn app(&self) -> Router {
        self.app_with(self.config())
    }

    pub fn app_with(&self, config: Config) -> Router {
        api::create_router(AppState::new(&config).unwrap())
    }
}

pub async fn post_json(
    app: Router,
    uri: &str,
    headers: &[(&str, &str)],
    body: impl Into<Body>,
) -> (StatusCode, serde_json::Value) {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        request = request.header(*name, *value);
    }

    let response = app
        .oneshot(request.body(body.into()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}
