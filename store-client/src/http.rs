//! HTTP transport shared by both platform clients

use crate::{StoreConfig, StoreError, StoreResult};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

const APPLICATION_JSON: &str = "application/json";

/// How a platform expects its token
#[derive(Debug, Clone)]
pub enum AuthScheme {
    /// `Authorization: Bearer {token}`
    Bearer,
    /// Token in a platform-specific header
    Header(&'static str),
}

/// A response whose status was inside the allowlist
#[derive(Debug)]
pub struct HttpReply {
    pub status: StatusCode,
    pub body: String,
}

impl HttpReply {
    pub fn json<T: DeserializeOwned>(&self, context: &str) -> StoreResult<T> {
        serde_json::from_str(&self.body).map_err(|e| StoreError::decode(context, e))
    }
}

/// Authenticated JSON transport with a mandatory timeout
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    token: String,
    auth: AuthScheme,
}

impl HttpTransport {
    /// Build a transport from configuration
    pub fn new(config: &StoreConfig, auth: AuthScheme) -> StoreResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(config.base_url.clone()));
        }

        Ok(Self {
            client,
            base_url,
            token: config.access_token.clone(),
            auth,
        })
    }

    /// Join percent-encoded path segments onto the base URL
    pub fn url<S: AsRef<str>>(&self, segments: &[S]) -> StoreResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Build an authenticated JSON request
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))
            .header(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));

        match self.auth {
            AuthScheme::Bearer => request.header(AUTHORIZATION, format!("Bearer {}", self.token)),
            AuthScheme::Header(name) => request.header(name, &self.token),
        }
    }

    /// Send a request; statuses outside `allowed` become [`StoreError::Status`]
    pub async fn send(&self, request: RequestBuilder, allowed: &[StatusCode]) -> StoreResult<HttpReply> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(status = status.as_u16(), body_len = body.len(), "Remote response");

        if !allowed.contains(&status) {
            return Err(StoreError::status(status, &body));
        }

        Ok(HttpReply { status, body })
    }

    /// Send a lookup; `404` yields `Ok(None)` instead of an error
    pub async fn send_lookup(&self, request: RequestBuilder) -> StoreResult<Option<HttpReply>> {
        match self.send(request, &[StatusCode::OK]).await {
            Ok(reply) => Ok(Some(reply)),
            Err(StoreError::Status { status, .. }) if status == StatusCode::NOT_FOUND => Ok(None),
            Err(e) => Err(e),
        }
    }
}
