//! Sync server configuration

use std::str::FromStr;
use std::time::Duration;

use store_client::{StoreConfig, StorefrontStore};

use crate::mapper::DEFAULT_ATTRIBUTE_SET_ID;
use crate::sync::DEFAULT_MAX_CONCURRENCY;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub const DEFAULT_BACKOFFICE_API_VERSION: &str = "V1";
pub const DEFAULT_STOREFRONT_API_VERSION: &str = "2023-04";

/// Sync server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// HTTP port (webhooks, health check)
    pub http_port: u16,
    /// Backoffice REST connection (products, order status)
    pub backoffice: StoreConfig,
    /// Storefront Admin REST connection (orders, metafields)
    pub storefront: StoreConfig,
    /// Bound on concurrently synced records of one event
    pub max_concurrency: usize,
    /// Whether `products/create` events are reconciled
    pub reconcile_on_create: bool,
    /// Only sync products carrying a truthy `is_published` metafield
    pub require_published: bool,
    /// Storefront webhook signing secret; verification is off when unset
    pub webhook_secret: Option<String>,
    /// Attribute set sent with backoffice products
    pub attribute_set_id: u32,
}

impl Config {
    /// Configuration with default policy for the given store connections
    pub fn new(backoffice: StoreConfig, storefront: StoreConfig) -> Self {
        Self {
            environment: "development".into(),
            http_port: 8080,
            backoffice,
            storefront,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            reconcile_on_create: false,
            require_published: false,
            webhook_secret: None,
            attribute_set_id: DEFAULT_ATTRIBUTE_SET_ID,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);
        let environment = env.get(&["ENVIRONMENT"]).unwrap_or_else(|| "development".into());
        let timeout = Duration::from_secs(env.parse(&["HTTP_TIMEOUT_SECS"], 10u64)?);

        let backoffice_url = env
            .get(&["BACKOFFICE_BASE_URL", "BASE_URL"])
            .ok_or("BACKOFFICE_BASE_URL must be set")?;
        let backoffice = StoreConfig::new(
            backoffice_url,
            env.require_secret(&["BACKOFFICE_TOKEN", "URL_TOKEN"], &environment)?,
            env.get(&["BACKOFFICE_API_VERSION"])
                .unwrap_or_else(|| DEFAULT_BACKOFFICE_API_VERSION.into()),
        )
        .with_timeout(timeout);

        let storefront_url = match env.get(&["STOREFRONT_BASE_URL"]) {
            Some(url) => url,
            None => env
                .get(&["STOREFRONT_STORE_NAME", "STORE_NAME"])
                .map(|name| StorefrontStore::base_url_for(&name))
                .ok_or("STOREFRONT_STORE_NAME or STOREFRONT_BASE_URL must be set")?,
        };
        let storefront = StoreConfig::new(
            storefront_url,
            env.require_secret(&["STOREFRONT_TOKEN", "SHOPIFY_TOKEN"], &environment)?,
            env.get(&["STOREFRONT_API_VERSION"])
                .unwrap_or_else(|| DEFAULT_STOREFRONT_API_VERSION.into()),
        )
        .with_timeout(timeout);

        Ok(Self {
            http_port: env.parse(&["HTTP_PORT"], 8080)?,
            max_concurrency: env
                .parse(&["SYNC_MAX_CONCURRENCY"], DEFAULT_MAX_CONCURRENCY)?
                .max(1),
            reconcile_on_create: env.flag(&["RECONCILE_ON_CREATE"])?,
            require_published: env.flag(&["REQUIRE_PUBLISHED"])?,
            webhook_secret: env.get(&["SHOPIFY_WEBHOOK_SECRET"]),
            attribute_set_id: env.parse(&["BACKOFFICE_ATTRIBUTE_SET_ID"], DEFAULT_ATTRIBUTE_SET_ID)?,
            environment,
            backoffice,
            storefront,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

/// Variable lookup; the first non-empty name in an alias list wins
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, names: &[&str]) -> Option<String> {
        names
            .iter()
            .filter_map(|name| (self.0)(name))
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
    }

    fn parse<T>(&self, names: &[&str], default: T) -> Result<T, BoxError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(names) {
            Some(raw) => raw
                .parse::<T>()
                .map_err(|e| format!("{} has invalid value {raw:?}: {e}", names[0]).into()),
            None => Ok(default),
        }
    }

    fn flag(&self, names: &[&str]) -> Result<bool, BoxError> {
        match self.get(names).map(|v| v.to_ascii_lowercase()).as_deref() {
            None | Some("0" | "false" | "no" | "off") => Ok(false),
            Some("1" | "true" | "yes" | "on") => Ok(true),
            Some(other) => Err(format!("{} is not a boolean: {other:?}", names[0]).into()),
        }
    }

    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(&self, names: &[&str], environment: &str) -> Result<String, BoxError> {
        match self.get(names) {
            Some(v) => Ok(v),
            None if environment == "development" => {
                Ok(format!("dev-{}-not-for-production", names[0]))
            }
            None => Err(format!("{} must be set in {environment} environment", names[0]).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(vars: &HashMap<String, String>) -> Result<Config, BoxError> {
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_with_minimal_development_env() {
        let config = from_map(&vars(&[
            ("BACKOFFICE_BASE_URL", "https://shop.example.com"),
            ("STOREFRONT_STORE_NAME", "acme"),
        ]))
        .unwrap();

        assert_eq!(config.http_port, 8080);
        assert_eq!(config.backoffice.api_version, "V1");
        assert_eq!(config.backoffice.timeout, Duration::from_secs(10));
        assert_eq!(config.storefront.base_url, "https://acme.myshopify.com");
        assert_eq!(config.storefront.api_version, "2023-04");
        assert_eq!(config.max_concurrency, 8);
        assert_eq!(config.attribute_set_id, 4);
        assert!(!config.reconcile_on_create);
        assert!(!config.require_published);
        assert!(config.webhook_secret.is_none());
        assert!(config.backoffice.access_token.starts_with("dev-"));
    }

    #[test]
    fn legacy_names_are_accepted() {
        let config = from_map(&vars(&[
            ("BASE_URL", "https://shop.example.com"),
            ("URL_TOKEN", "bo"),
            ("STORE_NAME", "acme"),
            ("SHOPIFY_TOKEN", "sf"),
            ("ENVIRONMENT", "production"),
        ]))
        .unwrap();

        assert_eq!(config.backoffice.base_url, "https://shop.example.com");
        assert_eq!(config.backoffice.access_token, "bo");
        assert_eq!(config.storefront.access_token, "sf");
        assert!(!config.is_development());
    }

    #[test]
    fn secrets_required_outside_development() {
        let err = from_map(&vars(&[
            ("ENVIRONMENT", "production"),
            ("BACKOFFICE_BASE_URL", "https://shop.example.com"),
            ("STOREFRONT_STORE_NAME", "acme"),
            ("STOREFRONT_TOKEN", "sf"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("BACKOFFICE_TOKEN"));
    }

    #[test]
    fn missing_backoffice_url_is_an_error() {
        let err = from_map(&vars(&[("STOREFRONT_STORE_NAME", "acme")])).unwrap_err();
        assert!(err.to_string().contains("BACKOFFICE_BASE_URL"));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = from_map(&vars(&[
            ("BACKOFFICE_BASE_URL", "http://localhost:9000"),
            ("STOREFRONT_BASE_URL", "http://localhost:9001"),
            ("STOREFRONT_STORE_NAME", "ignored"),
            ("HTTP_TIMEOUT_SECS", "3"),
            ("SYNC_MAX_CONCURRENCY", "0"),
            ("RECONCILE_ON_CREATE", "TRUE"),
            ("REQUIRE_PUBLISHED", "1"),
            ("SHOPIFY_WEBHOOK_SECRET", "s3cret"),
            ("BACKOFFICE_ATTRIBUTE_SET_ID", "9"),
        ]))
        .unwrap();

        assert_eq!(config.storefront.base_url, "http://localhost:9001");
        assert_eq!(config.storefront.timeout, Duration::from_secs(3));
        assert_eq!(config.max_concurrency, 1);
        assert!(config.reconcile_on_create);
        assert!(config.require_published);
        assert_eq!(config.webhook_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.attribute_set_id, 9);
    }

    #[test]
    fn malformed_values_are_rejected() {
        let base = [
            ("BACKOFFICE_BASE_URL", "http://localhost:9000"),
            ("STOREFRONT_STORE_NAME", "acme"),
        ];
        for bad in [("HTTP_PORT", "eighty"), ("RECONCILE_ON_CREATE", "maybe")] {
            let mut pairs = base.to_vec();
            pairs.push(bad);
            assert!(from_map(&vars(&pairs)).is_err(), "{bad:?}");
        }
    }
}
