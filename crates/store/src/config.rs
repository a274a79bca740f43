//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `CART_API_URL` - Base URL of the catalog and stock API (default: `http://localhost:3333`)
//! - `CART_STORAGE_PATH` - File backing the local key-value store (default: `rocket-cart.json`)
//! - `CART_STORAGE_KEY` - Slot holding the persisted cart (default: `@RocketShoes:cart`)
//! - `CART_CATALOG_CACHE_TTL_SECS` - Catalog cache lifetime in seconds (default: 300)
//! - `CART_CURRENCY` - ISO 4217 code used to format prices (default: USD)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use rocket_cart_core::CurrencyCode;
use thiserror::Error;
use url::Url;

/// Default slot name for the persisted cart.
pub const DEFAULT_STORAGE_KEY: &str = "@RocketShoes:cart";

const DEFAULT_API_URL: &str = "http://localhost:3333";
const DEFAULT_STORAGE_PATH: &str = "rocket-cart.json";
const DEFAULT_CACHE_TTL_SECS: &str = "300";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart application configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Catalog and stock API settings
    pub api: ApiConfig,
    /// Local persistence settings
    pub storage: StorageConfig,
    /// Currency used when rendering prices
    pub currency: CurrencyCode,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "production", "staging")
    pub sentry_environment: Option<String>,
}

/// Catalog and stock API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL; `/products/{id}` and `/stock/{id}` are resolved against it
    pub base_url: Url,
    /// How long catalog records stay cached
    pub catalog_cache_ttl: Duration,
}

/// Local key-value persistence configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// File holding every storage slot
    pub path: PathBuf,
    /// Slot name of the cart mirror
    pub cart_key: String,
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let base_url = parse_base_url(&env.get_or_default("CART_API_URL", DEFAULT_API_URL))?;
        let ttl_secs = env
            .get_or_default("CART_CATALOG_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CART_CATALOG_CACHE_TTL_SECS".to_string(), e.to_string())
            })?;

        let currency = match env.get_optional("CART_CURRENCY") {
            Some(code) => code.parse::<CurrencyCode>().map_err(|e| {
                ConfigError::InvalidEnvVar("CART_CURRENCY".to_string(), e.to_string())
            })?,
            None => CurrencyCode::default(),
        };

        Ok(Self {
            api: ApiConfig {
                base_url,
                catalog_cache_ttl: Duration::from_secs(ttl_secs),
            },
            storage: StorageConfig {
                path: PathBuf::from(env.get_or_default("CART_STORAGE_PATH", DEFAULT_STORAGE_PATH)),
                cart_key: env.get_or_default("CART_STORAGE_KEY", DEFAULT_STORAGE_KEY),
            },
            currency,
            sentry_dsn: env.get_optional("SENTRY_DSN"),
            sentry_environment: env.get_optional("SENTRY_ENVIRONMENT"),
        })
    }
}

impl ApiConfig {
    /// API configuration for `base_url` with the default cache lifetime.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            catalog_cache_ttl: Duration::from_secs(300),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable, treating empty values as unset.
    fn get_optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get_optional(key)
            .unwrap_or_else(|| default.to_string())
    }
}

/// Parse the API base URL, normalising it to end with a slash so that
/// relative joins keep any path prefix.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidEnvVar("CART_API_URL".to_string(), msg);

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<CartConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CartConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:3333/");
        assert_eq!(config.api.catalog_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.storage.path, PathBuf::from("rocket-cart.json"));
        assert_eq!(config.storage.cart_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.currency, CurrencyCode::USD);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("CART_API_URL", "https://api.example.com/v1"),
            ("CART_STORAGE_PATH", "/tmp/cart.json"),
            ("CART_STORAGE_KEY", "cart"),
            ("CART_CATALOG_CACHE_TTL_SECS", "0"),
            ("CART_CURRENCY", "brl"),
            ("SENTRY_DSN", "https://key@sentry.example.com/1"),
        ])
        .unwrap();

        assert_eq!(config.api.base_url.as_str(), "https://api.example.com/v1/");
        assert_eq!(config.api.catalog_cache_ttl, Duration::ZERO);
        assert_eq!(config.storage.path, PathBuf::from("/tmp/cart.json"));
        assert_eq!(config.storage.cart_key, "cart");
        assert_eq!(config.currency, CurrencyCode::BRL);
        assert!(config.sentry_dsn.is_some());
    }

    #[test]
    fn test_empty_values_fall_back_to_defaults() {
        let config = load(&[("CART_API_URL", ""), ("SENTRY_DSN", "  ")]).unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:3333/");
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_invalid_url() {
        let err = load(&[("CART_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "CART_API_URL"));

        let err = load(&[("CART_API_URL", "ftp://files.example.com")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_invalid_ttl() {
        let err = load(&[("CART_CATALOG_CACHE_TTL_SECS", "-5")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnvVar(ref key, _) if key == "CART_CATALOG_CACHE_TTL_SECS"
        ));
    }

    #[test]
    fn test_invalid_currency() {
        let err = load(&[("CART_CURRENCY", "DOGE")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "CART_CURRENCY"));
    }
}
