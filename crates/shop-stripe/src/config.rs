//! # Stripe Configuration
//!
//! All secrets are loaded from environment variables. Online payments are
//! optional: without `STRIPE_SECRET_KEY` the shop runs with bank transfer
//! and pay on delivery only.

use shop_core::ShopError;
use std::env;

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";
const DEFAULT_API_VERSION: &str = "2024-12-18.acacia";

/// Stripe API configuration
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_test_... or sk_live_...)
    pub secret_key: String,

    /// Publishable key handed to the storefront, if configured
    pub publishable_key: Option<String>,

    /// Webhook signing secret (whsec_...)
    pub webhook_secret: String,

    /// API base URL (overridden in tests)
    pub api_base_url: String,

    pub api_version: String,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("mode", &if self.is_live_mode() { "live" } else { "test" })
            .field("api_base_url", &self.api_base_url)
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl StripeConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `STRIPE_SECRET_KEY`
    /// - `STRIPE_WEBHOOK_SECRET`
    ///
    /// Optional: `STRIPE_PUBLISHABLE_KEY`
    pub fn from_env() -> Result<Self, ShopError> {
        dotenvy::dotenv().ok();

        let secret_key = env::var("STRIPE_SECRET_KEY").map_err(|_| {
            ShopError::Configuration("STRIPE_SECRET_KEY not set".to_string())
        })?;
        let webhook_secret = env::var("STRIPE_WEBHOOK_SECRET").map_err(|_| {
            ShopError::Configuration("STRIPE_WEBHOOK_SECRET not set".to_string())
        })?;
        let publishable_key = env::var("STRIPE_PUBLISHABLE_KEY")
            .ok()
            .filter(|k| !k.is_empty());

        let config = Self {
            secret_key,
            publishable_key,
            webhook_secret,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Like [`from_env`](Self::from_env), but `Ok(None)` when no secret key
    /// is configured at all
    pub fn from_env_optional() -> Result<Option<Self>, ShopError> {
        dotenvy::dotenv().ok();
        match env::var("STRIPE_SECRET_KEY") {
            Ok(key) if !key.is_empty() => Self::from_env().map(Some),
            _ => Ok(None),
        }
    }

    /// Create config with explicit values (for testing)
    pub fn new(secret_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            publishable_key: None,
            webhook_secret: webhook_secret.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    fn validate(&self) -> Result<(), ShopError> {
        if !self.secret_key.starts_with("sk_test_") && !self.secret_key.starts_with("sk_live_") {
            return Err(ShopError::Configuration(
                "STRIPE_SECRET_KEY must start with sk_test_ or sk_live_".to_string(),
            ));
        }
        if let Some(key) = &self.publishable_key {
            if !key.starts_with("pk_test_") && !key.starts_with("pk_live_") {
                return Err(ShopError::Configuration(
                    "STRIPE_PUBLISHABLE_KEY must start with pk_test_ or pk_live_".to_string(),
                ));
            }
        }
        if !self.webhook_secret.starts_with("whsec_") {
            return Err(ShopError::Configuration(
                "STRIPE_WEBHOOK_SECRET must start with whsec_".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_test_mode(&self) -> bool {
        self.secret_key.starts_with("sk_test_")
    }

    pub fn is_live_mode(&self) -> bool {
        self.secret_key.starts_with("sk_live_")
    }

    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.secret_key)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modes() {
        let config = StripeConfig::new("sk_test_abc123", "whsec_secret");
        assert!(config.is_test_mode());
        assert!(!config.is_live_mode());
        assert!(config.validate().is_ok());

        let config = StripeConfig::new("sk_live_abc123", "whsec_secret");
        assert!(config.is_live_mode());
    }

    #[test]
    fn test_validation() {
        assert!(StripeConfig::new("rk_abc", "whsec_secret").validate().is_err());
        assert!(StripeConfig::new("sk_test_abc", "secret").validate().is_err());

        let mut config = StripeConfig::new("sk_test_abc", "whsec_secret");
        config.publishable_key = Some("nope".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_auth_header() {
        let config = StripeConfig::new("sk_test_abc123", "whsec_secret");
        assert_eq!(config.auth_header(), "Bearer sk_test_abc123");
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = StripeConfig::new("sk_test_abc123", "whsec_secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk_test_abc123"));
        assert!(!debug.contains("whsec_secret"));
    }
}
