//! # Application Configuration
//!
//! Loaded once at startup from environment variables (and `.env` via
//! dotenvy). Stripe settings live in `shop_stripe::StripeConfig`.

use anyhow::Context;
use shop_core::Currency;
use std::env;
use std::net::SocketAddr;

const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";

/// Application configuration
#[derive(Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Storefront origin; checkout redirects land here
    pub frontend_url: String,
    /// HS256 signing key for bearer tokens
    pub jwt_secret: String,
    /// Seller account for `/api/admin/login`
    pub seller_email: Option<String>,
    pub seller_password: Option<String>,
    /// Exact origins, or `*.example.com` suffix patterns
    pub cors_allowed_origins: Vec<String>,
    pub currency: Currency,
    /// Explicit seed catalog path; searched for when unset
    pub catalog_path: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("frontend_url", &self.frontend_url)
            .field("seller_email", &self.seller_email)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("currency", &self.currency)
            .field("catalog_path", &self.catalog_path)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Load from environment variables.
    ///
    /// `JWT_SECRET` is required; everything else has a development default.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .context("JWT_SECRET must be set")?;

        let port = match env::var("PORT") {
            Ok(p) => p
                .parse()
                .with_context(|| format!("PORT is not a valid port: {}", p))?,
            Err(_) => 4800,
        };

        let currency = match env::var("STORE_CURRENCY") {
            Ok(c) => c.parse().map_err(anyhow::Error::msg)?,
            Err(_) => Currency::USD,
        };

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_else(|_| vec![DEFAULT_FRONTEND_URL.to_string()]);

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string()),
            jwt_secret,
            seller_email: non_empty_var("SELLER_EMAIL"),
            seller_password: non_empty_var("SELLER_PASSWORD"),
            cors_allowed_origins,
            currency,
            catalog_path: non_empty_var("CATALOG_PATH"),
        })
    }

    /// Development defaults around an explicit signing key (for testing)
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4800,
            environment: "development".to_string(),
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            jwt_secret: jwt_secret.into(),
            seller_email: None,
            seller_password: None,
            cors_allowed_origins: vec![DEFAULT_FRONTEND_URL.to_string()],
            currency: Currency::USD,
            catalog_path: None,
        }
    }

    /// Builder: set the seller credentials
    pub fn with_seller(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.seller_email = Some(email.into());
        self.seller_password = Some(password.into());
        self
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Whether a browser origin may call the API
    pub fn origin_allowed(&self, origin: &str) -> bool {
        self.cors_allowed_origins.iter().any(|allowed| {
            if allowed == "*" {
                return true;
            }
            match allowed.strip_prefix("*.") {
                Some(suffix) => origin
                    .split_once("://")
                    .map(|(_, host)| host)
                    .unwrap_or(origin)
                    .ends_with(&format!(".{}", suffix)),
                None => allowed == origin,
            }
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect()
}
