//! # Application State
//!
//! Shared state for the Axum application: configuration, the document
//! store, the order service and the optional payment strategy.

use crate::auth::TokenKeys;
use crate::config::AppConfig;
use shop_core::{
    BoxedPaymentStrategy, CheckoutUrls, InMemoryStore, OrderService, SeedCatalog, SharedStore,
};
use shop_stripe::{StripeCheckoutStrategy, StripeConfig};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: SharedStore,
    pub orders: Arc<OrderService>,
    /// `None` when Stripe is not configured
    pub payments: Option<BoxedPaymentStrategy>,
    pub tokens: TokenKeys,
}

impl AppState {
    /// Build state from the environment, loading the seed catalog if one is found
    pub async fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let payments = match StripeConfig::from_env_optional()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?
        {
            Some(stripe) => {
                let strategy = StripeCheckoutStrategy::new(stripe)
                    .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;
                Some(Arc::new(strategy) as BoxedPaymentStrategy)
            }
            None => {
                tracing::warn!("STRIPE_SECRET_KEY not set, online payments disabled");
                None
            }
        };

        let store = InMemoryStore::new().shared();
        if let Some(catalog) = load_seed_catalog(config.catalog_path.as_deref())? {
            let count = catalog.load_into(store.as_ref()).await?;
            tracing::info!("Seeded {} products", count);
        }

        Ok(Self::with_parts(config, store, payments))
    }

    /// Assemble state from explicit parts (for testing)
    pub fn with_parts(
        config: AppConfig,
        store: SharedStore,
        payments: Option<BoxedPaymentStrategy>,
    ) -> Self {
        let urls = CheckoutUrls::new(&config.frontend_url);
        let mut orders = OrderService::new(store.clone(), urls, config.currency);
        if let Some(strategy) = &payments {
            orders = orders.with_payments(strategy.clone());
        }

        Self {
            tokens: TokenKeys::new(&config.jwt_secret),
            config: Arc::new(config),
            store,
            orders: Arc::new(orders),
            payments,
        }
    }
}

/// Load the seed catalog from an explicit path, or search the usual spots
fn load_seed_catalog(explicit: Option<&str>) -> anyhow::Result<Option<SeedCatalog>> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path, e))?;
        return Ok(Some(parse_catalog(path, &content)?));
    }

    let config_paths = [
        "config/catalog.toml",
        "../config/catalog.toml",
        "../../config/catalog.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            return Ok(Some(parse_catalog(path, &content)?));
        }
    }

    tracing::warn!("No seed catalog found, starting with an empty store");
    Ok(None)
}

fn parse_catalog(path: &str, content: &str) -> anyhow::Result<SeedCatalog> {
    let catalog = SeedCatalog::from_toml(content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
    tracing::info!(
        "Loaded {} products, {} categories from {}",
        catalog.products.len(),
        catalog.categories.len(),
        path
    );
    Ok(catalog)
}
