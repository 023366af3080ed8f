//! # byc-shop
//!
//! Storefront backend: catalog, carts, orders and Stripe checkout.
//!
//! ## Usage
//!
//! ```bash
//! # Required
//! export JWT_SECRET=...
//! export SELLER_EMAIL=seller@byc.shop
//! export SELLER_PASSWORD=...
//!
//! # Optional, enables Online Payment orders
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_WEBHOOK_SECRET=whsec_...
//!
//! # Run the server
//! byc-shop
//! ```

use shop_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let state = AppState::new().await?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Currency: {}", state.config.currency);
    info!(
        "Online payments: {}",
        if state.orders.online_payments_enabled() { "stripe" } else { "disabled" }
    );

    let app = routes::create_router(state);

    info!("🛍️  byc-shop starting on http://{}", addr);

    if !is_prod {
        info!("📝 Health: http://{}/health", addr);
        info!("🧾 Orders: POST http://{}/api/order/create", addr);
        info!("🔔 Webhook: POST http://{}/webhook/stripe", addr);
        shop_stripe::print_webhook_setup_instructions(&format!("http://{}/webhook/stripe", addr));
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  🛍️  byc-shop 🛍️
  ━━━━━━━━━━━━━━━━━━━━━━━
  Storefront backend
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
