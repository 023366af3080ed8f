//! # shop-stripe
//!
//! Stripe Checkout payment strategy for byc-shop.
//!
//! **StripeCheckoutStrategy** implements `shop_core::PaymentStrategy` on top
//! of the Checkout Sessions API:
//! - one line item per order line plus a delivery-fee line
//! - the order id in session metadata
//! - session lookup for client-polled payment confirmation
//! - `Stripe-Signature` webhook verification
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shop_stripe::StripeCheckoutStrategy;
//! use shop_core::PaymentStrategy;
//!
//! let strategy = StripeCheckoutStrategy::from_env()?;
//!
//! let session = strategy.create_checkout(&order, &success_url, &cancel_url).await?;
//! // Redirect the customer to session.checkout_url
//!
//! // Later, in the webhook endpoint:
//! let event = strategy.verify_webhook(&body, signature).await?;
//! ```

pub mod checkout;
pub mod config;
pub mod webhook;

// Re-exports
pub use checkout::StripeCheckoutStrategy;
pub use config::StripeConfig;
pub use webhook::{
    constant_time_compare, print_webhook_setup_instructions, REQUIRED_WEBHOOK_EVENTS,
};
