//! # shop-api
//!
//! HTTP API layer for byc-shop.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints for accounts, catalog, carts, wishlists and orders
//! - Bearer-token auth with seller-only admin routes
//! - The Stripe webhook endpoint
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/user/register`, `/api/user/login` | Customer tokens |
//! | POST | `/api/admin/login` | Seller token |
//! | GET | `/api/product` | List products |
//! | POST | `/api/order/create` | Bank transfer / pay on delivery order |
//! | POST | `/api/order/stripe` | Online Payment order + checkout URL |
//! | POST | `/api/order/verify-payment` | Confirm after checkout redirect |
//! | PATCH | `/api/order/{id}/mark-paid` | Seller confirms a bank transfer |
//! | PATCH | `/api/order/{id}/cancel` | Cancel a pending order |
//! | POST | `/webhook/stripe` | Stripe webhook |

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::AppConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
