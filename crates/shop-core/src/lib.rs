//! # shop-core
//!
//! Core types and traits for the byc-shop backend.
//!
//! This crate provides:
//! - Catalog, cart, user, blog and order documents with their validation
//! - `Store` repository traits and the `InMemoryStore` document store
//! - `PaymentStrategy` trait for hosted-checkout providers
//! - `OrderService` for the order and payment lifecycle
//! - `ShopError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use shop_core::{CheckoutUrls, Currency, InMemoryStore, OrderService, Requester};
//!
//! let service = OrderService::new(InMemoryStore::new().shared(), CheckoutUrls::default(), Currency::NGN)
//!     .with_payments(stripe);
//!
//! // Bank transfer: stock is taken immediately
//! let order = service.place_order(&user_id, new_order).await?;
//!
//! // Admin confirms the transfer later
//! service.mark_paid(&order.id, &admin_id).await?;
//! ```

pub mod blog;
pub mod cart;
pub mod catalog;
pub mod category;
pub mod error;
pub mod money;
pub mod order;
pub mod payment;
pub mod product;
pub mod service;
pub mod store;
pub mod user;
pub mod validate;

// Re-exports for convenience
pub use blog::{Blog, BlogCounter, NewBlog};
pub use cart::{Cart, CartItem, CartLine, Wishlist};
pub use catalog::SeedCatalog;
pub use category::{Category, CategoryInput};
pub use error::{ShopError, ShopResult};
pub use money::Currency;
pub use order::{
    LineItem, NewOrder, NoteKind, Order, OrderNote, OrderState, OrderStatus, PaymentStatus,
    PaymentType, StockRequest,
};
pub use payment::{
    BoxedPaymentStrategy, CheckoutSession, CheckoutStatus, CheckoutUrls, PaymentStrategy,
    SessionPaymentStatus, WebhookEvent, WebhookEventType, ORDER_ID_METADATA_KEY,
};
pub use product::{
    CategoryName, Color, NewProduct, NewReview, Product, ProductUpdate, Review, Size,
    VariantStock,
};
pub use service::{OrderService, Requester, WebhookOutcome};
pub use store::{
    AddressRepository, BlogRepository, CartRepository, CategoryRepository, EventLedger,
    InMemoryStore, OrderRepository, ProductRepository, SharedStore, Store, StockShortfall,
    UserRepository, WishlistRepository,
};
pub use user::{Address, AddressDetails, Credentials, Registration, User};
