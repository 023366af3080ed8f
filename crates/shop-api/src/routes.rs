//! # Routes
//!
//! Axum router configuration for the shop API.

use crate::handlers::{
    self, addresses, admin, blogs, cart, categories, orders, products, users, webhook, wishlist,
};
use crate::state::AppState;
use axum::{
    http::{request::Parts, HeaderValue, Method},
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - `GET /`, `GET /health` - health check
/// - `POST /webhook/stripe` - Stripe webhook (raw body, signature checked)
/// - `/api/user`, `/api/admin` - accounts and tokens
/// - `/api/category`, `/api/product`, `/api/blog` - catalog and content
/// - `/api/cart`, `/api/wishlist`, `/api/address` - per-user collections
/// - `/api/order` - orders, checkout and payment confirmation
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .map(|o| config.origin_allowed(o))
                    .unwrap_or(false)
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let user_routes = Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/me", get(users::me))
        .route(
            "/recently-viewed",
            get(users::recently_viewed)
                .post(users::add_recently_viewed)
                .delete(users::clear_recently_viewed),
        );

    let admin_routes = Router::new()
        .route("/", get(admin::profile))
        .route("/login", post(admin::login));

    let category_routes = Router::new()
        .route("/", get(categories::list).post(categories::create))
        .route(
            "/{id}",
            get(categories::get)
                .put(categories::update)
                .delete(categories::delete),
        );

    let product_routes = Router::new()
        .route("/", get(products::list))
        .route("/add", post(products::add))
        .route("/stock", post(products::set_stock))
        .route(
            "/{id}",
            get(products::get)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/{id}/review", post(products::add_review));

    let cart_routes = Router::new()
        .route("/", get(cart::get))
        .route("/add", post(cart::add))
        .route("/update", put(cart::update))
        .route("/remove", delete(cart::remove))
        .route("/clear", delete(cart::clear));

    let blog_routes = Router::new()
        .route("/", get(blogs::list))
        .route("/create", post(blogs::create))
        .route("/{id}", get(blogs::get).delete(blogs::delete))
        .route("/{id}/views", patch(blogs::view))
        .route("/{id}/likes", patch(blogs::like));

    let address_routes = Router::new()
        .route("/", post(addresses::create))
        .route("/{user_id}", get(addresses::list));

    let order_routes = Router::new()
        .route("/user", get(orders::user_orders))
        .route("/admin", get(orders::all_orders))
        .route("/create", post(orders::create))
        .route("/stripe", post(orders::checkout))
        .route("/verify-payment", post(orders::verify_payment))
        .route("/{id}", get(orders::get))
        .route("/{id}/mark-paid", patch(orders::mark_paid))
        .route("/{id}/cancel", patch(orders::cancel));

    let wishlist_routes = Router::new()
        .route("/", get(wishlist::get))
        .route("/add", post(wishlist::add))
        .route("/remove", post(wishlist::remove));

    let api_routes = Router::new()
        .nest("/user", user_routes)
        .nest("/admin", admin_routes)
        .nest("/category", category_routes)
        .nest("/product", product_routes)
        .nest("/cart", cart_routes)
        .nest("/blog", blog_routes)
        .nest("/address", address_routes)
        .nest("/order", order_routes)
        .nest("/wishlist", wishlist_routes)
        .layer(cors);

    // Webhook routes (no CORS, must accept raw body)
    let webhook_routes = Router::new().route("/stripe", post(webhook::stripe));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api", api_routes)
        .nest("/webhook", webhook_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
