//! # Shop Error Types
//!
//! Typed error handling for the byc-shop backend.
//! All store, order and payment operations return `Result<T, ShopError>`.

use thiserror::Error;

/// Core error type for all shop operations
#[derive(Debug, Error)]
pub enum ShopError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Request body failed validation
    #[error("{0}")]
    Validation(String),

    /// Document not found in the store
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Product is flagged as not in stock
    #[error("Product out of stock: {product}")]
    OutOfStock { product: String },

    /// Requested size/color is not offered by the product
    #[error("Invalid variant for {product}: {detail}")]
    InvalidVariant { product: String, detail: String },

    /// Requested quantity exceeds what is available
    #[error("Insufficient stock for {product}: {available} available")]
    InsufficientStock {
        product: String,
        available: u32,
        requested: u32,
    },

    /// Provider reports the checkout session as unpaid
    #[error("Payment not completed for session {session_id}")]
    PaymentIncomplete { session_id: String },

    /// Operation not allowed in the order's current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Document already exists (duplicate email, review, ...)
    #[error("{0}")]
    Conflict(String),

    /// Missing or invalid credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed
    #[error("{0}")]
    Forbidden(String),

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    Provider { provider: String, message: String },

    /// Network/HTTP error communicating with provider
    #[error("Network error: {0}")]
    Network(String),

    /// Webhook signature verification failed
    #[error("Webhook verification failed: {0}")]
    WebhookVerificationFailed(String),

    /// Webhook payload parsing error
    #[error("Webhook parse error: {0}")]
    WebhookParseError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShopError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        ShopError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ShopError::Validation(message.into())
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ShopError::Configuration(_) => 500,
            ShopError::Validation(_) => 400,
            ShopError::NotFound { .. } => 404,
            ShopError::OutOfStock { .. } => 400,
            ShopError::InvalidVariant { .. } => 400,
            ShopError::InsufficientStock { .. } => 400,
            ShopError::PaymentIncomplete { .. } => 402,
            ShopError::InvalidState(_) => 409,
            ShopError::Conflict(_) => 409,
            ShopError::Unauthorized(_) => 401,
            ShopError::Forbidden(_) => 403,
            ShopError::Provider { .. } => 502,
            ShopError::Network(_) => 503,
            ShopError::WebhookVerificationFailed(_) => 400,
            ShopError::WebhookParseError(_) => 400,
            ShopError::Serialization(_) => 500,
            ShopError::Internal(_) => 500,
        }
    }

    /// Whether the message is safe to hand back to a client verbatim
    pub fn is_client_facing(&self) -> bool {
        self.status_code() < 500
    }
}

/// Result type alias for shop operations
pub type ShopResult<T> = Result<T, ShopError>;
