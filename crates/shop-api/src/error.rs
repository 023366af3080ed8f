//! # API Errors
//!
//! Every handler returns `Result<_, ApiError>`. Failures render as
//! `{ "success": false, "message": ... }` with the status code the core
//! error maps to.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shop_core::ShopError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Shop(#[from] ShopError),

    /// Body could not be read as the expected JSON
    #[error("{0}")]
    BadRequest(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Shop(err) => StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Shop(err) if !err.is_client_facing() => {
                tracing::error!(error = %err, status = status.as_u16(), "request failed");
                match status {
                    StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE => {
                        "Payment provider unavailable, please try again later".to_string()
                    }
                    _ => "Internal server error".to_string(),
                }
            }
            other => other.to_string(),
        };

        let body = serde_json::json!({ "success": false, "message": message });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_follows_core_error() {
        let err = ApiError::from(ShopError::not_found("Order", "o1"));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = ApiError::from(ShopError::InvalidState("Order is not pending".into()));
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err = ApiError::BadRequest("missing field `items`".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_server_errors_are_masked() {
        let err = ApiError::from(ShopError::Provider {
            provider: "stripe".into(),
            message: "No such price: price_123".into(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = ApiError::from(ShopError::Internal("lock poisoned".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
