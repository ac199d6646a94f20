//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::{CartError, CheckoutError};
use domain::DomainError;
use orders::{OrderError, ReviewError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed identity headers.
    Unauthorized(String),
    /// The acting identity may not perform this operation.
    Forbidden(String),
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Checkout engine error.
    Checkout(CheckoutError),
    /// Cart operation error.
    Cart(CartError),
    /// Order management error.
    Order(OrderError),
    /// Review submission error.
    Review(ReviewError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Cart(err) => cart_error_to_response(err),
            ApiError::Order(err) => order_error_to_response(err),
            ApiError::Review(err) => review_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    match &err {
        // User-input problems; nothing was created.
        CheckoutError::EmptyCart | CheckoutError::MissingAddress => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        // Consistency violation; the whole transaction rolled back.
        CheckoutError::InsufficientStock { .. } => (StatusCode::CONFLICT, err.to_string()),
        // Infrastructure failure: the message is already generic, the
        // cause is only logged.
        CheckoutError::Transaction(source) => {
            tracing::error!(error = %source, "checkout transaction failed");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn cart_error_to_response(err: CartError) -> (StatusCode, String) {
    match &err {
        CartError::InvalidQuantity => (StatusCode::BAD_REQUEST, err.to_string()),
        CartError::ProductUnavailable(_) | CartError::LineNotFound(_) => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        CartError::Store(source) => {
            tracing::error!(error = %source, "cart operation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong".to_string(),
            )
        }
    }
}

fn order_error_to_response(err: OrderError) -> (StatusCode, String) {
    match &err {
        OrderError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        OrderError::Forbidden => (StatusCode::FORBIDDEN, err.to_string()),
        OrderError::Domain(DomainError::InvalidStatusTransition { .. }) | OrderError::Conflict => {
            (StatusCode::CONFLICT, err.to_string())
        }
        OrderError::Domain(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        OrderError::Store(source) => {
            tracing::error!(error = %source, "order operation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong".to_string(),
            )
        }
    }
}

fn review_error_to_response(err: ReviewError) -> (StatusCode, String) {
    match &err {
        ReviewError::NotAllowed | ReviewError::Domain(_) => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        ReviewError::Store(source) => {
            tracing::error!(error = %source, "review operation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong".to_string(),
            )
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        ApiError::Cart(err)
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Order(err)
    }
}

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        ApiError::Review(err)
    }
}
