//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;
use document_store::StoreError;
use domain::DomainError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Missing or invalid token.
    Unauthorized(String),
    /// The token does not belong to the requested user.
    Forbidden(String),
    /// Domain logic error.
    Domain(DomainError),
    /// Checkout or instant buy error.
    Checkout(CheckoutError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::Checkout(err) => checkout_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    match &err {
        DomainError::InvalidUser(_)
        | DomainError::InvalidProduct(_)
        | DomainError::InvalidSignup(_)
        | DomainError::EmailTaken
        | DomainError::PhoneTaken
        | DomainError::TotalOverflow { .. }
        | DomainError::Store(StoreError::AggregateOverflow(_)) => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        DomainError::ProductNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        DomainError::EmptySearchQuery => {
            (StatusCode::NOT_FOUND, "Invalid search index".to_string())
        }
        DomainError::InvalidCredentials | DomainError::InvalidToken(_) => {
            (StatusCode::UNAUTHORIZED, err.to_string())
        }
        DomainError::Store(StoreError::Conflict(_)) => (StatusCode::CONFLICT, err.to_string()),
        DomainError::Store(e) if e.is_unavailable() => {
            tracing::error!(error = %err, "store unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, "store unavailable".to_string())
        }
        _ => {
            tracing::error!(error = %err, "internal server error");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    match err {
        CheckoutError::Domain(e) => domain_error_to_response(e),
        CheckoutError::EmptyCart(_) | CheckoutError::CartChanged { .. } => {
            (StatusCode::CONFLICT, err.to_string())
        }
        CheckoutError::PartialCheckoutFailure { .. } | CheckoutError::CartClearFailed { .. } => {
            tracing::error!(error = %err, "checkout left partial state");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}
