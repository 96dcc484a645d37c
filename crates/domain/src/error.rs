//! Domain error types.

use document_store::StoreError;
use thiserror::Error;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The user identifier is malformed or names no user.
    #[error("Invalid user: {0}")]
    InvalidUser(String),

    /// The product identifier is malformed or names no product.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// A product failed validation on insert.
    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    /// A catalog search was issued without a query.
    #[error("Search query is empty")]
    EmptySearchQuery,

    /// The order total does not fit in the money type.
    #[error("Order total overflows for {lines} lines")]
    TotalOverflow { lines: usize },

    /// Signup input failed validation.
    #[error("Invalid signup: {0}")]
    InvalidSignup(String),

    /// The email is already registered.
    #[error("user already exists")]
    EmailTaken,

    /// The phone number is already registered.
    #[error("this phone number is already in use")]
    PhoneTaken,

    /// Unknown email or wrong password.
    #[error("login or password is incorrect")]
    InvalidCredentials,

    /// A token failed verification.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// The password could not be hashed.
    #[error("Password hashing failed")]
    PasswordHash,

    /// An error occurred in the document store.
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl DomainError {
    /// Returns true when the store timed out or could not be reached.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, DomainError::Store(e) if e.is_unavailable())
    }
}

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UserNotFound(user_id) => DomainError::InvalidUser(user_id.to_string()),
            other => DomainError::Store(other),
        }
    }
}
