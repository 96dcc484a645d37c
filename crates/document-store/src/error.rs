use std::time::Duration;

use common::{OrderId, UserId};
use thiserror::Error;

/// Errors that can occur when interacting with a document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No user document exists for the identifier.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// The user exists but has no order with the identifier.
    #[error("Order {order_id} not found for user {user_id}")]
    OrderNotFound { user_id: UserId, order_id: OrderId },

    /// A unique field (email, phone, id) is already taken.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A grouped sum left the representable range.
    #[error("Aggregate overflow while summing cart for user {0}")]
    AggregateOverflow(UserId),

    /// The operation did not complete within its deadline.
    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    /// The store refused or dropped the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns true for failures of the store itself rather than of the
    /// request: timeouts, refused connections and driver errors.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            StoreError::Timeout(_) | StoreError::Unavailable(_) | StoreError::Database(_)
        )
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
