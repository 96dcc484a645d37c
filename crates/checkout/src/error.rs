//! Checkout error types.

use common::{Money, OrderId, UserId};
use document_store::StoreError;
use domain::DomainError;
use thiserror::Error;

use crate::state::CheckoutStep;

/// Errors that can occur during a checkout or instant buy.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Failure before any write: bad user, unknown product, store down.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// The cart had no lines; nothing was written.
    #[error("Cart is empty for user {0}")]
    EmptyCart(UserId),

    /// The store total disagrees with the loaded lines; nothing was written.
    #[error("Cart changed during checkout: loaded lines sum to {loaded}, store reports {aggregated}")]
    CartChanged { loaded: Money, aggregated: Money },

    /// The order was appended but its detail lines were not.
    #[error("Checkout of order {order_id} failed at {failed} after {completed}: {source}")]
    PartialCheckoutFailure {
        order_id: OrderId,
        completed: CheckoutStep,
        failed: CheckoutStep,
        #[source]
        source: DomainError,
    },

    /// The order is complete but the purchased lines are still in the cart.
    #[error("Order {order_id} was placed but the cart could not be cleared: {source}")]
    CartClearFailed {
        order_id: OrderId,
        #[source]
        source: DomainError,
    },
}

impl CheckoutError {
    /// Returns true when nothing was written and the store was unreachable.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, CheckoutError::Domain(e) if e.is_store_unavailable())
    }

    /// Returns the order left behind by a partial failure.
    pub fn order_id(&self) -> Option<OrderId> {
        match self {
            CheckoutError::PartialCheckoutFailure { order_id, .. }
            | CheckoutError::CartClearFailed { order_id, .. } => Some(*order_id),
            _ => None,
        }
    }

    /// Returns the step that failed, when a write had already succeeded.
    pub fn failed_step(&self) -> Option<CheckoutStep> {
        match self {
            CheckoutError::PartialCheckoutFailure { failed, .. } => Some(*failed),
            CheckoutError::CartClearFailed { .. } => Some(CheckoutStep::CartCleared),
            _ => None,
        }
    }
}

impl From<StoreError> for CheckoutError {
    fn from(e: StoreError) -> Self {
        CheckoutError::Domain(e.into())
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn unavailable() -> DomainError {
        DomainError::from(StoreError::Unavailable("down".to_string()))
    }

    #[test]
    fn test_timeout_is_store_unavailable() {
        let err = CheckoutError::from(StoreError::Timeout(Duration::from_secs(5)));
        assert!(err.is_store_unavailable());
        assert_eq!(err.order_id(), None);
    }

    #[test]
    fn test_missing_user_is_domain_invalid_user() {
        let err = CheckoutError::from(StoreError::UserNotFound(UserId::new()));
        assert!(matches!(err, CheckoutError::Domain(DomainError::InvalidUser(_))));
    }

    #[test]
    fn test_partial_failure_names_step() {
        let order_id = OrderId::new();
        let err = CheckoutError::PartialCheckoutFailure {
            order_id,
            completed: CheckoutStep::OrderAppended,
            failed: CheckoutStep::LineItemsAppended,
            source: unavailable(),
        };

        assert!(!err.is_store_unavailable());
        assert_eq!(err.order_id(), Some(order_id));
        assert_eq!(err.failed_step(), Some(CheckoutStep::LineItemsAppended));
        assert!(err.to_string().contains("LineItemsAppended"));
    }

    #[test]
    fn test_cart_clear_failure_keeps_order_id() {
        let order_id = OrderId::new();
        let err = CheckoutError::CartClearFailed {
            order_id,
            source: unavailable(),
        };
        assert_eq!(err.order_id(), Some(order_id));
        assert_eq!(err.failed_step(), Some(CheckoutStep::CartCleared));
    }
}
