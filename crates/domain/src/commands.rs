//! Inbound cart and checkout commands.
//!
//! The dispatcher resolves raw identifiers with [`parse_user_id`] and
//! [`parse_product_id`] before any store access, so a malformed user id is
//! rejected as [`DomainError::InvalidUser`] without touching the store.

use common::{ProductId, UserId};

use crate::error::DomainError;

/// Resolves a raw user identifier.
///
/// Only the exact canonical form is accepted; surrounding whitespace is not
/// stripped.
pub fn parse_user_id(raw: &str) -> Result<UserId, DomainError> {
    UserId::parse(raw).map_err(|_| DomainError::InvalidUser(raw.to_string()))
}

/// Resolves a raw product identifier.
///
/// A malformed id can never name a product, so it is reported as not found.
pub fn parse_product_id(raw: &str) -> Result<ProductId, DomainError> {
    ProductId::parse(raw).map_err(|_| DomainError::ProductNotFound(raw.to_string()))
}

/// Command to append a product snapshot to a user's cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddToCart {
    pub user_id: UserId,
    pub product_id: ProductId,
}

impl AddToCart {
    /// Creates a new AddToCart command.
    pub fn new(user_id: UserId, product_id: ProductId) -> Self {
        Self {
            user_id,
            product_id,
        }
    }
}

/// Command to remove every cart line for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveFromCart {
    pub user_id: UserId,
    pub product_id: ProductId,
}

impl RemoveFromCart {
    /// Creates a new RemoveFromCart command.
    pub fn new(user_id: UserId, product_id: ProductId) -> Self {
        Self {
            user_id,
            product_id,
        }
    }
}

/// Command to turn a user's cart into an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutCart {
    pub user_id: UserId,
}

impl CheckoutCart {
    /// Creates a new CheckoutCart command.
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

/// Command to buy a single product without touching the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstantBuy {
    pub user_id: UserId,
    pub product_id: ProductId,
}

impl InstantBuy {
    /// Creates a new InstantBuy command.
    pub fn new(user_id: UserId, product_id: ProductId) -> Self {
        Self {
            user_id,
            product_id,
        }
    }
}
