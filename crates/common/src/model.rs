//! Persisted data model.
//!
//! A [`User`] document is the unit of storage: the cart, the order history
//! and the address list are embedded collections inside it. Products live in
//! their own collection and are copied into carts and orders by value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Email, Money, OrderId, ProductId, UserId};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    pub product_name: String,
    pub price: Money,
    #[serde(default)]
    pub rating: Option<u8>,
    pub image: String,
}

/// A product snapshot copied into a cart at add time.
///
/// Quantity is implicitly one; adding the same product twice yields two lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub price: Money,
    #[serde(default)]
    pub rating: Option<u8>,
    pub image: String,
}

impl CartLine {
    /// Freezes the current state of a product into a cart line.
    pub fn snapshot(product: &Product) -> Self {
        Self {
            product_id: product.product_id,
            product_name: product.product_name.clone(),
            price: product.price,
            rating: product.rating,
            image: product.image.clone(),
        }
    }
}

impl From<&Product> for CartLine {
    fn from(product: &Product) -> Self {
        Self::snapshot(product)
    }
}

/// How an order is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub digital: bool,
    pub cod: bool,
}

impl PaymentMethod {
    /// Cash on delivery, the only method currently offered.
    pub const fn cash_on_delivery() -> Self {
        Self {
            digital: false,
            cod: true,
        }
    }
}

/// An immutable record of a purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub ordered_at: DateTime<Utc>,
    /// Lines the order was built from.
    pub order_cart: Vec<CartLine>,
    /// Denormalised detail lines, written separately after the order itself.
    #[serde(default)]
    pub order_list: Vec<CartLine>,
    pub price: Money,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub discount: Option<i64>,
}

impl Order {
    /// Returns true once the detail lines have been written.
    pub fn is_detailed(&self) -> bool {
        !self.order_list.is_empty()
    }
}

/// A shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub address_id: uuid::Uuid,
    pub house: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<String>,
}

/// A user document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: String,
    pub password_hash: String,
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub user_cart: Vec<CartLine>,
    #[serde(default)]
    pub address_details: Vec<Address>,
    #[serde(default)]
    pub orders: Vec<Order>,
}
