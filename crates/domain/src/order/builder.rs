//! Order Builder: turns cart snapshots into immutable orders.

use chrono::{DateTime, Utc};
use common::{CartLine, Money, Order, OrderId, PaymentMethod, Product};

use crate::error::DomainError;

/// Builds an order from a cart snapshot.
///
/// The total is the checked sum of the line prices. The lines become the
/// order's `order_cart`; the detail list starts empty and is filled by a
/// separate write.
pub fn build_order_from_cart(lines: &[CartLine]) -> Result<Order, DomainError> {
    build_order_at(lines, OrderId::new(), Utc::now())
}

/// Builds a single-line order for an instant buy.
pub fn build_order_from_single_product(product: &Product) -> Order {
    let line = CartLine::snapshot(product);
    Order {
        order_id: OrderId::new(),
        ordered_at: Utc::now(),
        order_cart: vec![line],
        order_list: Vec::new(),
        price: product.price,
        payment_method: PaymentMethod::cash_on_delivery(),
        discount: None,
    }
}

/// Same as [`build_order_from_cart`] with the id and timestamp supplied.
pub fn build_order_at(
    lines: &[CartLine],
    order_id: OrderId,
    ordered_at: DateTime<Utc>,
) -> Result<Order, DomainError> {
    let price = order_total(lines)?;
    Ok(Order {
        order_id,
        ordered_at,
        order_cart: lines.to_vec(),
        order_list: Vec::new(),
        price,
        payment_method: PaymentMethod::cash_on_delivery(),
        discount: None,
    })
}

/// Sums line prices without wrapping.
pub fn order_total(lines: &[CartLine]) -> Result<Money, DomainError> {
    Money::checked_sum(lines.iter().map(|line| line.price))
        .ok_or(DomainError::TotalOverflow { lines: lines.len() })
}
