//! Order construction.

mod builder;

pub use builder::{
    build_order_at, build_order_from_cart, build_order_from_single_product, order_total,
};
