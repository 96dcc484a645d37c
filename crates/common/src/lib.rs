//! Shared types for the storefront backend.

pub mod email;
pub mod model;
pub mod money;
pub mod types;

pub use email::{Email, EmailError};
pub use model::{Address, CartLine, Order, PaymentMethod, Product, User};
pub use money::Money;
pub use types::{IdError, OrderId, ProductId, UserId};
