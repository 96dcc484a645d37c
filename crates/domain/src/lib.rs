//! Domain layer for the storefront backend.
//!
//! This crate provides:
//! - Catalog lookups and the admin product insert
//! - The cart ledger (append, remove-by-product, clear, view)
//! - The order builder turning cart snapshots into orders
//! - Account signup, login and token verification
//!
//! Every service receives a [`StoreContext`] holding the store handle and
//! the per-operation timeout.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod commands;
pub mod context;
pub mod error;
pub mod order;

#[cfg(test)]
mod testing;

pub use account::{
    AccountService, Argon2PasswordHasher, Claims, JwtTokenIssuer, NewUser, PasswordHasher,
    TokenIssuer, TokenPair, TokenSubject, UserProfile,
};
pub use cart::{CartLedger, CartView};
pub use catalog::{CatalogService, NewProduct};
pub use commands::{
    AddToCart, CheckoutCart, InstantBuy, RemoveFromCart, parse_product_id, parse_user_id,
};
pub use context::{DEFAULT_STORE_TIMEOUT, StoreContext};
pub use error::DomainError;
pub use order::{build_order_from_cart, build_order_from_single_product, order_total};
