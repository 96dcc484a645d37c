//! Document stores for the storefront backend.
//!
//! The stores expose the collaborator contracts the domain depends on:
//! [`CatalogStore`] for products and [`UserStore`] for user documents with
//! their embedded cart and order history. No operation spans more than one
//! document, and no transaction ties two operations together.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
pub use store::{CatalogStore, DocumentStore, StoreOperation, UserStore, UserStoreExt};
