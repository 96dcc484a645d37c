//! Cart Ledger: the per-user list of product snapshots.

use common::{CartLine, Money, UserId};
use document_store::{CatalogStore, DocumentStore, UserStore, UserStoreExt};
use serde::Serialize;

use crate::commands::{AddToCart, RemoveFromCart};
use crate::context::StoreContext;
use crate::error::DomainError;

/// The lines in a cart and their store-computed total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub total: Money,
}

/// Service owning cart mutations.
///
/// The cart is a sequence of lines, not a product-to-quantity map: adding
/// the same product twice stores two lines.
pub struct CartLedger<S: DocumentStore> {
    ctx: StoreContext<S>,
}

impl<S: DocumentStore> CartLedger<S> {
    /// Creates a new cart ledger.
    pub fn new(ctx: StoreContext<S>) -> Self {
        Self { ctx }
    }

    /// Appends a snapshot of the product's current state to the cart.
    #[tracing::instrument(skip(self), fields(user_id = %cmd.user_id, product_id = %cmd.product_id))]
    pub async fn add_to_cart(&self, cmd: AddToCart) -> Result<CartLine, DomainError> {
        let product = self
            .ctx
            .run(self.ctx.store().find_product(cmd.product_id))
            .await?
            .ok_or_else(|| DomainError::ProductNotFound(cmd.product_id.to_string()))?;

        let line = CartLine::snapshot(&product);
        self.ctx
            .run(
                self.ctx
                    .store()
                    .append_cart_lines(cmd.user_id, vec![line.clone()]),
            )
            .await?;

        metrics::counter!("cart_lines_added_total").increment(1);
        tracing::info!(price = %line.price, "product added to cart");
        Ok(line)
    }

    /// Removes every line for the product. Removing an absent product is a
    /// no-op; the returned count says how many lines went away.
    #[tracing::instrument(skip(self), fields(user_id = %cmd.user_id, product_id = %cmd.product_id))]
    pub async fn remove_from_cart(&self, cmd: RemoveFromCart) -> Result<usize, DomainError> {
        let removed = self
            .ctx
            .run(
                self.ctx
                    .store()
                    .remove_cart_lines(cmd.user_id, cmd.product_id),
            )
            .await?;

        metrics::counter!("cart_lines_removed_total").increment(removed as u64);
        tracing::info!(removed, "cart lines removed");
        Ok(removed)
    }

    /// Empties the cart. Clearing an empty cart succeeds.
    #[tracing::instrument(skip(self))]
    pub async fn clear_cart(&self, user_id: UserId) -> Result<(), DomainError> {
        self.ctx.run(self.ctx.store().clear_cart(user_id)).await?;
        Ok(())
    }

    /// Returns the cart lines and the total summed by the store.
    #[tracing::instrument(skip(self))]
    pub async fn view_cart(&self, user_id: UserId) -> Result<CartView, DomainError> {
        let lines = self.ctx.run(self.ctx.store().cart_lines(user_id)).await?;
        let total = self.ctx.run(self.ctx.store().cart_total(user_id)).await?;
        Ok(CartView { lines, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_product, seed_user};
    use common::ProductId;
    use document_store::InMemoryDocumentStore;

    fn ledger(store: &InMemoryDocumentStore) -> CartLedger<InMemoryDocumentStore> {
        CartLedger::new(StoreContext::new(store.clone()))
    }

    #[tokio::test]
    async fn test_add_to_cart_appends_snapshot() {
        let store = InMemoryDocumentStore::new();
        let user_id = seed_user(&store).await;
        let product = seed_product(&store, "Headphones", 7_500).await;

        let line = ledger(&store)
            .add_to_cart(AddToCart::new(user_id, product.product_id))
            .await
            .unwrap();

        assert_eq!(line, CartLine::snapshot(&product));
        assert_eq!(store.cart_lines(user_id).await.unwrap(), vec![line]);
    }

    #[tokio::test]
    async fn test_add_to_cart_unknown_user() {
        let store = InMemoryDocumentStore::new();
        let product = seed_product(&store, "Headphones", 7_500).await;

        let result = ledger(&store)
            .add_to_cart(AddToCart::new(UserId::new(), product.product_id))
            .await;
        assert!(matches!(result, Err(DomainError::InvalidUser(_))));
    }

    #[tokio::test]
    async fn test_add_to_cart_unknown_product() {
        let store = InMemoryDocumentStore::new();
        let user_id = seed_user(&store).await;

        let result = ledger(&store)
            .add_to_cart(AddToCart::new(user_id, ProductId::new()))
            .await;
        assert!(matches!(result, Err(DomainError::ProductNotFound(_))));
        assert!(store.cart_lines(user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_product_is_noop() {
        let store = InMemoryDocumentStore::new();
        let user_id = seed_user(&store).await;
        let product = seed_product(&store, "Headphones", 7_500).await;
        let ledger = ledger(&store);
        ledger
            .add_to_cart(AddToCart::new(user_id, product.product_id))
            .await
            .unwrap();

        let removed = ledger
            .remove_from_cart(RemoveFromCart::new(user_id, ProductId::new()))
            .await
            .unwrap();
        assert_eq!(removed, 0);
        assert_eq!(store.cart_lines(user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_view_cart_totals_lines() {
        let store = InMemoryDocumentStore::new();
        let user_id = seed_user(&store).await;
        let a = seed_product(&store, "A", 100).await;
        let b = seed_product(&store, "B", 250).await;
        let ledger = ledger(&store);
        ledger
            .add_to_cart(AddToCart::new(user_id, a.product_id))
            .await
            .unwrap();
        ledger
            .add_to_cart(AddToCart::new(user_id, b.product_id))
            .await
            .unwrap();

        let view = ledger.view_cart(user_id).await.unwrap();
        assert_eq!(view.lines.len(), 2);
        assert_eq!(view.total.cents(), 350);
    }

    #[tokio::test]
    async fn test_clear_cart_unknown_user() {
        let store = InMemoryDocumentStore::new();
        let result = ledger(&store).clear_cart(UserId::new()).await;
        assert!(matches!(result, Err(DomainError::InvalidUser(_))));
    }
}
