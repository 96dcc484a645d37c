use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use common::{CartLine, Money, Order, OrderId, Product, ProductId, User, UserId};
use tokio::sync::RwLock;

use crate::{
    Result, StoreError,
    store::{CatalogStore, StoreOperation, UserStore},
};

#[derive(Debug, Default)]
struct Documents {
    users: HashMap<UserId, User>,
    products: Vec<Product>,
}

impl Documents {
    fn user(&self, user_id: UserId) -> Result<&User> {
        self.users
            .get(&user_id)
            .ok_or(StoreError::UserNotFound(user_id))
    }

    fn user_mut(&mut self, user_id: UserId) -> Result<&mut User> {
        self.users
            .get_mut(&user_id)
            .ok_or(StoreError::UserNotFound(user_id))
    }
}

#[derive(Debug, Default)]
struct Faults {
    failing: HashSet<StoreOperation>,
    delay: Option<Duration>,
}

/// In-memory document store for tests and local runs.
///
/// Every call takes the document lock once, so each operation is atomic on
/// its own just like a single-document update in a real store. Failures and
/// latency can be injected per operation to exercise partial-failure paths.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    documents: Arc<RwLock<Documents>>,
    faults: Arc<RwLock<Faults>>,
}

impl InMemoryDocumentStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call of `operation` fail with `Unavailable`.
    pub async fn fail_on(&self, operation: StoreOperation) {
        self.faults.write().await.failing.insert(operation);
    }

    /// Delays every subsequent call by `delay`.
    pub async fn set_delay(&self, delay: Duration) {
        self.faults.write().await.delay = Some(delay);
    }

    /// Removes all injected failures and delays.
    pub async fn clear_failures(&self) {
        let mut faults = self.faults.write().await;
        faults.failing.clear();
        faults.delay = None;
    }

    /// Returns the number of stored users.
    pub async fn user_count(&self) -> usize {
        self.documents.read().await.users.len()
    }

    /// Replaces a stored product in place. Carts and orders keep their
    /// snapshots; only future reads see the new values.
    pub async fn replace_product(&self, product: Product) -> Result<()> {
        let mut documents = self.documents.write().await;
        match documents
            .products
            .iter_mut()
            .find(|p| p.product_id == product.product_id)
        {
            Some(slot) => {
                *slot = product;
                Ok(())
            }
            None => Err(StoreError::Conflict(format!(
                "product {} does not exist",
                product.product_id
            ))),
        }
    }

    async fn check(&self, operation: StoreOperation) -> Result<()> {
        let (delay, failing) = {
            let faults = self.faults.read().await;
            (faults.delay, faults.failing.contains(&operation))
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if failing {
            return Err(StoreError::Unavailable(format!(
                "injected failure on {operation}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for InMemoryDocumentStore {
    async fn insert_product(&self, product: Product) -> Result<()> {
        self.check(StoreOperation::InsertProduct).await?;
        let mut documents = self.documents.write().await;
        if documents
            .products
            .iter()
            .any(|p| p.product_id == product.product_id)
        {
            return Err(StoreError::Conflict(format!(
                "product {} already exists",
                product.product_id
            )));
        }
        documents.products.push(product);
        Ok(())
    }

    async fn find_product(&self, product_id: ProductId) -> Result<Option<Product>> {
        self.check(StoreOperation::FindProduct).await?;
        let documents = self.documents.read().await;
        Ok(documents
            .products
            .iter()
            .find(|p| p.product_id == product_id)
            .cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        self.check(StoreOperation::ListProducts).await?;
        Ok(self.documents.read().await.products.clone())
    }

    async fn search_products_by_name(&self, pattern: &str) -> Result<Vec<Product>> {
        self.check(StoreOperation::SearchProducts).await?;
        let documents = self.documents.read().await;
        Ok(documents
            .products
            .iter()
            .filter(|p| p.product_name.contains(pattern))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserStore for InMemoryDocumentStore {
    async fn insert_user(&self, user: User) -> Result<()> {
        self.check(StoreOperation::InsertUser).await?;
        let mut documents = self.documents.write().await;

        if documents.users.contains_key(&user.user_id) {
            return Err(StoreError::Conflict(format!(
                "user {} already exists",
                user.user_id
            )));
        }
        if documents.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("email already registered".to_string()));
        }
        if documents.users.values().any(|u| u.phone == user.phone) {
            return Err(StoreError::Conflict("phone already registered".to_string()));
        }

        documents.users.insert(user.user_id, user);
        Ok(())
    }

    async fn find_user(&self, user_id: UserId) -> Result<Option<User>> {
        self.check(StoreOperation::FindUser).await?;
        Ok(self.documents.read().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.check(StoreOperation::FindUserByEmail).await?;
        let documents = self.documents.read().await;
        Ok(documents
            .users
            .values()
            .find(|u| u.email.as_str().eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        self.check(StoreOperation::EmailExists).await?;
        let documents = self.documents.read().await;
        Ok(documents
            .users
            .values()
            .any(|u| u.email.as_str().eq_ignore_ascii_case(email)))
    }

    async fn phone_exists(&self, phone: &str) -> Result<bool> {
        self.check(StoreOperation::PhoneExists).await?;
        let documents = self.documents.read().await;
        Ok(documents.users.values().any(|u| u.phone == phone))
    }

    async fn update_tokens(
        &self,
        user_id: UserId,
        token: String,
        refresh_token: String,
    ) -> Result<()> {
        self.check(StoreOperation::UpdateTokens).await?;
        let mut documents = self.documents.write().await;
        let user = documents.user_mut(user_id)?;
        user.token = Some(token);
        user.refresh_token = Some(refresh_token);
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn append_cart_lines(&self, user_id: UserId, lines: Vec<CartLine>) -> Result<()> {
        self.check(StoreOperation::AppendCartLines).await?;
        let mut documents = self.documents.write().await;
        documents.user_mut(user_id)?.user_cart.extend(lines);
        Ok(())
    }

    async fn remove_cart_lines(&self, user_id: UserId, product_id: ProductId) -> Result<usize> {
        self.check(StoreOperation::RemoveCartLines).await?;
        let mut documents = self.documents.write().await;
        let cart = &mut documents.user_mut(user_id)?.user_cart;
        let before = cart.len();
        cart.retain(|line| line.product_id != product_id);
        Ok(before - cart.len())
    }

    async fn set_cart_lines(&self, user_id: UserId, lines: Vec<CartLine>) -> Result<()> {
        self.check(StoreOperation::SetCartLines).await?;
        let mut documents = self.documents.write().await;
        documents.user_mut(user_id)?.user_cart = lines;
        Ok(())
    }

    async fn cart_lines(&self, user_id: UserId) -> Result<Vec<CartLine>> {
        self.check(StoreOperation::CartLines).await?;
        let documents = self.documents.read().await;
        Ok(documents.user(user_id)?.user_cart.clone())
    }

    async fn cart_total(&self, user_id: UserId) -> Result<Money> {
        self.check(StoreOperation::CartTotal).await?;
        let documents = self.documents.read().await;
        let cart = &documents.user(user_id)?.user_cart;
        Money::checked_sum(cart.iter().map(|line| line.price))
            .ok_or(StoreError::AggregateOverflow(user_id))
    }

    async fn append_order(&self, user_id: UserId, order: Order) -> Result<()> {
        self.check(StoreOperation::AppendOrder).await?;
        let mut documents = self.documents.write().await;
        documents.user_mut(user_id)?.orders.push(order);
        Ok(())
    }

    async fn append_order_detail_lines(
        &self,
        user_id: UserId,
        order_id: OrderId,
        lines: Vec<CartLine>,
    ) -> Result<()> {
        self.check(StoreOperation::AppendOrderDetailLines).await?;
        let mut documents = self.documents.write().await;
        let order = documents
            .user_mut(user_id)?
            .orders
            .iter_mut()
            .find(|o| o.order_id == order_id)
            .ok_or(StoreError::OrderNotFound { user_id, order_id })?;
        order.order_list.extend(lines);
        Ok(())
    }

    async fn orders(&self, user_id: UserId) -> Result<Vec<Order>> {
        self.check(StoreOperation::Orders).await?;
        let documents = self.documents.read().await;
        Ok(documents.user(user_id)?.orders.clone())
    }
}
