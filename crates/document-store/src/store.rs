use async_trait::async_trait;
use common::{CartLine, Money, Order, OrderId, Product, ProductId, User, UserId};

use crate::Result;

/// Names of the store operations, used for fault injection and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    InsertProduct,
    FindProduct,
    ListProducts,
    SearchProducts,
    InsertUser,
    FindUser,
    FindUserByEmail,
    EmailExists,
    PhoneExists,
    UpdateTokens,
    AppendCartLines,
    RemoveCartLines,
    SetCartLines,
    CartLines,
    CartTotal,
    AppendOrder,
    AppendOrderDetailLines,
    Orders,
}

impl StoreOperation {
    /// Returns the operation name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreOperation::InsertProduct => "insert_product",
            StoreOperation::FindProduct => "find_product",
            StoreOperation::ListProducts => "list_products",
            StoreOperation::SearchProducts => "search_products",
            StoreOperation::InsertUser => "insert_user",
            StoreOperation::FindUser => "find_user",
            StoreOperation::FindUserByEmail => "find_user_by_email",
            StoreOperation::EmailExists => "email_exists",
            StoreOperation::PhoneExists => "phone_exists",
            StoreOperation::UpdateTokens => "update_tokens",
            StoreOperation::AppendCartLines => "append_cart_lines",
            StoreOperation::RemoveCartLines => "remove_cart_lines",
            StoreOperation::SetCartLines => "set_cart_lines",
            StoreOperation::CartLines => "cart_lines",
            StoreOperation::CartTotal => "cart_total",
            StoreOperation::AppendOrder => "append_order",
            StoreOperation::AppendOrderDetailLines => "append_order_detail_lines",
            StoreOperation::Orders => "orders",
        }
    }
}

impl std::fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read access to the product catalog, plus the admin insert.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Inserts a new product.
    async fn insert_product(&self, product: Product) -> Result<()>;

    /// Finds a product by id.
    async fn find_product(&self, product_id: ProductId) -> Result<Option<Product>>;

    /// Lists every product in insertion order.
    async fn list_products(&self) -> Result<Vec<Product>>;

    /// Case-sensitive substring match over product names.
    async fn search_products_by_name(&self, pattern: &str) -> Result<Vec<Product>>;
}

/// Access to user documents and their embedded cart and order history.
///
/// Each mutating method is a single-document update: it is atomic on its
/// own, but nothing ties two calls together. Updates on a missing user fail
/// with [`StoreError::UserNotFound`](crate::StoreError::UserNotFound).
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user. Fails with `Conflict` on a duplicate email or phone.
    async fn insert_user(&self, user: User) -> Result<()>;

    /// Finds a user by id.
    async fn find_user(&self, user_id: UserId) -> Result<Option<User>>;

    /// Finds a user by email, ignoring case.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Returns true if a user with the email (ignoring case) exists.
    async fn email_exists(&self, email: &str) -> Result<bool>;

    /// Returns true if a user with the phone number exists.
    async fn phone_exists(&self, phone: &str) -> Result<bool>;

    /// Replaces the user's token pair and bumps `updated_at`.
    async fn update_tokens(&self, user_id: UserId, token: String, refresh_token: String)
    -> Result<()>;

    /// Appends lines to the end of the user's cart.
    async fn append_cart_lines(&self, user_id: UserId, lines: Vec<CartLine>) -> Result<()>;

    /// Removes every cart line for the product. Returns how many were removed.
    async fn remove_cart_lines(&self, user_id: UserId, product_id: ProductId) -> Result<usize>;

    /// Replaces the whole cart. An empty vector clears it.
    async fn set_cart_lines(&self, user_id: UserId, lines: Vec<CartLine>) -> Result<()>;

    /// Returns the user's cart lines.
    async fn cart_lines(&self, user_id: UserId) -> Result<Vec<CartLine>>;

    /// Sums the prices of the user's cart lines inside the store.
    async fn cart_total(&self, user_id: UserId) -> Result<Money>;

    /// Appends an order to the user's order history.
    async fn append_order(&self, user_id: UserId, order: Order) -> Result<()>;

    /// Appends detail lines to the `order_list` of one order.
    async fn append_order_detail_lines(
        &self,
        user_id: UserId,
        order_id: OrderId,
        lines: Vec<CartLine>,
    ) -> Result<()>;

    /// Returns the user's order history, oldest first.
    async fn orders(&self, user_id: UserId) -> Result<Vec<Order>>;
}

/// Extension trait providing convenience methods for user stores.
#[async_trait]
pub trait UserStoreExt: UserStore {
    /// Empties the user's cart.
    async fn clear_cart(&self, user_id: UserId) -> Result<()> {
        self.set_cart_lines(user_id, Vec::new()).await
    }
}

// Blanket implementation for all UserStore implementations
impl<T: UserStore + ?Sized> UserStoreExt for T {}

/// A store that serves both collections.
pub trait DocumentStore: CatalogStore + UserStore {}

impl<T: CatalogStore + UserStore + ?Sized> DocumentStore for T {}
