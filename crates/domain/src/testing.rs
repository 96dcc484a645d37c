//! Seeding helpers shared by unit tests.

use chrono::Utc;
use common::{Email, Money, Product, ProductId, User, UserId};
use document_store::{CatalogStore, InMemoryDocumentStore, UserStore};

pub(crate) async fn seed_user(store: &InMemoryDocumentStore) -> UserId {
    let now = Utc::now();
    let user_id = UserId::new();
    let user = User {
        user_id,
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: Email::parse(&format!("{user_id}@example.com")).unwrap(),
        phone: user_id.to_string(),
        password_hash: String::new(),
        token: None,
        refresh_token: None,
        created_at: now,
        updated_at: now,
        user_cart: Vec::new(),
        address_details: Vec::new(),
        orders: Vec::new(),
    };
    store.insert_user(user).await.unwrap();
    user_id
}

pub(crate) async fn seed_product(store: &InMemoryDocumentStore, name: &str, price: i64) -> Product {
    let product = Product {
        product_id: ProductId::new(),
        product_name: name.to_string(),
        price: Money::from_cents(price),
        rating: None,
        image: String::new(),
    };
    store.insert_product(product.clone()).await.unwrap();
    product
}
