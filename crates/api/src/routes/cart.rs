//! Cart, checkout and instant buy endpoints.
//!
//! All routes here require the `token` header.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use checkout::CheckoutReceipt;
use common::{Money, OrderId, ProductId};
use document_store::DocumentStore;
use domain::{AddToCart, CartView, CheckoutCart, InstantBuy, RemoveFromCart, parse_product_id};
use serde::{Deserialize, Serialize};

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CartQuery {
    pub id: Option<String>,
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
}

impl CartQuery {
    fn product_id(&self) -> Result<ProductId, ApiError> {
        let raw = self
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::BadRequest("product id is empty".to_string()))?;
        Ok(parse_product_id(raw)?)
    }
}

#[derive(Serialize)]
pub struct CartMessage {
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct RemoveResponse {
    pub message: &'static str,
    pub removed: usize,
}

#[derive(Serialize)]
pub struct OrderPlacedResponse {
    pub message: &'static str,
    pub order_id: OrderId,
    pub total: Money,
    pub receipt: CheckoutReceipt,
}

impl OrderPlacedResponse {
    fn new(receipt: CheckoutReceipt) -> Self {
        Self {
            message: "Successfully Placed the order",
            order_id: receipt.order.order_id,
            total: receipt.order.price,
            receipt,
        }
    }
}

/// GET /addtocart?id=&userID= — append a product snapshot to the cart.
#[tracing::instrument(skip(state, query))]
pub async fn add_to_cart<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    auth: RequireAuth,
    Query(query): Query<CartQuery>,
) -> Result<Json<CartMessage>, ApiError> {
    let user_id = auth.resolve(query.user_id.as_deref())?;
    let product_id = query.product_id()?;
    state
        .cart
        .add_to_cart(AddToCart::new(user_id, product_id))
        .await?;
    Ok(Json(CartMessage {
        message: "Successfully Added to the cart",
    }))
}

/// GET /removeitem?id=&userID= — remove every line for a product.
#[tracing::instrument(skip(state, query))]
pub async fn remove_item<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    auth: RequireAuth,
    Query(query): Query<CartQuery>,
) -> Result<Json<RemoveResponse>, ApiError> {
    let user_id = auth.resolve(query.user_id.as_deref())?;
    let product_id = query.product_id()?;
    let removed = state
        .cart
        .remove_from_cart(RemoveFromCart::new(user_id, product_id))
        .await?;
    Ok(Json(RemoveResponse {
        message: "Successfully removed item from cart",
        removed,
    }))
}

/// GET /listcart?userID= — the cart lines and their total.
#[tracing::instrument(skip(state, query))]
pub async fn list_cart<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    auth: RequireAuth,
    Query(query): Query<CartQuery>,
) -> Result<Json<CartView>, ApiError> {
    let user_id = auth.resolve(query.user_id.as_deref())?;
    Ok(Json(state.cart.view_cart(user_id).await?))
}

/// GET /cartcheckout?userID= — turn the cart into an order.
#[tracing::instrument(skip(state, query))]
pub async fn checkout<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    auth: RequireAuth,
    Query(query): Query<CartQuery>,
) -> Result<Json<OrderPlacedResponse>, ApiError> {
    let user_id = auth.resolve(query.user_id.as_deref())?;
    let receipt = state
        .checkout
        .checkout_cart(CheckoutCart::new(user_id))
        .await?;
    Ok(Json(OrderPlacedResponse::new(receipt)))
}

/// GET /instantbuy?id=&userID= — buy one product without touching the cart.
#[tracing::instrument(skip(state, query))]
pub async fn instant_buy<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    auth: RequireAuth,
    Query(query): Query<CartQuery>,
) -> Result<Json<OrderPlacedResponse>, ApiError> {
    let user_id = auth.resolve(query.user_id.as_deref())?;
    let product_id = query.product_id()?;
    let receipt = state
        .checkout
        .instant_buy(InstantBuy::new(user_id, product_id))
        .await?;
    Ok(Json(OrderPlacedResponse::new(receipt)))
}
