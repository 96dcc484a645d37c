//! Catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use common::Product;
use document_store::DocumentStore;
use domain::NewProduct;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub name: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// POST /admin/addproduct — insert a product into the catalog.
#[tracing::instrument(skip(state, req))]
pub async fn add_product<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<NewProduct>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.catalog.add_product(req).await?;
    Ok(Json(MessageResponse {
        message: "Successfully added the product!",
    }))
}

/// GET /users/productview — list every product.
#[tracing::instrument(skip(state))]
pub async fn list<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.catalog.list_products().await?))
}

/// GET /users/search?name= — substring search over product names.
#[tracing::instrument(skip(state, query), fields(name = %query.name))]
pub async fn search<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.catalog.search_products_by_name(&query.name).await?))
}
