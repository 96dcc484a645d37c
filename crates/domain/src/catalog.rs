//! Catalog Store: read access to products plus the admin insert.

use common::{Money, Product, ProductId};
use document_store::{CatalogStore, DocumentStore};
use serde::Deserialize;

use crate::context::StoreContext;
use crate::error::DomainError;

/// Product fields accepted from the admin endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub product_name: String,
    pub price: i64,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub image: String,
}

impl NewProduct {
    /// Creates a new product description.
    pub fn new(product_name: impl Into<String>, price: i64, image: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            price,
            rating: None,
            image: image.into(),
        }
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.product_name.trim().is_empty() {
            return Err(DomainError::InvalidProduct(
                "product name is required".to_string(),
            ));
        }
        if self.price < 0 {
            return Err(DomainError::InvalidProduct(format!(
                "price must not be negative, got {}",
                self.price
            )));
        }
        if let Some(rating) = self.rating
            && rating > 5
        {
            return Err(DomainError::InvalidProduct(format!(
                "rating must be between 0 and 5, got {rating}"
            )));
        }
        Ok(())
    }
}

/// Service for catalog lookups.
pub struct CatalogService<S: DocumentStore> {
    ctx: StoreContext<S>,
}

impl<S: DocumentStore> CatalogService<S> {
    /// Creates a new catalog service.
    pub fn new(ctx: StoreContext<S>) -> Self {
        Self { ctx }
    }

    /// Inserts a product under a fresh identifier.
    #[tracing::instrument(skip(self))]
    pub async fn add_product(&self, new: NewProduct) -> Result<Product, DomainError> {
        new.validate()?;

        let product = Product {
            product_id: ProductId::new(),
            product_name: new.product_name,
            price: Money::from_cents(new.price),
            rating: new.rating,
            image: new.image,
        };
        self.ctx
            .run(self.ctx.store().insert_product(product.clone()))
            .await?;

        tracing::info!(product_id = %product.product_id, "product added");
        Ok(product)
    }

    /// Resolves a product, failing with `ProductNotFound` on a miss.
    #[tracing::instrument(skip(self))]
    pub async fn find_product(&self, product_id: ProductId) -> Result<Product, DomainError> {
        self.ctx
            .run(self.ctx.store().find_product(product_id))
            .await?
            .ok_or_else(|| DomainError::ProductNotFound(product_id.to_string()))
    }

    /// Lists every product.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        Ok(self.ctx.run(self.ctx.store().list_products()).await?)
    }

    /// Case-sensitive substring search over product names.
    #[tracing::instrument(skip(self))]
    pub async fn search_products_by_name(&self, query: &str) -> Result<Vec<Product>, DomainError> {
        if query.is_empty() {
            return Err(DomainError::EmptySearchQuery);
        }
        Ok(self
            .ctx
            .run(self.ctx.store().search_products_by_name(query))
            .await?)
    }
}
