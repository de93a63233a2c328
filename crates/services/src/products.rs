//! Product catalog use cases. Stock levels move through `stock` instead.

use std::sync::Arc;

use chrono::Utc;
use domains::{Capability, DomainError, NewProduct, Product, ProductPatch, ProductRepo, ProductStats, Result};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::access::Actor;
use crate::degrade::degrade_read;
use crate::limit_or;

#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductRepo>,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductRepo>) -> Self {
        Self { products }
    }

    /// Active products, newest first.
    pub async fn list(&self, limit: Option<i64>) -> Result<Vec<Product>> {
        let limit = limit_or(limit, 100);
        degrade_read("products.list", self.products.list_products(true, Some(limit)).await)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Product>> {
        degrade_read("products.get", self.products.get_product(id).await)
    }

    pub async fn get_by_sku(&self, sku: &str) -> Result<Option<Product>> {
        degrade_read("products.get_by_sku", self.products.get_product_by_sku(sku.trim()).await)
    }

    /// Substring search over sku, name, application, quality, precision and
    /// OE numbers. A blank query matches nothing.
    pub async fn search(&self, query: &str, limit: Option<i64>) -> Result<Vec<Product>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        degrade_read("products.search", self.products.search_products(query, limit_or(limit, 50)).await)
    }

    pub async fn stats(&self) -> Result<ProductStats> {
        degrade_read("products.stats", self.products.product_stats().await)
    }

    /// Active products at or below their reorder point.
    pub async fn low_stock(&self, actor: &Actor, limit: Option<i64>) -> Result<Vec<Product>> {
        actor.require(Capability::ViewStock)?;
        degrade_read("products.low_stock", self.products.low_stock_products(limit_or(limit, 50)).await)
    }

    #[instrument(skip(self, actor, input), fields(actor = %actor.id(), sku = %input.sku))]
    pub async fn create(&self, actor: &Actor, input: NewProduct) -> Result<Product> {
        actor.require(Capability::EditProducts)?;
        if input.stock_quantity.is_some_and(|q| q < 0) {
            return Err(DomainError::validation("stock quantity cannot be negative"));
        }

        let product = input.into_product(Utc::now());
        validate(&product)?;
        if self.products.get_product_by_sku(&product.sku).await?.is_some() {
            return Err(DomainError::Conflict(format!("SKU `{}` already exists", product.sku)));
        }

        self.products.insert_product(&product).await?;
        info!(product_id = %product.id, "product created");
        Ok(product)
    }

    #[instrument(skip(self, actor, patch), fields(actor = %actor.id()))]
    pub async fn update(&self, actor: &Actor, id: Uuid, patch: ProductPatch) -> Result<Product> {
        actor.require(Capability::EditProducts)?;
        let mut product = self
            .products
            .get_product(id)
            .await?
            .ok_or_else(|| DomainError::not_found("product", id))?;

        if let Some(sku) = patch.sku.as_deref().map(str::trim) {
            if sku != product.sku {
                if let Some(other) = self.products.get_product_by_sku(sku).await? {
                    if other.id != id {
                        return Err(DomainError::Conflict(format!("SKU `{sku}` already exists")));
                    }
                }
            }
        }

        product.apply(patch);
        product.sku = product.sku.trim().to_string();
        product.name = product.name.trim().to_string();
        validate(&product)?;
        product.updated_at = Utc::now();

        self.products.update_product(&product).await?;
        Ok(product)
    }

    #[instrument(skip(self, actor), fields(actor = %actor.id()))]
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<()> {
        actor.require(Capability::DeleteProducts)?;
        if !self.products.delete_product(id).await? {
            return Err(DomainError::not_found("product", id));
        }
        info!(product_id = %id, "product deleted");
        Ok(())
    }
}

fn validate(product: &Product) -> Result<()> {
    if product.sku.is_empty() {
        return Err(DomainError::validation("SKU must not be empty"));
    }
    if product.name.is_empty() {
        return Err(DomainError::validation("product name must not be empty"));
    }
    if product.reorder_point < 0 {
        return Err(DomainError::validation("reorder point cannot be negative"));
    }
    if product.unit_cost.is_some_and(|c| c < 0) || product.unit_price.is_some_and(|p| p < 0) {
        return Err(DomainError::validation("prices cannot be negative"));
    }
    Ok(())
}
