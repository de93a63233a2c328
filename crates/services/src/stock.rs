//! # Stock Adjustment
//!
//! Overwrites and relative adjustments of `stock_quantity`. Relative moves
//! are clamped at zero and audited; the read-modify-write happens atomically
//! inside the repository.

use std::sync::Arc;

use chrono::Utc;
use domains::{Capability, DomainError, Product, ProductRepo, Result, StockAdjustment};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::access::Actor;
use crate::degrade::degrade_read;
use crate::limit_or;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustedStock {
    pub product: Product,
    pub adjustment: StockAdjustment,
}

#[derive(Clone)]
pub struct StockService {
    products: Arc<dyn ProductRepo>,
}

impl StockService {
    pub fn new(products: Arc<dyn ProductRepo>) -> Self {
        Self { products }
    }

    #[instrument(skip(self, actor), fields(actor = %actor.id()))]
    pub async fn set_stock(&self, actor: &Actor, id: Uuid, quantity: i32, note: Option<&str>) -> Result<Product> {
        actor.require(Capability::UpdateStock)?;
        if quantity < 0 {
            return Err(DomainError::validation("stock quantity cannot be negative"));
        }

        let product = self
            .products
            .set_stock(id, quantity, Utc::now())
            .await?
            .ok_or_else(|| DomainError::not_found("product", id))?;
        info!(product_id = %id, quantity, note, "stock set");
        Ok(product)
    }

    /// `max(0, current + delta)`, recorded with the reason and the actor.
    #[instrument(skip(self, actor), fields(actor = %actor.id()))]
    pub async fn adjust_stock(&self, actor: &Actor, id: Uuid, delta: i32, reason: &str) -> Result<AdjustedStock> {
        actor.require(Capability::UpdateStock)?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(DomainError::validation("a reason is required for stock adjustments"));
        }

        let (product, adjustment) = self
            .products
            .adjust_stock(id, delta, reason, Some(actor.id().to_string()), Utc::now())
            .await?
            .ok_or_else(|| DomainError::not_found("product", id))?;
        info!(
            product_id = %id,
            delta,
            previous = adjustment.previous_quantity,
            current = adjustment.new_quantity,
            "stock adjusted"
        );
        Ok(AdjustedStock { product, adjustment })
    }

    /// Audit rows, newest first.
    pub async fn history(&self, actor: &Actor, id: Uuid, limit: Option<i64>) -> Result<Vec<StockAdjustment>> {
        actor.require(Capability::ViewStock)?;
        degrade_read("stock.history", self.products.stock_history(id, limit_or(limit, 50)).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::fixtures::actor;
    use domains::{MockProductRepo, NewProduct, Role};

    #[tokio::test]
    async fn negative_quantity_is_rejected() {
        let mut repo = MockProductRepo::new();
        repo.expect_set_stock().never();
        let service = StockService::new(Arc::new(repo));
        let err = service.set_stock(&actor("f", Role::ShopFloor), Uuid::now_v7(), -1, None).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn sales_cannot_move_stock() {
        let service = StockService::new(Arc::new(MockProductRepo::new()));
        let sales = actor("s", Role::Sales);
        assert!(matches!(
            service.adjust_stock(&sales, Uuid::now_v7(), 3, "count").await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            service.set_stock(&sales, Uuid::now_v7(), 3, None).await,
            Err(DomainError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn reason_is_required_and_actor_recorded() {
        let mut repo = MockProductRepo::new();
        repo.expect_adjust_stock()
            .withf(|_, delta, reason, actor, _| *delta == -4 && reason == "damaged" && actor.as_deref() == Some("f"))
            .returning(|id, delta, reason, actor, at| {
                let mut product = NewProduct { sku: "SR-1".into(), name: "Rack".into(), ..Default::default() }
                    .into_product(at);
                product.id = id;
                let adjustment = StockAdjustment {
                    id: Uuid::now_v7(),
                    product_id: id,
                    delta,
                    previous_quantity: 2,
                    new_quantity: 0,
                    reason: reason.to_string(),
                    adjusted_by: actor,
                    created_at: at,
                };
                Ok(Some((product, adjustment)))
            });
        let service = StockService::new(Arc::new(repo));
        let floor = actor("f", Role::ShopFloor);

        assert!(matches!(
            service.adjust_stock(&floor, Uuid::now_v7(), -4, "  ").await,
            Err(DomainError::Validation(_))
        ));
        let adjusted = service.adjust_stock(&floor, Uuid::now_v7(), -4, " damaged ").await.unwrap();
        assert_eq!(adjusted.adjustment.new_quantity, 0);
        assert_eq!(adjusted.product.stock_quantity, 0);
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let mut repo = MockProductRepo::new();
        repo.expect_set_stock().returning(|_, _, _| Ok(None));
        let service = StockService::new(Arc::new(repo));
        let err = service.set_stock(&actor("a", Role::Admin), Uuid::now_v7(), 10, Some("recount")).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(..)));
    }
}
