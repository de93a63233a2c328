use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{DomainError, Product, ProductRepo, ProductStats, ProductStatus, Result, StockAdjustment};
use uuid::Uuid;

use super::{claim, release, take, values, MemoryStore};

impl MemoryStore {
    fn claim_sku(&self, sku: &str, id: Uuid) -> Result<()> {
        if !claim(&self.skus, sku.to_string(), id) {
            return Err(DomainError::Conflict(format!("SKU `{sku}` already exists")));
        }
        Ok(())
    }

    /// Clamped relative move plus its audit row, under the product's entry lock.
    pub(super) fn apply_adjustment(
        &self,
        id: Uuid,
        delta: i32,
        reason: &str,
        actor: Option<String>,
        at: DateTime<Utc>,
    ) -> Option<(Product, StockAdjustment)> {
        let mut product = self.products.get_mut(&id)?;
        let previous = product.stock_quantity;
        product.stock_quantity = previous.saturating_add(delta).max(0);
        product.updated_at = at;

        let adjustment = StockAdjustment {
            id: Uuid::now_v7(),
            product_id: id,
            delta,
            previous_quantity: previous,
            new_quantity: product.stock_quantity,
            reason: reason.to_string(),
            adjusted_by: actor,
            created_at: at,
        };
        self.stock_adjustments.entry(id).or_default().push(adjustment.clone());
        Some((product.clone(), adjustment))
    }
}

fn newest_first(products: &mut [Product]) {
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
}

#[async_trait]
impl ProductRepo for MemoryStore {
    async fn list_products(&self, active_only: bool, limit: Option<i64>) -> Result<Vec<Product>> {
        self.check()?;
        let mut products: Vec<Product> = values(&self.products)
            .into_iter()
            .filter(|p| !active_only || p.status == ProductStatus::Active)
            .collect();
        newest_first(&mut products);
        if let Some(limit) = limit {
            products.truncate(take(limit));
        }
        Ok(products)
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
        self.check()?;
        Ok(self.products.get(&id).map(|p| p.clone()))
    }

    async fn get_product_by_sku(&self, sku: &str) -> Result<Option<Product>> {
        self.check()?;
        let Some(id) = self.skus.get(sku).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.products.get(&id).map(|p| p.clone()))
    }

    async fn search_products(&self, query: &str, limit: i64) -> Result<Vec<Product>> {
        self.check()?;
        let mut hits: Vec<Product> = values(&self.products).into_iter().filter(|p| p.matches_query(query)).collect();
        newest_first(&mut hits);
        hits.truncate(take(limit));
        Ok(hits)
    }

    async fn low_stock_products(&self, limit: i64) -> Result<Vec<Product>> {
        self.check()?;
        let mut low: Vec<Product> = values(&self.products)
            .into_iter()
            .filter(|p| p.status == ProductStatus::Active && p.is_low_stock())
            .collect();
        low.sort_by(|a, b| b.stock_quantity.cmp(&a.stock_quantity));
        low.truncate(take(limit));
        Ok(low)
    }

    async fn product_stats(&self) -> Result<ProductStats> {
        self.check()?;
        let mut stats = ProductStats::default();
        for product in self.products.iter() {
            stats.total += 1;
            if product.status == ProductStatus::Active {
                stats.active += 1;
                if product.is_low_stock() {
                    stats.low_stock += 1;
                }
            }
        }
        Ok(stats)
    }

    async fn insert_product(&self, product: &Product) -> Result<()> {
        self.check()?;
        self.claim_sku(&product.sku, product.id)?;
        self.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> Result<()> {
        self.check()?;
        let Some(previous_sku) = self.products.get(&product.id).map(|p| p.sku.clone()) else {
            return Err(DomainError::not_found("product", product.id));
        };
        self.claim_sku(&product.sku, product.id)?;
        match self.products.get_mut(&product.id) {
            Some(mut stored) => {
                // Stock only moves through the stock operations.
                let stock = stored.stock_quantity;
                *stored = product.clone();
                stored.stock_quantity = stock;
                drop(stored);
                if previous_sku != product.sku {
                    release(&self.skus, &previous_sku, product.id);
                }
                Ok(())
            }
            None => {
                release(&self.skus, &product.sku, product.id);
                Err(DomainError::not_found("product", product.id))
            }
        }
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool> {
        self.check()?;
        self.stock_adjustments.remove(&id);
        let Some((_, product)) = self.products.remove(&id) else {
            return Ok(false);
        };
        release(&self.skus, &product.sku, id);
        Ok(true)
    }

    async fn set_stock(&self, id: Uuid, quantity: i32, at: DateTime<Utc>) -> Result<Option<Product>> {
        self.check()?;
        Ok(self.products.get_mut(&id).map(|mut product| {
            product.stock_quantity = quantity;
            product.updated_at = at;
            product.clone()
        }))
    }

    async fn adjust_stock(
        &self,
        id: Uuid,
        delta: i32,
        reason: &str,
        actor: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Option<(Product, StockAdjustment)>> {
        self.check()?;
        Ok(self.apply_adjustment(id, delta, reason, actor, at))
    }

    async fn stock_history(&self, id: Uuid, limit: i64) -> Result<Vec<StockAdjustment>> {
        self.check()?;
        let mut rows = self.stock_adjustments.get(&id).map(|r| r.clone()).unwrap_or_default();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        rows.truncate(take(limit));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use super::*;
    use domains::NewProduct;

    fn product(sku: &str, stock: i32) -> Product {
        NewProduct { sku: sku.into(), name: "Rack".into(), stock_quantity: Some(stock), ..Default::default() }
            .into_product(Utc::now())
    }

    #[tokio::test]
    async fn duplicate_sku_conflicts() {
        let store = MemoryStore::new();
        store.insert_product(&product("SR-1", 0)).await.unwrap();
        assert!(matches!(store.insert_product(&product("SR-1", 0)).await, Err(DomainError::Conflict(_))));
    }

    #[test]
    fn racing_inserts_of_one_sku_keep_a_single_product() {
        let store = Arc::new(MemoryStore::new());
        let gate = Arc::new(Barrier::new(8));

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let (store, gate) = (store.clone(), gate.clone());
                thread::spawn(move || {
                    let candidate = product("SR-RACE", 1);
                    gate.wait();
                    tokio_test::block_on(store.insert_product(&candidate)).is_ok()
                })
            })
            .collect();
        let stored = workers.into_iter().filter_map(|w| w.join().ok()).filter(|ok| *ok).count();

        assert_eq!(stored, 1);
        assert_eq!(tokio_test::block_on(store.list_products(false, None)).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn renaming_or_deleting_frees_the_old_sku() {
        let store = MemoryStore::new();
        let mut first = product("SR-1", 4);
        store.insert_product(&first).await.unwrap();
        let second = product("SR-2", 0);
        store.insert_product(&second).await.unwrap();

        let mut clash = second.clone();
        clash.sku = "SR-1".into();
        assert!(matches!(store.update_product(&clash).await, Err(DomainError::Conflict(_))));

        first.sku = "SR-1B".into();
        store.update_product(&first).await.unwrap();
        assert_eq!(store.get_product_by_sku("SR-1B").await.unwrap().map(|p| p.stock_quantity), Some(4));
        assert!(store.get_product_by_sku("SR-1").await.unwrap().is_none());

        assert!(store.delete_product(second.id).await.unwrap());
        store.insert_product(&product("SR-2", 0)).await.unwrap();
    }

    #[tokio::test]
    async fn adjustment_clamps_at_zero_and_is_audited() {
        let store = MemoryStore::new();
        let p = product("SR-1", 3);
        store.insert_product(&p).await.unwrap();

        let (after, audit) = store
            .adjust_stock(p.id, -10, "scrapped", Some("u-1".into()), Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.stock_quantity, 0);
        assert_eq!((audit.previous_quantity, audit.new_quantity), (3, 0));
        assert_eq!(store.stock_history(p.id, 10).await.unwrap().len(), 1);
        assert!(store.adjust_stock(Uuid::now_v7(), 1, "x", None, Utc::now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_adjustments_are_not_lost() {
        let store = Arc::new(MemoryStore::new());
        let p = product("SR-1", 0);
        store.insert_product(&p).await.unwrap();

        let id = p.id;
        let mut tasks = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.adjust_stock(id, 2, "receipt", None, Utc::now()).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(store.get_product(id).await.unwrap().unwrap().stock_quantity, 100);
    }

    #[tokio::test]
    async fn low_stock_is_inclusive_and_ordered() {
        let store = MemoryStore::new();
        for (sku, stock) in [("A", 5), ("B", 6), ("C", 1)] {
            store.insert_product(&product(sku, stock)).await.unwrap();
        }
        let low: Vec<String> = store.low_stock_products(10).await.unwrap().into_iter().map(|p| p.sku).collect();
        assert_eq!(low, vec!["A", "C"]);
        assert_eq!(store.product_stats().await.unwrap(), ProductStats { total: 3, active: 3, low_stock: 2 });
    }
}
