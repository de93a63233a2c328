use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{DomainError, Product, ProductRepo, ProductSpecs, ProductStats, ProductStatus, Result, StockAdjustment};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::PgConnection;
use uuid::Uuid;

use super::{col, count, db_err, enum_col, like_pattern, PgStore};

const PRODUCT_COLUMNS: &str = "id, sku, name, description, category, specs, stock_quantity, reorder_point, \
     unit_cost, unit_price, images, primary_image, status, created_at, updated_at";

const ADJUSTMENT_COLUMNS: &str =
    "id, product_id, delta, previous_quantity, new_quantity, reason, adjusted_by, created_at";

pub(super) fn product_from_row(row: &PgRow) -> Result<Product> {
    let specs: Json<ProductSpecs> = col(row, "specs")?;
    let images: Json<Vec<String>> = col(row, "images")?;
    Ok(Product {
        id: col(row, "id")?,
        sku: col(row, "sku")?,
        name: col(row, "name")?,
        description: col(row, "description")?,
        category: col(row, "category")?,
        specs: specs.0,
        stock_quantity: col(row, "stock_quantity")?,
        reorder_point: col(row, "reorder_point")?,
        unit_cost: col(row, "unit_cost")?,
        unit_price: col(row, "unit_price")?,
        images: images.0,
        primary_image: col(row, "primary_image")?,
        status: enum_col(row, "status", ProductStatus::parse)?,
        created_at: col(row, "created_at")?,
        updated_at: col(row, "updated_at")?,
    })
}

fn adjustment_from_row(row: &PgRow) -> Result<StockAdjustment> {
    Ok(StockAdjustment {
        id: col(row, "id")?,
        product_id: col(row, "product_id")?,
        delta: col(row, "delta")?,
        previous_quantity: col(row, "previous_quantity")?,
        new_quantity: col(row, "new_quantity")?,
        reason: col(row, "reason")?,
        adjusted_by: col(row, "adjusted_by")?,
        created_at: col(row, "created_at")?,
    })
}

/// Clamped relative move plus its audit row on an open transaction.
///
/// The row lock taken by `FOR UPDATE` serialises concurrent moves on the
/// same product; the update computes from the stored value, never from a
/// value read earlier by the caller.
pub(super) async fn adjust_in(
    conn: &mut PgConnection,
    id: Uuid,
    delta: i32,
    reason: &str,
    actor: Option<String>,
    at: DateTime<Utc>,
) -> Result<Option<(Product, StockAdjustment)>> {
    let previous: Option<i32> = sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?;
    let Some(previous) = previous else {
        return Ok(None);
    };

    let row = sqlx::query(&format!(
        "UPDATE products \
         SET stock_quantity = LEAST(GREATEST(0, stock_quantity::bigint + $2), 2147483647)::integer, updated_at = $3 \
         WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(id)
    .bind(i64::from(delta))
    .bind(at)
    .fetch_one(&mut *conn)
    .await
    .map_err(db_err)?;
    let product = product_from_row(&row)?;

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
    sqlx::query(&format!("INSERT INTO stock_adjustments ({ADJUSTMENT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"))
        .bind(adjustment.id)
        .bind(adjustment.product_id)
        .bind(adjustment.delta)
        .bind(adjustment.previous_quantity)
        .bind(adjustment.new_quantity)
        .bind(&adjustment.reason)
        .bind(&adjustment.adjusted_by)
        .bind(adjustment.created_at)
        .execute(&mut *conn)
        .await
        .map_err(db_err)?;

    Ok(Some((product, adjustment)))
}

#[async_trait]
impl ProductRepo for PgStore {
    async fn list_products(&self, active_only: bool, limit: Option<i64>) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE (NOT $1 OR status = 'active') \
             ORDER BY created_at DESC, id DESC LIMIT $2"
        ))
        .bind(active_only)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(product_from_row).collect()
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn get_product_by_sku(&self, sku: &str) -> Result<Option<Product>> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = $1"))
            .bind(sku)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn search_products(&self, query: &str, limit: i64) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE sku ILIKE $1 OR name ILIKE $1 \
                OR specs->>'application' ILIKE $1 OR specs->>'quality_number' ILIKE $1 \
                OR specs->>'precision_number' ILIKE $1 OR specs->>'oe_number' ILIKE $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2"
        ))
        .bind(like_pattern(query))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(product_from_row).collect()
    }

    async fn low_stock_products(&self, limit: i64) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE status = 'active' AND stock_quantity <= reorder_point \
             ORDER BY stock_quantity DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(product_from_row).collect()
    }

    async fn product_stats(&self) -> Result<ProductStats> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total, \
                    COUNT(*) FILTER (WHERE status = 'active') AS active, \
                    COUNT(*) FILTER (WHERE status = 'active' AND stock_quantity <= reorder_point) AS low_stock \
             FROM products",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(ProductStats {
            total: count(col(&row, "total")?),
            active: count(col(&row, "active")?),
            low_stock: count(col(&row, "low_stock")?),
        })
    }

    async fn insert_product(&self, p: &Product) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO products ({PRODUCT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)"
        ))
        .bind(p.id)
        .bind(&p.sku)
        .bind(&p.name)
        .bind(&p.description)
        .bind(&p.category)
        .bind(Json(&p.specs))
        .bind(p.stock_quantity)
        .bind(p.reorder_point)
        .bind(p.unit_cost)
        .bind(p.unit_price)
        .bind(Json(&p.images))
        .bind(&p.primary_image)
        .bind(p.status.as_str())
        .bind(p.created_at)
        .bind(p.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn update_product(&self, p: &Product) -> Result<()> {
        // stock_quantity is left alone: it only moves through set/adjust.
        let done = sqlx::query(
            "UPDATE products SET sku = $2, name = $3, description = $4, category = $5, specs = $6, \
                 reorder_point = $7, unit_cost = $8, unit_price = $9, images = $10, primary_image = $11, \
                 status = $12, updated_at = $13 \
             WHERE id = $1",
        )
        .bind(p.id)
        .bind(&p.sku)
        .bind(&p.name)
        .bind(&p.description)
        .bind(&p.category)
        .bind(Json(&p.specs))
        .bind(p.reorder_point)
        .bind(p.unit_cost)
        .bind(p.unit_price)
        .bind(Json(&p.images))
        .bind(&p.primary_image)
        .bind(p.status.as_str())
        .bind(p.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        if done.rows_affected() == 0 {
            return Err(DomainError::not_found("product", p.id));
        }
        Ok(())
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool> {
        let done = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(done.rows_affected() > 0)
    }

    async fn set_stock(&self, id: Uuid, quantity: i32, at: DateTime<Utc>) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            "UPDATE products SET stock_quantity = $2, updated_at = $3 WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(quantity)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn adjust_stock(
        &self,
        id: Uuid,
        delta: i32,
        reason: &str,
        actor: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Option<(Product, StockAdjustment)>> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let outcome = adjust_in(&mut tx, id, delta, reason, actor, at).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(outcome)
    }

    async fn stock_history(&self, id: Uuid, limit: i64) -> Result<Vec<StockAdjustment>> {
        let rows = sqlx::query(&format!(
            "SELECT {ADJUSTMENT_COLUMNS} FROM stock_adjustments WHERE product_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2"
        ))
        .bind(id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(adjustment_from_row).collect()
    }
}
