use async_trait::async_trait;
use domains::{
    DomainError, LineReceipt, PoLineItem, PoStatus, PurchaseOrder, PurchaseOrderDetail, PurchaseOrderRepo,
    ReceiptOutcome, Result, Vendor, VendorRepo,
};
use sqlx::postgres::PgRow;
use uuid::Uuid;

use super::products::adjust_in;
use super::{col, db_err, enum_col, PgStore};

const VENDOR_COLUMNS: &str = "id, vendor_code, vendor_name, contact_name, email, phone, address, lead_time_days, \
     payment_terms, notes, is_active, created_at, updated_at";

const ORDER_COLUMNS: &str = "id, po_number, vendor_id, po_date, expected_delivery_date, actual_delivery_date, \
     status, total_amount, notes, created_by, created_at, updated_at";

const LINE_COLUMNS: &str = "id, po_id, line_number, product_id, part_number, description, quantity, unit_price, \
     total_price, received_quantity, created_at, updated_at";

fn vendor_from_row(row: &PgRow) -> Result<Vendor> {
    Ok(Vendor {
        id: col(row, "id")?,
        vendor_code: col(row, "vendor_code")?,
        vendor_name: col(row, "vendor_name")?,
        contact_name: col(row, "contact_name")?,
        email: col(row, "email")?,
        phone: col(row, "phone")?,
        address: col(row, "address")?,
        lead_time_days: col(row, "lead_time_days")?,
        payment_terms: col(row, "payment_terms")?,
        notes: col(row, "notes")?,
        is_active: col(row, "is_active")?,
        created_at: col(row, "created_at")?,
        updated_at: col(row, "updated_at")?,
    })
}

fn order_from_row(row: &PgRow) -> Result<PurchaseOrder> {
    Ok(PurchaseOrder {
        id: col(row, "id")?,
        po_number: col(row, "po_number")?,
        vendor_id: col(row, "vendor_id")?,
        po_date: col(row, "po_date")?,
        expected_delivery_date: col(row, "expected_delivery_date")?,
        actual_delivery_date: col(row, "actual_delivery_date")?,
        status: enum_col(row, "status", PoStatus::parse)?,
        total_amount: col(row, "total_amount")?,
        notes: col(row, "notes")?,
        created_by: col(row, "created_by")?,
        created_at: col(row, "created_at")?,
        updated_at: col(row, "updated_at")?,
    })
}

fn line_from_row(row: &PgRow) -> Result<PoLineItem> {
    Ok(PoLineItem {
        id: col(row, "id")?,
        po_id: col(row, "po_id")?,
        line_number: col(row, "line_number")?,
        product_id: col(row, "product_id")?,
        part_number: col(row, "part_number")?,
        description: col(row, "description")?,
        quantity: col(row, "quantity")?,
        unit_price: col(row, "unit_price")?,
        total_price: col(row, "total_price")?,
        received_quantity: col(row, "received_quantity")?,
        created_at: col(row, "created_at")?,
        updated_at: col(row, "updated_at")?,
    })
}

#[async_trait]
impl VendorRepo for PgStore {
    async fn list_vendors(&self, active_only: bool) -> Result<Vec<Vendor>> {
        let rows = sqlx::query(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors WHERE (NOT $1 OR is_active) ORDER BY vendor_name"
        ))
        .bind(active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(vendor_from_row).collect()
    }

    async fn get_vendor(&self, id: Uuid) -> Result<Option<Vendor>> {
        let row = sqlx::query(&format!("SELECT {VENDOR_COLUMNS} FROM vendors WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(vendor_from_row).transpose()
    }

    async fn insert_vendor(&self, v: &Vendor) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO vendors ({VENDOR_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"
        ))
        .bind(v.id)
        .bind(&v.vendor_code)
        .bind(&v.vendor_name)
        .bind(&v.contact_name)
        .bind(&v.email)
        .bind(&v.phone)
        .bind(&v.address)
        .bind(v.lead_time_days)
        .bind(&v.payment_terms)
        .bind(&v.notes)
        .bind(v.is_active)
        .bind(v.created_at)
        .bind(v.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn update_vendor(&self, v: &Vendor) -> Result<()> {
        let done = sqlx::query(
            "UPDATE vendors SET vendor_code = $2, vendor_name = $3, contact_name = $4, email = $5, phone = $6, \
                 address = $7, lead_time_days = $8, payment_terms = $9, notes = $10, is_active = $11, updated_at = $12 \
             WHERE id = $1",
        )
        .bind(v.id)
        .bind(&v.vendor_code)
        .bind(&v.vendor_name)
        .bind(&v.contact_name)
        .bind(&v.email)
        .bind(&v.phone)
        .bind(&v.address)
        .bind(v.lead_time_days)
        .bind(&v.payment_terms)
        .bind(&v.notes)
        .bind(v.is_active)
        .bind(v.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        if done.rows_affected() == 0 {
            return Err(DomainError::not_found("vendor", v.id));
        }
        Ok(())
    }

    async fn delete_vendor(&self, id: Uuid) -> Result<bool> {
        let done = sqlx::query("DELETE FROM vendors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(done.rows_affected() > 0)
    }
}

#[async_trait]
impl PurchaseOrderRepo for PgStore {
    async fn list_purchase_orders(&self, limit: Option<i64>) -> Result<Vec<PurchaseOrder>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM purchase_orders ORDER BY created_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(order_from_row).collect()
    }

    async fn get_purchase_order(&self, id: Uuid) -> Result<Option<PurchaseOrderDetail>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM purchase_orders WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let order = order_from_row(&row)?;

        let lines = sqlx::query(&format!("SELECT {LINE_COLUMNS} FROM po_line_items WHERE po_id = $1 ORDER BY line_number"))
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        let line_items = lines.iter().map(line_from_row).collect::<Result<Vec<_>>>()?;
        Ok(Some(PurchaseOrderDetail { order, line_items }))
    }

    /// Header and lines land together or not at all.
    async fn create_purchase_order(&self, detail: &PurchaseOrderDetail) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let o = &detail.order;

        // 1. Insert header
        sqlx::query(&format!(
            "INSERT INTO purchase_orders ({ORDER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
        ))
        .bind(o.id)
        .bind(&o.po_number)
        .bind(o.vendor_id)
        .bind(o.po_date)
        .bind(o.expected_delivery_date)
        .bind(o.actual_delivery_date)
        .bind(o.status.as_str())
        .bind(o.total_amount)
        .bind(&o.notes)
        .bind(&o.created_by)
        .bind(o.created_at)
        .bind(o.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        // 2. Insert lines
        for line in &detail.line_items {
            sqlx::query(&format!(
                "INSERT INTO po_line_items ({LINE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
            ))
            .bind(line.id)
            .bind(line.po_id)
            .bind(line.line_number)
            .bind(line.product_id)
            .bind(&line.part_number)
            .bind(&line.description)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.total_price)
            .bind(line.received_quantity)
            .bind(line.created_at)
            .bind(line.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn update_purchase_order(&self, o: &PurchaseOrder) -> Result<()> {
        let done = sqlx::query(
            "UPDATE purchase_orders SET po_number = $2, vendor_id = $3, po_date = $4, expected_delivery_date = $5, \
                 actual_delivery_date = $6, status = $7, total_amount = $8, notes = $9, updated_at = $10 \
             WHERE id = $1",
        )
        .bind(o.id)
        .bind(&o.po_number)
        .bind(o.vendor_id)
        .bind(o.po_date)
        .bind(o.expected_delivery_date)
        .bind(o.actual_delivery_date)
        .bind(o.status.as_str())
        .bind(o.total_amount)
        .bind(&o.notes)
        .bind(o.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        if done.rows_affected() == 0 {
            return Err(DomainError::not_found("purchase order", o.id));
        }
        Ok(())
    }

    async fn delete_purchase_order(&self, id: Uuid) -> Result<bool> {
        let done = sqlx::query("DELETE FROM purchase_orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(done.rows_affected() > 0)
    }

    async fn receive_line_item(&self, receipt: &LineReceipt) -> Result<Option<ReceiptOutcome>> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // 1. Lock the line; its order must match.
        let row = sqlx::query(&format!(
            "SELECT {LINE_COLUMNS} FROM po_line_items WHERE id = $1 AND po_id = $2 FOR UPDATE"
        ))
        .bind(receipt.line_id)
        .bind(receipt.po_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut line = line_from_row(&row)?;

        // 2. Book at most what is still outstanding
        let booked = receipt.quantity.min(line.outstanding()).max(0);
        line.received_quantity += booked;
        line.updated_at = receipt.received_at;
        sqlx::query("UPDATE po_line_items SET received_quantity = $2, updated_at = $3 WHERE id = $1")
            .bind(line.id)
            .bind(line.received_quantity)
            .bind(line.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        // 3. Restock the linked product
        let product = match line.product_id {
            Some(product_id) if booked > 0 => {
                adjust_in(&mut tx, product_id, booked, &receipt.reason, receipt.received_by.clone(), receipt.received_at)
                    .await?
                    .map(|(product, _)| product)
            }
            _ => None,
        };

        sqlx::query("UPDATE purchase_orders SET updated_at = $2 WHERE id = $1")
            .bind(receipt.po_id)
            .bind(receipt.received_at)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(Some(ReceiptOutcome { line, product }))
    }
}
