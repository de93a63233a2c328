use async_trait::async_trait;
use domains::{
    DomainError, LineReceipt, PurchaseOrder, PurchaseOrderDetail, PurchaseOrderRepo, ReceiptOutcome, Result, Vendor,
    VendorRepo,
};
use uuid::Uuid;

use super::{claim, release, take, values, MemoryStore};

impl MemoryStore {
    fn claim_vendor_code(&self, vendor: &Vendor) -> Result<()> {
        if !claim(&self.vendor_codes, vendor.vendor_code.clone(), vendor.id) {
            return Err(DomainError::Conflict(format!("vendor code `{}` already exists", vendor.vendor_code)));
        }
        Ok(())
    }
}

#[async_trait]
impl VendorRepo for MemoryStore {
    async fn list_vendors(&self, active_only: bool) -> Result<Vec<Vendor>> {
        self.check()?;
        let mut vendors: Vec<Vendor> = values(&self.vendors)
            .into_iter()
            .filter(|v| !active_only || v.is_active)
            .collect();
        vendors.sort_by(|a, b| a.vendor_name.cmp(&b.vendor_name));
        Ok(vendors)
    }

    async fn get_vendor(&self, id: Uuid) -> Result<Option<Vendor>> {
        self.check()?;
        Ok(self.vendors.get(&id).map(|v| v.clone()))
    }

    async fn insert_vendor(&self, vendor: &Vendor) -> Result<()> {
        self.check()?;
        self.claim_vendor_code(vendor)?;
        self.vendors.insert(vendor.id, vendor.clone());
        Ok(())
    }

    async fn update_vendor(&self, vendor: &Vendor) -> Result<()> {
        self.check()?;
        let Some(previous_code) = self.vendors.get(&vendor.id).map(|v| v.vendor_code.clone()) else {
            return Err(DomainError::not_found("vendor", vendor.id));
        };
        self.claim_vendor_code(vendor)?;
        match self.vendors.get_mut(&vendor.id) {
            Some(mut stored) => {
                *stored = vendor.clone();
                drop(stored);
                if previous_code != vendor.vendor_code {
                    release(&self.vendor_codes, &previous_code, vendor.id);
                }
                Ok(())
            }
            None => {
                release(&self.vendor_codes, &vendor.vendor_code, vendor.id);
                Err(DomainError::not_found("vendor", vendor.id))
            }
        }
    }

    async fn delete_vendor(&self, id: Uuid) -> Result<bool> {
        self.check()?;
        let Some((_, vendor)) = self.vendors.remove(&id) else {
            return Ok(false);
        };
        release(&self.vendor_codes, &vendor.vendor_code, id);
        Ok(true)
    }
}

#[async_trait]
impl PurchaseOrderRepo for MemoryStore {
    async fn list_purchase_orders(&self, limit: Option<i64>) -> Result<Vec<PurchaseOrder>> {
        self.check()?;
        let mut orders: Vec<PurchaseOrder> = self.purchase_orders.iter().map(|d| d.order.clone()).collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        if let Some(limit) = limit {
            orders.truncate(take(limit));
        }
        Ok(orders)
    }

    async fn get_purchase_order(&self, id: Uuid) -> Result<Option<PurchaseOrderDetail>> {
        self.check()?;
        Ok(self.purchase_orders.get(&id).map(|d| d.clone()))
    }

    async fn create_purchase_order(&self, detail: &PurchaseOrderDetail) -> Result<()> {
        self.check()?;
        let number = &detail.order.po_number;
        if !claim(&self.po_numbers, number.clone(), detail.order.id) {
            return Err(DomainError::Conflict(format!("PO number `{number}` already exists")));
        }
        let mut detail = detail.clone();
        detail.line_items.sort_by_key(|l| l.line_number);
        self.purchase_orders.insert(detail.order.id, detail);
        Ok(())
    }

    async fn update_purchase_order(&self, order: &PurchaseOrder) -> Result<()> {
        self.check()?;
        match self.purchase_orders.get_mut(&order.id) {
            Some(mut stored) => {
                // The number is fixed at creation.
                let po_number = std::mem::take(&mut stored.order.po_number);
                stored.order = order.clone();
                stored.order.po_number = po_number;
                Ok(())
            }
            None => Err(DomainError::not_found("purchase order", order.id)),
        }
    }

    async fn delete_purchase_order(&self, id: Uuid) -> Result<bool> {
        self.check()?;
        let Some((_, detail)) = self.purchase_orders.remove(&id) else {
            return Ok(false);
        };
        release(&self.po_numbers, &detail.order.po_number, id);
        Ok(true)
    }

    async fn receive_line_item(&self, receipt: &LineReceipt) -> Result<Option<ReceiptOutcome>> {
        self.check()?;
        let Some(mut detail) = self.purchase_orders.get_mut(&receipt.po_id) else {
            return Ok(None);
        };
        let Some(line) = detail.line_items.iter_mut().find(|l| l.id == receipt.line_id) else {
            return Ok(None);
        };

        let booked = receipt.quantity.min(line.outstanding()).max(0);
        line.received_quantity += booked;
        line.updated_at = receipt.received_at;
        let line = line.clone();

        let product = match line.product_id {
            Some(product_id) if booked > 0 => self
                .apply_adjustment(product_id, booked, &receipt.reason, receipt.received_by.clone(), receipt.received_at)
                .map(|(product, _)| product),
            _ => None,
        };
        detail.order.updated_at = receipt.received_at;
        Ok(Some(ReceiptOutcome { line, product }))
    }
}
