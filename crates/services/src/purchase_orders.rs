//! # Purchase Orders
//!
//! Orders are created together with their line items in one storage
//! transaction. Status changes are free-form unless the deployment turns on
//! transition enforcement.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    Capability, DomainError, LineReceipt, NewPurchaseOrder, PoStatus, ProductRepo, PurchaseOrder,
    PurchaseOrderDetail, PurchaseOrderPatch, PurchaseOrderRepo, ReceiptOutcome, Result, VendorRepo,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::access::{Actor, Policy};
use crate::degrade::degrade_read;
use crate::limit_or;

#[derive(Clone)]
pub struct PurchaseOrderService {
    orders: Arc<dyn PurchaseOrderRepo>,
    vendors: Arc<dyn VendorRepo>,
    products: Arc<dyn ProductRepo>,
    policy: Policy,
}

impl PurchaseOrderService {
    pub fn new(
        orders: Arc<dyn PurchaseOrderRepo>,
        vendors: Arc<dyn VendorRepo>,
        products: Arc<dyn ProductRepo>,
        policy: Policy,
    ) -> Self {
        Self { orders, vendors, products, policy }
    }

    /// Newest first.
    pub async fn list(&self, actor: &Actor, limit: Option<i64>) -> Result<Vec<PurchaseOrder>> {
        actor.require(Capability::ViewPos)?;
        let limit = limit_or(limit, 100);
        degrade_read("purchase_orders.list", self.orders.list_purchase_orders(Some(limit)).await)
    }

    pub async fn get(&self, actor: &Actor, id: Uuid) -> Result<Option<PurchaseOrderDetail>> {
        actor.require(Capability::ViewPos)?;
        degrade_read("purchase_orders.get", self.orders.get_purchase_order(id).await)
    }

    #[instrument(skip(self, actor, input), fields(actor = %actor.id(), po_number = %input.po_number))]
    pub async fn create(&self, actor: &Actor, input: NewPurchaseOrder) -> Result<PurchaseOrderDetail> {
        actor.require(Capability::ManagePos)?;

        // 1. Shape of the order itself
        if input.po_number.trim().is_empty() {
            return Err(DomainError::validation("PO number must not be empty"));
        }
        for (idx, line) in input.line_items.iter().enumerate() {
            let n = idx + 1;
            if line.part_number.trim().is_empty() {
                return Err(DomainError::validation(format!("line {n}: part number must not be empty")));
            }
            if line.quantity <= 0 {
                return Err(DomainError::validation(format!("line {n}: quantity must be positive")));
            }
            if line.unit_price < 0 {
                return Err(DomainError::validation(format!("line {n}: unit price cannot be negative")));
            }
        }

        // 2. Every reference must resolve
        if self.vendors.get_vendor(input.vendor_id).await?.is_none() {
            return Err(DomainError::not_found("vendor", input.vendor_id));
        }
        for product_id in input.line_items.iter().filter_map(|l| l.product_id) {
            if self.products.get_product(product_id).await?.is_none() {
                return Err(DomainError::not_found("product", product_id));
            }
        }

        // 3. Header and lines land together or not at all
        let detail = input.into_detail(Some(actor.id().to_string()), Utc::now());
        self.orders.create_purchase_order(&detail).await?;
        info!(po_id = %detail.order.id, lines = detail.line_items.len(), total = detail.order.total_amount, "purchase order created");
        Ok(detail)
    }

    #[instrument(skip(self, actor, patch), fields(actor = %actor.id()))]
    pub async fn update(&self, actor: &Actor, id: Uuid, patch: PurchaseOrderPatch) -> Result<PurchaseOrder> {
        actor.require(Capability::ManagePos)?;
        let mut order = self
            .orders
            .get_purchase_order(id)
            .await?
            .ok_or_else(|| DomainError::not_found("purchase order", id))?
            .order;

        if let Some(next) = patch.status {
            if self.policy.enforce_po_transitions && !order.status.can_transition_to(next) {
                return Err(DomainError::validation(format!(
                    "cannot move purchase order from {} to {}",
                    order.status, next
                )));
            }
        }

        order.apply(patch);
        order.updated_at = Utc::now();
        self.orders.update_purchase_order(&order).await?;
        Ok(order)
    }

    #[instrument(skip(self, actor), fields(actor = %actor.id()))]
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<()> {
        actor.require(Capability::ManagePos)?;
        if !self.orders.delete_purchase_order(id).await? {
            return Err(DomainError::not_found("purchase order", id));
        }
        Ok(())
    }

    /// Books goods received against one line and restocks the linked product.
    #[instrument(skip(self, actor), fields(actor = %actor.id()))]
    pub async fn receive_line_item(
        &self,
        actor: &Actor,
        po_id: Uuid,
        line_id: Uuid,
        quantity: i32,
    ) -> Result<ReceiptOutcome> {
        actor.require(Capability::ManagePos)?;
        if quantity <= 0 {
            return Err(DomainError::validation("received quantity must be positive"));
        }

        let detail = self
            .orders
            .get_purchase_order(po_id)
            .await?
            .ok_or_else(|| DomainError::not_found("purchase order", po_id))?;
        if detail.order.status == PoStatus::Cancelled {
            return Err(DomainError::validation("cannot receive goods on a cancelled purchase order"));
        }
        let line = detail
            .line_items
            .iter()
            .find(|l| l.id == line_id)
            .ok_or_else(|| DomainError::not_found("line item", line_id))?;
        if quantity > line.outstanding() {
            return Err(DomainError::validation(format!(
                "only {} of line {} are still outstanding",
                line.outstanding(),
                line.line_number
            )));
        }

        let receipt = LineReceipt {
            po_id,
            line_id,
            quantity,
            reason: format!("PO {} receipt", detail.order.po_number),
            received_by: Some(actor.id().to_string()),
            received_at: Utc::now(),
        };
        let outcome = self
            .orders
            .receive_line_item(&receipt)
            .await?
            .ok_or_else(|| DomainError::not_found("line item", line_id))?;
        info!(%po_id, %line_id, quantity, "goods received");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::fixtures::actor;
    use domains::{MockProductRepo, MockPurchaseOrderRepo, MockVendorRepo, NewPoLine, NewVendor, Role};

    fn new_order(lines: Vec<NewPoLine>) -> NewPurchaseOrder {
        NewPurchaseOrder {
            po_number: "PO-1001".into(),
            vendor_id: Uuid::now_v7(),
            po_date: Utc::now(),
            expected_delivery_date: None,
            notes: None,
            line_items: lines,
        }
    }

    fn line(qty: i32, price: i32) -> NewPoLine {
        NewPoLine { part_number: "BR-22".into(), quantity: qty, unit_price: price, ..Default::default() }
    }

    fn vendors(exists: bool) -> MockVendorRepo {
        let mut vendors = MockVendorRepo::new();
        vendors.expect_get_vendor().returning(move |_| {
            Ok(exists.then(|| {
                NewVendor { vendor_code: "V1".into(), vendor_name: "Acme".into(), ..Default::default() }.into_vendor(Utc::now())
            }))
        });
        vendors
    }

    fn service(orders: MockPurchaseOrderRepo, vendors: MockVendorRepo, policy: Policy) -> PurchaseOrderService {
        PurchaseOrderService::new(Arc::new(orders), Arc::new(vendors), Arc::new(MockProductRepo::new()), policy)
    }

    #[tokio::test]
    async fn create_stores_header_and_lines_once() {
        let mut orders = MockPurchaseOrderRepo::new();
        orders
            .expect_create_purchase_order()
            .times(1)
            .withf(|d| d.line_items.len() == 2 && d.order.total_amount == 2 * 1500 + 3 * 200)
            .returning(|_| Ok(()));
        let service = service(orders, vendors(true), Policy::default());

        let detail = service
            .create(&actor("m", Role::Manager), new_order(vec![line(2, 1500), line(3, 200)]))
            .await
            .unwrap();
        assert_eq!(detail.order.status, PoStatus::Draft);
        assert_eq!(detail.order.created_by.as_deref(), Some("m"));
    }

    #[tokio::test]
    async fn bad_line_or_missing_vendor_stores_nothing() {
        let mut orders = MockPurchaseOrderRepo::new();
        orders.expect_create_purchase_order().never();
        let service = service(orders, vendors(false), Policy::default());
        let manager = actor("m", Role::Manager);

        assert!(matches!(
            service.create(&manager, new_order(vec![line(0, 100)])).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            service.create(&manager, new_order(vec![line(1, 100)])).await,
            Err(DomainError::NotFound(..))
        ));
    }

    fn stored(status: PoStatus) -> PurchaseOrderDetail {
        let mut detail = new_order(vec![line(4, 100)]).into_detail(None, Utc::now());
        detail.order.status = status;
        detail
    }

    #[tokio::test]
    async fn transitions_are_free_unless_enforced() {
        let detail = stored(PoStatus::Received);

        let mut orders = MockPurchaseOrderRepo::new();
        let d = detail.clone();
        orders.expect_get_purchase_order().returning(move |_| Ok(Some(d.clone())));
        orders.expect_update_purchase_order().times(1).returning(|_| Ok(()));
        let free = service(orders, vendors(true), Policy::default());
        let back_to_draft = PurchaseOrderPatch { status: Some(PoStatus::Draft), ..Default::default() };
        let order = free.update(&actor("m", Role::Manager), detail.order.id, back_to_draft.clone()).await.unwrap();
        assert_eq!(order.status, PoStatus::Draft);

        let mut orders = MockPurchaseOrderRepo::new();
        let d = detail.clone();
        orders.expect_get_purchase_order().returning(move |_| Ok(Some(d.clone())));
        orders.expect_update_purchase_order().never();
        let strict = service(orders, vendors(true), Policy { enforce_po_transitions: true, ..Policy::default() });
        assert!(matches!(
            strict.update(&actor("m", Role::Manager), detail.order.id, back_to_draft).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn over_receipt_is_rejected() {
        let detail = stored(PoStatus::Sent);
        let (po_id, line_id) = (detail.order.id, detail.line_items[0].id);

        let mut orders = MockPurchaseOrderRepo::new();
        orders.expect_get_purchase_order().returning(move |_| Ok(Some(detail.clone())));
        orders.expect_receive_line_item().never();
        let service = service(orders, vendors(true), Policy::default());

        let err = service.receive_line_item(&actor("a", Role::Admin), po_id, line_id, 5).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn receipt_reason_names_the_po() {
        let detail = stored(PoStatus::Acknowledged);
        let (po_id, line_id) = (detail.order.id, detail.line_items[0].id);
        let line = detail.line_items[0].clone();

        let mut orders = MockPurchaseOrderRepo::new();
        orders.expect_get_purchase_order().returning(move |_| Ok(Some(detail.clone())));
        orders
            .expect_receive_line_item()
            .withf(|r| r.reason == "PO PO-1001 receipt" && r.quantity == 4)
            .returning(move |r| {
                let mut line = line.clone();
                line.received_quantity += r.quantity;
                Ok(Some(ReceiptOutcome { line, product: None }))
            });
        let service = service(orders, vendors(true), Policy::default());

        let outcome = service.receive_line_item(&actor("a", Role::Admin), po_id, line_id, 4).await.unwrap();
        assert_eq!(outcome.line.outstanding(), 0);
    }
}
