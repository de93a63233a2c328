mod common;

use std::sync::Arc;

use ai_adapters::DisabledRanker;
use chrono::Utc;
use domains::{
    DomainError, NewPoLine, NewPurchaseOrder, NewVendor, PoStatus, PurchaseOrderPatch, Role, Vendor,
};
use services::{Actor, Policy};
use uuid::Uuid;

async fn vendor(w: &common::World, manager: &Actor, code: &str) -> Vendor {
    w.services
        .vendors
        .create(manager, NewVendor { vendor_code: code.into(), vendor_name: format!("Vendor {code}"), ..Default::default() })
        .await
        .unwrap()
}

fn order(po_number: &str, vendor_id: Uuid, lines: Vec<NewPoLine>) -> NewPurchaseOrder {
    NewPurchaseOrder {
        po_number: po_number.into(),
        vendor_id,
        po_date: Utc::now(),
        expected_delivery_date: None,
        notes: None,
        line_items: lines,
    }
}

fn line(part: &str, product_id: Option<Uuid>, quantity: i32, unit_price: i32) -> NewPoLine {
    NewPoLine { product_id, part_number: part.into(), description: None, quantity, unit_price }
}

#[tokio::test]
async fn order_and_lines_are_created_together() {
    let w = common::world();
    let manager = w.actor("buyer", Role::Manager).await;
    let v = vendor(&w, &manager, "ACME").await;

    let detail = w
        .services
        .purchase_orders
        .create(
            &manager,
            order("PO-1", v.id, vec![line("A-1", None, 3, 250), line("B-2", None, 2, 1000)]),
        )
        .await
        .unwrap();

    assert_eq!(detail.order.total_amount, 3 * 250 + 2 * 1000);
    assert_eq!(detail.order.status, PoStatus::Draft);
    assert_eq!(detail.order.created_by.as_deref(), Some("buyer"));
    let numbers: Vec<i32> = detail.line_items.iter().map(|l| l.line_number).collect();
    assert_eq!(numbers, vec![1, 2]);

    let fetched = w.services.purchase_orders.get(&manager, detail.order.id).await.unwrap().unwrap();
    assert_eq!(fetched.line_items.len(), 2);

    assert!(matches!(
        w.services.purchase_orders.create(&manager, order("PO-1", v.id, vec![])).await,
        Err(DomainError::Conflict(_))
    ));
}

#[tokio::test]
async fn a_bad_line_leaves_no_order_behind() {
    let w = common::world();
    let manager = w.actor("buyer", Role::Manager).await;
    let v = vendor(&w, &manager, "ACME").await;

    let missing_product = Uuid::now_v7();
    let result = w
        .services
        .purchase_orders
        .create(&manager, order("PO-2", v.id, vec![line("A-1", None, 1, 1), line("X", Some(missing_product), 1, 1)]))
        .await;
    assert!(matches!(result, Err(DomainError::NotFound(..))));

    let result = w
        .services
        .purchase_orders
        .create(&manager, order("PO-3", v.id, vec![line("A-1", None, 0, 1)]))
        .await;
    assert!(matches!(result, Err(DomainError::Validation(_))));

    assert!(w.services.purchase_orders.list(&manager, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn receiving_never_exceeds_the_ordered_quantity_and_restocks() {
    let w = common::world();
    let manager = w.actor("buyer", Role::Manager).await;
    let v = vendor(&w, &manager, "ACME").await;
    let p = w.product("RCV-1", 2).await;

    let detail = w
        .services
        .purchase_orders
        .create(&manager, order("PO-9", v.id, vec![line("RCV-1", Some(p.id), 5, 100)]))
        .await
        .unwrap();
    let line_id = detail.line_items[0].id;

    let first = w
        .services
        .purchase_orders
        .receive_line_item(&manager, detail.order.id, line_id, 3)
        .await
        .unwrap();
    assert_eq!(first.line.received_quantity, 3);
    assert_eq!(first.product.map(|p| p.stock_quantity), Some(5));

    assert!(matches!(
        w.services.purchase_orders.receive_line_item(&manager, detail.order.id, line_id, 10).await,
        Err(DomainError::Validation(_))
    ));
    let second = w
        .services
        .purchase_orders
        .receive_line_item(&manager, detail.order.id, line_id, 2)
        .await
        .unwrap();
    assert_eq!(second.line.received_quantity, 5);
    assert_eq!(second.line.outstanding(), 0);

    let product = w.services.products.get(p.id).await.unwrap().unwrap();
    assert_eq!(product.stock_quantity, 7);

    let history = w.services.stock.history(&manager, p.id, None).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|h| h.reason == "PO PO-9 receipt"));

    assert!(matches!(
        w.services.purchase_orders.receive_line_item(&manager, detail.order.id, line_id, 0).await,
        Err(DomainError::Validation(_))
    ));
}

#[tokio::test]
async fn status_changes_are_free_by_default() {
    let w = common::world();
    let manager = w.actor("buyer", Role::Manager).await;
    let v = vendor(&w, &manager, "ACME").await;
    let detail = w.services.purchase_orders.create(&manager, order("PO-4", v.id, vec![])).await.unwrap();
    let id = detail.order.id;

    let patch = |status| PurchaseOrderPatch { status: Some(status), ..Default::default() };
    w.services.purchase_orders.update(&manager, id, patch(PoStatus::Received)).await.unwrap();
    let back = w.services.purchase_orders.update(&manager, id, patch(PoStatus::Draft)).await.unwrap();
    assert_eq!(back.status, PoStatus::Draft);
}

#[tokio::test]
async fn enforced_transitions_reject_going_backwards() {
    let policy = Policy { enforce_po_transitions: true, ..Policy::default() };
    let w = common::world_with(policy, Arc::new(DisabledRanker));
    let manager = w.actor("buyer", Role::Manager).await;
    let v = vendor(&w, &manager, "ACME").await;
    let detail = w.services.purchase_orders.create(&manager, order("PO-5", v.id, vec![])).await.unwrap();
    let id = detail.order.id;

    let patch = |status| PurchaseOrderPatch { status: Some(status), ..Default::default() };
    for next in [PoStatus::Sent, PoStatus::Acknowledged, PoStatus::Received] {
        w.services.purchase_orders.update(&manager, id, patch(next)).await.unwrap();
    }
    assert!(matches!(
        w.services.purchase_orders.update(&manager, id, patch(PoStatus::Draft)).await,
        Err(DomainError::Validation(_))
    ));
    assert!(matches!(
        w.services.purchase_orders.update(&manager, id, patch(PoStatus::Cancelled)).await,
        Err(DomainError::Validation(_))
    ));
}

#[tokio::test]
async fn duplicate_vendor_codes_conflict() {
    let w = common::world();
    let manager = w.actor("buyer", Role::Manager).await;
    vendor(&w, &manager, "DUP").await;

    let again = w
        .services
        .vendors
        .create(&manager, NewVendor { vendor_code: "DUP".into(), vendor_name: "Other".into(), ..Default::default() })
        .await;
    assert!(matches!(again, Err(DomainError::Conflict(_))));
}
