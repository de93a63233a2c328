//! `PgStore` against a throwaway PostgreSQL container, checking the same
//! behaviour the in-memory store guarantees.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    Comment, CommentRepo, DomainError, LineReceipt, NewPoLine, NewProduct, NewPurchaseOrder, Product, ProductRepo,
    PurchaseOrderDetail, PurchaseOrderRepo, Reaction, ReactionRepo, TargetKind, TargetRef,
};
use storage_adapters::PgStore;
use testcontainers_modules::postgres::Postgres;
use testcontainers_modules::testcontainers::runners::AsyncRunner;
use testcontainers_modules::testcontainers::{ContainerAsync, ImageExt};
use uuid::Uuid;

/// The container must outlive the store.
async fn store() -> (ContainerAsync<Postgres>, Arc<PgStore>) {
    let container = Postgres::default().with_tag("16-alpine").start().await.unwrap();
    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();

    let store = PgStore::connect(&format!("postgres://postgres:postgres@{host}:{port}/postgres"), 16)
        .await
        .unwrap();
    store.migrate().await.unwrap();
    (container, Arc::new(store))
}

async fn product(store: &PgStore, sku: &str) -> Product {
    let product = NewProduct { sku: sku.into(), name: "Rack".into(), ..Default::default() }.into_product(Utc::now());
    store.insert_product(&product).await.unwrap();
    product
}

fn order(number: &str, product_id: Option<Uuid>, lines: usize) -> PurchaseOrderDetail {
    NewPurchaseOrder {
        po_number: number.into(),
        vendor_id: Uuid::now_v7(),
        po_date: Utc::now(),
        expected_delivery_date: None,
        notes: None,
        line_items: (0..lines)
            .map(|_| NewPoLine {
                product_id,
                part_number: "SR-1".into(),
                quantity: 6,
                unit_price: 1200,
                ..Default::default()
            })
            .collect(),
    }
    .into_detail(Some("buyer".into()), Utc::now())
}

#[tokio::test]
async fn concurrent_adjustments_are_serialized() {
    let (_pg, store) = store().await;
    let id = product(&store, "PG-1").await.id;

    let tasks: Vec<_> = (0..40)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.adjust_stock(id, 3, "receipt", None, Utc::now()).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(store.get_product(id).await.unwrap().unwrap().stock_quantity, 120);
    assert_eq!(store.stock_history(id, 100).await.unwrap().len(), 40);

    let (floored, audit) = store.adjust_stock(id, -500, "scrapped", None, Utc::now()).await.unwrap().unwrap();
    assert_eq!(floored.stock_quantity, 0);
    assert_eq!((audit.previous_quantity, audit.new_quantity), (120, 0));
}

#[tokio::test]
async fn a_failing_line_leaves_no_order_behind() {
    let (_pg, store) = store().await;
    let mut detail = order("PO-100", None, 2);
    let first = detail.line_items[0].id;
    detail.line_items[1].id = first;

    assert!(matches!(store.create_purchase_order(&detail).await, Err(DomainError::Conflict(_))));
    assert!(store.get_purchase_order(detail.order.id).await.unwrap().is_none());
    assert!(store.list_purchase_orders(None).await.unwrap().is_empty());

    store.create_purchase_order(&order("PO-100", None, 2)).await.unwrap();
    assert!(matches!(
        store.create_purchase_order(&order("PO-100", None, 1)).await,
        Err(DomainError::Conflict(_))
    ));
}

#[tokio::test]
async fn receipts_book_the_line_and_restock() {
    let (_pg, store) = store().await;
    let p = product(&store, "PG-2").await;
    let detail = order("PO-200", Some(p.id), 1);
    store.create_purchase_order(&detail).await.unwrap();

    let receipt = LineReceipt {
        po_id: detail.order.id,
        line_id: detail.line_items[0].id,
        quantity: 4,
        reason: "PO PO-200 receipt".into(),
        received_by: Some("dock".into()),
        received_at: Utc::now(),
    };
    let outcome = store.receive_line_item(&receipt).await.unwrap().unwrap();
    assert_eq!(outcome.line.received_quantity, 4);
    assert_eq!(outcome.product.map(|p| p.stock_quantity), Some(4));
    assert_eq!(store.stock_history(p.id, 5).await.unwrap()[0].reason, "PO PO-200 receipt");

    let elsewhere = LineReceipt { po_id: Uuid::now_v7(), ..receipt };
    assert!(store.receive_line_item(&elsewhere).await.unwrap().is_none());
}

#[tokio::test]
async fn a_second_reaction_from_one_user_conflicts() {
    let (_pg, store) = store().await;
    let target = TargetRef::new(TargetKind::Post, Uuid::now_v7());
    let like = |user: &str| Reaction {
        id: Uuid::now_v7(),
        target,
        user_id: user.into(),
        reaction_type: Reaction::DEFAULT_TYPE.into(),
        created_at: Utc::now(),
    };

    let first = like("u-1");
    store.insert_reaction(&first).await.unwrap();
    assert!(matches!(store.insert_reaction(&like("u-1")).await, Err(DomainError::Conflict(_))));
    store.insert_reaction(&like("u-2")).await.unwrap();
    assert_eq!(store.count_reactions(target).await.unwrap(), 2);

    assert!(store.delete_reaction(first.id).await.unwrap());
    assert!(store.find_reaction(target, "u-1").await.unwrap().is_none());
}

#[tokio::test]
async fn soft_deleted_comments_leave_the_listing_only() {
    let (_pg, store) = store().await;
    let target = TargetRef::new(TargetKind::Document, Uuid::now_v7());
    let keep = Comment::new(target, "a".into(), "first".into(), None, Utc::now());
    let gone = Comment::new(target, "b".into(), "second".into(), Some(keep.id), Utc::now());
    store.insert_comment(&keep).await.unwrap();
    store.insert_comment(&gone).await.unwrap();

    assert!(store.soft_delete_comment(gone.id, Utc::now()).await.unwrap());
    let listed = store.list_comments(target).await.unwrap();
    assert_eq!(listed.iter().map(|c| c.id).collect::<Vec<_>>(), vec![keep.id]);

    let stored = store.get_comment(gone.id).await.unwrap().unwrap();
    assert!(stored.is_deleted);
    assert_eq!(stored.parent_comment_id, Some(keep.id));
    assert!(store.update_comment_content(gone.id, "x", Utc::now()).await.unwrap().is_none());
}
