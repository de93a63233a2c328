mod common;

use std::sync::Arc;

use domains::{DomainError, Role};
use uuid::Uuid;

#[tokio::test]
async fn adjustment_clamps_at_zero_and_is_audited() {
    let w = common::world();
    let floor = w.actor("floor-1", Role::ShopFloor).await;
    let p = w.product("AD-1", 3).await;

    let out = w.services.stock.adjust_stock(&floor, p.id, -10, "scrapped").await.unwrap();
    assert_eq!(out.product.stock_quantity, 0);
    assert_eq!(out.adjustment.previous_quantity, 3);
    assert_eq!(out.adjustment.new_quantity, 0);
    assert_eq!(out.adjustment.delta, -10);
    assert_eq!(out.adjustment.adjusted_by.as_deref(), Some("floor-1"));

    let history = w.services.stock.history(&floor, p.id, None).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].reason, "scrapped");
}

#[tokio::test]
async fn adjustment_needs_a_reason_and_a_product() {
    let w = common::world();
    let floor = w.actor("floor-1", Role::ShopFloor).await;
    let p = w.product("AD-2", 1).await;

    assert!(matches!(
        w.services.stock.adjust_stock(&floor, p.id, 1, "   ").await,
        Err(DomainError::Validation(_))
    ));
    assert!(matches!(
        w.services.stock.adjust_stock(&floor, Uuid::now_v7(), 1, "count").await,
        Err(DomainError::NotFound(..))
    ));
}

#[tokio::test]
async fn set_stock_rejects_negative_quantities() {
    let w = common::world();
    let floor = w.actor("floor-1", Role::ShopFloor).await;
    let p = w.product("SS-1", 1).await;

    assert!(matches!(
        w.services.stock.set_stock(&floor, p.id, -1, None).await,
        Err(DomainError::Validation(_))
    ));
    let set = w.services.stock.set_stock(&floor, p.id, 12, Some("recount")).await.unwrap();
    assert_eq!(set.stock_quantity, 12);
}

#[tokio::test]
async fn concurrent_adjustments_never_lose_an_update() {
    let w = Arc::new(common::world());
    let floor = Arc::new(w.actor("floor-1", Role::ShopFloor).await);
    let p = w.product("CC-1", 0).await;
    let id = p.id;

    let mut tasks = Vec::new();
    for i in 0..50 {
        let w = w.clone();
        let floor = floor.clone();
        tasks.push(tokio::spawn(async move {
            w.services.stock.adjust_stock(&floor, id, 1, &format!("receipt {i}")).await.unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let product = w.services.products.get(id).await.unwrap().unwrap();
    assert_eq!(product.stock_quantity, 50);
    let history = w.services.stock.history(&floor, id, Some(100)).await.unwrap();
    assert_eq!(history.len(), 50);
}

#[tokio::test]
async fn low_stock_lists_products_at_or_below_reorder_point() {
    let w = common::world();
    let viewer = w.actor("viewer", Role::Readonly).await;
    let low = w.product("LS-1", 1).await;
    w.product("LS-2", 500).await;

    let listed = w.services.products.low_stock(&viewer, None).await.unwrap();
    assert_eq!(listed.iter().map(|p| p.id).collect::<Vec<_>>(), vec![low.id]);
    assert_eq!(w.services.products.stats().await.unwrap().low_stock, 1);
}
