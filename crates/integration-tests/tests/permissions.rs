mod common;

use domains::{DomainError, NewProduct, ProductPatch, Role};
use services::export::{ExportFormat, ExportTable};

fn forbidden<T: std::fmt::Debug>(result: Result<T, DomainError>) -> bool {
    matches!(result, Err(DomainError::Forbidden(_)))
}

fn product(sku: &str) -> NewProduct {
    NewProduct { sku: sku.into(), name: "Rack".into(), ..Default::default() }
}

#[tokio::test]
async fn readonly_can_browse_but_not_write() {
    let w = common::world();
    let viewer = w.actor("viewer", Role::Readonly).await;

    assert!(w.services.products.low_stock(&viewer, None).await.is_ok());
    assert!(forbidden(w.services.products.create(&viewer, product("RO-1")).await));
    assert!(forbidden(w.services.purchase_orders.list(&viewer, None).await));
    assert!(forbidden(w.services.users.list(&viewer).await));
    assert!(forbidden(w.services.analytics.dashboard(&viewer).await));
}

#[tokio::test]
async fn manager_edits_products_but_cannot_delete_them() {
    let w = common::world();
    let manager = w.actor("manager", Role::Manager).await;

    let created = w.services.products.create(&manager, product("MG-1")).await.unwrap();
    let renamed = w
        .services
        .products
        .update(&manager, created.id, ProductPatch { name: Some("Rack, power".into()), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(renamed.name, "Rack, power");

    assert!(forbidden(w.services.products.delete(&manager, created.id).await));

    let admin = w.actor("admin", Role::Admin).await;
    w.services.products.delete(&admin, created.id).await.unwrap();
    assert_eq!(w.services.products.get(created.id).await.unwrap(), None);
}

#[tokio::test]
async fn sales_may_search_with_ai_while_shop_floor_may_not() {
    let w = common::world();
    let sales = w.actor("sales", Role::Sales).await;
    let floor = w.actor("floor", Role::ShopFloor).await;

    // The ranker is disabled here, so an allowed call degrades to no matches.
    assert_eq!(w.services.search.semantic_search(&sales, "mazda rack", None).await.unwrap(), vec![]);
    assert!(forbidden(w.services.search.semantic_search(&floor, "mazda rack", None).await));
}

#[tokio::test]
async fn shop_floor_moves_stock_but_cannot_export() {
    let w = common::world();
    let floor = w.actor("floor", Role::ShopFloor).await;
    let p = w.product("SF-1", 3).await;

    let adjusted = w.services.stock.adjust_stock(&floor, p.id, 2, "found on shelf").await.unwrap();
    assert_eq!(adjusted.product.stock_quantity, 5);
    assert!(forbidden(
        w.services
            .export
            .export(&floor, &[ExportTable::Products], ExportFormat::Csv, chrono::Utc::now().date_naive())
            .await
    ));
}

#[tokio::test]
async fn admins_cannot_demote_themselves() {
    let w = common::world();
    let admin = w.actor("root", Role::Admin).await;
    w.actor("clerk", Role::Readonly).await;

    assert!(matches!(
        w.services.users.update_role(&admin, "root", Role::Manager).await,
        Err(DomainError::Validation(_))
    ));
    let promoted = w.services.users.update_role(&admin, "clerk", Role::Sales).await.unwrap();
    assert_eq!(promoted.role, Role::Sales);
}

#[tokio::test]
async fn role_survives_sign_in() {
    let w = common::world();
    w.actor("returning", Role::Manager).await;

    let jwt = auth_adapters::JwtIdentityProvider::new(common::SECRET, None).unwrap();
    let token = jwt.issue(&common::identity("returning"), chrono::Duration::minutes(5)).unwrap();
    let actor = w.services.auth.authenticate(&token).await.unwrap();
    assert_eq!(actor.role(), Role::Manager);
}

#[tokio::test]
async fn first_sign_in_provisions_a_readonly_user() {
    let w = common::world();
    let jwt = auth_adapters::JwtIdentityProvider::new(common::SECRET, None).unwrap();
    let token = jwt.issue(&common::identity("newcomer"), chrono::Duration::minutes(5)).unwrap();

    let actor = w.services.auth.authenticate(&token).await.unwrap();
    assert_eq!(actor.id(), "newcomer");
    assert_eq!(actor.role(), Role::Readonly);

    assert!(forbidden(w.services.auth.authenticate("garbage").await));
}
