mod common;

use chrono::NaiveDate;
use domains::{DomainError, Role};
use services::export::{ExportFormat, ExportTable};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
}

#[tokio::test]
async fn nothing_selected_is_a_validation_error() {
    let w = common::world();
    let admin = w.actor("root", Role::Admin).await;
    assert!(matches!(
        w.services.export.export(&admin, &[], ExportFormat::Json, day()).await,
        Err(DomainError::Validation(_))
    ));
}

#[tokio::test]
async fn csv_writes_one_file_per_non_empty_table() {
    let w = common::world();
    let manager = w.actor("lead", Role::Manager).await;
    w.product("EX-1", 4).await;

    let files = w
        .services
        .export
        .export(&manager, &[ExportTable::Products, ExportTable::Vendors, ExportTable::Products], ExportFormat::Csv, day())
        .await
        .unwrap();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].filename, "products-2026-03-14.csv");
    assert_eq!(files[0].content_type.essence_str(), "text/csv");
    let text = String::from_utf8(files[0].data.to_vec()).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().split(',').any(|h| h == "sku"));
    assert!(lines.next().unwrap().contains("EX-1"));
    assert_eq!(lines.next(), None);
}

#[tokio::test]
async fn json_bundles_every_selected_table() {
    let w = common::world();
    let admin = w.actor("root", Role::Admin).await;
    w.product("EX-2", 1).await;

    let files = w
        .services
        .export
        .export(&admin, &[ExportTable::Products, ExportTable::Users, ExportTable::Vendors], ExportFormat::Json, day())
        .await
        .unwrap();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].filename, "stockroom-export-2026-03-14.json");
    let document: serde_json::Value = serde_json::from_slice(&files[0].data).unwrap();
    assert_eq!(document["products"][0]["sku"], "EX-2");
    assert_eq!(document["vendors"], serde_json::json!([]));
    assert!(!document["users"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn readonly_cannot_export() {
    let w = common::world();
    let viewer = w.actor("viewer", Role::Readonly).await;
    assert!(matches!(
        w.services.export.export(&viewer, &[ExportTable::Products], ExportFormat::Csv, day()).await,
        Err(DomainError::Forbidden(_))
    ));
}
