//! # Export
//!
//! Serializes selected tables as one pretty JSON document or one CSV file
//! per table. Files are built in memory and handed back as blobs.

use std::sync::Arc;

use bytes::Bytes;
use chrono::NaiveDate;
use domains::{Capability, DomainError, ProductRepo, PurchaseOrderRepo, Result, UserRepo, VendorRepo};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, instrument};

use crate::access::Actor;
use crate::degrade::degrade_read;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportTable {
    Products,
    PurchaseOrders,
    Vendors,
    Users,
}

impl ExportTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportTable::Products => "products",
            ExportTable::PurchaseOrders => "purchase_orders",
            ExportTable::Vendors => "vendors",
            ExportTable::Users => "users",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

/// One downloadable file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: mime::Mime,
    pub data: Bytes,
}

type Row = Map<String, Value>;

#[derive(Clone)]
pub struct ExportService {
    products: Arc<dyn ProductRepo>,
    orders: Arc<dyn PurchaseOrderRepo>,
    vendors: Arc<dyn VendorRepo>,
    users: Arc<dyn UserRepo>,
}

impl ExportService {
    pub fn new(
        products: Arc<dyn ProductRepo>,
        orders: Arc<dyn PurchaseOrderRepo>,
        vendors: Arc<dyn VendorRepo>,
        users: Arc<dyn UserRepo>,
    ) -> Self {
        Self { products, orders, vendors, users }
    }

    /// `date` stamps the filenames.
    #[instrument(skip(self, actor), fields(actor = %actor.id()))]
    pub async fn export(
        &self,
        actor: &Actor,
        tables: &[ExportTable],
        format: ExportFormat,
        date: NaiveDate,
    ) -> Result<Vec<ExportFile>> {
        actor.require(Capability::ExportData)?;

        let mut selected: Vec<ExportTable> = Vec::with_capacity(tables.len());
        for table in tables {
            if !selected.contains(table) {
                selected.push(*table);
            }
        }
        if selected.is_empty() {
            return Err(DomainError::validation("select at least one table to export"));
        }

        let mut dataset = Vec::with_capacity(selected.len());
        for table in selected {
            dataset.push((table, self.rows(table).await?));
        }

        let files = match format {
            ExportFormat::Json => vec![json_file(dataset, date)?],
            ExportFormat::Csv => dataset
                .into_iter()
                .filter(|(_, rows)| !rows.is_empty())
                .map(|(table, rows)| ExportFile {
                    filename: format!("{}-{date}.csv", table.as_str()),
                    content_type: mime::TEXT_CSV,
                    data: Bytes::from(to_csv(&rows)),
                })
                .collect(),
        };
        info!(files = files.len(), ?format, "export generated");
        Ok(files)
    }

    async fn rows(&self, table: ExportTable) -> Result<Vec<Row>> {
        match table {
            ExportTable::Products => {
                to_rows(&degrade_read("export.products", self.products.list_products(false, None).await)?)
            }
            ExportTable::PurchaseOrders => {
                to_rows(&degrade_read("export.purchase_orders", self.orders.list_purchase_orders(None).await)?)
            }
            ExportTable::Vendors => to_rows(&degrade_read("export.vendors", self.vendors.list_vendors(false).await)?),
            ExportTable::Users => to_rows(&degrade_read("export.users", self.users.list_users().await)?),
        }
    }
}

fn to_rows<T: Serialize>(items: &[T]) -> Result<Vec<Row>> {
    items
        .iter()
        .map(|item| match serde_json::to_value(item) {
            Ok(Value::Object(row)) => Ok(row),
            Ok(_) => Err(DomainError::Internal("export row is not an object".into())),
            Err(e) => Err(DomainError::Internal(e.to_string())),
        })
        .collect()
}

fn json_file(dataset: Vec<(ExportTable, Vec<Row>)>, date: NaiveDate) -> Result<ExportFile> {
    let document: Map<String, Value> = dataset
        .into_iter()
        .map(|(table, rows)| (table.as_str().to_string(), Value::Array(rows.into_iter().map(Value::Object).collect())))
        .collect();
    let data = serde_json::to_vec_pretty(&Value::Object(document)).map_err(|e| DomainError::Internal(e.to_string()))?;
    Ok(ExportFile {
        filename: format!("stockroom-export-{date}.json"),
        content_type: mime::APPLICATION_JSON,
        data: Bytes::from(data),
    })
}

/// Header row from the first row's keys, then one line per row.
pub fn to_csv(rows: &[Row]) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };
    let headers: Vec<&String> = first.keys().collect();

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(headers.iter().map(|h| h.as_str()).collect::<Vec<_>>().join(","));
    for row in rows {
        let cells: Vec<String> = headers.iter().map(|h| escape_cell(&cell_text(row.get(*h)))).collect();
        lines.push(cells.join(","));
    }
    lines.join("\n")
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Doubles every quote; wraps in quotes only when the value holds a comma.
pub fn escape_cell(raw: &str) -> String {
    let doubled = raw.replace('"', "\"\"");
    if doubled.contains(',') {
        format!("\"{doubled}\"")
    } else {
        doubled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::fixtures::actor;
    use chrono::Utc;
    use domains::{MockProductRepo, MockPurchaseOrderRepo, MockUserRepo, MockVendorRepo, NewVendor, Role};
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn cells_are_escaped_minimally() {
        assert_eq!(escape_cell("plain"), "plain");
        assert_eq!(escape_cell("a,b"), "\"a,b\"");
        assert_eq!(escape_cell("say \"hi\""), "say \"\"hi\"\"");
        assert_eq!(escape_cell("\"x\",y"), "\"\"\"x\"\",y\"");
    }

    #[test]
    fn csv_uses_first_row_headers() {
        let rows = vec![
            row(json!({ "name": "Rack, LH", "qty": 3, "note": null })),
            row(json!({ "name": "Pump", "qty": 0, "note": "ok", "extra": true })),
        ];
        let csv = to_csv(&rows);
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines[0], "name,note,qty");
        assert_eq!(lines[1], "\"Rack, LH\",,3");
        assert_eq!(lines[2], "Pump,ok,0");
        assert_eq!(lines.len(), 3);
    }

    fn service() -> ExportService {
        let mut vendors = MockVendorRepo::new();
        vendors.expect_list_vendors().returning(|_| {
            Ok(vec![NewVendor { vendor_code: "V1".into(), vendor_name: "Acme, Inc".into(), ..Default::default() }
                .into_vendor(Utc::now())])
        });
        let mut users = MockUserRepo::new();
        users.expect_list_users().returning(|| Ok(vec![]));
        ExportService::new(
            Arc::new(MockProductRepo::new()),
            Arc::new(MockPurchaseOrderRepo::new()),
            Arc::new(vendors),
            Arc::new(users),
        )
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 9).unwrap_or_default()
    }

    #[tokio::test]
    async fn csv_skips_empty_tables() {
        let files = service()
            .export(&actor("m", Role::Manager), &[ExportTable::Vendors, ExportTable::Users], ExportFormat::Csv, date())
            .await
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].filename, "vendors-2026-03-09.csv");
        assert_eq!(files[0].content_type, mime::TEXT_CSV);
        let text = String::from_utf8(files[0].data.to_vec()).unwrap();
        assert!(text.contains("\"Acme, Inc\""));
    }

    #[tokio::test]
    async fn json_is_one_document_keyed_by_table() {
        let files = service()
            .export(&actor("a", Role::Admin), &[ExportTable::Users, ExportTable::Vendors], ExportFormat::Json, date())
            .await
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].filename, "stockroom-export-2026-03-09.json");
        let doc: Value = serde_json::from_slice(&files[0].data).unwrap();
        assert_eq!(doc["users"], json!([]));
        assert_eq!(doc["vendors"][0]["vendor_code"], "V1");
    }

    #[tokio::test]
    async fn empty_selection_and_missing_capability() {
        let service = service();
        assert!(matches!(
            service.export(&actor("a", Role::Admin), &[], ExportFormat::Json, date()).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            service.export(&actor("f", Role::ShopFloor), &[ExportTable::Users], ExportFormat::Csv, date()).await,
            Err(DomainError::Forbidden(_))
        ));
    }
}
