use std::collections::BTreeMap;
use std::sync::Arc;

use domains::{Capability, PoStatus, ProductRepo, ProductStatus, PurchaseOrderRepo, Result, UserRepo};
use serde::Serialize;

use crate::access::Actor;
use crate::degrade::degrade_read;

const UNCATEGORIZED: &str = "uncategorized";

/// Figures for the analytics dashboard. Money in cents.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_products: u64,
    pub active_products: u64,
    pub low_stock_count: u64,
    pub inventory_value: i64,
    pub average_stock_level: f64,
    pub products_by_category: BTreeMap<String, u64>,
    pub purchase_orders_by_status: BTreeMap<String, u64>,
    pub open_purchase_orders: u64,
    pub users_by_role: BTreeMap<String, u64>,
}

#[derive(Clone)]
pub struct AnalyticsService {
    products: Arc<dyn ProductRepo>,
    orders: Arc<dyn PurchaseOrderRepo>,
    users: Arc<dyn UserRepo>,
}

impl AnalyticsService {
    pub fn new(products: Arc<dyn ProductRepo>, orders: Arc<dyn PurchaseOrderRepo>, users: Arc<dyn UserRepo>) -> Self {
        Self { products, orders, users }
    }

    pub async fn dashboard(&self, actor: &Actor) -> Result<DashboardSummary> {
        actor.require(Capability::ViewAnalytics)?;

        let products = degrade_read("analytics.products", self.products.list_products(false, None).await)?;
        let orders = degrade_read("analytics.purchase_orders", self.orders.list_purchase_orders(None).await)?;
        let users = degrade_read("analytics.users", self.users.list_users().await)?;

        let mut summary = DashboardSummary {
            total_products: products.len() as u64,
            ..Default::default()
        };

        let mut stock_total: i64 = 0;
        for product in &products {
            let active = product.status == ProductStatus::Active;
            if active {
                summary.active_products += 1;
                if product.is_low_stock() {
                    summary.low_stock_count += 1;
                }
            }
            stock_total += i64::from(product.stock_quantity);
            summary.inventory_value += i64::from(product.stock_quantity) * i64::from(product.unit_price.unwrap_or(0));
            let category = product.category.clone().unwrap_or_else(|| UNCATEGORIZED.to_string());
            *summary.products_by_category.entry(category).or_default() += 1;
        }
        if !products.is_empty() {
            summary.average_stock_level = stock_total as f64 / products.len() as f64;
        }

        for order in &orders {
            *summary.purchase_orders_by_status.entry(order.status.to_string()).or_default() += 1;
            if order.status == PoStatus::Sent {
                summary.open_purchase_orders += 1;
            }
        }

        for user in &users {
            *summary.users_by_role.entry(user.role.to_string()).or_default() += 1;
        }

        Ok(summary)
    }
}
