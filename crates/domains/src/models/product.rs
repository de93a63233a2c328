use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::string_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
    Discontinued,
}

string_enum!(ProductStatus {
    Active => "active",
    Inactive => "inactive",
    Discontinued => "discontinued",
});

/// Free-text technical attributes imported from the shop's parts catalog.
/// None of these carry behaviour; they are searched and displayed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductSpecs {
    pub precision_number: Option<String>,
    pub quality_number: Option<String>,
    pub driver_bellow: Option<String>,
    pub passenger_bellow: Option<String>,
    pub tie_rod_driver: Option<String>,
    pub tie_rod_passenger: Option<String>,
    pub cast_number: Option<String>,
    pub application: Option<String>,
    pub pressure_fitting: Option<String>,
    pub return_fitting: Option<String>,
    pub rack_sim_adapter: Option<String>,
    pub rack_sim_stop: Option<String>,
    pub cutter: Option<String>,
    pub bushing: Option<String>,
    pub base: Option<String>,
    pub installer: Option<String>,
    pub sleeve: Option<String>,
    pub timing: Option<String>,
    pub years: Option<String>,
    pub ups: Option<String>,
    pub lps: Option<String>,
    pub mcs: Option<String>,
    pub bhs: Option<String>,
    pub pt_x4: Option<String>,
    pub ppt: Option<String>,
    pub o_rings: Option<String>,
    pub other_parts: Option<String>,
    pub bushing_driver: Option<String>,
    pub bushing_passenger: Option<String>,
    pub bushing_insert: Option<String>,
    pub turns: Option<String>,
    pub oal: Option<String>,
    pub comments: Option<String>,
    pub oe_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(flatten)]
    pub specs: ProductSpecs,
    pub stock_quantity: i32,
    pub reorder_point: i32,
    /// Cents.
    pub unit_cost: Option<i32>,
    /// Cents.
    pub unit_price: Option<i32>,
    pub images: Vec<String>,
    pub primary_image: Option<String>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub const DEFAULT_REORDER_POINT: i32 = 5;

    /// Derived at read time; the inclusive boundary is deliberate.
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.reorder_point
    }

    /// Case-insensitive substring match over the identifying columns.
    pub fn matches_query(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        let hit = |field: Option<&str>| field.is_some_and(|v| v.to_lowercase().contains(&needle));
        hit(Some(&self.sku))
            || hit(Some(&self.name))
            || hit(self.specs.application.as_deref())
            || hit(self.specs.quality_number.as_deref())
            || hit(self.specs.precision_number.as_deref())
            || hit(self.specs.oe_number.as_deref())
    }

    /// Applies a partial update; `updated_at` is the caller's concern.
    pub fn apply(&mut self, patch: ProductPatch) {
        if let Some(sku) = patch.sku {
            self.sku = sku;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(category) = patch.category {
            self.category = Some(category);
        }
        if let Some(specs) = patch.specs {
            self.specs = specs;
        }
        if let Some(reorder_point) = patch.reorder_point {
            self.reorder_point = reorder_point;
        }
        if let Some(unit_cost) = patch.unit_cost {
            self.unit_cost = Some(unit_cost);
        }
        if let Some(unit_price) = patch.unit_price {
            self.unit_price = Some(unit_price);
        }
        if let Some(images) = patch.images {
            self.images = images;
        }
        if let Some(primary_image) = patch.primary_image {
            self.primary_image = Some(primary_image);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(flatten)]
    pub specs: ProductSpecs,
    #[serde(default)]
    pub stock_quantity: Option<i32>,
    #[serde(default)]
    pub reorder_point: Option<i32>,
    #[serde(default)]
    pub unit_cost: Option<i32>,
    #[serde(default)]
    pub unit_price: Option<i32>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub primary_image: Option<String>,
    #[serde(default)]
    pub status: Option<ProductStatus>,
}

impl NewProduct {
    pub fn into_product(self, now: DateTime<Utc>) -> Product {
        Product {
            id: Uuid::now_v7(),
            sku: self.sku.trim().to_string(),
            name: self.name.trim().to_string(),
            description: self.description,
            category: self.category,
            specs: self.specs,
            stock_quantity: self.stock_quantity.unwrap_or(0),
            reorder_point: self.reorder_point.unwrap_or(Product::DEFAULT_REORDER_POINT),
            unit_cost: self.unit_cost,
            unit_price: self.unit_price,
            images: self.images,
            primary_image: self.primary_image,
            status: self.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update. Stock is deliberately absent: it only moves through the
/// stock operations so every change is checked against `can_update_stock`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductPatch {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub specs: Option<ProductSpecs>,
    pub reorder_point: Option<i32>,
    pub unit_cost: Option<i32>,
    pub unit_price: Option<i32>,
    pub images: Option<Vec<String>>,
    pub primary_image: Option<String>,
    pub status: Option<ProductStatus>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductStats {
    pub total: u64,
    pub active: u64,
    pub low_stock: u64,
}

/// Audit row written by every `adjust_stock` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub id: Uuid,
    pub product_id: Uuid,
    pub delta: i32,
    pub previous_quantity: i32,
    pub new_quantity: i32,
    pub reason: String,
    pub adjusted_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i32, reorder: i32) -> Product {
        let mut p = NewProduct {
            sku: "SR-100".into(),
            name: "Rack".into(),
            ..Default::default()
        }
        .into_product(Utc::now());
        p.stock_quantity = stock;
        p.reorder_point = reorder;
        p
    }

    #[test]
    fn low_stock_boundary_is_inclusive() {
        assert!(product(5, 5).is_low_stock());
        assert!(product(0, 5).is_low_stock());
        assert!(!product(6, 5).is_low_stock());
    }

    #[test]
    fn new_product_defaults() {
        let p = product(0, 5);
        assert_eq!(p.reorder_point, Product::DEFAULT_REORDER_POINT);
        assert_eq!(p.status, ProductStatus::Active);
    }

    #[test]
    fn query_matches_specs() {
        let mut p = product(1, 1);
        p.specs.application = Some("Mazda 929 DOHC".into());
        assert!(p.matches_query("mazda"));
        assert!(p.matches_query("sr-1"));
        assert!(!p.matches_query("toyota"));
    }
}
