//! # Core Traits (Ports)
//!
//! Any storage, identity or ranking adapter must implement these traits to
//! be used by the services. Every method returns `DomainError`; adapters map
//! their driver errors at this boundary (`DatabaseUnavailable` for an
//! unreachable store, `Conflict` for unique-key violations).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::Result;
use crate::models::*;

/// Local user accounts.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn get_user(&self, id: &str) -> Result<Option<User>>;
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Inserts a readonly account on first sight; afterwards refreshes the
    /// profile fields and `last_signed_in` but never the role.
    async fn upsert_user(&self, identity: &ExternalIdentity, login_method: &str, seen_at: DateTime<Utc>) -> Result<User>;

    async fn update_role(&self, id: &str, role: Role) -> Result<Option<User>>;
}

/// Product catalog and stock levels.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ProductRepo: Send + Sync {
    /// Newest first. `limit = None` returns every row.
    async fn list_products(&self, active_only: bool, limit: Option<i64>) -> Result<Vec<Product>>;
    async fn get_product(&self, id: Uuid) -> Result<Option<Product>>;
    async fn get_product_by_sku(&self, sku: &str) -> Result<Option<Product>>;
    async fn search_products(&self, query: &str, limit: i64) -> Result<Vec<Product>>;
    /// Active products with `stock_quantity <= reorder_point`, highest stock first.
    async fn low_stock_products(&self, limit: i64) -> Result<Vec<Product>>;
    async fn product_stats(&self) -> Result<ProductStats>;

    async fn insert_product(&self, product: &Product) -> Result<()>;
    async fn update_product(&self, product: &Product) -> Result<()>;
    async fn delete_product(&self, id: Uuid) -> Result<bool>;

    /// Overwrites the quantity. `None` when the id does not resolve.
    async fn set_stock(&self, id: Uuid, quantity: i32, at: DateTime<Utc>) -> Result<Option<Product>>;

    /// Atomic `max(0, current + delta)` plus the audit row.
    async fn adjust_stock(
        &self,
        id: Uuid,
        delta: i32,
        reason: &str,
        actor: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Option<(Product, StockAdjustment)>>;

    /// Newest first.
    async fn stock_history(&self, id: Uuid, limit: i64) -> Result<Vec<StockAdjustment>>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait VendorRepo: Send + Sync {
    /// Ordered by vendor name.
    async fn list_vendors(&self, active_only: bool) -> Result<Vec<Vendor>>;
    async fn get_vendor(&self, id: Uuid) -> Result<Option<Vendor>>;
    async fn insert_vendor(&self, vendor: &Vendor) -> Result<()>;
    async fn update_vendor(&self, vendor: &Vendor) -> Result<()>;
    async fn delete_vendor(&self, id: Uuid) -> Result<bool>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PurchaseOrderRepo: Send + Sync {
    /// Newest first.
    async fn list_purchase_orders(&self, limit: Option<i64>) -> Result<Vec<PurchaseOrder>>;
    async fn get_purchase_order(&self, id: Uuid) -> Result<Option<PurchaseOrderDetail>>;

    /// Header and every line item in one transaction: either all rows land or none.
    async fn create_purchase_order(&self, detail: &PurchaseOrderDetail) -> Result<()>;

    async fn update_purchase_order(&self, order: &PurchaseOrder) -> Result<()>;
    /// Removes the header and its line items.
    async fn delete_purchase_order(&self, id: Uuid) -> Result<bool>;

    /// Adds to `received_quantity` (capped at the ordered quantity) and
    /// restocks the linked product with an audit row, in one transaction.
    async fn receive_line_item(&self, receipt: &LineReceipt) -> Result<Option<ReceiptOutcome>>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait FormRepo: Send + Sync {
    /// Ordered by name.
    async fn list_templates(&self) -> Result<Vec<FormTemplate>>;
    async fn get_template(&self, id: Uuid) -> Result<Option<FormTemplate>>;
    async fn insert_template(&self, template: &FormTemplate) -> Result<()>;
    async fn update_template(&self, template: &FormTemplate) -> Result<()>;
    async fn delete_template(&self, id: Uuid) -> Result<bool>;

    async fn insert_submission(&self, submission: &FormSubmission) -> Result<()>;
    /// Newest first.
    async fn list_submissions(&self, template_id: Option<Uuid>, limit: i64) -> Result<Vec<FormSubmission>>;
    async fn get_submission(&self, id: Uuid) -> Result<Option<FormSubmission>>;
    async fn update_submission(&self, submission: &FormSubmission) -> Result<()>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostRepo: Send + Sync {
    /// Published only; pinned first, then newest `published_at`.
    async fn list_published(&self, limit: i64) -> Result<Vec<Post>>;
    async fn get_post(&self, id: Uuid) -> Result<Option<Post>>;
    async fn search_published(&self, query: &str, limit: i64) -> Result<Vec<Post>>;
    async fn insert_post(&self, post: &Post) -> Result<()>;
    async fn update_post(&self, post: &Post) -> Result<()>;
    async fn increment_post_views(&self, id: Uuid) -> Result<()>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DocumentRepo: Send + Sync {
    /// Public only; ordered by category, `order_index`, then newest.
    async fn list_public(&self, category: Option<DocumentCategory>, limit: i64) -> Result<Vec<Document>>;
    async fn get_document(&self, id: Uuid) -> Result<Option<Document>>;
    async fn search_public(&self, query: &str, limit: i64) -> Result<Vec<Document>>;
    async fn insert_document(&self, document: &Document) -> Result<()>;
    async fn update_document(&self, document: &Document) -> Result<()>;
    async fn delete_document(&self, id: Uuid) -> Result<bool>;
    async fn increment_document_views(&self, id: Uuid) -> Result<()>;
    async fn increment_document_downloads(&self, id: Uuid) -> Result<()>;
}

/// Storage side of the comment engine. No authorization lives here.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CommentRepo: Send + Sync {
    /// Non-deleted comments of one target, oldest first.
    async fn list_comments(&self, target: TargetRef) -> Result<Vec<Comment>>;
    /// Includes soft-deleted rows.
    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>>;
    async fn insert_comment(&self, comment: &Comment) -> Result<()>;
    /// Sets content and `is_edited`; `None` when absent or soft-deleted.
    async fn update_comment_content(&self, id: Uuid, content: &str, at: DateTime<Utc>) -> Result<Option<Comment>>;
    /// `false` when absent or already deleted.
    async fn soft_delete_comment(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ReactionRepo: Send + Sync {
    async fn find_reaction(&self, target: TargetRef, user_id: &str) -> Result<Option<Reaction>>;
    /// `Conflict` if the user already holds a reaction on the target.
    async fn insert_reaction(&self, reaction: &Reaction) -> Result<()>;
    async fn delete_reaction(&self, id: Uuid) -> Result<bool>;
    async fn count_reactions(&self, target: TargetRef) -> Result<u64>;
}

/// External token-issuing service: bearer token → stable identity.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `Forbidden` for any token that does not verify.
    async fn resolve(&self, token: &str) -> Result<ExternalIdentity>;
}

/// What the ranking model sees of one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub index: usize,
    pub sku: String,
    pub name: String,
    pub application: String,
    pub years: String,
    pub precision_number: String,
    pub quality_number: String,
    pub driver_bellow: String,
    pub passenger_bellow: String,
    pub tie_rod_driver: String,
    pub tie_rod_passenger: String,
    pub category: String,
    pub oe_number: String,
}

impl ProductSummary {
    pub fn from_product(index: usize, p: &Product) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            index,
            sku: p.sku.clone(),
            name: p.name.clone(),
            application: text(&p.specs.application),
            years: text(&p.specs.years),
            precision_number: text(&p.specs.precision_number),
            quality_number: text(&p.specs.quality_number),
            driver_bellow: text(&p.specs.driver_bellow),
            passenger_bellow: text(&p.specs.passenger_bellow),
            tie_rod_driver: text(&p.specs.tie_rod_driver),
            tie_rod_passenger: text(&p.specs.tie_rod_passenger),
            category: text(&p.category),
            oe_number: text(&p.specs.oe_number),
        }
    }
}

/// One entry of the ranking model's answer, referring back to a summary index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RankedCandidate {
    pub index: i64,
    pub relevance_score: i64,
    pub reasoning: String,
}

/// Hosted language model used for semantic product search.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ProductRanker: Send + Sync {
    /// Any deviation from the response contract is an error; callers decide
    /// how to degrade.
    async fn rank(&self, query: &str, candidates: &[ProductSummary], limit: usize) -> Result<Vec<RankedCandidate>>;
}
