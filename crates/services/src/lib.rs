//! # Stockroom Services
//!
//! Use cases on top of the domain ports. Every protected operation takes the
//! calling [`Actor`] and checks its capability before touching storage;
//! adapters never see an authorization decision.

pub mod access;
pub mod analytics;
pub mod auth;
pub mod comments;
pub mod degrade;
pub mod documents;
pub mod export;
pub mod forms;
pub mod posts;
pub mod products;
pub mod purchase_orders;
pub mod reactions;
pub mod search;
pub mod stock;
pub mod targets;
pub mod users;
pub mod vendors;

use std::sync::Arc;

use domains::ports::*;

pub use access::{Actor, Policy};

/// Storage handles, constructed once at start-up and shared by every service.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepo>,
    pub products: Arc<dyn ProductRepo>,
    pub vendors: Arc<dyn VendorRepo>,
    pub purchase_orders: Arc<dyn PurchaseOrderRepo>,
    pub forms: Arc<dyn FormRepo>,
    pub posts: Arc<dyn PostRepo>,
    pub documents: Arc<dyn DocumentRepo>,
    pub comments: Arc<dyn CommentRepo>,
    pub reactions: Arc<dyn ReactionRepo>,
}

impl Repositories {
    /// Every port served by one backing store.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepo
            + ProductRepo
            + VendorRepo
            + PurchaseOrderRepo
            + FormRepo
            + PostRepo
            + DocumentRepo
            + CommentRepo
            + ReactionRepo
            + 'static,
    {
        Self {
            users: store.clone(),
            products: store.clone(),
            vendors: store.clone(),
            purchase_orders: store.clone(),
            forms: store.clone(),
            posts: store.clone(),
            documents: store.clone(),
            comments: store.clone(),
            reactions: store,
        }
    }
}

/// Every use case, wired against one set of repositories.
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub users: users::UserService,
    pub products: products::ProductService,
    pub stock: stock::StockService,
    pub vendors: vendors::VendorService,
    pub purchase_orders: purchase_orders::PurchaseOrderService,
    pub forms: forms::FormService,
    pub posts: posts::PostService,
    pub documents: documents::DocumentService,
    pub comments: comments::CommentService,
    pub reactions: reactions::ReactionService,
    pub search: search::SearchService,
    pub analytics: analytics::AnalyticsService,
    pub export: export::ExportService,
}

impl Services {
    pub fn new(
        repos: Repositories,
        identity: Arc<dyn IdentityProvider>,
        ranker: Arc<dyn ProductRanker>,
        policy: Policy,
    ) -> Self {
        let targets = targets::TargetResolver::new(repos.posts.clone(), repos.documents.clone(), repos.comments.clone());

        Self {
            auth: auth::AuthService::new(repos.users.clone(), identity),
            users: users::UserService::new(repos.users.clone()),
            products: products::ProductService::new(repos.products.clone()),
            stock: stock::StockService::new(repos.products.clone()),
            vendors: vendors::VendorService::new(repos.vendors.clone()),
            purchase_orders: purchase_orders::PurchaseOrderService::new(
                repos.purchase_orders.clone(),
                repos.vendors.clone(),
                repos.products.clone(),
                policy,
            ),
            forms: forms::FormService::new(repos.forms.clone()),
            posts: posts::PostService::new(repos.posts.clone()),
            documents: documents::DocumentService::new(repos.documents.clone()),
            comments: comments::CommentService::new(
                comments::CommentEngine::new(repos.comments.clone(), targets.clone()),
                policy,
            ),
            reactions: reactions::ReactionService::new(repos.reactions.clone(), targets),
            search: search::SearchService::new(repos.products.clone(), ranker),
            analytics: analytics::AnalyticsService::new(
                repos.products.clone(),
                repos.purchase_orders.clone(),
                repos.users.clone(),
            ),
            export: export::ExportService::new(
                repos.products,
                repos.purchase_orders,
                repos.vendors,
                repos.users,
            ),
        }
    }
}

/// Applies a caller-supplied limit, falling back to the operation default and
/// never going below one row.
pub(crate) fn limit_or(limit: Option<i64>, default: i64) -> i64 {
    limit.unwrap_or(default).max(1)
}
