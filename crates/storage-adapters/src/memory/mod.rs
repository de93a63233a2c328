//! # In-memory store
//!
//! One `DashMap` per table. Every multi-step write holds the entry lock of the
//! row it mutates, so a stock adjustment or a line receipt is atomic with
//! respect to concurrent callers.
//!
//! Natural keys (SKU, vendor code, PO number, one reaction per user and
//! target) live in separate index maps. A writer claims the key through
//! `entry()` before it writes the row, so two racing inserts cannot both pass
//! the uniqueness check.
//!
//! The store can be switched into an outage state, in which every call fails
//! with `DatabaseUnavailable`; the degraded-read paths are exercised that way.

mod content;
mod forms;
mod interactions;
mod products;
mod purchasing;
mod users;

use std::sync::atomic::{AtomicBool, Ordering};

use std::hash::Hash;

use dashmap::{mapref::entry::Entry, DashMap};
use domains::*;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<String, User>,
    products: DashMap<Uuid, Product>,
    stock_adjustments: DashMap<Uuid, Vec<StockAdjustment>>,
    vendors: DashMap<Uuid, Vendor>,
    purchase_orders: DashMap<Uuid, PurchaseOrderDetail>,
    templates: DashMap<Uuid, FormTemplate>,
    submissions: DashMap<Uuid, FormSubmission>,
    posts: DashMap<Uuid, Post>,
    documents: DashMap<Uuid, Document>,
    comments: DashMap<Uuid, Comment>,
    reactions: DashMap<Uuid, Reaction>,
    skus: DashMap<String, Uuid>,
    vendor_codes: DashMap<String, Uuid>,
    po_numbers: DashMap<String, Uuid>,
    reaction_keys: DashMap<(TargetRef, String), Uuid>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every operation fails with `DatabaseUnavailable`.
    pub fn set_unavailable(&self, down: bool) {
        self.unavailable.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(DomainError::DatabaseUnavailable("in-memory store is offline".into()))
        } else {
            Ok(())
        }
    }
}

/// Clamps a repository limit to a usable `take` count.
fn take(limit: i64) -> usize {
    usize::try_from(limit.max(0)).unwrap_or(usize::MAX)
}

/// Claims `key` for row `id`. False when another row already holds it.
fn claim<K: Eq + Hash>(index: &DashMap<K, Uuid>, key: K, id: Uuid) -> bool {
    match index.entry(key) {
        Entry::Occupied(held) => *held.get() == id,
        Entry::Vacant(free) => {
            free.insert(id);
            true
        }
    }
}

/// Frees `key` if row `id` still holds it.
fn release<K: Eq + Hash>(index: &DashMap<K, Uuid>, key: &K, id: Uuid) {
    index.remove_if(key, |_, holder| *holder == id);
}

fn values<K, V>(map: &DashMap<K, V>) -> Vec<V>
where
    K: Eq + Hash,
    V: Clone,
{
    map.iter().map(|entry| entry.value().clone()).collect()
}
