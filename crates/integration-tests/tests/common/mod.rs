//! Shared fixtures: a memory-backed service graph and provisioned callers.

#![allow(dead_code)]

use std::sync::Arc;

use ai_adapters::DisabledRanker;
use auth_adapters::JwtIdentityProvider;
use chrono::Utc;
use domains::{ExternalIdentity, NewProduct, Product, ProductRanker, Role, UserRepo};
use services::{Actor, Policy, Repositories, Services};
use storage_adapters::MemoryStore;

pub const SECRET: &str = "integration-test-secret";

pub struct World {
    pub store: Arc<MemoryStore>,
    pub services: Services,
}

pub fn world() -> World {
    world_with(Policy::default(), Arc::new(DisabledRanker))
}

pub fn world_with(policy: Policy, ranker: Arc<dyn ProductRanker>) -> World {
    let store = Arc::new(MemoryStore::new());
    let identity = Arc::new(JwtIdentityProvider::new(SECRET, None).unwrap());
    let services = Services::new(Repositories::from_store(store.clone()), identity, ranker, policy);
    World { store, services }
}

pub fn identity(subject: &str) -> ExternalIdentity {
    ExternalIdentity {
        subject: subject.to_string(),
        email: Some(format!("{subject}@example.com")),
        name: Some(subject.to_string()),
    }
}

impl World {
    /// Provisions `subject` with `role`, the way first sign-in plus an admin
    /// role change would.
    pub async fn actor(&self, subject: &str, role: Role) -> Actor {
        self.store.upsert_user(&identity(subject), "jwt", Utc::now()).await.unwrap();
        let user = self.store.update_role(subject, role).await.unwrap().unwrap();
        Actor::new(user)
    }

    pub async fn product(&self, sku: &str, stock: i32) -> Product {
        let admin = self.actor("fixture-admin", Role::Admin).await;
        self.services
            .products
            .create(
                &admin,
                NewProduct { sku: sku.into(), name: format!("Part {sku}"), stock_quantity: Some(stock), ..Default::default() },
            )
            .await
            .unwrap()
    }
}
