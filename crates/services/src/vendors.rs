use std::sync::Arc;

use chrono::Utc;
use domains::{Capability, DomainError, NewVendor, Result, Vendor, VendorPatch, VendorRepo};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::access::Actor;
use crate::degrade::degrade_read;

#[derive(Clone)]
pub struct VendorService {
    vendors: Arc<dyn VendorRepo>,
}

impl VendorService {
    pub fn new(vendors: Arc<dyn VendorRepo>) -> Self {
        Self { vendors }
    }

    /// Active vendors by name.
    pub async fn list(&self, actor: &Actor) -> Result<Vec<Vendor>> {
        actor.require(Capability::ViewPos)?;
        degrade_read("vendors.list", self.vendors.list_vendors(true).await)
    }

    pub async fn get(&self, actor: &Actor, id: Uuid) -> Result<Option<Vendor>> {
        actor.require(Capability::ViewPos)?;
        degrade_read("vendors.get", self.vendors.get_vendor(id).await)
    }

    /// Duplicate vendor codes surface as `Conflict` from the store.
    #[instrument(skip(self, actor, input), fields(actor = %actor.id(), code = %input.vendor_code))]
    pub async fn create(&self, actor: &Actor, input: NewVendor) -> Result<Vendor> {
        actor.require(Capability::ManagePos)?;
        let vendor = input.into_vendor(Utc::now());
        validate(&vendor)?;
        self.vendors.insert_vendor(&vendor).await?;
        info!(vendor_id = %vendor.id, "vendor created");
        Ok(vendor)
    }

    #[instrument(skip(self, actor, patch), fields(actor = %actor.id()))]
    pub async fn update(&self, actor: &Actor, id: Uuid, patch: VendorPatch) -> Result<Vendor> {
        actor.require(Capability::ManagePos)?;
        let mut vendor = self
            .vendors
            .get_vendor(id)
            .await?
            .ok_or_else(|| DomainError::not_found("vendor", id))?;
        vendor.apply(patch);
        validate(&vendor)?;
        vendor.updated_at = Utc::now();
        self.vendors.update_vendor(&vendor).await?;
        Ok(vendor)
    }

    #[instrument(skip(self, actor), fields(actor = %actor.id()))]
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<()> {
        actor.require(Capability::ManagePos)?;
        if !self.vendors.delete_vendor(id).await? {
            return Err(DomainError::not_found("vendor", id));
        }
        Ok(())
    }
}

fn validate(vendor: &Vendor) -> Result<()> {
    if vendor.vendor_code.is_empty() || vendor.vendor_name.trim().is_empty() {
        return Err(DomainError::validation("vendor code and name are required"));
    }
    if vendor.lead_time_days < 0 {
        return Err(DomainError::validation("lead time cannot be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::fixtures::actor;
    use domains::{MockVendorRepo, Role};

    #[tokio::test]
    async fn manager_creates_vendor_with_defaults() {
        let mut repo = MockVendorRepo::new();
        repo.expect_insert_vendor().times(1).returning(|_| Ok(()));
        let service = VendorService::new(Arc::new(repo));

        let vendor = service
            .create(
                &actor("m", Role::Manager),
                NewVendor { vendor_code: " ACME ".into(), vendor_name: "Acme Steering".into(), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(vendor.vendor_code, "ACME");
        assert!(vendor.is_active);
        assert_eq!(vendor.lead_time_days, 0);
    }

    #[tokio::test]
    async fn sales_cannot_see_vendors() {
        let service = VendorService::new(Arc::new(MockVendorRepo::new()));
        assert!(matches!(service.list(&actor("s", Role::Sales)).await, Err(DomainError::Forbidden(_))));
    }
}
