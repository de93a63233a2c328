use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A supplier referenced by purchase orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: Uuid,
    pub vendor_code: String,
    pub vendor_name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub lead_time_days: i32,
    pub payment_terms: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewVendor {
    pub vendor_code: String,
    pub vendor_name: String,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub lead_time_days: Option<i32>,
    #[serde(default)]
    pub payment_terms: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewVendor {
    pub fn into_vendor(self, now: DateTime<Utc>) -> Vendor {
        Vendor {
            id: Uuid::now_v7(),
            vendor_code: self.vendor_code.trim().to_string(),
            vendor_name: self.vendor_name.trim().to_string(),
            contact_name: self.contact_name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            lead_time_days: self.lead_time_days.unwrap_or(0),
            payment_terms: self.payment_terms,
            notes: self.notes,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorPatch {
    pub vendor_name: Option<String>,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub lead_time_days: Option<i32>,
    pub payment_terms: Option<String>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

impl Vendor {
    pub fn apply(&mut self, patch: VendorPatch) {
        if let Some(v) = patch.vendor_name {
            self.vendor_name = v;
        }
        if let Some(v) = patch.contact_name {
            self.contact_name = Some(v);
        }
        if let Some(v) = patch.email {
            self.email = Some(v);
        }
        if let Some(v) = patch.phone {
            self.phone = Some(v);
        }
        if let Some(v) = patch.address {
            self.address = Some(v);
        }
        if let Some(v) = patch.lead_time_days {
            self.lead_time_days = v;
        }
        if let Some(v) = patch.payment_terms {
            self.payment_terms = Some(v);
        }
        if let Some(v) = patch.notes {
            self.notes = Some(v);
        }
        if let Some(v) = patch.is_active {
            self.is_active = v;
        }
    }
}
