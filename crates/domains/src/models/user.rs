use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::string_enum;

/// The closed set of roles. Role is the sole authorization input.
///
/// Deserialization is total: any unrecognized string becomes `Readonly`,
/// so a corrupt or future role value can never grant access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Role {
    Admin,
    Manager,
    ShopFloor,
    Sales,
    #[default]
    Readonly,
}

string_enum!(Role {
    Admin => "admin",
    Manager => "manager",
    ShopFloor => "shop_floor",
    Sales => "sales",
    Readonly => "readonly",
});

impl Role {
    /// Fail-closed parse: unknown or empty input resolves to `Readonly`.
    pub fn from_str_lossy(raw: &str) -> Self {
        Self::parse(raw.trim()).unwrap_or(Role::Readonly)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Manager => "Manager",
            Role::ShopFloor => "Shop Floor",
            Role::Sales => "Sales",
            Role::Readonly => "Read-Only",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Role::Admin => "Full system access including user management",
            Role::Manager => "Manage products, stock, and purchase orders",
            Role::ShopFloor => "Update stock levels and fill forms",
            Role::Sales => "Search products and view inventory",
            Role::Readonly => "View-only access to products and stock",
        }
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        Role::from_str_lossy(&raw)
    }
}

impl From<Option<&str>> for Role {
    fn from(raw: Option<&str>) -> Self {
        raw.map(Role::from_str_lossy).unwrap_or_default()
    }
}

/// A locally provisioned account. `id` is the identity provider's subject.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub login_method: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_signed_in: DateTime<Utc>,
}

/// Profile fields resolved from a bearer token by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIdentity {
    /// Stable user identifier issued by the provider.
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl ExternalIdentity {
    /// Name shown for a freshly provisioned account: the provider's display
    /// name, else the local part of the email address.
    pub fn display_name(&self) -> Option<String> {
        self.name.clone().or_else(|| {
            self.email
                .as_deref()
                .and_then(|e| e.split('@').next())
                .filter(|local| !local.is_empty())
                .map(str::to_string)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_roles_fail_closed() {
        assert_eq!(Role::from_str_lossy("superuser"), Role::Readonly);
        assert_eq!(Role::from_str_lossy(""), Role::Readonly);
        assert_eq!(Role::from(None), Role::Readonly);
        assert_eq!(Role::from_str_lossy("shop_floor"), Role::ShopFloor);

        let role: Role = serde_json::from_str("\"root\"").unwrap();
        assert_eq!(role, Role::Readonly);
        let role: Role = serde_json::from_str("\"manager\"").unwrap();
        assert_eq!(role, Role::Manager);
        assert_eq!(serde_json::to_string(&Role::ShopFloor).unwrap(), "\"shop_floor\"");
    }

    #[test]
    fn display_name_falls_back_to_email_local_part() {
        let identity = ExternalIdentity {
            subject: "u-1".into(),
            email: Some("jo@example.com".into()),
            name: None,
        };
        assert_eq!(identity.display_name().as_deref(), Some("jo"));
    }
}
