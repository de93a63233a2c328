//! # Permissions
//!
//! Role → capability lookup. The whole matrix lives in one static table
//! indexed by role so it can be read and tested in a single place; nothing
//! is derived from a seniority ordinal (sales may use AI search while
//! shop floor may not, even though shop floor can move stock).

use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, Result};
use crate::models::Role;

/// A single named permission flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewProducts,
    EditProducts,
    DeleteProducts,
    UpdateStock,
    ViewStock,
    ManagePos,
    ViewPos,
    ManageUsers,
    ViewUsers,
    AccessAi,
    ExportData,
    ViewAnalytics,
    ManageForms,
    FillForms,
}

impl Capability {
    pub const ALL: [Capability; 14] = [
        Capability::ViewProducts,
        Capability::EditProducts,
        Capability::DeleteProducts,
        Capability::UpdateStock,
        Capability::ViewStock,
        Capability::ManagePos,
        Capability::ViewPos,
        Capability::ManageUsers,
        Capability::ViewUsers,
        Capability::AccessAi,
        Capability::ExportData,
        Capability::ViewAnalytics,
        Capability::ManageForms,
        Capability::FillForms,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ViewProducts => "view_products",
            Capability::EditProducts => "edit_products",
            Capability::DeleteProducts => "delete_products",
            Capability::UpdateStock => "update_stock",
            Capability::ViewStock => "view_stock",
            Capability::ManagePos => "manage_pos",
            Capability::ViewPos => "view_pos",
            Capability::ManageUsers => "manage_users",
            Capability::ViewUsers => "view_users",
            Capability::AccessAi => "access_ai",
            Capability::ExportData => "export_data",
            Capability::ViewAnalytics => "view_analytics",
            Capability::ManageForms => "manage_forms",
            Capability::FillForms => "fill_forms",
        }
    }
}

/// The immutable capability record for one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub can_view_products: bool,
    pub can_edit_products: bool,
    pub can_delete_products: bool,
    pub can_update_stock: bool,
    pub can_view_stock: bool,
    pub can_manage_pos: bool,
    pub can_view_pos: bool,
    pub can_manage_users: bool,
    pub can_view_users: bool,
    pub can_access_ai: bool,
    pub can_export_data: bool,
    pub can_view_analytics: bool,
    pub can_manage_forms: bool,
    pub can_fill_forms: bool,
}

impl Capabilities {
    pub fn allows(&self, cap: Capability) -> bool {
        match cap {
            Capability::ViewProducts => self.can_view_products,
            Capability::EditProducts => self.can_edit_products,
            Capability::DeleteProducts => self.can_delete_products,
            Capability::UpdateStock => self.can_update_stock,
            Capability::ViewStock => self.can_view_stock,
            Capability::ManagePos => self.can_manage_pos,
            Capability::ViewPos => self.can_view_pos,
            Capability::ManageUsers => self.can_manage_users,
            Capability::ViewUsers => self.can_view_users,
            Capability::AccessAi => self.can_access_ai,
            Capability::ExportData => self.can_export_data,
            Capability::ViewAnalytics => self.can_view_analytics,
            Capability::ManageForms => self.can_manage_forms,
            Capability::FillForms => self.can_fill_forms,
        }
    }

    /// `Forbidden` naming the missing capability, never a silent no-op.
    pub fn require(&self, cap: Capability) -> Result<()> {
        if self.allows(cap) {
            Ok(())
        } else {
            Err(DomainError::forbidden(format!("missing capability `{}`", cap.as_str())))
        }
    }

    pub fn granted(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|c| self.allows(*c))
    }
}

const fn caps(flags: [bool; 14]) -> Capabilities {
    Capabilities {
        can_view_products: flags[0],
        can_edit_products: flags[1],
        can_delete_products: flags[2],
        can_update_stock: flags[3],
        can_view_stock: flags[4],
        can_manage_pos: flags[5],
        can_view_pos: flags[6],
        can_manage_users: flags[7],
        can_view_users: flags[8],
        can_access_ai: flags[9],
        can_export_data: flags[10],
        can_view_analytics: flags[11],
        can_manage_forms: flags[12],
        can_fill_forms: flags[13],
    }
}

const T: bool = true;
const F: bool = false;

// Rows follow `Role` declaration order; columns follow `Capability::ALL`:
// view, edit, delete, stock, view stock, manage po, view po, manage users,
// view users, ai, export, analytics, manage forms, fill forms.
static ROLE_TABLE: [Capabilities; 5] = [
    /* admin      */ caps([T, T, T, T, T, T, T, T, T, T, T, T, T, T]),
    /* manager    */ caps([T, T, F, T, T, T, T, F, T, T, T, T, T, T]),
    /* shop_floor */ caps([T, F, F, T, T, F, F, F, F, F, F, F, F, T]),
    /* sales      */ caps([T, F, F, F, T, F, F, F, F, T, F, F, F, F]),
    /* readonly   */ caps([T, F, F, F, T, F, F, F, F, F, F, F, F, F]),
];

/// Pure lookup; no side effects, no persisted decision.
pub fn capabilities_for(role: Role) -> &'static Capabilities {
    let row = match role {
        Role::Admin => 0,
        Role::Manager => 1,
        Role::ShopFloor => 2,
        Role::Sales => 3,
        Role::Readonly => 4,
    };
    &ROLE_TABLE[row]
}

impl Role {
    pub fn capabilities(&self) -> &'static Capabilities {
        capabilities_for(*self)
    }
}
