//! The authenticated caller and the deployment's access policy.

use domains::{Capabilities, Capability, DomainError, Result, Role, User};

/// A resolved, locally provisioned user acting on the system.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    user: User,
}

impl Actor {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn id(&self) -> &str {
        &self.user.id
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn capabilities(&self) -> &'static Capabilities {
        self.user.role.capabilities()
    }

    pub fn require(&self, cap: Capability) -> Result<()> {
        self.capabilities().require(cap)
    }

    pub fn is_admin(&self) -> bool {
        self.user.role == Role::Admin
    }

    /// Read rule for authored content: shared content, or the author, or any admin.
    pub fn can_see(&self, owner_id: &str, shared: bool) -> bool {
        shared || self.is_admin() || self.id() == owner_id
    }

    /// Ownership rule for authored content: the author, or any admin.
    pub fn require_owner_or_admin(&self, owner_id: &str, what: &str) -> Result<()> {
        if self.is_admin() || self.id() == owner_id {
            Ok(())
        } else {
            Err(DomainError::forbidden(format!("only the author or an administrator may modify this {what}")))
        }
    }
}

/// Deployment switches for behaviour that tightens the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    /// Comments may only be edited or deleted by their author or an admin.
    pub enforce_comment_authorship: bool,
    /// Purchase order status changes follow `PoStatus::can_transition_to`.
    pub enforce_po_transitions: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            enforce_comment_authorship: true,
            enforce_po_transitions: false,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Utc;
    use domains::{Role, User};

    use super::Actor;

    pub fn actor(id: &str, role: Role) -> Actor {
        let now = Utc::now();
        Actor::new(User {
            id: id.to_string(),
            name: Some(id.to_string()),
            email: None,
            login_method: Some("jwt".into()),
            role,
            created_at: now,
            last_signed_in: now,
        })
    }
}
