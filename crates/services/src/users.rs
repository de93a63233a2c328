use std::sync::Arc;

use domains::{Capability, DomainError, Result, Role, User, UserRepo};
use tracing::{info, instrument};

use crate::access::Actor;
use crate::degrade::degrade_read;

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepo>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepo>) -> Self {
        Self { users }
    }

    pub async fn list(&self, actor: &Actor) -> Result<Vec<User>> {
        actor.require(Capability::ViewUsers)?;
        degrade_read("users.list", self.users.list_users().await)
    }

    /// An administrator cannot demote themselves, so self-service can never
    /// leave the system without an admin.
    #[instrument(skip(self, actor), fields(actor = %actor.id()))]
    pub async fn update_role(&self, actor: &Actor, user_id: &str, role: Role) -> Result<User> {
        actor.require(Capability::ManageUsers)?;
        if actor.id() == user_id && role != Role::Admin {
            return Err(DomainError::validation("administrators cannot change their own role"));
        }

        let user = self
            .users
            .update_role(user_id, role)
            .await?
            .ok_or_else(|| DomainError::not_found("user", user_id))?;
        info!(user_id, %role, "role changed");
        Ok(user)
    }
}
