//! Caller resolution: bearer token → identity → local account.
//!
//! The first authenticated request of a new subject provisions a readonly
//! account; every later one refreshes `last_signed_in`.

use std::sync::Arc;

use chrono::Utc;
use domains::{Capabilities, IdentityProvider, Result, Role, User, UserRepo};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::access::Actor;

pub const LOGIN_METHOD: &str = "jwt";

/// What `auth.me` returns for a signed-in caller.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    #[serde(flatten)]
    pub user: User,
    pub role_name: &'static str,
    pub role_description: &'static str,
    pub capabilities: Capabilities,
}

impl Profile {
    pub fn of(actor: &Actor) -> Self {
        let role: Role = actor.role();
        Self {
            user: actor.user().clone(),
            role_name: role.display_name(),
            role_description: role.description(),
            capabilities: *actor.capabilities(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LogoutAck {
    pub success: bool,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepo>,
    identity: Arc<dyn IdentityProvider>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepo>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { users, identity }
    }

    /// `Forbidden` for a token the identity provider rejects.
    #[instrument(skip_all)]
    pub async fn authenticate(&self, token: &str) -> Result<Actor> {
        let identity = self.identity.resolve(token).await?;
        let user = self.users.upsert_user(&identity, LOGIN_METHOD, Utc::now()).await?;
        debug!(user_id = %user.id, role = %user.role, "caller resolved");
        Ok(Actor::new(user))
    }

    pub fn me(&self, actor: Option<&Actor>) -> Option<Profile> {
        actor.map(Profile::of)
    }

    /// Sessions are stateless bearer tokens; there is nothing to revoke
    /// server-side.
    pub fn logout(&self) -> LogoutAck {
        LogoutAck { success: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{DomainError, ExternalIdentity, MockIdentityProvider, MockUserRepo};

    #[tokio::test]
    async fn first_sight_provisions_a_readonly_account() {
        let mut identity = MockIdentityProvider::new();
        identity.expect_resolve().returning(|_| {
            Ok(ExternalIdentity { subject: "sub-1".into(), email: Some("sam@shop.test".into()), name: None })
        });

        let mut users = MockUserRepo::new();
        users
            .expect_upsert_user()
            .withf(|identity, method, _| identity.subject == "sub-1" && method == "jwt")
            .returning(|identity, method, at| {
                Ok(User {
                    id: identity.subject.clone(),
                    name: identity.display_name(),
                    email: identity.email.clone(),
                    login_method: Some(method.to_string()),
                    role: Role::default(),
                    created_at: at,
                    last_signed_in: at,
                })
            });

        let service = AuthService::new(Arc::new(users), Arc::new(identity));
        let actor = service.authenticate("token").await.unwrap();
        assert_eq!(actor.id(), "sub-1");
        assert_eq!(actor.role(), Role::Readonly);

        let profile = service.me(Some(&actor)).unwrap();
        assert_eq!(profile.role_name, "Read-Only");
        assert!(profile.capabilities.can_view_products);
        assert!(!profile.capabilities.can_update_stock);
    }

    #[tokio::test]
    async fn rejected_token_is_forbidden() {
        let mut identity = MockIdentityProvider::new();
        identity.expect_resolve().returning(|_| Err(DomainError::forbidden("bad signature")));
        let mut users = MockUserRepo::new();
        users.expect_upsert_user().never();

        let service = AuthService::new(Arc::new(users), Arc::new(identity));
        assert!(matches!(service.authenticate("nope").await, Err(DomainError::Forbidden(_))));
        assert!(service.me(None).is_none());
        assert!(service.logout().success);
    }
}
