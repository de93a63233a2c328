use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{ExternalIdentity, Result, Role, User, UserRepo};

use super::{values, MemoryStore};

#[async_trait]
impl UserRepo for MemoryStore {
    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.check()?;
        Ok(self.users.get(id).map(|u| u.clone()))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.check()?;
        let mut users = values(&self.users);
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn upsert_user(&self, identity: &ExternalIdentity, login_method: &str, seen_at: DateTime<Utc>) -> Result<User> {
        self.check()?;
        let mut entry = self.users.entry(identity.subject.clone()).or_insert_with(|| User {
            id: identity.subject.clone(),
            name: identity.display_name(),
            email: identity.email.clone(),
            login_method: Some(login_method.to_string()),
            role: Role::default(),
            created_at: seen_at,
            last_signed_in: seen_at,
        });

        let user = entry.value_mut();
        if let Some(name) = identity.display_name() {
            user.name = Some(name);
        }
        if identity.email.is_some() {
            user.email = identity.email.clone();
        }
        user.login_method = Some(login_method.to_string());
        user.last_signed_in = seen_at;
        Ok(user.clone())
    }

    async fn update_role(&self, id: &str, role: Role) -> Result<Option<User>> {
        self.check()?;
        Ok(self.users.get_mut(id).map(|mut user| {
            user.role = role;
            user.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(name: Option<&str>) -> ExternalIdentity {
        ExternalIdentity { subject: "sub-1".into(), email: Some("lee@shop.test".into()), name: name.map(Into::into) }
    }

    #[tokio::test]
    async fn upsert_provisions_readonly_then_keeps_role() {
        let store = MemoryStore::new();
        let first = store.upsert_user(&identity(None), "jwt", Utc::now()).await.unwrap();
        assert_eq!(first.role, Role::Readonly);
        assert_eq!(first.name.as_deref(), Some("lee"));

        store.update_role("sub-1", Role::Manager).await.unwrap();
        let later = Utc::now();
        let again = store.upsert_user(&identity(Some("Lee Park")), "jwt", later).await.unwrap();
        assert_eq!(again.role, Role::Manager);
        assert_eq!(again.name.as_deref(), Some("Lee Park"));
        assert_eq!(again.last_signed_in, later);
        assert_eq!(again.created_at, first.created_at);
    }
}
