use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{ExternalIdentity, Result, Role, User, UserRepo};
use sqlx::postgres::PgRow;

use super::{col, db_err, PgStore};

const USER_COLUMNS: &str = "id, name, email, login_method, role, created_at, last_signed_in";

fn user_from_row(row: &PgRow) -> Result<User> {
    let role: String = col(row, "role")?;
    Ok(User {
        id: col(row, "id")?,
        name: col(row, "name")?,
        email: col(row, "email")?,
        login_method: col(row, "login_method")?,
        // Unknown stored roles fall back to readonly.
        role: Role::from_str_lossy(&role),
        created_at: col(row, "created_at")?,
        last_signed_in: col(row, "last_signed_in")?,
    })
}

#[async_trait]
impl UserRepo for PgStore {
    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id"))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(user_from_row).collect()
    }

    async fn upsert_user(&self, identity: &ExternalIdentity, login_method: &str, seen_at: DateTime<Utc>) -> Result<User> {
        let row = sqlx::query(&format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $6) \
             ON CONFLICT (id) DO UPDATE SET \
                 name = COALESCE(EXCLUDED.name, users.name), \
                 email = COALESCE(EXCLUDED.email, users.email), \
                 login_method = EXCLUDED.login_method, \
                 last_signed_in = EXCLUDED.last_signed_in \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&identity.subject)
        .bind(identity.display_name())
        .bind(&identity.email)
        .bind(login_method)
        .bind(Role::default().as_str())
        .bind(seen_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        user_from_row(&row)
    }

    async fn update_role(&self, id: &str, role: Role) -> Result<Option<User>> {
        let row = sqlx::query(&format!("UPDATE users SET role = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"))
            .bind(id)
            .bind(role.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(user_from_row).transpose()
    }
}
