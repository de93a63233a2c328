//! # PostgreSQL store
//!
//! Maps the relational schema in `migrations/` onto the domain models.
//! Queries are built at runtime and decoded column by column; JSON-shaped
//! attributes (product specs, tags, images, form fields, submission data)
//! live in JSONB columns.
//!
//! Multi-row writes (a purchase order with its lines, a stock move with its
//! audit row, a line receipt) each run inside one transaction.

mod content;
mod forms;
mod interactions;
mod products;
mod purchasing;
mod users;

use std::time::Duration;

use domains::{DomainError, Result};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, Row};
use tracing::{info, instrument};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Opens a pool; fails with `DatabaseUnavailable` if the server cannot
    /// be reached within the acquire timeout.
    #[instrument(skip(url))]
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await
            .map_err(db_err)?;
        info!("connected to postgres");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DomainError::Internal(format!("migration failed: {e}")))?;
        info!("schema migrations applied");
        Ok(())
    }
}

/// Translates driver failures into the domain taxonomy.
pub(crate) fn db_err(err: sqlx::Error) -> DomainError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => DomainError::Conflict(db.message().to_string()),
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            DomainError::DatabaseUnavailable(err.to_string())
        }
        _ => DomainError::Internal(err.to_string()),
    }
}

fn col<'r, T>(row: &'r PgRow, name: &str) -> Result<T>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name).map_err(db_err)
}

/// Decodes a TEXT column holding one of a fixed set of wire names.
fn enum_col<T>(row: &PgRow, name: &str, parse: fn(&str) -> Option<T>) -> Result<T> {
    let raw: String = col(row, name)?;
    parse(&raw).ok_or_else(|| DomainError::Internal(format!("unexpected {name} value `{raw}`")))
}

/// `%needle%` with LIKE metacharacters escaped.
fn like_pattern(needle: &str) -> String {
    let escaped = needle.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}

fn count(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or(0)
}
