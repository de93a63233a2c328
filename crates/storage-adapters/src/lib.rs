//! # Storage Adapters
//!
//! Implementations of the `domains` repository ports.
//!
//! * [`memory::MemoryStore`]: `dashmap`-backed, always compiled. Used by the
//!   test suites and by `database.backend = "memory"` deployments.
//! * [`postgres::PgStore`]: `sqlx` + PostgreSQL, behind the `db-postgres`
//!   feature, with embedded migrations.

pub mod memory;

#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::MemoryStore;

#[cfg(feature = "db-postgres")]
pub use postgres::PgStore;
