//! Read-path degradation.
//!
//! When storage cannot be reached, list and lookup operations answer with an
//! empty collection (or `None`) instead of failing the request. The warning
//! carries `degraded = true` so "nothing matched" and "store down" can be told
//! apart in the logs. Writes never go through here.

use domains::{DomainError, Result};
use tracing::warn;

pub fn degrade_read<T: Default>(operation: &'static str, result: Result<T>) -> Result<T> {
    match result {
        Err(DomainError::DatabaseUnavailable(reason)) => {
            warn!(operation, degraded = true, %reason, "storage unavailable, returning empty result");
            Ok(T::default())
        }
        other => other,
    }
}
