//! # DomainError
//!
//! Centralized error handling for the Stockroom ecosystem.
//! Every port and service returns this type so the transport layer can map
//! each failure class to a distinct response.

use thiserror::Error;

/// The primary error type for all domain and service operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Missing or invalid credential, or the caller's role lacks a capability.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Referenced entity does not resolve (entity kind, id).
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Malformed or out-of-range input (e.g. negative stock quantity).
    #[error("validation error: {0}")]
    Validation(String),

    /// A unique identifier is already taken (SKU, PO number, vendor code).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The storage layer could not be reached.
    #[error("database unavailable: {0}")]
    DatabaseUnavailable(String),

    /// Anything else (corrupt row, serialization failure).
    #[error("internal service error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound(entity.to_string(), id.to_string())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::DatabaseUnavailable(_))
    }
}

/// A specialized Result type for Stockroom logic.
pub type Result<T> = std::result::Result<T, DomainError>;
