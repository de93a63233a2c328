//! # auth-adapters
//!
//! Identity providers behind the `IdentityProvider` port.
//!
//! The `auth-jwt` feature verifies HS256 bearer tokens carrying
//! Supabase-style claims (`sub`, `email`, `user_metadata.name`, `aud`,
//! `exp`) and can mint them for seeding and tests.

#[cfg(feature = "auth-jwt")]
pub mod jwt;

#[cfg(feature = "auth-jwt")]
pub use jwt::{Claims, JwtIdentityProvider, TokenError, UserMetadata};
