//! stockroom/crates/domains/src/lib.rs
//!
//! The central domain types and interface definitions for Stockroom.
//! Nothing in here performs I/O; adapters implement the ports.

pub mod errors;
pub mod models;
pub mod permissions;
pub mod ports;

// Re-exporting for easier access in other crates
pub use errors::*;
pub use models::*;
pub use permissions::*;
pub use ports::*;

#[cfg(test)]
mod tests {
    use super::models::*;
    use uuid::Uuid;

    #[test]
    fn test_comment_target_roundtrip() {
        let id = Uuid::now_v7();
        let target = TargetRef::new(TargetKind::Document, id);
        assert_eq!(target.to_string(), format!("document:{id}"));
        assert!(target.kind.accepts_comments());
        assert!(!TargetKind::Comment.accepts_comments());
    }
}
