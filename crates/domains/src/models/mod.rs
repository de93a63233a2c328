//! # Domain Models
//!
//! These structs represent the core entities of Stockroom.
//! Entity ids are UUID v7 (time-ordered); user ids are the subject string
//! issued by the identity provider. Money is always integer cents.

mod document;
mod form;
mod interaction;
mod post;
mod product;
mod purchase_order;
mod user;
mod vendor;

pub use document::*;
pub use form::*;
pub use interaction::*;
pub use post::*;
pub use product::*;
pub use purchase_order::*;
pub use user::*;
pub use vendor::*;

/// Implements `as_str`, `Display` and a fallible `parse` for a fieldless enum
/// whose wire form is a fixed snake_case string.
macro_rules! string_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }

            pub fn parse(raw: &str) -> Option<Self> {
                match raw {
                    $($text => Some($ty::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use string_enum;
