//! The `Schema` tagged sum type and the in-memory `Value` domain shared by
//! every other `shapewire` crate. See `schema.rs` for why this codec owns
//! its schema representation instead of treating it as an external
//! collaborator (§1/§9 of the expanded specification).

pub mod error;
pub mod schema;
pub mod validate;
pub mod value;

#[cfg(feature = "serde")]
pub mod def;

pub use error::{SchemaBuildError, ValidationError};
#[cfg(feature = "effects")]
pub use schema::EffectKind;
pub use schema::{EnumMemberKind, Lazy, LiteralValue, ObjectField, Schema, UnserializableKind, ValueFactory};
pub use value::Value;
