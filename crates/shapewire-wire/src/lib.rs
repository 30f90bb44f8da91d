//! Byte-cursor and tagged-header bit-packing primitives for the shapewire codec.
//!
//! Values are addressed byte-by-byte; the only bit-level packing that happens
//! anywhere in this crate is within a handful of header bytes (type tag,
//! subtag, and short length fields). There is no notion of an arbitrary
//! bit offset into a payload the way a hardware telemetry parser would need.

pub mod cursor;
pub mod error;
pub mod header;
pub mod numeric;

pub use cursor::{ByteReader, ByteWriter};
pub use error::WireError;
