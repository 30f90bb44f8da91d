use thiserror::Error;

/// Errors raised by the byte-cursor and header primitives. These are folded
/// into the richer `CodecError` by the `shapewire` crate, which adds the
/// schema-shaped context (field name, union index, etc.) that this low-level
/// layer does not have access to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("attempted to read past the end of the input buffer")]
    OutOfBounds,
    #[error("length field uses the reserved encoding")]
    ReservedLengthTag,
    #[error("length {len} exceeds the family's cap of {max}")]
    LengthOutOfRange { len: usize, max: usize },
    #[error("byte sequence is not valid UTF-8")]
    InvalidUtf8,
    #[error("numeric subtype byte {0:#x} is not a recognized subtype")]
    UnknownNumericSubtype(u8),
}
