//! The top-level error type a caller of [`crate::encode`]/[`crate::decode`]
//! sees. Where `bitcraft::errors` splits `CompileError`/`ReadError` along
//! the compile/parse boundary, this codec has no separate compile step, so
//! every failure mode collapses into one enum covering schema rejection,
//! value rejection, and malformed wire input.

use shapewire_schema::ValidationError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    /// The value does not match the schema's shape, or an effect (`refine`,
    /// discriminant matching, union membership) rejected it.
    #[error("value failed validation: {0}")]
    ValidationFailure(#[from] ValidationError),

    /// The schema (or a schema reachable from it) names one of the seven
    /// kinds this codec refuses to serialize, permits unknown object keys,
    /// declares too many union options, or combines an intersection this
    /// codec cannot merge structurally.
    #[error("schema cannot be serialized: {0}")]
    UnserializableSchema(String),

    /// A length (string, array, map) exceeds the wire format's encodable
    /// range for its family.
    #[error("value out of range for the wire format: {0}")]
    ValueOutOfRange(String),

    /// A `catch` fallback already replaced the value earlier on this path,
    /// and a `transform` effect further down the same path has nothing
    /// well-formed left to encode (§4.5).
    #[error("a transform effect must run during encoding because catch already replaced the value")]
    TransformUnserializable,

    /// The envelope's version byte does not match the version this build
    /// of the codec speaks.
    #[error("envelope protocol version {found} is not supported (expected {expected})")]
    ProtocolMismatch { expected: u8, found: u8 },

    /// The envelope's schema fingerprint does not match the schema passed
    /// to `decode` — the bytes were produced by, or are being read against,
    /// a different schema shape.
    #[error("envelope schema fingerprint {found:#018x} does not match the expected {expected:#018x}")]
    SchemaMismatch { expected: u64, found: u64 },

    /// The byte stream ran out, held an unrecognized subtype, held a
    /// reserved length-form tag, or held non-UTF-8 bytes where a string
    /// was expected.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Decoding or encoding nested past the recursion-depth guard — almost
    /// always a `lazy` schema with no base case, rather than an actual
    /// cycle in the in-memory value (the `Value` tree cannot itself cycle).
    #[error("value nesting exceeds the recursion depth guard ({0} levels)")]
    CyclicValue(usize),
}

#[cfg(feature = "effects")]
impl From<shapewire_effects::EffectsError> for CodecError {
    fn from(_: shapewire_effects::EffectsError) -> Self {
        CodecError::TransformUnserializable
    }
}

pub(crate) fn malformed(e: shapewire_wire::WireError) -> CodecError {
    CodecError::MalformedInput(e.to_string())
}

pub(crate) fn out_of_range(e: shapewire_wire::WireError) -> CodecError {
    CodecError::ValueOutOfRange(e.to_string())
}

pub(crate) fn mismatch(expected: &'static str) -> CodecError {
    CodecError::ValidationFailure(ValidationError::TypeMismatch { expected })
}
