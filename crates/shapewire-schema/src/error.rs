use thiserror::Error;

/// Errors raised while *building* a [`crate::Schema`] — the runtime
/// analogue of `bitcraft::errors::CompileError`, since this codec compiles
/// nothing ahead of time but still rejects malformed schema shapes eagerly
/// rather than at first use.
#[derive(Debug, Error)]
pub enum SchemaBuildError {
    #[error("union declares {0} options but the wire format caps unions at 32")]
    TooManyUnionOptions(usize),
    #[error("union must declare at least one option")]
    EmptyUnion,
    #[error("object declares the same field name twice: {0}")]
    DuplicateField(String),
    #[error("literal/default/catch value must be a string, integer, or boolean, found {0}")]
    UnsupportedLiteralValue(&'static str),
}

/// Errors raised by the minimal built-in validator (the "safe-parse"
/// capability §6 asks the schema collaborator for).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("expected {expected}, found a value of a different shape")]
    TypeMismatch { expected: &'static str },
    #[error("object is missing required field {0:?}")]
    MissingField(String),
    #[error("no union option accepted the value")]
    NoUnionVariantMatched,
    #[error("tuple expected {expected} elements, found {found}")]
    TupleLengthMismatch { expected: usize, found: usize },
    #[error("string of {0} bytes exceeds the 2^20 byte cap")]
    StringTooLong(usize),
    #[error("bigint value is outside the signed-64 range")]
    BigIntOutOfRange,
    #[error("value {0} has no entry in the declared enum")]
    EnumValueNotAllowed(String),
    #[error("refinement predicate rejected the value")]
    RefinementFailed,
    #[error("discriminant field {field:?} did not match any variant")]
    DiscriminantNotMatched { field: String },
}
