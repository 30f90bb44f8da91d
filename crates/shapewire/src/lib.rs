//! # shapewire
//!
//! A schema-directed binary codec: given a [`Schema`] describing the shape
//! of a value — primitives, objects, arrays, unions, maps, and a handful of
//! decorators (`optional`, `nullable`, `default`, `catch`, `refine`,
//! `preprocess`, `transform`, `readonly`, `branded`, `lazy`) — `encode` and
//! `decode` turn an in-memory [`Value`] into bytes and back.
//!
//! Every encoded value starts with a 9-byte envelope (one version byte plus
//! an 8-byte big-endian structural fingerprint of the schema) so a decoder
//! can refuse input produced against a differently-shaped schema before it
//! even looks at the body. The body that follows is tagged per value: a
//! 3-bit type tag plus family-specific subtag and length bits pick out a
//! numeric, string, date, array/tuple/set, union, object, or map wire form.
//!
//! ```
//! use shapewire::{decode, encode};
//! use shapewire_schema::{ObjectField, Schema, Value};
//!
//! let schema = Schema::object(vec![
//!     ObjectField::new("id", Schema::Number),
//!     ObjectField::new("name", Schema::optional(Schema::Str)),
//! ])
//! .unwrap();
//!
//! let value = Value::Object(vec![
//!     ("id".to_string(), Value::Int(7)),
//!     ("name".to_string(), Value::Str("ada".to_string())),
//! ]);
//!
//! let bytes = encode(&schema, &value).unwrap();
//! let decoded = decode(&schema, &bytes).unwrap();
//! assert_eq!(decoded, value);
//! ```

pub mod codec;
pub mod envelope;
pub mod error;

pub use error::CodecError;
pub use shapewire_schema::{Schema, Value};

use shapewire_effects::EncodeState;
use shapewire_wire::{ByteReader, ByteWriter};

/// Validates `value` against `schema`, then writes the 9-byte envelope
/// followed by the tagged wire body. Fails with [`CodecError::UnserializableSchema`]
/// if `schema` (or anything it reaches through objects, composites, or
/// decorators) names a kind this codec cannot represent on the wire.
pub fn encode(schema: &Schema, value: &Value) -> Result<Vec<u8>, CodecError> {
    codec::check_serializable(schema)?;

    let fingerprint = shapewire_hash::fingerprint(schema);
    let mut writer = ByteWriter::with_capacity(64);
    envelope::write_envelope(&mut writer, fingerprint);

    let mut state = EncodeState::new();
    codec::encode_value(schema, value, &mut writer, &mut state, 0)?;

    tracing::debug!(bytes = writer.len(), fingerprint, "encoded value");
    Ok(writer.into_vec())
}

/// Reads the envelope from `bytes`, checks its fingerprint against `schema`,
/// decodes the tagged body, then re-validates the result — which is also
/// where `default` fill-ins, `catch` fallbacks, and `transform` effects are
/// (re-)applied, since the wire body only ever carries their pre-transform
/// form.
pub fn decode(schema: &Schema, bytes: &[u8]) -> Result<Value, CodecError> {
    codec::check_serializable(schema)?;

    let fingerprint = shapewire_hash::fingerprint(schema);
    let mut reader = ByteReader::new(bytes);
    envelope::read_envelope(&mut reader, fingerprint)?;

    let raw = codec::decode_value(schema, &mut reader, 0)?;
    let validated = shapewire_schema::validate::validate(schema, raw)?;
    tracing::debug!(bytes = bytes.len(), fingerprint, "decoded value");
    Ok(validated)
}
