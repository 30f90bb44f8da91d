//! The recursive dispatcher that walks a schema and a value together,
//! either writing bytes (encode) or reading them back (decode). This is
//! the one module in the crate that touches every `Schema` variant, the
//! same way `bitcraft::schema::Schema::parse` was the one place that
//! walked every `Field`.
//!
//! Encode does its own type-checking inline rather than delegating to
//! `shapewire_schema::validate::validate` up front, because that function's
//! `Effect::Transform` arm *applies* the transform — exactly the value the
//! wire must not carry (§4.5 says the base schema encodes the pre-transform
//! value). The one exception is `catch` and untagged-`union` branch
//! selection, both of which call the full validator to decide membership;
//! a transform nested inside a `catch`'s inner schema or a union option is
//! applied once during that membership test rather than deferred to decode.
//! This mirrors how `shapewire_effects::resolve_catch` is already written
//! and documented, and is accepted here as the same trade-off rather than
//! a new inconsistency.

use shapewire_effects::EncodeState;
use shapewire_schema::{EnumMemberKind, LiteralValue, ObjectField, Schema, Value};
use shapewire_wire::header::{
    numeric_subtype, object_subtag, pack_array_header, pack_date_header, pack_map_header,
    pack_numeric_header, pack_object_header, pack_string_header, pack_union_header,
    read_array_len, read_map_len, read_string_len, tag_of, unpack_map_is_map,
    unpack_numeric_subtype, unpack_object_subtag, unpack_union_index, TAG_MAP, TAG_NUMERIC,
    TAG_OBJECT, TAG_STRING, TAG_UNION,
};
use shapewire_wire::numeric::{
    exceeds_safe_integer_range, narrow_int_subtype, read_int_payload, write_int_payload,
};
use shapewire_wire::{ByteReader, ByteWriter};

use crate::error::{malformed, mismatch, out_of_range, CodecError};

/// Bounds schema-decorator recursion (chiefly `lazy`) so a schema with no
/// base case fails cleanly instead of overflowing the stack.
pub const MAX_RECURSION_DEPTH: usize = 256;

fn depth_guard(depth: usize) -> Result<(), CodecError> {
    if depth >= MAX_RECURSION_DEPTH {
        Err(CodecError::CyclicValue(depth))
    } else {
        Ok(())
    }
}

// ------------------------------------------------------------ reject-list

/// Walks `schema` looking for anything the dispatcher refuses outright:
/// an unserializable kind, a passthrough object, or an unsupported
/// intersection shape (§4.4 step 1). Applied once up front so a rejection
/// surfaces before any bytes are written, no matter how deep the offending
/// node sits.
pub fn check_serializable(schema: &Schema) -> Result<(), CodecError> {
    let mut visited = std::collections::HashSet::new();
    check_serializable_inner(schema, &mut visited)
}

fn check_serializable_inner(
    schema: &Schema,
    visited: &mut std::collections::HashSet<usize>,
) -> Result<(), CodecError> {
    match schema {
        Schema::Unserializable(kind) => Err(CodecError::UnserializableSchema(format!(
            "schema kind {kind:?} has no wire representation"
        ))),

        Schema::Object { fields, passthrough } => {
            if *passthrough {
                return Err(CodecError::UnserializableSchema(
                    "object permits unknown keys (passthrough) and has no fixed wire shape".into(),
                ));
            }
            fields
                .iter()
                .try_for_each(|f| check_serializable_inner(&f.schema, visited))
        }

        Schema::Array(element) | Schema::Set(element) | Schema::Record(element) => {
            check_serializable_inner(element, visited)
        }

        Schema::Tuple(elements) => elements
            .iter()
            .try_for_each(|e| check_serializable_inner(e, visited)),

        Schema::Union(options) => {
            if options.len() > shapewire_wire::header::UNION_MAX_OPTIONS {
                return Err(CodecError::UnserializableSchema(format!(
                    "union declares {} options but the wire format caps unions at {}",
                    options.len(),
                    shapewire_wire::header::UNION_MAX_OPTIONS
                )));
            }
            options
                .iter()
                .try_for_each(|o| check_serializable_inner(o, visited))
        }

        Schema::DiscriminatedUnion { variants, .. } => variants
            .iter()
            .try_for_each(|v| check_serializable_inner(v, visited)),

        Schema::Map { key, value } => {
            check_serializable_inner(key, visited)?;
            check_serializable_inner(value, visited)
        }

        Schema::Intersection(a, b) => {
            if !supported_intersection(a, b) {
                return Err(CodecError::UnserializableSchema(
                    "intersection of these schema shapes is not supported".into(),
                ));
            }
            check_serializable_inner(a, visited)?;
            check_serializable_inner(b, visited)
        }

        Schema::Optional(inner)
        | Schema::Nullable(inner)
        | Schema::Readonly(inner)
        | Schema::Branded(inner, _)
        | Schema::Default(inner, _) => check_serializable_inner(inner, visited),

        #[cfg(feature = "effects")]
        Schema::Catch(inner, _) | Schema::Effect(inner, _) => check_serializable_inner(inner, visited),

        Schema::Pipeline { input, .. } => check_serializable_inner(input, visited),

        Schema::Lazy(lazy) => {
            let id = lazy.identity();
            if visited.insert(id) {
                check_serializable_inner(&lazy.get(), visited)
            } else {
                Ok(())
            }
        }

        _ => Ok(()),
    }
}

fn supported_intersection(a: &Schema, b: &Schema) -> bool {
    matches!(
        (a, b),
        (Schema::Object { .. }, Schema::Object { .. })
            | (Schema::Number, Schema::Number)
            | (Schema::Str, Schema::Str)
            | (Schema::Bool, Schema::Bool)
    )
}

fn merge_object_fields(fa: &[ObjectField], fb: &[ObjectField]) -> Vec<ObjectField> {
    let mut merged = fa.to_vec();
    for field in fb {
        if let Some(existing) = merged.iter_mut().find(|f| f.name == field.name) {
            existing.schema = field.schema.clone();
        } else {
            merged.push(field.clone());
        }
    }
    merged
}

fn literal_matches(lit: &LiteralValue, value: &Value) -> bool {
    match (lit, value) {
        (LiteralValue::Str(s), Value::Str(v)) => *s == v.as_str(),
        (LiteralValue::Int(n), Value::Int(v)) => n == v,
        (LiteralValue::Bool(b), Value::Bool(v)) => b == v,
        _ => false,
    }
}

fn literal_primitive(lit: &LiteralValue) -> Schema {
    match lit {
        LiteralValue::Str(_) => Schema::Str,
        LiteralValue::Int(_) => Schema::Number,
        LiteralValue::Bool(_) => Schema::Bool,
    }
}

fn enum_member_primitive(kind: &EnumMemberKind) -> Schema {
    match kind {
        EnumMemberKind::Str => Schema::Str,
        EnumMemberKind::Numeric => Schema::Number,
    }
}

// ------------------------------------------------------------------ encode

pub fn encode_value(
    schema: &Schema,
    value: &Value,
    writer: &mut ByteWriter,
    state: &mut EncodeState,
    depth: usize,
) -> Result<(), CodecError> {
    depth_guard(depth)?;

    match schema {
        Schema::Unserializable(kind) => Err(CodecError::UnserializableSchema(format!("{kind:?}"))),

        Schema::Number => encode_number(value, writer),
        Schema::Nan => encode_number(value, writer),
        Schema::BigInt => encode_bigint(value, writer),
        Schema::Bool => encode_bool(value, writer),
        Schema::Str => encode_str(value, writer),
        Schema::Date => encode_date(value, writer),

        Schema::Literal(lit) => {
            if !literal_matches(lit, value) {
                return Err(mismatch("matching literal"));
            }
            encode_value(&literal_primitive(lit), value, writer, state, depth + 1)
        }

        Schema::NativeEnum { member_kind, members } => {
            if !members.iter().any(|(_, lit)| literal_matches(lit, value)) {
                return Err(CodecError::ValidationFailure(
                    shapewire_schema::ValidationError::EnumValueNotAllowed(format!("{value:?}")),
                ));
            }
            encode_value(&enum_member_primitive(member_kind), value, writer, state, depth + 1)
        }

        Schema::Object { fields, .. } => encode_object(fields, value, writer, state, depth),

        Schema::Array(element) => encode_array(element, value, writer, state, depth),
        Schema::Tuple(schemas) => encode_tuple(schemas, value, writer, state, depth),
        Schema::Set(element) => encode_set(element, value, writer, state, depth),

        Schema::Union(options) => encode_union(options, value, writer, state, depth),
        Schema::DiscriminatedUnion { variants, .. } => {
            encode_union(variants, value, writer, state, depth)
        }

        Schema::Record(value_schema) => encode_record(value_schema, value, writer, state, depth),
        Schema::Map { key, value: vschema } => encode_map(key, vschema, value, writer, state, depth),

        Schema::Intersection(a, b) => encode_intersection(a, b, value, writer, state, depth),

        Schema::Optional(inner) => match value {
            Value::Undefined => {
                writer.write_u8(pack_object_header(object_subtag::UNDEFINED));
                Ok(())
            }
            other => encode_value(inner, other, writer, state, depth + 1),
        },

        Schema::Nullable(inner) => match value {
            Value::Null => {
                writer.write_u8(pack_object_header(object_subtag::NULL));
                Ok(())
            }
            other => encode_value(inner, other, writer, state, depth + 1),
        },

        Schema::Readonly(inner) | Schema::Branded(inner, _) => {
            encode_value(inner, value, writer, state, depth + 1)
        }

        Schema::Lazy(lazy) => encode_value(&lazy.get(), value, writer, state, depth + 1),

        Schema::Default(inner, factory) => match value {
            Value::Undefined => encode_value(inner, &factory.call(), writer, state, depth + 1),
            other => encode_value(inner, other, writer, state, depth + 1),
        },

        #[cfg(feature = "effects")]
        Schema::Catch(inner, factory) => {
            let resolved = shapewire_effects::resolve_catch(inner, value.clone(), factory, state);
            encode_value(inner, &resolved, writer, state, depth + 1)
        }

        Schema::Pipeline { input, .. } => encode_value(input, value, writer, state, depth + 1),

        #[cfg(feature = "effects")]
        Schema::Effect(inner, effect) => encode_effect(inner, effect, value, writer, state, depth),
    }
}

fn encode_number(value: &Value, writer: &mut ByteWriter) -> Result<(), CodecError> {
    match value {
        Value::Int(n) => {
            if exceeds_safe_integer_range(*n) {
                tracing::warn!(value = n, "integer exceeds safe-integer range");
            }
            let subtype = narrow_int_subtype(*n);
            writer.write_u8(pack_numeric_header(subtype));
            write_int_payload(writer, subtype, *n);
            Ok(())
        }
        Value::Float(f) if f.is_nan() => {
            writer.write_u8(pack_numeric_header(numeric_subtype::NAN));
            Ok(())
        }
        Value::Float(f) if *f == f64::INFINITY => {
            writer.write_u8(pack_numeric_header(numeric_subtype::POS_INF));
            Ok(())
        }
        Value::Float(f) if *f == f64::NEG_INFINITY => {
            writer.write_u8(pack_numeric_header(numeric_subtype::NEG_INF));
            Ok(())
        }
        Value::Float(f) => {
            writer.write_u8(pack_numeric_header(numeric_subtype::F64));
            writer.write_f64_le(*f);
            Ok(())
        }
        _ => Err(mismatch("number")),
    }
}

fn encode_bigint(value: &Value, writer: &mut ByteWriter) -> Result<(), CodecError> {
    let n = match value {
        Value::BigInt(n) => *n,
        Value::Int(n) => *n,
        _ => return Err(mismatch("bigint")),
    };
    writer.write_u8(pack_numeric_header(numeric_subtype::BIGINT_I64));
    write_int_payload(writer, numeric_subtype::BIGINT_I64, n);
    Ok(())
}

fn encode_bool(value: &Value, writer: &mut ByteWriter) -> Result<(), CodecError> {
    match value {
        Value::Bool(true) => {
            writer.write_u8(pack_numeric_header(numeric_subtype::TRUE));
            Ok(())
        }
        Value::Bool(false) => {
            writer.write_u8(pack_numeric_header(numeric_subtype::FALSE));
            Ok(())
        }
        _ => Err(mismatch("boolean")),
    }
}

fn encode_str(value: &Value, writer: &mut ByteWriter) -> Result<(), CodecError> {
    match value {
        Value::Str(s) if s.len() < (1 << 20) => {
            let header = pack_string_header(s.len()).map_err(out_of_range)?;
            writer.write_bytes(&header);
            writer.write_bytes(s.as_bytes());
            Ok(())
        }
        Value::Str(s) => Err(CodecError::ValidationFailure(
            shapewire_schema::ValidationError::StringTooLong(s.len()),
        )),
        _ => Err(mismatch("string")),
    }
}

fn encode_date(value: &Value, writer: &mut ByteWriter) -> Result<(), CodecError> {
    match value {
        Value::Date(ms) => {
            writer.write_u8(pack_date_header());
            writer.write_i64_le(*ms);
            Ok(())
        }
        _ => Err(mismatch("date")),
    }
}

fn encode_object(
    fields: &[ObjectField],
    value: &Value,
    writer: &mut ByteWriter,
    state: &mut EncodeState,
    depth: usize,
) -> Result<(), CodecError> {
    let given = match value {
        Value::Object(entries) => entries,
        _ => return Err(mismatch("object")),
    };

    writer.write_u8(pack_object_header(object_subtag::OBJECT));

    for field in fields {
        match given.iter().find(|(name, _)| name == &field.name) {
            Some((_, v)) => encode_value(&field.schema, v, writer, state, depth + 1)?,
            None => {
                if field.schema.is_optional() {
                    writer.write_u8(shapewire_wire::header::ABSENT_OPTIONAL_MARKER);
                } else if let Some((inner, factory)) = field.schema.as_default() {
                    encode_value(inner, &factory.call(), writer, state, depth + 1)?;
                } else {
                    return Err(CodecError::ValidationFailure(
                        shapewire_schema::ValidationError::MissingField(field.name.clone()),
                    ));
                }
            }
        }
    }
    Ok(())
}

fn as_array<'a>(value: &'a Value, expected: &'static str) -> Result<&'a [Value], CodecError> {
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(mismatch(expected)),
    }
}

fn encode_array(
    element: &Schema,
    value: &Value,
    writer: &mut ByteWriter,
    state: &mut EncodeState,
    depth: usize,
) -> Result<(), CodecError> {
    let items = as_array(value, "array")?;
    let header = pack_array_header(items.len()).map_err(out_of_range)?;
    writer.write_bytes(&header);
    for item in items {
        encode_value(element, item, writer, state, depth + 1)?;
    }
    Ok(())
}

fn encode_tuple(
    schemas: &[Schema],
    value: &Value,
    writer: &mut ByteWriter,
    state: &mut EncodeState,
    depth: usize,
) -> Result<(), CodecError> {
    let items = as_array(value, "tuple")?;
    if items.len() != schemas.len() {
        return Err(CodecError::ValidationFailure(
            shapewire_schema::ValidationError::TupleLengthMismatch {
                expected: schemas.len(),
                found: items.len(),
            },
        ));
    }
    let header = pack_array_header(items.len()).map_err(out_of_range)?;
    writer.write_bytes(&header);
    for (s, item) in schemas.iter().zip(items) {
        encode_value(s, item, writer, state, depth + 1)?;
    }
    Ok(())
}

fn encode_set(
    element: &Schema,
    value: &Value,
    writer: &mut ByteWriter,
    state: &mut EncodeState,
    depth: usize,
) -> Result<(), CodecError> {
    let items = match value {
        Value::Set(items) => items,
        _ => return Err(mismatch("set")),
    };
    let header = pack_array_header(items.len()).map_err(out_of_range)?;
    writer.write_bytes(&header);
    for item in items {
        encode_value(element, item, writer, state, depth + 1)?;
    }
    Ok(())
}

fn encode_union(
    options: &[Schema],
    value: &Value,
    writer: &mut ByteWriter,
    state: &mut EncodeState,
    depth: usize,
) -> Result<(), CodecError> {
    for (i, option) in options.iter().enumerate() {
        if shapewire_schema::validate::validate(option, value.clone()).is_ok() {
            let header = pack_union_header(i as u8).map_err(out_of_range)?;
            writer.write_u8(header);
            return encode_value(option, value, writer, state, depth + 1);
        }
    }
    Err(CodecError::ValidationFailure(
        shapewire_schema::ValidationError::NoUnionVariantMatched,
    ))
}

fn encode_record(
    value_schema: &Schema,
    value: &Value,
    writer: &mut ByteWriter,
    state: &mut EncodeState,
    depth: usize,
) -> Result<(), CodecError> {
    let pairs = match value {
        Value::Record(pairs) => pairs,
        _ => return Err(mismatch("record")),
    };
    let header = pack_map_header(false, pairs.len()).map_err(out_of_range)?;
    writer.write_bytes(&header);
    for (k, v) in pairs {
        encode_value(&Schema::Str, &Value::Str(k.clone()), writer, state, depth + 1)?;
        encode_value(value_schema, v, writer, state, depth + 1)?;
    }
    Ok(())
}

fn encode_map(
    key_schema: &Schema,
    value_schema: &Schema,
    value: &Value,
    writer: &mut ByteWriter,
    state: &mut EncodeState,
    depth: usize,
) -> Result<(), CodecError> {
    let pairs = match value {
        Value::Map(pairs) => pairs,
        _ => return Err(mismatch("map")),
    };
    let header = pack_map_header(true, pairs.len()).map_err(out_of_range)?;
    writer.write_bytes(&header);
    for (k, v) in pairs {
        encode_value(key_schema, k, writer, state, depth + 1)?;
        encode_value(value_schema, v, writer, state, depth + 1)?;
    }
    Ok(())
}

fn encode_intersection(
    a: &Schema,
    b: &Schema,
    value: &Value,
    writer: &mut ByteWriter,
    state: &mut EncodeState,
    depth: usize,
) -> Result<(), CodecError> {
    match (a, b) {
        (
            Schema::Object { fields: fa, passthrough: pa },
            Schema::Object { fields: fb, passthrough: pb },
        ) => {
            let merged = Schema::Object {
                fields: merge_object_fields(fa, fb),
                passthrough: *pa || *pb,
            };
            encode_value(&merged, value, writer, state, depth + 1)
        }
        (Schema::Number, Schema::Number) | (Schema::Str, Schema::Str) | (Schema::Bool, Schema::Bool) => {
            encode_value(a, value, writer, state, depth + 1)
        }
        _ => Err(CodecError::UnserializableSchema(
            "unsupported intersection shape".into(),
        )),
    }
}

#[cfg(feature = "effects")]
fn encode_effect(
    inner: &Schema,
    effect: &shapewire_schema::EffectKind,
    value: &Value,
    writer: &mut ByteWriter,
    state: &mut EncodeState,
    depth: usize,
) -> Result<(), CodecError> {
    use shapewire_schema::EffectKind;
    match effect {
        EffectKind::Refine(predicate) => {
            if !predicate(value) {
                return Err(CodecError::ValidationFailure(
                    shapewire_schema::ValidationError::RefinementFailed,
                ));
            }
            encode_value(inner, value, writer, state, depth + 1)
        }
        EffectKind::Preprocess(f) => {
            let preprocessed = f(value.clone());
            encode_value(inner, &preprocessed, writer, state, depth + 1)
        }
        EffectKind::Transform(_) => {
            shapewire_effects::resolve_effect_for_encode(effect, value.clone(), state)?;
            encode_value(inner, value, writer, state, depth + 1)
        }
    }
}

// ------------------------------------------------------------------ decode

pub fn decode_value(schema: &Schema, reader: &mut ByteReader, depth: usize) -> Result<Value, CodecError> {
    depth_guard(depth)?;

    match schema {
        Schema::Unserializable(kind) => Err(CodecError::UnserializableSchema(format!("{kind:?}"))),

        Schema::Number => decode_number(reader),
        Schema::Nan => decode_number(reader),
        Schema::BigInt => decode_bigint(reader),
        Schema::Bool => decode_bool(reader),
        Schema::Str => decode_str(reader),
        Schema::Date => decode_date(reader),

        Schema::Literal(lit) => decode_value(&literal_primitive(lit), reader, depth + 1),
        Schema::NativeEnum { member_kind, .. } => {
            decode_value(&enum_member_primitive(member_kind), reader, depth + 1)
        }

        Schema::Object { fields, .. } => decode_object(fields, reader, depth),

        Schema::Array(element) => decode_array(element, reader, depth),
        Schema::Tuple(schemas) => decode_tuple(schemas, reader, depth),
        Schema::Set(element) => decode_set(element, reader, depth),

        Schema::Union(options) => decode_union(options, reader, depth),
        Schema::DiscriminatedUnion { variants, .. } => decode_union(variants, reader, depth),

        Schema::Record(value_schema) => decode_record(value_schema, reader, depth),
        Schema::Map { key, value } => decode_map(key, value, reader, depth),

        Schema::Intersection(a, b) => decode_intersection(a, b, reader, depth),

        Schema::Optional(inner) => {
            let header0 = reader.peek_u8().map_err(malformed)?;
            if tag_of(header0) == TAG_OBJECT && unpack_object_subtag(header0) == object_subtag::UNDEFINED {
                reader.read_u8().map_err(malformed)?;
                Ok(Value::Undefined)
            } else {
                decode_value(inner, reader, depth + 1)
            }
        }

        Schema::Nullable(inner) => {
            let header0 = reader.peek_u8().map_err(malformed)?;
            if tag_of(header0) == TAG_OBJECT && unpack_object_subtag(header0) == object_subtag::NULL {
                reader.read_u8().map_err(malformed)?;
                Ok(Value::Null)
            } else {
                decode_value(inner, reader, depth + 1)
            }
        }

        Schema::Readonly(inner) | Schema::Branded(inner, _) => decode_value(inner, reader, depth + 1),

        Schema::Lazy(lazy) => decode_value(&lazy.get(), reader, depth + 1),

        Schema::Default(inner, _) => decode_value(inner, reader, depth + 1),
        #[cfg(feature = "effects")]
        Schema::Catch(inner, _) => decode_value(inner, reader, depth + 1),
        Schema::Pipeline { input, .. } => decode_value(input, reader, depth + 1),
        #[cfg(feature = "effects")]
        Schema::Effect(inner, _) => decode_value(inner, reader, depth + 1),
    }
}

fn decode_number(reader: &mut ByteReader) -> Result<Value, CodecError> {
    let header0 = reader.read_u8().map_err(malformed)?;
    if tag_of(header0) != TAG_NUMERIC {
        return Err(CodecError::MalformedInput("expected a numeric header".into()));
    }
    match unpack_numeric_subtype(header0) {
        numeric_subtype::F64 => Ok(Value::Float(reader.read_f64_le().map_err(malformed)?)),
        numeric_subtype::NAN => Ok(Value::Float(f64::NAN)),
        numeric_subtype::POS_INF => Ok(Value::Float(f64::INFINITY)),
        numeric_subtype::NEG_INF => Ok(Value::Float(f64::NEG_INFINITY)),
        numeric_subtype::TRUE => Ok(Value::Bool(true)),
        numeric_subtype::FALSE => Ok(Value::Bool(false)),
        subtype => Ok(Value::Int(read_int_payload(reader, subtype).map_err(malformed)?)),
    }
}

fn decode_bigint(reader: &mut ByteReader) -> Result<Value, CodecError> {
    let header0 = reader.read_u8().map_err(malformed)?;
    if tag_of(header0) != TAG_NUMERIC {
        return Err(CodecError::MalformedInput("expected a numeric header".into()));
    }
    let n = read_int_payload(reader, unpack_numeric_subtype(header0)).map_err(malformed)?;
    Ok(Value::BigInt(n))
}

fn decode_bool(reader: &mut ByteReader) -> Result<Value, CodecError> {
    let header0 = reader.read_u8().map_err(malformed)?;
    if tag_of(header0) != TAG_NUMERIC {
        return Err(CodecError::MalformedInput("expected a numeric header".into()));
    }
    match unpack_numeric_subtype(header0) {
        numeric_subtype::TRUE => Ok(Value::Bool(true)),
        numeric_subtype::FALSE => Ok(Value::Bool(false)),
        other => Err(malformed(shapewire_wire::WireError::UnknownNumericSubtype(other))),
    }
}

fn decode_str(reader: &mut ByteReader) -> Result<Value, CodecError> {
    let header0 = reader.read_u8().map_err(malformed)?;
    if tag_of(header0) != TAG_STRING {
        return Err(CodecError::MalformedInput("expected a string header".into()));
    }
    let len = read_string_len(reader, header0).map_err(malformed)?;
    let bytes = reader.read_slice(len).map_err(malformed)?;
    let s = std::str::from_utf8(bytes)
        .map_err(|_| malformed(shapewire_wire::WireError::InvalidUtf8))?
        .to_string();
    Ok(Value::Str(s))
}

fn decode_date(reader: &mut ByteReader) -> Result<Value, CodecError> {
    let header0 = reader.read_u8().map_err(malformed)?;
    if tag_of(header0) != shapewire_wire::header::TAG_DATE {
        return Err(CodecError::MalformedInput("expected a date header".into()));
    }
    Ok(Value::Date(reader.read_i64_le().map_err(malformed)?))
}

fn decode_object(fields: &[ObjectField], reader: &mut ByteReader, depth: usize) -> Result<Value, CodecError> {
    let header0 = reader.read_u8().map_err(malformed)?;
    if tag_of(header0) != TAG_OBJECT || unpack_object_subtag(header0) != object_subtag::OBJECT {
        return Err(CodecError::MalformedInput("expected an object header".into()));
    }

    let mut out = Vec::with_capacity(fields.len());
    for field in fields {
        if field.schema.is_optional() {
            let header0 = reader.peek_u8().map_err(malformed)?;
            if tag_of(header0) == TAG_OBJECT && unpack_object_subtag(header0) == object_subtag::ABSENT {
                reader.read_u8().map_err(malformed)?;
                continue;
            }
        }
        let v = decode_value(&field.schema, reader, depth + 1)?;
        out.push((field.name.clone(), v));
    }
    Ok(Value::Object(out))
}

fn decode_array(element: &Schema, reader: &mut ByteReader, depth: usize) -> Result<Value, CodecError> {
    let header0 = reader.read_u8().map_err(malformed)?;
    let len = read_array_len(reader, header0).map_err(malformed)?;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        out.push(decode_value(element, reader, depth + 1)?);
    }
    Ok(Value::Array(out))
}

fn decode_tuple(schemas: &[Schema], reader: &mut ByteReader, depth: usize) -> Result<Value, CodecError> {
    let header0 = reader.read_u8().map_err(malformed)?;
    let len = read_array_len(reader, header0).map_err(malformed)?;
    if len != schemas.len() {
        return Err(CodecError::ValidationFailure(
            shapewire_schema::ValidationError::TupleLengthMismatch {
                expected: schemas.len(),
                found: len,
            },
        ));
    }
    let mut out = Vec::with_capacity(len);
    for s in schemas {
        out.push(decode_value(s, reader, depth + 1)?);
    }
    Ok(Value::Array(out))
}

fn decode_set(element: &Schema, reader: &mut ByteReader, depth: usize) -> Result<Value, CodecError> {
    let header0 = reader.read_u8().map_err(malformed)?;
    let len = read_array_len(reader, header0).map_err(malformed)?;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        out.push(decode_value(element, reader, depth + 1)?);
    }
    Ok(Value::Set(out))
}

fn decode_union(options: &[Schema], reader: &mut ByteReader, depth: usize) -> Result<Value, CodecError> {
    let header0 = reader.read_u8().map_err(malformed)?;
    if tag_of(header0) != TAG_UNION {
        return Err(CodecError::MalformedInput("expected a union header".into()));
    }
    let idx = unpack_union_index(header0) as usize;
    let option = options
        .get(idx)
        .ok_or_else(|| CodecError::MalformedInput(format!("union option index {idx} out of range")))?;
    decode_value(option, reader, depth + 1)
}

fn decode_record(value_schema: &Schema, reader: &mut ByteReader, depth: usize) -> Result<Value, CodecError> {
    let header0 = reader.read_u8().map_err(malformed)?;
    if tag_of(header0) != TAG_MAP || unpack_map_is_map(header0) {
        return Err(CodecError::MalformedInput("expected a record header".into()));
    }
    let len = read_map_len(reader, header0).map_err(malformed)?;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        let key = match decode_value(&Schema::Str, reader, depth + 1)? {
            Value::Str(s) => s,
            _ => unreachable!("Schema::Str always decodes to Value::Str"),
        };
        let v = decode_value(value_schema, reader, depth + 1)?;
        out.push((key, v));
    }
    Ok(Value::Record(out))
}

fn decode_map(
    key_schema: &Schema,
    value_schema: &Schema,
    reader: &mut ByteReader,
    depth: usize,
) -> Result<Value, CodecError> {
    let header0 = reader.read_u8().map_err(malformed)?;
    if tag_of(header0) != TAG_MAP || !unpack_map_is_map(header0) {
        return Err(CodecError::MalformedInput("expected a map header".into()));
    }
    let len = read_map_len(reader, header0).map_err(malformed)?;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        let k = decode_value(key_schema, reader, depth + 1)?;
        let v = decode_value(value_schema, reader, depth + 1)?;
        out.push((k, v));
    }
    Ok(Value::Map(out))
}

fn decode_intersection(a: &Schema, b: &Schema, reader: &mut ByteReader, depth: usize) -> Result<Value, CodecError> {
    match (a, b) {
        (
            Schema::Object { fields: fa, passthrough: pa },
            Schema::Object { fields: fb, passthrough: pb },
        ) => {
            let merged = Schema::Object {
                fields: merge_object_fields(fa, fb),
                passthrough: *pa || *pb,
            };
            decode_value(&merged, reader, depth + 1)
        }
        (Schema::Number, Schema::Number) | (Schema::Str, Schema::Str) | (Schema::Bool, Schema::Bool) => {
            decode_value(a, reader, depth + 1)
        }
        _ => Err(CodecError::UnserializableSchema(
            "unsupported intersection shape".into(),
        )),
    }
}
