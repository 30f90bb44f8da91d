use shapewire::{decode, encode, CodecError};
use shapewire_schema::{EnumMemberKind, Lazy, ObjectField, Schema, Value};

fn roundtrip(schema: &Schema, value: Value) -> Value {
    let bytes = encode(schema, &value).expect("encode");
    decode(schema, &bytes).expect("decode")
}

#[test]
fn primitives_roundtrip() {
    assert_eq!(roundtrip(&Schema::Number, Value::Int(-42)), Value::Int(-42));
    assert_eq!(
        roundtrip(&Schema::Number, Value::Float(3.5)),
        Value::Float(3.5)
    );
    assert_eq!(
        roundtrip(&Schema::Nan, Value::Float(f64::NAN)),
        Value::Float(f64::NAN)
    );
    assert_eq!(
        roundtrip(&Schema::BigInt, Value::BigInt(9_000_000_000)),
        Value::BigInt(9_000_000_000)
    );
    assert_eq!(roundtrip(&Schema::Bool, Value::Bool(true)), Value::Bool(true));
    assert_eq!(
        roundtrip(&Schema::Str, Value::Str("hi".into())),
        Value::Str("hi".into())
    );
    assert_eq!(roundtrip(&Schema::Date, Value::Date(1_700_000_000_000)), Value::Date(1_700_000_000_000));
}

#[test]
fn object_with_optional_fields_distinguishes_absent_from_explicit_undefined() {
    let schema = Schema::object(vec![
        ObjectField::new("id", Schema::Number),
        ObjectField::new("nickname", Schema::optional(Schema::Str)),
    ])
    .unwrap();

    let absent = Value::Object(vec![("id".into(), Value::Int(1))]);
    assert_eq!(roundtrip(&schema, absent.clone()), absent);

    let explicit_undefined = Value::Object(vec![
        ("id".into(), Value::Int(1)),
        ("nickname".into(), Value::Undefined),
    ]);
    assert_eq!(
        roundtrip(&schema, explicit_undefined.clone()),
        explicit_undefined
    );

    let present = Value::Object(vec![
        ("id".into(), Value::Int(1)),
        ("nickname".into(), Value::Str("ada".into())),
    ]);
    assert_eq!(roundtrip(&schema, present.clone()), present);
}

#[test]
fn missing_required_field_fails_to_encode() {
    let schema = Schema::object(vec![ObjectField::new("id", Schema::Number)]).unwrap();
    let err = encode(&schema, &Value::Object(vec![])).unwrap_err();
    assert!(matches!(err, CodecError::ValidationFailure(_)));
}

#[test]
fn default_field_is_filled_in_when_absent() {
    let schema = Schema::object(vec![ObjectField::new(
        "retries",
        Schema::default_with(Schema::Number, || Value::Int(3)),
    )])
    .unwrap();

    let decoded = roundtrip(&schema, Value::Object(vec![]));
    assert_eq!(decoded, Value::Object(vec![("retries".into(), Value::Int(3))]));
}

#[test]
#[cfg(feature = "effects")]
fn catch_substitutes_fallback_when_inner_schema_rejects_value() {
    let schema = Schema::catch_with(Schema::Number, || Value::Int(-1));
    let decoded = roundtrip(&schema, Value::Str("not a number".into()));
    assert_eq!(decoded, Value::Int(-1));
}

#[test]
fn array_and_tuple_and_set_roundtrip() {
    let array_schema = Schema::array(Schema::Number);
    let value = Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    assert_eq!(roundtrip(&array_schema, value.clone()), value);

    let tuple_schema = Schema::Tuple(vec![Schema::Number, Schema::Str]);
    let value = Value::Array(vec![Value::Int(1), Value::Str("x".into())]);
    assert_eq!(roundtrip(&tuple_schema, value.clone()), value);

    let set_schema = Schema::set(Schema::Number);
    let value = Value::Set(vec![Value::Int(1), Value::Int(2), Value::Int(1)]);
    assert_eq!(roundtrip(&set_schema, value), Value::Set(vec![Value::Int(1), Value::Int(2)]));
}

#[test]
fn union_picks_first_matching_option_deterministically() {
    let schema = Schema::union(vec![Schema::Number, Schema::Str]).unwrap();
    assert_eq!(roundtrip(&schema, Value::Int(1)), Value::Int(1));
    assert_eq!(roundtrip(&schema, Value::Str("x".into())), Value::Str("x".into()));
}

#[test]
fn discriminated_union_roundtrips_each_variant() {
    let circle = Schema::object(vec![
        ObjectField::new("kind", Schema::Literal(shapewire_schema::LiteralValue::Str("circle"))),
        ObjectField::new("radius", Schema::Number),
    ])
    .unwrap();
    let square = Schema::object(vec![
        ObjectField::new("kind", Schema::Literal(shapewire_schema::LiteralValue::Str("square"))),
        ObjectField::new("side", Schema::Number),
    ])
    .unwrap();
    let schema = Schema::discriminated_union("kind", vec![circle, square]).unwrap();

    let circle_value = Value::Object(vec![
        ("kind".into(), Value::Str("circle".into())),
        ("radius".into(), Value::Int(5)),
    ]);
    assert_eq!(roundtrip(&schema, circle_value.clone()), circle_value);

    let square_value = Value::Object(vec![
        ("kind".into(), Value::Str("square".into())),
        ("side".into(), Value::Int(2)),
    ]);
    assert_eq!(roundtrip(&schema, square_value.clone()), square_value);
}

#[test]
fn record_and_map_roundtrip() {
    let record_schema = Schema::record(Schema::Number);
    let value = Value::Record(vec![("a".into(), Value::Int(1)), ("b".into(), Value::Int(2))]);
    assert_eq!(roundtrip(&record_schema, value.clone()), value);

    let map_schema = Schema::map(Schema::Str, Schema::Bool);
    let value = Value::Map(vec![(Value::Str("k".into()), Value::Bool(true))]);
    assert_eq!(roundtrip(&map_schema, value.clone()), value);
}

#[test]
fn native_enum_roundtrips_string_and_numeric_members() {
    let str_enum = Schema::NativeEnum {
        member_kind: EnumMemberKind::Str,
        members: vec![
            ("Red".into(), shapewire_schema::LiteralValue::Str("red")),
            ("Blue".into(), shapewire_schema::LiteralValue::Str("blue")),
        ],
    };
    assert_eq!(roundtrip(&str_enum, Value::Str("red".into())), Value::Str("red".into()));

    let numeric_enum = Schema::NativeEnum {
        member_kind: EnumMemberKind::Numeric,
        members: vec![("Low".into(), shapewire_schema::LiteralValue::Int(0))],
    };
    assert_eq!(roundtrip(&numeric_enum, Value::Int(0)), Value::Int(0));
}

#[test]
fn recursive_schema_roundtrips_a_finite_chain() {
    let lazy = Lazy::new();
    let node = Schema::object(vec![
        ObjectField::new("value", Schema::Number),
        ObjectField::new("next", Schema::optional(Schema::Lazy(lazy.clone()))),
    ])
    .unwrap();
    lazy.set(node.clone());

    let chain = Value::Object(vec![
        ("value".into(), Value::Int(1)),
        (
            "next".into(),
            Value::Object(vec![("value".into(), Value::Int(2))]),
        ),
    ]);
    assert_eq!(roundtrip(&node, chain.clone()), chain);
}

#[test]
fn decode_rejects_bytes_encoded_under_a_different_schema() {
    let a = Schema::Number;
    let b = Schema::object(vec![ObjectField::new("x", Schema::Number)]).unwrap();

    let bytes = encode(&a, &Value::Int(1)).unwrap();
    let err = decode(&b, &bytes).unwrap_err();
    assert!(matches!(err, CodecError::SchemaMismatch { .. }));
}

#[test]
fn decode_rejects_truncated_input() {
    let schema = Schema::object(vec![ObjectField::new("x", Schema::Number)]).unwrap();
    let bytes = encode(&schema, &Value::Object(vec![("x".into(), Value::Int(1))])).unwrap();
    let truncated = &bytes[..bytes.len() - 1];
    assert!(matches!(
        decode(&schema, truncated),
        Err(CodecError::MalformedInput(_))
    ));
}

#[test]
fn unserializable_schema_is_rejected_before_any_bytes_are_written() {
    let schema = Schema::Unserializable(shapewire_schema::UnserializableKind::Any);
    let err = encode(&schema, &Value::Int(1)).unwrap_err();
    assert!(matches!(err, CodecError::UnserializableSchema(_)));
}

#[test]
fn passthrough_object_is_rejected() {
    let schema = Schema::object_passthrough(vec![ObjectField::new("x", Schema::Number)]).unwrap();
    let err = encode(&schema, &Value::Object(vec![("x".into(), Value::Int(1))])).unwrap_err();
    assert!(matches!(err, CodecError::UnserializableSchema(_)));
}

#[test]
fn readonly_and_branded_roundtrip_like_their_inner_schema() {
    let schema = Schema::readonly(Schema::branded(Schema::Number, "UserId"));
    assert_eq!(roundtrip(&schema, Value::Int(7)), Value::Int(7));
}

#[test]
#[cfg(feature = "effects")]
fn refine_accepts_a_value_passing_the_predicate() {
    let schema = Schema::refine(Schema::Number, |v| matches!(v, Value::Int(n) if *n >= 0));
    assert_eq!(roundtrip(&schema, Value::Int(3)), Value::Int(3));
}

#[test]
#[cfg(feature = "effects")]
fn refine_rejects_a_value_failing_the_predicate_at_encode_time() {
    let schema = Schema::refine(Schema::Number, |v| matches!(v, Value::Int(n) if *n >= 0));
    let err = encode(&schema, &Value::Int(-1)).unwrap_err();
    assert!(matches!(err, CodecError::ValidationFailure(_)));
}

#[test]
#[cfg(feature = "effects")]
fn preprocess_runs_before_the_base_schema_encodes() {
    let schema = Schema::preprocess(Schema::Str, |v| match v {
        Value::Str(s) => Value::Str(s.trim().to_string()),
        other => other,
    });
    assert_eq!(
        roundtrip(&schema, Value::Str("  padded  ".into())),
        Value::Str("padded".into())
    );
}

#[test]
#[cfg(feature = "effects")]
fn transform_applies_on_decode_but_not_on_the_wire() {
    let schema = Schema::transform(Schema::Number, |v| match v {
        Value::Int(n) => Value::Int(n * 2),
        other => other,
    });
    let bytes = encode(&schema, &Value::Int(5)).unwrap();
    // The wire carries the pre-transform value (§4.5): decoding the raw
    // inner schema sees 5, not 10.
    assert_eq!(decode(&Schema::Number, &bytes).unwrap(), Value::Int(5));
    assert_eq!(decode(&schema, &bytes).unwrap(), Value::Int(10));
}

#[test]
#[cfg(feature = "effects")]
fn transform_nested_inside_a_union_option_roundtrips_the_original_value() {
    let schema = Schema::union(vec![
        Schema::transform(Schema::Number, |v| match v {
            Value::Int(n) => Value::Int(n * 2),
            other => other,
        }),
        Schema::Str,
    ])
    .unwrap();

    let decoded = roundtrip(&schema, Value::Int(5));
    assert_eq!(decoded, Value::Int(10));
    assert_eq!(roundtrip(&schema, Value::Str("x".into())), Value::Str("x".into()));
}
