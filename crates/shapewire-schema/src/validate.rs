//! The minimal built-in "safe-parse" capability §6 asks the schema
//! collaborator for. Used both by the `shapewire` crate's encode entry
//! point (validate the caller's value before anything is written) and by
//! its decode exit point (re-validate the reconstructed value, which is
//! also where defaults and transforms get applied, per §6.1).
//!
//! Decorator unwrapping lives here rather than only in the wire
//! dispatcher: the wire dispatcher decides what *bytes* a decorator
//! implies (§4.4 step 5), while this module decides what *value* a
//! decorator implies, and the two agree by construction but are not the
//! same question.

use crate::error::ValidationError;
#[cfg(feature = "effects")]
use crate::schema::EffectKind;
use crate::schema::{LiteralValue, Schema};
use crate::value::Value;

fn mismatch(expected: &'static str) -> ValidationError {
    ValidationError::TypeMismatch { expected }
}

fn literal_matches(lit: &LiteralValue, value: &Value) -> bool {
    match (lit, value) {
        (LiteralValue::Str(s), Value::Str(v)) => *s == v.as_str(),
        (LiteralValue::Int(n), Value::Int(v)) => n == v,
        (LiteralValue::Bool(b), Value::Bool(v)) => b == v,
        _ => false,
    }
}

/// Validates `value` against `schema`, returning the value the caller
/// should treat as canonical: unchanged for plain data, with defaults
/// filled in for absent optional fields with a `Default` decorator, with
/// `catch` fallbacks substituted where the inner schema rejected the
/// value, and with `transform` effects applied last.
pub fn validate(schema: &Schema, value: Value) -> Result<Value, ValidationError> {
    match schema {
        Schema::Unserializable(_) => Err(mismatch("a serializable schema")),

        Schema::Number => match value {
            Value::Int(_) | Value::Float(_) => Ok(value),
            _ => Err(mismatch("number")),
        },

        Schema::BigInt => match value {
            Value::BigInt(_) => Ok(value),
            Value::Int(n) => Ok(Value::BigInt(n)),
            _ => Err(mismatch("bigint")),
        },

        Schema::Bool => match value {
            Value::Bool(_) => Ok(value),
            _ => Err(mismatch("boolean")),
        },

        Schema::Str => match &value {
            Value::Str(s) if s.len() < (1 << 20) => Ok(value),
            Value::Str(s) => Err(ValidationError::StringTooLong(s.len())),
            _ => Err(mismatch("string")),
        },

        Schema::Date => match value {
            Value::Date(_) => Ok(value),
            _ => Err(mismatch("date")),
        },

        Schema::Nan => match value {
            Value::Float(f) if f.is_nan() => Ok(value),
            _ => Err(mismatch("NaN")),
        },

        Schema::Literal(lit) => {
            if literal_matches(lit, &value) {
                Ok(value)
            } else {
                Err(mismatch("matching literal"))
            }
        }

        Schema::NativeEnum { members, .. } => {
            let matched = members.iter().any(|(_, lit)| literal_matches(lit, &value));
            if matched {
                Ok(value)
            } else {
                Err(ValidationError::EnumValueNotAllowed(format!("{value:?}")))
            }
        }

        Schema::Object { fields, .. } => match value {
            Value::Object(given) => {
                let mut out = Vec::with_capacity(fields.len());
                for field in fields {
                    let found = given.iter().find(|(name, _)| name == &field.name);
                    match found {
                        Some((_, v)) => {
                            let validated = validate(&field.schema, v.clone())?;
                            out.push((field.name.clone(), validated));
                        }
                        None => {
                            if field.schema.is_optional() {
                            } else if let Some((inner, factory)) = field.schema.as_default() {
                                let validated = validate(inner, factory.call())?;
                                out.push((field.name.clone(), validated));
                            } else {
                                return Err(ValidationError::MissingField(field.name.clone()));
                            }
                        }
                    }
                }
                Ok(Value::Object(out))
            }
            _ => Err(mismatch("object")),
        },

        Schema::Array(element) => match value {
            Value::Array(items) => {
                let validated: Result<Vec<_>, _> =
                    items.into_iter().map(|v| validate(element, v)).collect();
                Ok(Value::Array(validated?))
            }
            _ => Err(mismatch("array")),
        },

        Schema::Tuple(schemas) => match value {
            Value::Array(items) => {
                if items.len() != schemas.len() {
                    return Err(ValidationError::TupleLengthMismatch {
                        expected: schemas.len(),
                        found: items.len(),
                    });
                }
                let validated: Result<Vec<_>, _> = schemas
                    .iter()
                    .zip(items)
                    .map(|(s, v)| validate(s, v))
                    .collect();
                Ok(Value::Array(validated?))
            }
            _ => Err(mismatch("tuple")),
        },

        Schema::Set(element) => match value {
            Value::Set(items) => {
                let validated: Result<Vec<_>, _> =
                    items.into_iter().map(|v| validate(element, v)).collect();
                Ok(Value::Set(validated?))
            }
            _ => Err(mismatch("set")),
        },

        Schema::Union(options) => {
            for option in options {
                if let Ok(v) = validate(option, value.clone()) {
                    return Ok(v);
                }
            }
            Err(ValidationError::NoUnionVariantMatched)
        }

        Schema::DiscriminatedUnion {
            discriminant,
            variants,
        } => {
            let tag = match &value {
                Value::Object(fields) => {
                    fields.iter().find(|(name, _)| name == discriminant).map(|(_, v)| v.clone())
                }
                _ => None,
            };
            for variant in variants {
                if let Schema::Object { fields, .. } = variant {
                    let variant_tag = fields
                        .iter()
                        .find(|f| &f.name == discriminant)
                        .and_then(|f| match &f.schema {
                            Schema::Literal(lit) => Some(lit.clone()),
                            _ => None,
                        });
                    if let (Some(tag), Some(variant_tag)) = (&tag, &variant_tag) {
                        if literal_matches(variant_tag, tag) {
                            return validate(variant, value);
                        }
                    }
                }
            }
            Err(ValidationError::DiscriminantNotMatched {
                field: discriminant.clone(),
            })
        }

        Schema::Record(value_schema) => match value {
            Value::Record(pairs) => {
                let validated: Result<Vec<_>, _> = pairs
                    .into_iter()
                    .map(|(k, v)| validate(value_schema, v).map(|v| (k, v)))
                    .collect();
                Ok(Value::Record(validated?))
            }
            _ => Err(mismatch("record")),
        },

        Schema::Map { key, value: vschema } => match value {
            Value::Map(pairs) => {
                let validated: Result<Vec<_>, _> = pairs
                    .into_iter()
                    .map(|(k, v)| {
                        let k = validate(key, k)?;
                        let v = validate(vschema, v)?;
                        Ok((k, v))
                    })
                    .collect();
                Ok(Value::Map(validated?))
            }
            _ => Err(mismatch("map")),
        },

        Schema::Intersection(a, b) => validate_intersection(a, b, value),

        Schema::Optional(inner) => match value {
            Value::Undefined => Ok(Value::Undefined),
            other => validate(inner, other),
        },

        Schema::Nullable(inner) => match value {
            Value::Null => Ok(Value::Null),
            other => validate(inner, other),
        },

        Schema::Readonly(inner) | Schema::Branded(inner, _) => validate(inner, value),

        Schema::Lazy(lazy) => validate(&lazy.get(), value),

        Schema::Default(inner, factory) => match value {
            Value::Undefined => validate(inner, factory.call()),
            other => validate(inner, other),
        },

        #[cfg(feature = "effects")]
        Schema::Catch(inner, factory) => match validate(inner, value.clone()) {
            Ok(v) => Ok(v),
            Err(_) => validate(inner, factory.call()),
        },

        // The input side is the structurally-known half of a pipeline; the
        // output side is left to the caller's own follow-up validation
        // since this codec has no generic input->output value mapper to
        // invoke on its behalf (see DESIGN.md).
        Schema::Pipeline { input, .. } => validate(input, value),

        #[cfg(feature = "effects")]
        Schema::Effect(inner, effect) => match effect {
            EffectKind::Refine(predicate) => {
                let v = validate(inner, value)?;
                if predicate(&v) {
                    Ok(v)
                } else {
                    Err(ValidationError::RefinementFailed)
                }
            }
            EffectKind::Preprocess(f) => {
                let preprocessed = f(value);
                validate(inner, preprocessed)
            }
            EffectKind::Transform(f) => {
                let v = validate(inner, value)?;
                Ok(f(v))
            }
        },
    }
}

fn validate_intersection(a: &Schema, b: &Schema, value: Value) -> Result<Value, ValidationError> {
    match (a, b) {
        (
            Schema::Object {
                fields: fa,
                passthrough: pa,
            },
            Schema::Object {
                fields: fb,
                passthrough: pb,
            },
        ) => {
            let mut merged = fa.clone();
            for field in fb {
                if let Some(existing) = merged.iter_mut().find(|f| f.name == field.name) {
                    existing.schema = field.schema.clone();
                } else {
                    merged.push(field.clone());
                }
            }
            validate(
                &Schema::Object {
                    fields: merged,
                    passthrough: *pa || *pb,
                },
                value,
            )
        }
        (Schema::Number, Schema::Number)
        | (Schema::Str, Schema::Str)
        | (Schema::Bool, Schema::Bool) => validate(a, value),
        _ => Err(mismatch("a supported intersection shape")),
    }
}
