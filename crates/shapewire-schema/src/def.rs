//! JSON-deserializable schema description, compiled into [`Schema`] via
//! `TryFrom`. Mirrors `bitcraft::serde`'s `SchemaDef` -> `bitcraft::compiled`
//! split: describe the shape in data, then compile it into the runtime type
//! that actually drives the codec.
//!
//! Decorators backed by an arbitrary Rust closure (`default`'s factory,
//! `catch`'s replacement, `refine`/`preprocess`/`transform`, and `lazy`)
//! have no JSON representation beyond a constant fallback value, since JSON
//! cannot carry a closure. `SchemaDef::Default`/`SchemaDef::Catch` describe
//! only a constant; a computed default or any effect has to be composed in
//! Rust against [`Schema`]'s own builder methods.

use serde::{Deserialize, Serialize};

use crate::error::SchemaBuildError;
use crate::schema::{EnumMemberKind, LiteralValue, ObjectField, Schema};
use crate::value::Value;

/// A JSON literal, used both for `literal`/`native_enum` schemas and for the
/// constant fallback of `default`/`catch`.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(untagged)]
pub enum ValueDef {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<&ValueDef> for Value {
    fn from(def: &ValueDef) -> Value {
        match def {
            ValueDef::Null => Value::Null,
            ValueDef::Bool(b) => Value::Bool(*b),
            ValueDef::Int(n) => Value::Int(*n),
            ValueDef::Float(f) => Value::Float(*f),
            ValueDef::Str(s) => Value::Str(s.clone()),
        }
    }
}

/// `LiteralValue` only admits the three kinds the wire format's numeric
/// classifier and string family can distinguish without ambiguity; a
/// JSON string leaks into a `&'static str` the same way a one-time startup
/// schema load would, since `LiteralValue` is meant to be cheap to clone
/// and compare for the lifetime of the process.
fn literal_value(def: &ValueDef) -> Result<LiteralValue, SchemaBuildError> {
    match def {
        ValueDef::Bool(b) => Ok(LiteralValue::Bool(*b)),
        ValueDef::Int(n) => Ok(LiteralValue::Int(*n)),
        ValueDef::Str(s) => Ok(LiteralValue::Str(Box::leak(s.clone().into_boxed_str()))),
        ValueDef::Null => Err(SchemaBuildError::UnsupportedLiteralValue("null")),
        ValueDef::Float(_) => Err(SchemaBuildError::UnsupportedLiteralValue("float")),
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum EnumMemberKindDef {
    Str,
    Numeric,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ObjectFieldDef {
    pub name: String,
    pub schema: SchemaDef,
}

/// Top-level schema description. One variant per [`Schema`] wire family and
/// per JSON-representable decorator.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemaDef {
    Number,
    BigInt,
    Bool,
    Str,
    Date,
    Nan,
    Literal {
        value: ValueDef,
    },
    NativeEnum {
        member_kind: EnumMemberKindDef,
        members: Vec<(String, ValueDef)>,
    },
    Object {
        fields: Vec<ObjectFieldDef>,
        #[serde(default)]
        passthrough: bool,
    },
    Array {
        element: Box<SchemaDef>,
    },
    Tuple {
        elements: Vec<SchemaDef>,
    },
    Set {
        element: Box<SchemaDef>,
    },
    Union {
        options: Vec<SchemaDef>,
    },
    DiscriminatedUnion {
        discriminant: String,
        variants: Vec<SchemaDef>,
    },
    Record {
        value: Box<SchemaDef>,
    },
    Map {
        key: Box<SchemaDef>,
        value: Box<SchemaDef>,
    },
    Intersection {
        left: Box<SchemaDef>,
        right: Box<SchemaDef>,
    },
    Optional {
        inner: Box<SchemaDef>,
    },
    Nullable {
        inner: Box<SchemaDef>,
    },
    Readonly {
        inner: Box<SchemaDef>,
    },
    Default {
        inner: Box<SchemaDef>,
        value: ValueDef,
    },
    #[cfg(feature = "effects")]
    Catch {
        inner: Box<SchemaDef>,
        value: ValueDef,
    },
}

impl TryFrom<&SchemaDef> for Schema {
    type Error = SchemaBuildError;

    fn try_from(def: &SchemaDef) -> Result<Self, Self::Error> {
        Ok(match def {
            SchemaDef::Number => Schema::Number,
            SchemaDef::BigInt => Schema::BigInt,
            SchemaDef::Bool => Schema::Bool,
            SchemaDef::Str => Schema::Str,
            SchemaDef::Date => Schema::Date,
            SchemaDef::Nan => Schema::Nan,
            SchemaDef::Literal { value } => Schema::Literal(literal_value(value)?),
            SchemaDef::NativeEnum {
                member_kind,
                members,
            } => Schema::NativeEnum {
                member_kind: match member_kind {
                    EnumMemberKindDef::Str => EnumMemberKind::Str,
                    EnumMemberKindDef::Numeric => EnumMemberKind::Numeric,
                },
                members: members
                    .iter()
                    .map(|(name, v)| Ok((name.clone(), literal_value(v)?)))
                    .collect::<Result<Vec<_>, SchemaBuildError>>()?,
            },
            SchemaDef::Object { fields, passthrough } => {
                let fields = fields
                    .iter()
                    .map(|f| Ok(ObjectField::new(f.name.clone(), Schema::try_from(&f.schema)?)))
                    .collect::<Result<Vec<_>, SchemaBuildError>>()?;
                if *passthrough {
                    Schema::object_passthrough(fields)?
                } else {
                    Schema::object(fields)?
                }
            }
            SchemaDef::Array { element } => Schema::array(Schema::try_from(element.as_ref())?),
            SchemaDef::Tuple { elements } => Schema::Tuple(
                elements
                    .iter()
                    .map(Schema::try_from)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            SchemaDef::Set { element } => Schema::set(Schema::try_from(element.as_ref())?),
            SchemaDef::Union { options } => Schema::union(
                options
                    .iter()
                    .map(Schema::try_from)
                    .collect::<Result<Vec<_>, _>>()?,
            )?,
            SchemaDef::DiscriminatedUnion {
                discriminant,
                variants,
            } => Schema::discriminated_union(
                discriminant.clone(),
                variants
                    .iter()
                    .map(Schema::try_from)
                    .collect::<Result<Vec<_>, _>>()?,
            )?,
            SchemaDef::Record { value } => Schema::record(Schema::try_from(value.as_ref())?),
            SchemaDef::Map { key, value } => Schema::map(
                Schema::try_from(key.as_ref())?,
                Schema::try_from(value.as_ref())?,
            ),
            SchemaDef::Intersection { left, right } => Schema::Intersection(
                Box::new(Schema::try_from(left.as_ref())?),
                Box::new(Schema::try_from(right.as_ref())?),
            ),
            SchemaDef::Optional { inner } => Schema::optional(Schema::try_from(inner.as_ref())?),
            SchemaDef::Nullable { inner } => Schema::nullable(Schema::try_from(inner.as_ref())?),
            SchemaDef::Readonly { inner } => Schema::readonly(Schema::try_from(inner.as_ref())?),
            SchemaDef::Default { inner, value } => {
                let compiled = Schema::try_from(inner.as_ref())?;
                let constant = Value::from(value);
                Schema::default_with(compiled, move || constant.clone())
            }
            #[cfg(feature = "effects")]
            SchemaDef::Catch { inner, value } => {
                let compiled = Schema::try_from(inner.as_ref())?;
                let constant = Value::from(value);
                Schema::catch_with(compiled, move || constant.clone())
            }
        })
    }
}
