//! The `Schema` tagged sum type: one variant per §4.1 wire family, one per
//! decorator kind, and one folding the seven refused kinds together.
//!
//! Where `bitcraft::field::Field` described a bit-field by its fragments
//! and assembly order, `Schema` describes a value by its shape and the
//! decorators wrapping it. The dispatcher in the `shapewire` crate matches
//! on this enum exhaustively instead of doing the teacher's `TryFrom`
//! compile-then-assemble two-step, because here there is nothing to
//! precompute: the wire form is decided by the variant itself.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::SchemaBuildError;
use crate::value::Value;

/// Matches `UNION_MAX_OPTIONS` (kept in sync by
/// the 5-bit option-index field in the union header, §4.1).
const UNION_MAX_OPTIONS: usize = 32;

/// The seven schema kinds this codec refuses to serialize (§4.4 step 1).
/// Folded into one variant so the dispatcher's reject-list is a single
/// match arm; the kind travels with the error so callers still see which
/// one tripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnserializableKind {
    Any,
    Unknown,
    Never,
    Void,
    Function,
    Symbol,
    Promise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralValue {
    Str(&'static str),
    Int(i64),
    Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumMemberKind {
    Str,
    Numeric,
}

#[derive(Debug, Clone)]
pub struct ObjectField {
    pub name: String,
    pub schema: Schema,
}

impl ObjectField {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// A recursive indirection for schemas that refer to themselves (e.g.
/// `Node = { v: number, next: Node? }`). Backed by `Rc<RefCell<Option<_>>>`
/// so the cell can be created, handed to the body that refers back to it,
/// and only then populated — the same two-phase construction every
/// recursive-type library needs. Identity (the `Rc` pointer) is what lets
/// the fingerprint traversal and the cyclic-value guard break cycles.
#[derive(Clone)]
pub struct Lazy(Rc<RefCell<Option<Schema>>>);

impl Lazy {
    pub fn new() -> Self {
        Lazy(Rc::new(RefCell::new(None)))
    }

    /// Populates the lazy cell. Panics if called twice; a `Lazy` is meant
    /// to be tied to exactly one schema definition.
    pub fn set(&self, schema: Schema) {
        let mut slot = self.0.borrow_mut();
        assert!(slot.is_none(), "Lazy schema cell populated twice");
        *slot = Some(schema);
    }

    pub fn get(&self) -> Schema {
        self.0
            .borrow()
            .clone()
            .expect("Lazy schema dereferenced before being set")
    }

    /// Stable identity for this cell, used to break cycles during
    /// fingerprinting and to recognize "we've already unwrapped this lazy
    /// node in this traversal".
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

impl Default for Lazy {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Lazy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lazy({:#x})", self.identity())
    }
}

/// Produces the value a `default` decorator substitutes for a missing
/// field, or the replacement a `catch` decorator substitutes for a value
/// the inner schema rejected. Stored as a shared closure rather than a
/// plain `Value` because the original library allows `() => computeIt()`,
/// not just a constant.
#[derive(Clone)]
pub struct ValueFactory(Rc<dyn Fn() -> Value>);

impl ValueFactory {
    pub fn new(f: impl Fn() -> Value + 'static) -> Self {
        ValueFactory(Rc::new(f))
    }

    pub fn constant(value: Value) -> Self {
        ValueFactory::new(move || value.clone())
    }

    pub fn call(&self) -> Value {
        (self.0)()
    }
}

impl std::fmt::Debug for ValueFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ValueFactory(..)")
    }
}

/// A refinement, preprocess, or transform effect wrapping a base schema,
/// per §4.5. `Refine` never changes the wire form; `Preprocess` maps the
/// input *into* the base schema's shape before anything else runs;
/// `Transform` maps the base schema's parsed output into a shape the wire
/// format no longer describes structurally, so it is bypassed during
/// normal encoding (§4.5) and re-applied by the validator on decode.
#[cfg(feature = "effects")]
#[derive(Clone)]
pub enum EffectKind {
    Refine(Rc<dyn Fn(&Value) -> bool>),
    Preprocess(Rc<dyn Fn(Value) -> Value>),
    Transform(Rc<dyn Fn(Value) -> Value>),
}

#[cfg(feature = "effects")]
impl std::fmt::Debug for EffectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EffectKind::Refine(_) => "Refine",
            EffectKind::Preprocess(_) => "Preprocess",
            EffectKind::Transform(_) => "Transform",
        };
        write!(f, "EffectKind::{name}(..)")
    }
}

/// The tagged sum type realizing "a schema" for this codec (§9 design
/// note). One variant per §4.1 wire family, one per decorator, and
/// `Unserializable` folding the seven refused kinds.
#[derive(Debug, Clone)]
pub enum Schema {
    // ---- primitives (§4.1 Numeric, String, Date) ----
    Number,
    BigInt,
    Bool,
    Str,
    Date,
    Nan,
    Literal(LiteralValue),
    NativeEnum {
        member_kind: EnumMemberKind,
        members: Vec<(String, LiteralValue)>,
    },

    // ---- composites ----
    Object {
        fields: Vec<ObjectField>,
        /// `true` for schemas that permit unknown keys ("passthrough");
        /// these are rejected at encode time (§4.1) because their shape
        /// is not statically known.
        passthrough: bool,
    },
    Array(Box<Schema>),
    Tuple(Vec<Schema>),
    Set(Box<Schema>),
    Union(Vec<Schema>),
    DiscriminatedUnion {
        discriminant: String,
        variants: Vec<Schema>,
    },
    Record(Box<Schema>),
    Map {
        key: Box<Schema>,
        value: Box<Schema>,
    },
    Intersection(Box<Schema>, Box<Schema>),

    // ---- decorators (§4.4 step 5, §4.5) ----
    Optional(Box<Schema>),
    Nullable(Box<Schema>),
    Readonly(Box<Schema>),
    /// A brand tag with no runtime effect on the wire form or the
    /// fingerprint; carried only so schema authors can express nominal
    /// typing the way the original library does.
    Branded(Box<Schema>, &'static str),
    Lazy(Lazy),
    Default(Box<Schema>, ValueFactory),
    #[cfg(feature = "effects")]
    Catch(Box<Schema>, ValueFactory),
    /// A pipeline's input side is what the wire format follows (§4.4
    /// step 5); the output side exists for the validator to check after
    /// decode re-parses under the input schema.
    Pipeline {
        input: Box<Schema>,
        output: Box<Schema>,
    },
    #[cfg(feature = "effects")]
    Effect(Box<Schema>, EffectKind),

    Unserializable(UnserializableKind),
}

impl Schema {
    pub fn optional(inner: Schema) -> Schema {
        Schema::Optional(Box::new(inner))
    }

    pub fn nullable(inner: Schema) -> Schema {
        Schema::Nullable(Box::new(inner))
    }

    pub fn readonly(inner: Schema) -> Schema {
        Schema::Readonly(Box::new(inner))
    }

    pub fn branded(inner: Schema, brand: &'static str) -> Schema {
        Schema::Branded(Box::new(inner), brand)
    }

    pub fn default_with(inner: Schema, make_default: impl Fn() -> Value + 'static) -> Schema {
        Schema::Default(Box::new(inner), ValueFactory::new(make_default))
    }

    #[cfg(feature = "effects")]
    pub fn catch_with(inner: Schema, make_replacement: impl Fn() -> Value + 'static) -> Schema {
        Schema::Catch(Box::new(inner), ValueFactory::new(make_replacement))
    }

    #[cfg(feature = "effects")]
    pub fn refine(inner: Schema, predicate: impl Fn(&Value) -> bool + 'static) -> Schema {
        Schema::Effect(Box::new(inner), EffectKind::Refine(Rc::new(predicate)))
    }

    #[cfg(feature = "effects")]
    pub fn preprocess(inner: Schema, f: impl Fn(Value) -> Value + 'static) -> Schema {
        Schema::Effect(Box::new(inner), EffectKind::Preprocess(Rc::new(f)))
    }

    #[cfg(feature = "effects")]
    pub fn transform(inner: Schema, f: impl Fn(Value) -> Value + 'static) -> Schema {
        Schema::Effect(Box::new(inner), EffectKind::Transform(Rc::new(f)))
    }

    pub fn array(element: Schema) -> Schema {
        Schema::Array(Box::new(element))
    }

    pub fn set(element: Schema) -> Schema {
        Schema::Set(Box::new(element))
    }

    pub fn record(value: Schema) -> Schema {
        Schema::Record(Box::new(value))
    }

    pub fn map(key: Schema, value: Schema) -> Schema {
        Schema::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn object(fields: Vec<ObjectField>) -> Result<Schema, SchemaBuildError> {
        let mut seen = std::collections::HashSet::new();
        for f in &fields {
            if !seen.insert(f.name.clone()) {
                return Err(SchemaBuildError::DuplicateField(f.name.clone()));
            }
        }
        Ok(Schema::Object {
            fields,
            passthrough: false,
        })
    }

    pub fn object_passthrough(fields: Vec<ObjectField>) -> Result<Schema, SchemaBuildError> {
        match Schema::object(fields)? {
            Schema::Object { fields, .. } => Ok(Schema::Object {
                fields,
                passthrough: true,
            }),
            _ => unreachable!(),
        }
    }

    pub fn union(options: Vec<Schema>) -> Result<Schema, SchemaBuildError> {
        if options.is_empty() {
            return Err(SchemaBuildError::EmptyUnion);
        }
        if options.len() > UNION_MAX_OPTIONS {
            return Err(SchemaBuildError::TooManyUnionOptions(options.len()));
        }
        Ok(Schema::Union(options))
    }

    pub fn discriminated_union(
        discriminant: impl Into<String>,
        variants: Vec<Schema>,
    ) -> Result<Schema, SchemaBuildError> {
        if variants.is_empty() {
            return Err(SchemaBuildError::EmptyUnion);
        }
        if variants.len() > UNION_MAX_OPTIONS {
            return Err(SchemaBuildError::TooManyUnionOptions(variants.len()));
        }
        Ok(Schema::DiscriminatedUnion {
            discriminant: discriminant.into(),
            variants,
        })
    }

    /// `true` if this node is an `Optional` wrapper, looking through the
    /// transparent `readonly`/`branded` decorators that don't change
    /// whether a record field may be absent.
    pub fn is_optional(&self) -> bool {
        match self {
            Schema::Optional(_) => true,
            Schema::Readonly(inner) | Schema::Branded(inner, _) => inner.is_optional(),
            _ => false,
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            Schema::Nullable(_) => true,
            Schema::Readonly(inner) | Schema::Branded(inner, _) => inner.is_nullable(),
            _ => false,
        }
    }

    /// Looks through `readonly`/`branded` wrappers for a `default`
    /// decorator, the other shape a record field may take while still
    /// being absent from the source record (§3 invariant 4).
    pub fn as_default(&self) -> Option<(&Schema, &ValueFactory)> {
        match self {
            Schema::Default(inner, factory) => Some((inner, factory)),
            Schema::Readonly(inner) | Schema::Branded(inner, _) => inner.as_default(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_over_cap_is_rejected() {
        let options: Vec<Schema> = (0..33).map(|_| Schema::Number).collect();
        assert!(matches!(
            Schema::union(options),
            Err(SchemaBuildError::TooManyUnionOptions(33))
        ));
    }

    #[test]
    fn union_at_cap_is_accepted() {
        let options: Vec<Schema> = (0..32).map(|_| Schema::Number).collect();
        assert!(Schema::union(options).is_ok());
    }

    #[test]
    fn duplicate_field_name_rejected() {
        let fields = vec![
            ObjectField::new("a", Schema::Number),
            ObjectField::new("a", Schema::Str),
        ];
        assert!(matches!(
            Schema::object(fields),
            Err(SchemaBuildError::DuplicateField(_))
        ));
    }

    #[test]
    fn lazy_roundtrips_through_set_and_get() {
        let lazy = Lazy::new();
        lazy.set(Schema::Number);
        assert!(matches!(lazy.get(), Schema::Number));
    }

    #[test]
    fn default_factory_is_called_fresh_each_time() {
        let schema = Schema::default_with(Schema::Number, || Value::Int(7));
        if let Schema::Default(_, factory) = schema {
            assert_eq!(factory.call(), Value::Int(7));
            assert_eq!(factory.call(), Value::Int(7));
        } else {
            panic!("expected Default variant");
        }
    }
}
