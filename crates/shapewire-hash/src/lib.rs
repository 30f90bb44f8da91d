//! Structural fingerprinting of a [`Schema`](shapewire_schema::Schema):
//! a deterministic post-order traversal that yields one wire-family tag
//! byte per node, hashed with FNV-1a extended to a 64-bit accumulator.
//!
//! Grounded on `bearcove-rapace`'s `compute_method_id`, the same
//! offset-basis/prime byte-at-a-time FNV-1a used there to turn a service
//! and method name into a stable numeric identifier — except this
//! accumulator is never folded down to 32 bits, since the wire envelope
//! has room for the full 64-bit hash (§4.2).

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use shapewire_schema::{EnumMemberKind, LiteralValue, Schema};
use shapewire_wire::header::{
    TAG_ARRAY, TAG_DATE, TAG_MAP, TAG_NUMERIC, TAG_OBJECT, TAG_STRING, TAG_UNION,
};

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// The 64-bit structural fingerprint of `schema`. Depends only on the
/// sequence of wire-family tags a post-order traversal produces: field
/// names, refinement predicates, and value-level constraints never enter
/// into it (invariant 3).
pub fn fingerprint(schema: &Schema) -> u64 {
    let mut tags = Vec::new();
    let visited: Rc<RefCell<HashSet<usize>>> = Rc::new(RefCell::new(HashSet::new()));
    collect_tags(schema, &mut tags, &visited);
    hash_tags(&tags)
}

fn hash_tags(tags: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in tags {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn collect_tags(schema: &Schema, out: &mut Vec<u8>, visited: &Rc<RefCell<HashSet<usize>>>) {
    match schema {
        Schema::Number | Schema::BigInt | Schema::Nan => out.push(TAG_NUMERIC),
        Schema::Bool => out.push(TAG_NUMERIC),

        Schema::Literal(lit) => out.push(match lit {
            LiteralValue::Str(_) => TAG_STRING,
            LiteralValue::Int(_) | LiteralValue::Bool(_) => TAG_NUMERIC,
        }),

        Schema::NativeEnum { member_kind, .. } => out.push(match member_kind {
            EnumMemberKind::Str => TAG_STRING,
            EnumMemberKind::Numeric => TAG_NUMERIC,
        }),

        Schema::Str => out.push(TAG_STRING),

        Schema::Date => out.push(TAG_DATE),

        Schema::Object { fields, .. } => {
            out.push(TAG_OBJECT);
            for field in fields {
                collect_tags(&field.schema, out, visited);
            }
        }

        Schema::Array(element) => {
            out.push(TAG_ARRAY);
            collect_tags(element, out, visited);
        }
        Schema::Tuple(elements) => {
            out.push(TAG_ARRAY);
            for element in elements {
                collect_tags(element, out, visited);
            }
        }
        Schema::Set(element) => {
            out.push(TAG_ARRAY);
            collect_tags(element, out, visited);
        }

        Schema::Union(options) => {
            out.push(TAG_UNION);
            for option in options {
                collect_tags(option, out, visited);
            }
        }
        Schema::DiscriminatedUnion { variants, .. } => {
            out.push(TAG_UNION);
            for variant in variants {
                collect_tags(variant, out, visited);
            }
        }

        Schema::Record(value) => {
            out.push(TAG_MAP);
            collect_tags(value, out, visited);
        }
        Schema::Map { key, value } => {
            out.push(TAG_MAP);
            collect_tags(key, out, visited);
            collect_tags(value, out, visited);
        }

        Schema::Intersection(a, b) => {
            collect_tags(a, out, visited);
            collect_tags(b, out, visited);
        }

        // Decorators contribute nothing of their own; they delegate to
        // the schema they wrap (§4.2).
        Schema::Optional(inner)
        | Schema::Nullable(inner)
        | Schema::Readonly(inner)
        | Schema::Branded(inner, _)
        | Schema::Default(inner, _) => collect_tags(inner, out, visited),

        #[cfg(feature = "effects")]
        Schema::Catch(inner, _) | Schema::Effect(inner, _) => collect_tags(inner, out, visited),

        Schema::Pipeline { input, .. } => collect_tags(input, out, visited),

        Schema::Lazy(lazy) => {
            let identity = lazy.identity();
            if visited.borrow_mut().insert(identity) {
                collect_tags(&lazy.get(), out, visited);
            }
        }

        // Unserializable schemas never reach the fingerprinter in
        // practice (the dispatcher rejects them first), but contribute a
        // stable byte rather than panicking if one slips through.
        Schema::Unserializable(_) => out.push(0xFF),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapewire_schema::{Lazy as SchemaLazy, ObjectField};

    #[test]
    fn same_shape_same_fingerprint() {
        let a = Schema::object(vec![ObjectField::new("x", Schema::Number)]).unwrap();
        let b = Schema::object(vec![ObjectField::new("x", Schema::Number)]).unwrap();
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn renaming_a_field_does_not_change_fingerprint() {
        let a = Schema::object(vec![ObjectField::new("x", Schema::Number)]).unwrap();
        let b = Schema::object(vec![ObjectField::new("y", Schema::Number)]).unwrap();
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn reordering_fields_changes_fingerprint() {
        let a = Schema::object(vec![
            ObjectField::new("x", Schema::Number),
            ObjectField::new("y", Schema::Str),
        ])
        .unwrap();
        let b = Schema::object(vec![
            ObjectField::new("y", Schema::Str),
            ObjectField::new("x", Schema::Number),
        ])
        .unwrap();
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn adding_a_field_changes_fingerprint() {
        let a = Schema::object(vec![ObjectField::new("x", Schema::Number)]).unwrap();
        let b = Schema::object(vec![
            ObjectField::new("x", Schema::Number),
            ObjectField::new("y", Schema::Str),
        ])
        .unwrap();
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn changing_union_arity_changes_fingerprint() {
        let a = Schema::union(vec![Schema::Number, Schema::Str]).unwrap();
        let b = Schema::union(vec![Schema::Number, Schema::Str, Schema::Bool]).unwrap();
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn decorators_do_not_change_fingerprint() {
        let plain = Schema::Number;
        let decorated = Schema::readonly(Schema::optional(Schema::branded(Schema::Number, "id")));
        assert_eq!(fingerprint(&plain), fingerprint(&decorated));
    }

    #[test]
    fn recursive_schema_fingerprints_without_looping() {
        let lazy = SchemaLazy::new();
        let node = Schema::object(vec![
            ObjectField::new("value", Schema::Number),
            ObjectField::new("next", Schema::optional(Schema::Lazy(lazy.clone()))),
        ])
        .unwrap();
        lazy.set(node.clone());
        // Must terminate and produce a stable value across repeated calls.
        let first = fingerprint(&node);
        let second = fingerprint(&node);
        assert_eq!(first, second);
    }
}
