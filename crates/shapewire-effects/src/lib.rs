//! Decorator resolution policy: what value the encoder hands to an inner
//! schema when it unwraps `catch` or one of the three effect kinds (§4.4
//! step 5, §4.5).
//!
//! Grounded on `bitcraft::transform::Transform::apply`'s shape: validate
//! the configuration, then run a fixed, ordered sequence of steps and
//! surface a typed error the moment one step can't proceed. Here the
//! "configuration" is the decorator itself and the "steps" are the three
//! effect kinds plus the catch fallback, rather than base-reinterpret /
//! scale-offset / enum / string-decode, but the shape — validate first,
//! then walk a fixed order, bail with a specific error variant — is the
//! same one.

#[cfg(feature = "effects")]
use shapewire_schema::EffectKind;
use shapewire_schema::{Schema, Value, ValueFactory};
#[cfg(feature = "effects")]
use thiserror::Error;

/// Threaded through one encode call. Carries the "a catch fallback has
/// already replaced this value" flag §4.5 uses to forbid a `transform`
/// effect from running later in the same traversal — the replacement
/// value came from the schema author's fallback, not from parsing the
/// caller's input, so it cannot be handed to a function that expects
/// base-schema output.
#[derive(Debug, Default, Clone, Copy)]
pub struct EncodeState {
    pub catch_replaced: bool,
}

impl EncodeState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "effects")]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EffectsError {
    #[error("a transform effect must run during encoding because catch already replaced the value")]
    TransformUnserializable,
}

/// Resolves a `catch(inner, factory)` decorator for encoding: try the
/// inner schema's validator against `value`; if it accepts, encode that
/// (possibly default-filled) value unchanged; if it rejects, substitute
/// the factory's replacement and mark the state so a later `transform`
/// effect on the same path is rejected instead of silently skipped.
pub fn resolve_catch(inner: &Schema, value: Value, factory: &ValueFactory, state: &mut EncodeState) -> Value {
    match shapewire_schema::validate::validate(inner, value) {
        Ok(validated) => validated,
        Err(_) => {
            state.catch_replaced = true;
            factory.call()
        }
    }
}

/// Resolves an effect decorator for encoding. Refinement never changes
/// the value; preprocess runs unconditionally; transform is bypassed
/// during ordinary encoding (the base schema encodes the pre-transform
/// value, and the validator re-applies the transform on decode) unless
/// `state.catch_replaced` is set, in which case there is no well-formed
/// pre-transform value left to encode and the call fails.
#[cfg(feature = "effects")]
pub fn resolve_effect_for_encode(
    effect: &EffectKind,
    value: Value,
    state: &EncodeState,
) -> Result<Value, EffectsError> {
    match effect {
        EffectKind::Refine(_) => Ok(value),
        EffectKind::Preprocess(f) => Ok(f(value)),
        EffectKind::Transform(_) => {
            if state.catch_replaced {
                Err(EffectsError::TransformUnserializable)
            } else {
                Ok(value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catch_passes_through_accepted_value() {
        let mut state = EncodeState::new();
        let factory = ValueFactory::constant(Value::Int(-1));
        let result = resolve_catch(&Schema::Number, Value::Int(5), &factory, &mut state);
        assert_eq!(result, Value::Int(5));
        assert!(!state.catch_replaced);
    }

    #[test]
    fn catch_substitutes_and_flags_on_rejection() {
        let mut state = EncodeState::new();
        let factory = ValueFactory::constant(Value::Int(-1));
        let result = resolve_catch(&Schema::Number, Value::Str("nope".into()), &factory, &mut state);
        assert_eq!(result, Value::Int(-1));
        assert!(state.catch_replaced);
    }

    #[test]
    #[cfg(feature = "effects")]
    fn transform_bypassed_when_no_catch_replacement() {
        let state = EncodeState::new();
        let effect = EffectKind::Transform(std::rc::Rc::new(|v: Value| v));
        let result = resolve_effect_for_encode(&effect, Value::Int(1), &state).unwrap();
        assert_eq!(result, Value::Int(1));
    }

    #[test]
    #[cfg(feature = "effects")]
    fn transform_rejected_after_catch_replacement() {
        let state = EncodeState { catch_replaced: true };
        let effect = EffectKind::Transform(std::rc::Rc::new(|v: Value| v));
        let result = resolve_effect_for_encode(&effect, Value::Int(1), &state);
        assert_eq!(result, Err(EffectsError::TransformUnserializable));
    }

    #[test]
    #[cfg(feature = "effects")]
    fn preprocess_runs_regardless_of_catch_state() {
        let state = EncodeState { catch_replaced: true };
        let effect = EffectKind::Preprocess(std::rc::Rc::new(|v: Value| match v {
            Value::Str(s) => Value::Str(s.trim().to_string()),
            other => other,
        }));
        let result = resolve_effect_for_encode(&effect, Value::Str("  x  ".into()), &state).unwrap();
        assert_eq!(result, Value::Str("x".into()));
    }
}
