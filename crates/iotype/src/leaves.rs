// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Leaf descriptors for primitive values.
//!
//! Each leaf is built once per process and shared. Numbers serialize to JSON
//! numbers when finite; non-finite values use the sentinel strings
//! `"Infinity"`, `"-Infinity"` and `"NaN"`.

use crate::descriptor::{TypeDescriptor, TypeOptions};
use crate::error::{DescriptorError, StateError};
use crate::schema::StateSchema;
use crate::validator::{StateKind, StateValidator, Validator};
use crate::value::{Value, ValueKind};
use crate::StateObject;
use std::sync::{Arc, OnceLock};

const POSITIVE_INFINITY: &str = "Infinity";
const NEGATIVE_INFINITY: &str = "-Infinity";
const NOT_A_NUMBER: &str = "NaN";

type LeafCell = OnceLock<Arc<TypeDescriptor>>;

#[allow(clippy::expect_used)] // leaf options are constant and covered by tests
fn leaf(
    cell: &'static LeafCell,
    build: fn() -> Result<Arc<TypeDescriptor>, DescriptorError>,
) -> Arc<TypeDescriptor> {
    cell.get_or_init(|| build().expect("leaf descriptor options are valid"))
        .clone()
}

fn unsupported(type_name: &str, operation: &'static str) -> StateError {
    StateError::Unsupported {
        type_name: type_name.to_string(),
        operation,
    }
}

fn wrong_state(type_name: &str, state: &StateObject) -> StateError {
    StateError::failed(type_name, format!("cannot restore from {}", state))
}

// ---------------------------------------------------------------------------
// BooleanIO
// ---------------------------------------------------------------------------

/// `BooleanIO`: `true`/`false`.
pub fn boolean() -> Arc<TypeDescriptor> {
    static CELL: LeafCell = OnceLock::new();
    leaf(&CELL, || {
        TypeDescriptor::new(
            "BooleanIO",
            TypeOptions {
                documentation: Some("Primitive type for boolean values.".into()),
                validator: Some(Validator::of_kind(ValueKind::Bool)),
                state_schema: Some(StateSchema::as_value(
                    "boolean",
                    StateValidator::of_kind(StateKind::Bool),
                )),
                to_state_object: Some(Arc::new(boolean_to_state)),
                from_state_object: Some(Arc::new(boolean_from_state)),
                ..TypeOptions::default()
            },
        )
    })
}

fn boolean_to_state(value: &Value) -> Result<StateObject, StateError> {
    value
        .as_bool()
        .map(StateObject::Bool)
        .ok_or_else(|| StateError::failed("BooleanIO", format!("not a boolean: {}", value.describe())))
}

fn boolean_from_state(state: &StateObject) -> Result<Value, StateError> {
    state
        .as_bool()
        .map(Value::Bool)
        .ok_or_else(|| wrong_state("BooleanIO", state))
}

// ---------------------------------------------------------------------------
// StringIO
// ---------------------------------------------------------------------------

/// `StringIO`: text.
pub fn string() -> Arc<TypeDescriptor> {
    static CELL: LeafCell = OnceLock::new();
    leaf(&CELL, || {
        TypeDescriptor::new(
            "StringIO",
            TypeOptions {
                documentation: Some("Primitive type for strings.".into()),
                validator: Some(Validator::of_kind(ValueKind::String)),
                state_schema: Some(StateSchema::as_value(
                    "string",
                    StateValidator::of_kind(StateKind::String),
                )),
                to_state_object: Some(Arc::new(string_to_state)),
                from_state_object: Some(Arc::new(string_from_state)),
                ..TypeOptions::default()
            },
        )
    })
}

fn string_to_state(value: &Value) -> Result<StateObject, StateError> {
    value
        .as_str()
        .map(|s| StateObject::String(s.to_string()))
        .ok_or_else(|| StateError::failed("StringIO", format!("not a string: {}", value.describe())))
}

fn string_from_state(state: &StateObject) -> Result<Value, StateError> {
    state
        .as_str()
        .map(Value::from)
        .ok_or_else(|| wrong_state("StringIO", state))
}

// ---------------------------------------------------------------------------
// NumberIO
// ---------------------------------------------------------------------------

/// `NumberIO`: any `f64`, including infinities and NaN.
pub fn number() -> Arc<TypeDescriptor> {
    static CELL: LeafCell = OnceLock::new();
    leaf(&CELL, || {
        TypeDescriptor::new(
            "NumberIO",
            TypeOptions {
                documentation: Some(
                    "Primitive type for floating point numbers, including infinities and NaN.".into(),
                ),
                validator: Some(Validator::of_kind(ValueKind::Number)),
                state_schema: Some(StateSchema::as_value(
                    "number | 'Infinity' | '-Infinity' | 'NaN'",
                    StateValidator::from_predicate(is_number_state),
                )),
                to_state_object: Some(Arc::new(number_to_state)),
                from_state_object: Some(Arc::new(number_from_state)),
                ..TypeOptions::default()
            },
        )
    })
}

fn is_number_state(state: &StateObject) -> bool {
    match state {
        StateObject::Number(_) => true,
        StateObject::String(s) => parse_sentinel(s).is_some(),
        _ => false,
    }
}

fn parse_sentinel(s: &str) -> Option<f64> {
    match s {
        POSITIVE_INFINITY => Some(f64::INFINITY),
        NEGATIVE_INFINITY => Some(f64::NEG_INFINITY),
        NOT_A_NUMBER => Some(f64::NAN),
        _ => None,
    }
}

/// Encode a number, using a sentinel string when it is not finite.
pub fn encode_number(n: f64) -> StateObject {
    match serde_json::Number::from_f64(n) {
        Some(number) => StateObject::Number(number),
        None if n.is_nan() => StateObject::String(NOT_A_NUMBER.into()),
        None if n > 0.0 => StateObject::String(POSITIVE_INFINITY.into()),
        None => StateObject::String(NEGATIVE_INFINITY.into()),
    }
}

/// Decode a number or sentinel string.
pub fn decode_number(state: &StateObject) -> Option<f64> {
    match state {
        StateObject::Number(n) => n.as_f64(),
        StateObject::String(s) => parse_sentinel(s),
        _ => None,
    }
}

fn number_to_state(value: &Value) -> Result<StateObject, StateError> {
    value
        .as_f64()
        .map(encode_number)
        .ok_or_else(|| StateError::failed("NumberIO", format!("not a number: {}", value.describe())))
}

fn number_from_state(state: &StateObject) -> Result<Value, StateError> {
    decode_number(state)
        .map(Value::Number)
        .ok_or_else(|| wrong_state("NumberIO", state))
}

// ---------------------------------------------------------------------------
// VoidIO
// ---------------------------------------------------------------------------

/// `VoidIO`: the absence of a value. Serializes to `null`.
pub fn void() -> Arc<TypeDescriptor> {
    static CELL: LeafCell = OnceLock::new();
    leaf(&CELL, || {
        TypeDescriptor::new(
            "VoidIO",
            TypeOptions {
                documentation: Some(
                    "Type with no instances, usually the return type of a method returning nothing."
                        .into(),
                ),
                validator: Some(Validator::of_kind(ValueKind::Null)),
                state_schema: Some(StateSchema::as_value(
                    "null",
                    StateValidator::of_kind(StateKind::Null),
                )),
                to_state_object: Some(Arc::new(|_: &Value| -> Result<StateObject, StateError> {
                    Ok(StateObject::Null)
                })),
                from_state_object: Some(Arc::new(|_: &StateObject| -> Result<Value, StateError> {
                    Ok(Value::Null)
                })),
                ..TypeOptions::default()
            },
        )
    })
}

// ---------------------------------------------------------------------------
// FunctionIO
// ---------------------------------------------------------------------------

/// `FunctionIO`: callable values. Not serializable.
pub fn function() -> Arc<TypeDescriptor> {
    static CELL: LeafCell = OnceLock::new();
    leaf(&CELL, || {
        TypeDescriptor::new(
            "FunctionIO",
            TypeOptions {
                documentation: Some("Wrapper for the built-in function type.".into()),
                validator: Some(Validator::of_kind(ValueKind::Function)),
                to_state_object: Some(Arc::new(|_: &Value| -> Result<StateObject, StateError> {
                    Err(unsupported("FunctionIO", "toStateObject"))
                })),
                from_state_object: Some(Arc::new(|_: &StateObject| -> Result<Value, StateError> {
                    Err(unsupported("FunctionIO", "fromStateObject"))
                })),
                is_function_type: true,
                ..TypeOptions::default()
            },
        )
    })
}

// ---------------------------------------------------------------------------
// ObjectLiteralIO
// ---------------------------------------------------------------------------

/// `ObjectLiteralIO`: opaque plain data, stored as-is.
pub fn object_literal() -> Arc<TypeDescriptor> {
    static CELL: LeafCell = OnceLock::new();
    leaf(&CELL, || {
        TypeDescriptor::new(
            "ObjectLiteralIO",
            TypeOptions {
                documentation: Some("IO Type for object literals.".into()),
                validator: Some(
                    Validator::of_kind(ValueKind::Plain)
                        .with_predicate(|v| matches!(v, Value::Plain(StateObject::Object(_)))),
                ),
                state_schema: Some(StateSchema::as_value(
                    "object literal",
                    StateValidator::of_kind(StateKind::Object),
                )),
                to_state_object: Some(Arc::new(object_literal_to_state)),
                from_state_object: Some(Arc::new(|state: &StateObject| -> Result<Value, StateError> {
                    Ok(Value::Plain(state.clone()))
                })),
                ..TypeOptions::default()
            },
        )
    })
}

fn object_literal_to_state(value: &Value) -> Result<StateObject, StateError> {
    match value {
        Value::Plain(data) => Ok(data.clone()),
        other => Err(StateError::failed(
            "ObjectLiteralIO",
            format!("not plain data: {}", other.describe()),
        )),
    }
}

/// Every leaf descriptor, for catalogs and documentation.
pub fn all() -> Vec<Arc<TypeDescriptor>> {
    vec![
        boolean(),
        string(),
        number(),
        void(),
        function(),
        object_literal(),
    ]
}
