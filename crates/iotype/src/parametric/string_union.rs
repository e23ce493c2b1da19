// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `StringUnionIO<"a"|"b">`: one of a closed set of strings, serialized as itself.

use super::cache::TypeCache;
use super::check_distinct;
use crate::descriptor::{TypeDescriptor, TypeOptions};
use crate::error::{DescriptorError, StateError};
use crate::schema::StateSchema;
use crate::validator::{StateKind, StateValidator, Validator};
use crate::value::{Value, ValueKind};
use crate::StateObject;
use std::sync::{Arc, OnceLock};

/// Constructor for `StringUnionIO<...>`, keyed by the ordered value list.
#[derive(Debug)]
pub struct StringUnionTypes {
    cache: TypeCache<Vec<String>>,
}

impl Default for StringUnionTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl StringUnionTypes {
    pub fn new() -> Self {
        Self {
            cache: TypeCache::new("StringUnionIO"),
        }
    }

    /// Process-wide instance.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<StringUnionTypes> = OnceLock::new();
        GLOBAL.get_or_init(Self::new)
    }

    pub fn cache(&self) -> &TypeCache<Vec<String>> {
        &self.cache
    }

    /// Canonical descriptor for `values`, in the given order.
    pub fn of<I, S>(&self, values: I) -> Result<Arc<TypeDescriptor>, DescriptorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        check_distinct("StringUnionIO", values.iter().map(String::as_str))?;
        let build_values = values.clone();
        self.cache
            .get_or_try_build(values, move || build(build_values))
    }
}

fn build(values: Vec<String>) -> Result<Arc<TypeDescriptor>, DescriptorError> {
    let label = values
        .iter()
        .map(|v| format!("\"{}\"", v))
        .collect::<Vec<_>>()
        .join("|");
    let type_name = format!("StringUnionIO<{}>", label);
    let values: Arc<[String]> = values.into();

    let validator = Validator::of_kind(ValueKind::String)
        .with_valid_values(values.iter().map(|v| Value::from(v.as_str())).collect())
        .with_message(format!("expected one of {}", label));

    let to_state = {
        let type_name = type_name.clone();
        move |value: &Value| -> Result<StateObject, StateError> {
            value
                .as_str()
                .map(|s| StateObject::String(s.to_string()))
                .ok_or_else(|| StateError::InvalidValue {
                    type_name: type_name.clone(),
                    reason: format!("expected a string, found {}", value.describe()),
                })
        }
    };

    let from_state = {
        let values = Arc::clone(&values);
        let type_name = type_name.clone();
        move |state: &StateObject| -> Result<Value, StateError> {
            let key = state.as_str().unwrap_or_default();
            if values.iter().any(|v| v == key) {
                Ok(Value::from(key))
            } else {
                Err(StateError::UnrecognizedKey {
                    type_name: type_name.clone(),
                    key: key.to_string(),
                })
            }
        }
    };

    TypeDescriptor::new(
        type_name,
        TypeOptions {
            documentation: Some(format!("Possible values: {}.", label.replace('|', ", "))),
            validator: Some(validator),
            // Membership is checked on restore so unknown keys are reported as such.
            state_schema: Some(StateSchema::as_value(
                label.clone(),
                StateValidator::of_kind(StateKind::String),
            )),
            to_state_object: Some(Arc::new(to_state)),
            from_state_object: Some(Arc::new(from_state)),
            ..TypeOptions::default()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_serialization() {
        let shapes = StringUnionTypes::new().of(["circle", "square"]).expect("shapes");
        assert_eq!(shapes.type_name(), "StringUnionIO<\"circle\"|\"square\">");
        assert_eq!(
            shapes.to_state_object(&Value::from("square")).expect("to_state"),
            json!("square")
        );
        assert_eq!(
            shapes.from_state_object(&json!("circle")).expect("from_state"),
            Value::from("circle")
        );
        assert!(!shapes.is_value_valid(&Value::from("triangle")));
        assert!(matches!(
            shapes.from_state_object(&json!("triangle")),
            Err(StateError::UnrecognizedKey { .. })
        ));
    }

    #[test]
    fn test_memoized_by_value_list() {
        let types = StringUnionTypes::new();
        let a = types.of(["on", "off"]).expect("a");
        let b = types.of(vec!["on".to_string(), "off".to_string()]).expect("b");
        let c = types.of(["off", "on"]).expect("c");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(types.cache().stats().hits, 1);
    }

    #[test]
    fn test_duplicates_rejected() {
        assert!(matches!(
            StringUnionTypes::new().of(["on", "on"]),
            Err(DescriptorError::DuplicateValue { .. })
        ));
    }
}
