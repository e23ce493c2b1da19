// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `NullableIO<T>`: `T` or null. Null never reaches `T`'s functions.

use super::cache::{DescriptorKey, TypeCache};
use crate::descriptor::{TypeDescriptor, TypeOptions};
use crate::error::{DescriptorError, StateError};
use crate::schema::{abbreviate, StateSchema};
use crate::validator::{StateValidator, Validator};
use crate::value::Value;
use crate::StateObject;
use std::sync::{Arc, OnceLock};

/// Constructor for `NullableIO<T>`.
#[derive(Debug)]
pub struct NullableTypes {
    cache: TypeCache<DescriptorKey>,
}

impl Default for NullableTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl NullableTypes {
    pub fn new() -> Self {
        Self {
            cache: TypeCache::new("NullableIO"),
        }
    }

    /// Process-wide instance.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<NullableTypes> = OnceLock::new();
        GLOBAL.get_or_init(Self::new)
    }

    pub fn cache(&self) -> &TypeCache<DescriptorKey> {
        &self.cache
    }

    /// Canonical `NullableIO<inner>`.
    pub fn of(&self, inner: &Arc<TypeDescriptor>) -> Result<Arc<TypeDescriptor>, DescriptorError> {
        self.cache
            .get_or_try_build(DescriptorKey::from(inner), || build(inner))
    }
}

fn build(inner: &Arc<TypeDescriptor>) -> Result<Arc<TypeDescriptor>, DescriptorError> {
    let validator = {
        let inner = Arc::clone(inner);
        Validator::from_predicate(move |value| value.is_null() || inner.is_value_valid(value))
    };

    let schema = {
        let inner = Arc::clone(inner);
        StateSchema::as_value(
            format!("null | {}", inner.type_name()),
            StateValidator::from_predicate(move |state| {
                state.is_null() || inner.is_state_object_valid(state)
            }),
        )
    };

    let to_state = {
        let inner = Arc::clone(inner);
        move |value: &Value| -> Result<StateObject, StateError> {
            if value.is_null() {
                Ok(StateObject::Null)
            } else {
                inner.to_state_object(value)
            }
        }
    };

    let from_state = {
        let inner = Arc::clone(inner);
        move |state: &StateObject| -> Result<Value, StateError> {
            if state.is_null() {
                Ok(Value::Null)
            } else {
                inner.from_state_object(state)
            }
        }
    };

    // A null on one side only needs a replacement, which the owner does.
    let apply_state = {
        let inner = Arc::clone(inner);
        let type_name = format!("NullableIO<{}>", inner.type_name());
        move |value: &Value, state: &StateObject| -> Result<(), StateError> {
            match (value.is_null(), state.is_null()) {
                (true, true) => Ok(()),
                (false, false) => inner.apply_state(value, state),
                _ => Err(StateError::failed(
                    type_name.clone(),
                    format!(
                        "cannot apply {} in place over {}",
                        abbreviate(state),
                        value.describe()
                    ),
                )),
            }
        }
    };

    TypeDescriptor::new(
        format!("NullableIO<{}>", inner.type_name()),
        TypeOptions {
            documentation: Some(format!(
                "A wrapper for {} that also allows null.",
                inner.type_name()
            )),
            validator: Some(validator),
            state_schema: Some(schema),
            to_state_object: Some(Arc::new(to_state)),
            from_state_object: Some(Arc::new(from_state)),
            apply_state: Some(Arc::new(apply_state)),
            parameter_types: vec![Arc::clone(inner)],
            default_deserialization_method: inner.default_deserialization_method(),
            ..TypeOptions::default()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DeserializationMethod, TypeDescriptorBuilder};
    use crate::value::ObjectHandle;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_null_bypasses_inner_functions() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (to_calls, from_calls) = (Arc::clone(&calls), Arc::clone(&calls));
        let counted = TypeDescriptorBuilder::new("CountedIO")
            .to_state_object(move |_| {
                to_calls.fetch_add(1, Ordering::SeqCst);
                Ok(json!("counted"))
            })
            .from_state_object(move |_| {
                from_calls.fetch_add(1, Ordering::SeqCst);
                Ok(Value::from("counted"))
            })
            .build()
            .expect("CountedIO");

        let nullable = NullableTypes::new().of(&counted).expect("nullable");
        assert_eq!(nullable.type_name(), "NullableIO<CountedIO>");
        assert_eq!(nullable.to_state_object(&Value::Null).expect("null"), StateObject::Null);
        assert_eq!(nullable.from_state_object(&StateObject::Null).expect("null"), Value::Null);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        nullable.to_state_object(&Value::from("x")).expect("delegates");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_non_null_values_follow_inner_rules() {
        let nullable = NullableTypes::new().of(&crate::leaves::number()).expect("nullable");
        assert!(nullable.is_value_valid(&Value::Null));
        assert!(nullable.is_value_valid(&Value::from(1.0)));
        assert!(!nullable.is_value_valid(&Value::from("1")));
        assert!(nullable.is_state_object_valid(&json!(null)));
        assert!(!nullable.is_state_object_valid(&json!(true)));
    }

    fn room_type(nullables: &NullableTypes) -> (Arc<TypeDescriptor>, Arc<TypeDescriptor>) {
        let wall = TypeDescriptorBuilder::new("WallIO")
            .field("height", crate::leaves::number())
            .default_deserialization_method(DeserializationMethod::ApplyState)
            .build()
            .expect("WallIO");
        let nullable = nullables.of(&wall).expect("nullable");
        assert_eq!(
            nullable.default_deserialization_method(),
            DeserializationMethod::ApplyState
        );
        let room = TypeDescriptorBuilder::new("RoomIO")
            .field("wall", nullable)
            .build()
            .expect("RoomIO");
        (wall, room)
    }

    #[test]
    fn test_apply_null_state_clears_attribute() {
        let (_, room) = room_type(&NullableTypes::new());
        let wall = ObjectHandle::new("WallIO").with("height", 1.0);
        let live = ObjectHandle::new("RoomIO").with("wall", wall);

        room.apply_state(&Value::from(live.clone()), &json!({"wall": null}))
            .expect("apply");
        assert_eq!(live.get("wall"), Some(Value::Null));
        assert_eq!(
            room.to_state_object(&Value::from(live)).expect("to_state"),
            json!({"wall": null})
        );
    }

    #[test]
    fn test_apply_state_over_null_attribute_builds_value() {
        let (_, room) = room_type(&NullableTypes::new());
        let live = ObjectHandle::new("RoomIO").with("wall", Value::Null);

        room.apply_state(&Value::from(live.clone()), &json!({"wall": {"height": 5.0}}))
            .expect("apply");
        assert_eq!(
            room.to_state_object(&Value::from(live)).expect("to_state"),
            json!({"wall": {"height": 5.0}})
        );
    }

    #[test]
    fn test_apply_state_keeps_identity_when_both_present() {
        let (_, room) = room_type(&NullableTypes::new());
        let wall = ObjectHandle::new("WallIO").with("height", 1.0);
        let live = ObjectHandle::new("RoomIO").with("wall", wall.clone());

        room.apply_state(&Value::from(live.clone()), &json!({"wall": {"height": 2.0}}))
            .expect("apply");
        assert_eq!(live.get("wall"), Some(Value::from(wall.clone())));
        assert_eq!(wall.get("height"), Some(Value::Number(2.0)));
    }

    #[test]
    fn test_direct_apply_rejects_null_mismatch() {
        let nullables = NullableTypes::new();
        let (wall_type, _) = room_type(&nullables);
        let nullable = nullables.of(&wall_type).expect("nullable");
        let wall = Value::from(ObjectHandle::new("WallIO").with("height", 1.0));

        assert!(nullable.apply_state(&Value::Null, &json!(null)).is_ok());
        assert!(matches!(
            nullable.apply_state(&wall, &json!(null)),
            Err(StateError::Failed { .. })
        ));
        assert!(matches!(
            nullable.apply_state(&Value::Null, &json!({"height": 5.0})),
            Err(StateError::Failed { .. })
        ));
    }
}
