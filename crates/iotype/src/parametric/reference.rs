// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `ReferenceIO<T>`: serializes a registered instance by its identifier.
//!
//! Restoring looks the identifier up in an [`InstanceRegistry`] and returns
//! the registered instance itself. A missing registration is reported as
//! [`StateError::NotYetAvailable`], which is retryable; every other failure
//! is a validation error.

use super::cache::{DescriptorKey, TypeCache};
use crate::descriptor::{DeserializationMode, TypeDescriptor, TypeOptions};
use crate::error::{DescriptorError, StateError};
use crate::leaves;
use crate::registry::{self, InstanceRegistry};
use crate::schema::StateSchema;
use crate::value::Value;
use crate::StateObject;
use serde_json::Map;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// State key holding the referenced instance's identifier.
pub const REFERENCE_ID_KEY: &str = "id";

/// Constructor for `ReferenceIO<T>`, bound to one registry.
pub struct ReferenceTypes {
    cache: TypeCache<DescriptorKey>,
    registry: Arc<dyn InstanceRegistry>,
}

impl ReferenceTypes {
    /// Resolve references against `registry`.
    pub fn with_registry(registry: Arc<dyn InstanceRegistry>) -> Self {
        Self {
            cache: TypeCache::new("ReferenceIO"),
            registry,
        }
    }

    /// Process-wide instance, bound to [`registry::global`].
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<ReferenceTypes> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            let registry: Arc<dyn InstanceRegistry> = registry::global().clone();
            Self::with_registry(registry)
        })
    }

    pub fn cache(&self) -> &TypeCache<DescriptorKey> {
        &self.cache
    }

    pub fn registry(&self) -> &Arc<dyn InstanceRegistry> {
        &self.registry
    }

    /// Canonical `ReferenceIO<target>`.
    pub fn of(&self, target: &Arc<TypeDescriptor>) -> Result<Arc<TypeDescriptor>, DescriptorError> {
        self.cache.get_or_try_build(DescriptorKey::from(target), || {
            build(target, Arc::clone(&self.registry))
        })
    }
}

impl fmt::Debug for ReferenceTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceTypes")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

fn build(
    target: &Arc<TypeDescriptor>,
    registry: Arc<dyn InstanceRegistry>,
) -> Result<Arc<TypeDescriptor>, DescriptorError> {
    let type_name = format!("ReferenceIO<{}>", target.type_name());

    let to_state = {
        let type_name = type_name.clone();
        move |value: &Value| -> Result<StateObject, StateError> {
            let object = value.as_object().ok_or_else(|| StateError::InvalidValue {
                type_name: type_name.clone(),
                reason: format!("only objects can be referenced, found {}", value.describe()),
            })?;
            let id = object.id().ok_or_else(|| StateError::Unidentified {
                type_name: type_name.clone(),
            })?;
            let mut out = Map::new();
            out.insert(REFERENCE_ID_KEY.to_string(), StateObject::String(id));
            Ok(StateObject::Object(out))
        }
    };

    let from_state = {
        let type_name = type_name.clone();
        move |state: &StateObject| -> Result<Value, StateError> {
            let id = state
                .get(REFERENCE_ID_KEY)
                .and_then(StateObject::as_str)
                .ok_or_else(|| StateError::failed(type_name.clone(), "missing identifier"))?;
            registry.lookup(id).ok_or_else(|| {
                log::debug!("[iotype] {} is not yet available", id);
                StateError::NotYetAvailable { id: id.to_string() }
            })
        }
    };

    let apply_state = {
        let type_name = type_name.clone();
        move |_: &Value, _: &StateObject| -> Result<(), StateError> {
            Err(StateError::Unsupported {
                type_name: type_name.clone(),
                operation: "applyState",
            })
        }
    };

    TypeDescriptor::new(
        type_name,
        TypeOptions {
            documentation: Some(format!(
                "Uses reference identity to serialize and deserialize {}.",
                target.type_name()
            )),
            validator: Some(target.validator().clone()),
            state_schema: Some(StateSchema::composite([(REFERENCE_ID_KEY, leaves::string())])?),
            to_state_object: Some(Arc::new(to_state)),
            from_state_object: Some(Arc::new(from_state)),
            apply_state: Some(Arc::new(apply_state)),
            parameter_types: vec![Arc::clone(target)],
            deserialization_mode: DeserializationMode::ReferenceType,
            ..TypeOptions::default()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeDescriptorBuilder;
    use crate::registry::HashMapInstanceRegistry;
    use crate::value::ObjectHandle;
    use serde_json::json;

    fn ball_type() -> Arc<TypeDescriptor> {
        TypeDescriptorBuilder::new("BallIO")
            .field("radius", leaves::number())
            .build()
            .expect("BallIO")
    }

    fn private_references() -> (Arc<HashMapInstanceRegistry>, ReferenceTypes) {
        let registry = Arc::new(HashMapInstanceRegistry::new());
        let references = ReferenceTypes::with_registry(registry.clone());
        (registry, references)
    }

    #[test]
    fn test_serializes_identifier_only() {
        let (_, references) = private_references();
        let reference = references.of(&ball_type()).expect("reference");
        assert_eq!(reference.deserialization_mode(), DeserializationMode::ReferenceType);

        let ball = ObjectHandle::with_id("BallIO", "sim.ball").with("radius", 2.0);
        let state = reference.to_state_object(&Value::from(ball)).expect("to_state");
        assert_eq!(state, json!({"id": "sim.ball"}));
    }

    #[test]
    fn test_resolves_to_the_registered_instance() {
        let (registry, references) = private_references();
        let reference = references.of(&ball_type()).expect("reference");
        let state = json!({"id": "sim.ball"});

        let err = reference.from_state_object(&state).unwrap_err();
        assert_eq!(err, StateError::NotYetAvailable { id: "sim.ball".into() });
        assert!(!err.is_validation_failure());

        let ball = ObjectHandle::with_id("BallIO", "sim.ball").with("radius", 2.0);
        registry.register_object(&ball);
        let restored = reference.from_state_object(&state).expect("resolved");
        assert_eq!(restored, Value::from(ball));
    }

    #[test]
    fn test_reference_failures_are_validation_errors() {
        let (_, references) = private_references();
        let reference = references.of(&ball_type()).expect("reference");

        let anonymous = ObjectHandle::new("BallIO");
        let err = reference.to_state_object(&Value::from(anonymous)).unwrap_err();
        assert!(matches!(err, StateError::Unidentified { .. }));

        let err = reference.from_state_object(&json!({"id": 7})).unwrap_err();
        assert!(err.is_validation_failure());

        let err = reference
            .apply_state(&Value::from(ObjectHandle::new("BallIO")), &json!({"id": "x"}))
            .unwrap_err();
        assert!(matches!(err, StateError::Unsupported { operation: "applyState", .. }));
    }

    #[test]
    fn test_each_registry_has_its_own_cache() {
        let ball = ball_type();
        let (_, first) = private_references();
        let (_, second) = private_references();
        let a = first.of(&ball).expect("a");
        assert!(Arc::ptr_eq(&a, &first.of(&ball).expect("a again")));
        assert!(!Arc::ptr_eq(&a, &second.of(&ball).expect("b")));
    }
}
