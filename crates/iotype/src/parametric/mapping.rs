// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `MapIO<K, V>`: keyed structures serialized as ordered `[key, value]` pairs.

use super::cache::{DescriptorKey, TypeCache};
use crate::descriptor::{TypeDescriptor, TypeOptions};
use crate::error::{DescriptorError, StateError};
use crate::schema::{abbreviate, StateSchema};
use crate::validator::{StateValidator, Validator};
use crate::value::{MapValue, Value, ValueKind};
use crate::StateObject;
use std::sync::{Arc, OnceLock};

/// Constructor for `MapIO<K, V>`.
#[derive(Debug)]
pub struct MappingTypes {
    cache: TypeCache<(DescriptorKey, DescriptorKey)>,
}

impl Default for MappingTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl MappingTypes {
    pub fn new() -> Self {
        Self {
            cache: TypeCache::new("MapIO"),
        }
    }

    /// Process-wide instance.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<MappingTypes> = OnceLock::new();
        GLOBAL.get_or_init(Self::new)
    }

    pub fn cache(&self) -> &TypeCache<(DescriptorKey, DescriptorKey)> {
        &self.cache
    }

    /// Canonical `MapIO<key, value>`.
    pub fn of(
        &self,
        key: &Arc<TypeDescriptor>,
        value: &Arc<TypeDescriptor>,
    ) -> Result<Arc<TypeDescriptor>, DescriptorError> {
        self.cache.get_or_try_build(
            (DescriptorKey::from(key), DescriptorKey::from(value)),
            || build(key, value),
        )
    }
}

fn is_pair_state(key: &TypeDescriptor, value: &TypeDescriptor, state: &StateObject) -> bool {
    match state.as_array().map(Vec::as_slice) {
        Some([k, v]) => key.is_state_object_valid(k) && value.is_state_object_valid(v),
        _ => false,
    }
}

fn build(
    key: &Arc<TypeDescriptor>,
    value: &Arc<TypeDescriptor>,
) -> Result<Arc<TypeDescriptor>, DescriptorError> {
    let type_name = format!("MapIO<{}, {}>", key.type_name(), value.type_name());

    let validator = {
        let (key, value) = (Arc::clone(key), Arc::clone(value));
        Validator::of_kind(ValueKind::Map).with_predicate(move |map| {
            map.as_map().is_some_and(|entries| {
                entries
                    .iter()
                    .all(|(k, v)| key.is_value_valid(k) && value.is_value_valid(v))
            })
        })
    };

    let schema = {
        let (key, value) = (Arc::clone(key), Arc::clone(value));
        StateSchema::as_value(
            format!("Array<[{}, {}]>", key.type_name(), value.type_name()),
            StateValidator::from_predicate(move |state| {
                state
                    .as_array()
                    .is_some_and(|pairs| pairs.iter().all(|pair| is_pair_state(&key, &value, pair)))
            }),
        )
    };

    let to_state = {
        let (key, value) = (Arc::clone(key), Arc::clone(value));
        let type_name = type_name.clone();
        move |map: &Value| -> Result<StateObject, StateError> {
            let entries = map.as_map().ok_or_else(|| StateError::InvalidValue {
                type_name: type_name.clone(),
                reason: format!("expected map, found {}", map.describe()),
            })?;
            let mut pairs = Vec::with_capacity(entries.len());
            for (k, v) in entries.iter() {
                pairs.push(StateObject::Array(vec![
                    key.to_state_object(k)?,
                    value.to_state_object(v)?,
                ]));
            }
            Ok(StateObject::Array(pairs))
        }
    };

    let from_state = {
        let (key, value) = (Arc::clone(key), Arc::clone(value));
        let type_name = type_name.clone();
        move |state: &StateObject| -> Result<Value, StateError> {
            let pairs = state
                .as_array()
                .ok_or_else(|| StateError::failed(type_name.clone(), "expected an array of pairs"))?;
            let mut map = MapValue::new();
            for pair in pairs {
                let Some([k, v]) = pair.as_array().map(Vec::as_slice) else {
                    return Err(StateError::failed(type_name.clone(), "expected a [key, value] pair"));
                };
                let restored = key.from_state_object(k)?;
                if map.get(&restored).is_some() {
                    return Err(StateError::failed(
                        type_name.clone(),
                        format!("key {} appears more than once", abbreviate(k)),
                    ));
                }
                map.insert(restored, value.from_state_object(v)?);
            }
            Ok(Value::Map(map))
        }
    };

    TypeDescriptor::new(
        type_name,
        TypeOptions {
            documentation: Some(format!(
                "IO Type for maps. Keys are serialized with {}, values with {}.",
                key.type_name(),
                value.type_name()
            )),
            validator: Some(validator),
            state_schema: Some(schema),
            to_state_object: Some(Arc::new(to_state)),
            from_state_object: Some(Arc::new(from_state)),
            parameter_types: vec![Arc::clone(key), Arc::clone(value)],
            ..TypeOptions::default()
        },
    )
}
