// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `ArrayIO<T>`: ordered collections whose elements are all `T`.

use super::cache::{DescriptorKey, TypeCache};
use crate::descriptor::{TypeDescriptor, TypeOptions};
use crate::error::{DescriptorError, StateError};
use crate::schema::StateSchema;
use crate::validator::{StateValidator, Validator};
use crate::value::{Value, ValueKind};
use crate::StateObject;
use std::sync::{Arc, OnceLock};

/// Constructor for `ArrayIO<T>`.
#[derive(Debug)]
pub struct CollectionTypes {
    cache: TypeCache<DescriptorKey>,
}

impl Default for CollectionTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionTypes {
    pub fn new() -> Self {
        Self {
            cache: TypeCache::new("ArrayIO"),
        }
    }

    /// Process-wide instance.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<CollectionTypes> = OnceLock::new();
        GLOBAL.get_or_init(Self::new)
    }

    pub fn cache(&self) -> &TypeCache<DescriptorKey> {
        &self.cache
    }

    /// Canonical `ArrayIO<element>`.
    pub fn of(&self, element: &Arc<TypeDescriptor>) -> Result<Arc<TypeDescriptor>, DescriptorError> {
        self.cache
            .get_or_try_build(DescriptorKey::from(element), || build(element))
    }
}

fn build(element: &Arc<TypeDescriptor>) -> Result<Arc<TypeDescriptor>, DescriptorError> {
    let type_name = format!("ArrayIO<{}>", element.type_name());

    let validator = {
        let element = Arc::clone(element);
        Validator::of_kind(ValueKind::Array).with_predicate(move |value| {
            value
                .as_array()
                .is_some_and(|items| items.iter().all(|item| element.is_value_valid(item)))
        })
    };

    let schema = {
        let element = Arc::clone(element);
        StateSchema::as_value(
            format!("Array<{}>", element.type_name()),
            StateValidator::from_predicate(move |state| {
                state
                    .as_array()
                    .is_some_and(|items| items.iter().all(|item| element.is_state_object_valid(item)))
            }),
        )
    };

    let to_state = {
        let element = Arc::clone(element);
        let type_name = type_name.clone();
        move |value: &Value| -> Result<StateObject, StateError> {
            let items = value.as_array().ok_or_else(|| StateError::InvalidValue {
                type_name: type_name.clone(),
                reason: format!("expected array, found {}", value.describe()),
            })?;
            items
                .iter()
                .map(|item| element.to_state_object(item))
                .collect::<Result<Vec<_>, _>>()
                .map(StateObject::Array)
        }
    };

    let from_state = {
        let element = Arc::clone(element);
        let type_name = type_name.clone();
        move |state: &StateObject| -> Result<Value, StateError> {
            let items = state
                .as_array()
                .ok_or_else(|| StateError::failed(type_name.clone(), "expected an array state"))?;
            items
                .iter()
                .map(|item| element.from_state_object(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
    };

    TypeDescriptor::new(
        type_name,
        TypeOptions {
            documentation: Some(format!(
                "IO Type for arrays. Each element is serialized with {}.",
                element.type_name()
            )),
            validator: Some(validator),
            state_schema: Some(schema),
            to_state_object: Some(Arc::new(to_state)),
            from_state_object: Some(Arc::new(from_state)),
            parameter_types: vec![Arc::clone(element)],
            ..TypeOptions::default()
        },
    )
}
