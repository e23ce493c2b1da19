// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `OrIO<A, B, ...>`: a value of one of several types.
//!
//! The first type, in declaration order, whose validator accepts a value
//! serializes it. The state records that type's ordinal, so declaration
//! order is part of the union's identity.

use super::cache::{DescriptorKey, TypeCache};
use super::join_names;
use crate::descriptor::{TypeDescriptor, TypeOptions};
use crate::error::{DescriptorError, StateError};
use crate::schema::StateSchema;
use crate::validator::{StateValidator, Validator};
use crate::value::Value;
use crate::StateObject;
use serde_json::Map;
use std::sync::{Arc, OnceLock};

/// State key holding the ordinal of the serializing type.
pub const UNION_INDEX_KEY: &str = "index";
/// State key holding that type's own state.
pub const UNION_STATE_KEY: &str = "state";

/// Constructor for `OrIO<...>`.
#[derive(Debug)]
pub struct UnionTypes {
    cache: TypeCache<Vec<DescriptorKey>>,
}

impl Default for UnionTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl UnionTypes {
    pub fn new() -> Self {
        Self {
            cache: TypeCache::new("OrIO"),
        }
    }

    /// Process-wide instance.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<UnionTypes> = OnceLock::new();
        GLOBAL.get_or_init(Self::new)
    }

    pub fn cache(&self) -> &TypeCache<Vec<DescriptorKey>> {
        &self.cache
    }

    /// Canonical union of `types`, in the given order.
    pub fn of(&self, types: &[Arc<TypeDescriptor>]) -> Result<Arc<TypeDescriptor>, DescriptorError> {
        if types.is_empty() {
            return Err(DescriptorError::EmptyParameters { constructor: "OrIO" });
        }
        let key = types.iter().map(DescriptorKey::from).collect();
        self.cache.get_or_try_build(key, || build(types))
    }
}

/// Split a union state into its ordinal and inner state.
fn decode(state: &StateObject, arity: usize) -> Option<(usize, &StateObject)> {
    let map = state.as_object()?;
    if map.len() != 2 {
        return None;
    }
    let index = usize::try_from(map.get(UNION_INDEX_KEY)?.as_u64()?).ok()?;
    let inner = map.get(UNION_STATE_KEY)?;
    (index < arity).then_some((index, inner))
}

fn build(types: &[Arc<TypeDescriptor>]) -> Result<Arc<TypeDescriptor>, DescriptorError> {
    let names = join_names(types);
    let type_name = format!("OrIO<{}>", names);
    let types: Arc<[Arc<TypeDescriptor>]> = types.into();

    let validator = {
        let types = Arc::clone(&types);
        Validator::from_predicate(move |value| types.iter().any(|t| t.is_value_valid(value)))
            .with_message(format!("expected one of {}", names))
    };

    let schema = {
        let types = Arc::clone(&types);
        StateSchema::as_value(
            format!("{{ index: number, state: {} }}", names.replace(", ", " | ")),
            StateValidator::from_predicate(move |state| {
                decode(state, types.len())
                    .is_some_and(|(index, inner)| types[index].is_state_object_valid(inner))
            }),
        )
    };

    let to_state = {
        let types = Arc::clone(&types);
        let type_name = type_name.clone();
        move |value: &Value| -> Result<StateObject, StateError> {
            let (index, member) = types
                .iter()
                .enumerate()
                .find(|(_, t)| t.is_value_valid(value))
                .ok_or_else(|| StateError::InvalidValue {
                    type_name: type_name.clone(),
                    reason: format!("no member type accepts {}", value.describe()),
                })?;
            let mut out = Map::new();
            out.insert(UNION_INDEX_KEY.to_string(), StateObject::from(index));
            out.insert(UNION_STATE_KEY.to_string(), member.to_state_object(value)?);
            Ok(StateObject::Object(out))
        }
    };

    let from_state = {
        let types = Arc::clone(&types);
        let type_name = type_name.clone();
        move |state: &StateObject| -> Result<Value, StateError> {
            let (index, inner) = decode(state, types.len()).ok_or_else(|| {
                StateError::failed(type_name.clone(), "expected {index, state} with a valid index")
            })?;
            types[index].from_state_object(inner)
        }
    };

    TypeDescriptor::new(
        type_name,
        TypeOptions {
            documentation: Some(format!(
                "IO Type for a union of {}. The first matching type serializes the value.",
                names
            )),
            validator: Some(validator),
            state_schema: Some(schema),
            to_state_object: Some(Arc::new(to_state)),
            from_state_object: Some(Arc::new(from_state)),
            parameter_types: types.to_vec(),
            ..TypeOptions::default()
        },
    )
}
