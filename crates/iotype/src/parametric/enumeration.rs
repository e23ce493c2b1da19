// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `EnumerationIO(A|B|...)`: members of a closed [`Enumeration`].
//!
//! A member serializes to its key. Restoring returns the enumeration's own
//! singleton, so identity comparisons keep working after a restore.

use super::cache::{ArcKey, TypeCache};
use super::check_distinct;
use crate::descriptor::{TypeDescriptor, TypeOptions};
use crate::error::{DescriptorError, StateError};
use crate::schema::StateSchema;
use crate::validator::{StateKind, StateValidator, Validator};
use crate::value::{Enumeration, Value, ValueKind};
use crate::StateObject;
use std::sync::{Arc, OnceLock};

/// Constructor for `EnumerationIO(...)`.
#[derive(Debug)]
pub struct EnumerationTypes {
    cache: TypeCache<ArcKey<Enumeration>>,
}

impl Default for EnumerationTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl EnumerationTypes {
    pub fn new() -> Self {
        Self {
            cache: TypeCache::new("EnumerationIO"),
        }
    }

    /// Process-wide instance.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<EnumerationTypes> = OnceLock::new();
        GLOBAL.get_or_init(Self::new)
    }

    pub fn cache(&self) -> &TypeCache<ArcKey<Enumeration>> {
        &self.cache
    }

    /// Canonical descriptor for `enumeration`.
    ///
    /// Two enumerations with the same keys are still different types.
    pub fn of(
        &self,
        enumeration: &Arc<Enumeration>,
    ) -> Result<Arc<TypeDescriptor>, DescriptorError> {
        check_distinct("EnumerationIO", enumeration.keys())?;
        self.cache
            .get_or_try_build(ArcKey(Arc::clone(enumeration)), || build(enumeration))
    }
}

fn build(enumeration: &Arc<Enumeration>) -> Result<Arc<TypeDescriptor>, DescriptorError> {
    let keys = enumeration.keys().collect::<Vec<_>>().join("|");
    let type_name = format!("EnumerationIO({})", keys);

    let validator = {
        let enumeration = Arc::clone(enumeration);
        Validator::of_kind(ValueKind::Enum)
            .with_predicate(move |value| value.as_enum().is_some_and(|m| enumeration.contains(m)))
            .with_message(format!("expected a member of {}", keys))
    };

    let to_state = {
        let type_name = type_name.clone();
        move |value: &Value| -> Result<StateObject, StateError> {
            let member = value.as_enum().ok_or_else(|| StateError::InvalidValue {
                type_name: type_name.clone(),
                reason: format!("expected an enumeration member, found {}", value.describe()),
            })?;
            Ok(StateObject::String(member.key().to_string()))
        }
    };

    let from_state = {
        let enumeration = Arc::clone(enumeration);
        let type_name = type_name.clone();
        move |state: &StateObject| -> Result<Value, StateError> {
            let key = state.as_str().unwrap_or_default();
            enumeration
                .get(key)
                .map(|member| Value::Enum(Arc::clone(member)))
                .ok_or_else(|| StateError::UnrecognizedKey {
                    type_name: type_name.clone(),
                    key: key.to_string(),
                })
        }
    };

    TypeDescriptor::new(
        type_name,
        TypeOptions {
            documentation: Some(format!("Possible values: {}.", keys.replace('|', ", "))),
            validator: Some(validator),
            // Membership is checked on restore so unknown keys are reported as such.
            state_schema: Some(StateSchema::as_value(
                keys.clone(),
                StateValidator::of_kind(StateKind::String),
            )),
            to_state_object: Some(Arc::new(to_state)),
            from_state_object: Some(Arc::new(from_state)),
            ..TypeOptions::default()
        },
    )
}
