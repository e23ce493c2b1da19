// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The root of every descriptor hierarchy.

use super::{TypeDescriptor, TypeOptions};
use crate::config::ROOT_TYPE_NAME;
use crate::error::{DescriptorError, StateError};
use crate::validator::Validator;
use crate::value::Value;
use crate::StateObject;
use serde_json::{json, Map};
use std::sync::{Arc, OnceLock};

/// Metadata every element inherits unless a subtype overrides it.
fn root_metadata_defaults() -> Map<String, StateObject> {
    let defaults = json!({
        "typeName": ROOT_TYPE_NAME,
        "documentation": "",
        "state": true,
        "readOnly": false,
        "eventType": "MODEL",
        "highFrequency": false,
        "playback": false,
        "dynamicElement": false,
        "isArchetype": false,
        "featured": false,
        "designed": false,
    });
    match defaults {
        StateObject::Object(map) => map,
        _ => Map::new(),
    }
}

fn to_null(_: &Value) -> Result<StateObject, StateError> {
    Ok(StateObject::Null)
}

fn refuse_from_state(_: &StateObject) -> Result<Value, StateError> {
    Err(StateError::Unsupported {
        type_name: ROOT_TYPE_NAME.to_string(),
        operation: "fromStateObject",
    })
}

fn ignore_state(_: &Value, _: &StateObject) -> Result<(), StateError> {
    Ok(())
}

fn no_arguments(_: &StateObject) -> Result<Vec<Value>, StateError> {
    Ok(Vec::new())
}

fn build_root() -> TypeDescriptor {
    let mut data_defaults = Map::new();
    data_defaults.insert("initialState".to_string(), StateObject::Null);

    let options = TypeOptions {
        documentation: Some(
            "The root of all IO Types. Stateless: its instances serialize to null.".to_string(),
        ),
        validator: Some(Validator::any()),
        to_state_object: Some(Arc::new(to_null)),
        from_state_object: Some(Arc::new(refuse_from_state)),
        apply_state: Some(Arc::new(ignore_state)),
        state_object_to_create_element_arguments: Some(Arc::new(no_arguments)),
        metadata_defaults: root_metadata_defaults(),
        data_defaults,
        ..TypeOptions::default()
    };
    TypeDescriptor::assemble(ROOT_TYPE_NAME.to_string(), None, options)
}

impl TypeDescriptor {
    /// The process-wide root descriptor, `ObjectIO`.
    pub fn root() -> &'static Arc<TypeDescriptor> {
        static ROOT: OnceLock<Arc<TypeDescriptor>> = OnceLock::new();
        ROOT.get_or_init(|| {
            log::debug!("[iotype] initializing root type {}", ROOT_TYPE_NAME);
            Arc::new(build_root())
        })
    }

    /// The root must define every lifecycle function itself.
    pub(super) fn check_root(&self) -> Result<(), DescriptorError> {
        let missing = if self.to_state.is_none() {
            Some("toStateObject")
        } else if self.from_state.is_none() {
            Some("fromStateObject")
        } else if self.apply_state.is_none() {
            Some("applyState")
        } else if self.create_arguments.is_none() {
            Some("stateObjectToCreateElementArguments")
        } else {
            None
        };
        match missing {
            Some(function) => Err(DescriptorError::IncompleteRoot {
                type_name: self.type_name.clone(),
                function,
            }),
            None => Ok(()),
        }
    }
}
