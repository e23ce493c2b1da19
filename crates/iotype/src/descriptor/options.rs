// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Construction options for [`TypeDescriptor`](super::TypeDescriptor).

use super::{
    AddChildFn, ApplyStateFn, CreateArgumentsFn, DeserializationMethod, DeserializationMode,
    FromStateFn, ToStateFn, TypeDescriptor,
};
use crate::schema::StateSchema;
use crate::validator::Validator;
use crate::StateObject;
use serde_json::Map;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Every setting a descriptor can be built with.
///
/// All fields are optional; `TypeOptions::default()` describes a stateless
/// subtype of the root that inherits everything.
#[derive(Clone, Default)]
pub struct TypeOptions {
    /// Parent type. Default: the root.
    pub supertype: Option<Arc<TypeDescriptor>>,
    /// Default: `"IO Type for <core name>"`.
    pub documentation: Option<String>,
    /// Default: object-kind for composite schemas, otherwise the supertype's.
    pub validator: Option<Validator>,
    /// Default: none (stateless at this level).
    pub state_schema: Option<StateSchema>,
    /// Default: inherited, or derived from a composite schema.
    pub to_state_object: Option<ToStateFn>,
    /// Default: inherited, or derived from a composite schema.
    pub from_state_object: Option<FromStateFn>,
    /// Default: inherited, or derived from a composite schema.
    pub apply_state: Option<ApplyStateFn>,
    /// Default: inherited (the root yields no arguments).
    pub state_object_to_create_element_arguments: Option<CreateArgumentsFn>,
    /// Default: inherited; unsupported when nothing in the chain defines it.
    pub add_child_element: Option<AddChildFn>,
    /// Default: empty.
    pub parameter_types: Vec<Arc<TypeDescriptor>>,
    /// Default: [`DeserializationMode::DataType`].
    pub deserialization_mode: DeserializationMode,
    /// Default: [`DeserializationMethod::FromStateObject`].
    pub default_deserialization_method: DeserializationMethod,
    /// Default: none.
    pub methods: BTreeMap<String, MethodSpec>,
    /// Default: empty. Every entry must name a method in `methods`.
    pub method_order: Vec<String>,
    /// Default: none. Must not repeat an ancestor's event.
    pub events: Vec<String>,
    /// Default: empty. Merged over ancestors' defaults.
    pub metadata_defaults: Map<String, StateObject>,
    /// Default: empty. Merged over ancestors' defaults.
    pub data_defaults: Map<String, StateObject>,
    /// Default: false.
    pub is_function_type: bool,
}

impl fmt::Debug for TypeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeOptions")
            .field("supertype", &self.supertype.as_ref().map(|s| s.type_name()))
            .field("documentation", &self.documentation)
            .field("state_schema", &self.state_schema)
            .field("to_state_object", &self.to_state_object.is_some())
            .field("from_state_object", &self.from_state_object.is_some())
            .field("apply_state", &self.apply_state.is_some())
            .field("deserialization_mode", &self.deserialization_mode)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

/// Metadata for a method callable on instances of a type.
///
/// Documentation only; descriptors do not invoke methods.
#[derive(Debug, Clone)]
pub struct MethodSpec {
    pub return_type: Arc<TypeDescriptor>,
    pub parameter_types: Vec<Arc<TypeDescriptor>>,
    pub documentation: String,
    /// May be invoked on read-only elements.
    pub invocable_for_read_only: bool,
}

impl MethodSpec {
    /// Method returning `return_type` and taking no parameters.
    pub fn new(return_type: Arc<TypeDescriptor>, documentation: impl Into<String>) -> Self {
        Self {
            return_type,
            parameter_types: Vec::new(),
            documentation: documentation.into(),
            invocable_for_read_only: false,
        }
    }

    /// Set the parameter types.
    pub fn with_parameters(mut self, parameter_types: Vec<Arc<TypeDescriptor>>) -> Self {
        self.parameter_types = parameter_types;
        self
    }

    /// Allow invoking on read-only elements.
    pub fn invocable_for_read_only(mut self) -> Self {
        self.invocable_for_read_only = true;
        self
    }
}
