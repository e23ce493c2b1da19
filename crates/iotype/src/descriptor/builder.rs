// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for TypeDescriptor.

use super::{
    DeserializationMethod, DeserializationMode, MethodSpec, TypeDescriptor, TypeOptions,
};
use crate::error::{DescriptorError, StateError};
use crate::schema::StateSchema;
use crate::validator::Validator;
use crate::value::Value;
use crate::StateObject;
use std::sync::Arc;

/// Builder for creating TypeDescriptor instances.
///
/// Fields added with [`field`](Self::field) accumulate into a composite state
/// schema; [`value_schema`](Self::value_schema) replaces them with a value
/// schema instead.
#[derive(Debug)]
pub struct TypeDescriptorBuilder {
    name: String,
    fields: Vec<(String, Arc<TypeDescriptor>)>,
    options: TypeOptions,
}

impl TypeDescriptorBuilder {
    /// Create a new builder for a subtype of the root.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            options: TypeOptions::default(),
        }
    }

    /// Set the parent type.
    pub fn supertype(mut self, supertype: Arc<TypeDescriptor>) -> Self {
        self.options.supertype = Some(supertype);
        self
    }

    pub fn documentation(mut self, documentation: impl Into<String>) -> Self {
        self.options.documentation = Some(documentation.into());
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.options.validator = Some(validator);
        self
    }

    /// Add a composite field. A leading `_` marks a private attribute.
    pub fn field(mut self, name: impl Into<String>, descriptor: Arc<TypeDescriptor>) -> Self {
        self.fields.push((name.into(), descriptor));
        self
    }

    /// Use a prebuilt state schema. Discards fields added so far.
    pub fn state_schema(mut self, schema: StateSchema) -> Self {
        self.fields.clear();
        self.options.state_schema = Some(schema);
        self
    }

    /// Add a serialization override.
    pub fn to_state_object(
        mut self,
        f: impl Fn(&Value) -> Result<StateObject, StateError> + Send + Sync + 'static,
    ) -> Self {
        self.options.to_state_object = Some(Arc::new(f));
        self
    }

    pub fn from_state_object(
        mut self,
        f: impl Fn(&StateObject) -> Result<Value, StateError> + Send + Sync + 'static,
    ) -> Self {
        self.options.from_state_object = Some(Arc::new(f));
        self
    }

    pub fn apply_state(
        mut self,
        f: impl Fn(&Value, &StateObject) -> Result<(), StateError> + Send + Sync + 'static,
    ) -> Self {
        self.options.apply_state = Some(Arc::new(f));
        self
    }

    /// Map state to the arguments a container needs to create an element.
    pub fn create_element_arguments(
        mut self,
        f: impl Fn(&StateObject) -> Result<Vec<Value>, StateError> + Send + Sync + 'static,
    ) -> Self {
        self.options.state_object_to_create_element_arguments = Some(Arc::new(f));
        self
    }

    /// Let containers of this type create named children from state.
    pub fn add_child_element(
        mut self,
        f: impl Fn(&Value, &str, &StateObject) -> Result<Value, StateError> + Send + Sync + 'static,
    ) -> Self {
        self.options.add_child_element = Some(Arc::new(f));
        self
    }

    pub fn deserialization_mode(mut self, mode: DeserializationMode) -> Self {
        self.options.deserialization_mode = mode;
        self
    }

    pub fn default_deserialization_method(mut self, method: DeserializationMethod) -> Self {
        self.options.default_deserialization_method = method;
        self
    }

    /// Declare a method. Methods are listed in `method_order` as declared.
    pub fn method(mut self, name: impl Into<String>, spec: MethodSpec) -> Self {
        let name = name.into();
        self.options.method_order.push(name.clone());
        self.options.methods.insert(name, spec);
        self
    }

    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.options.events.push(event.into());
        self
    }

    pub fn metadata_default(mut self, key: impl Into<String>, value: StateObject) -> Self {
        self.options.metadata_defaults.insert(key.into(), value);
        self
    }

    pub fn data_default(mut self, key: impl Into<String>, value: StateObject) -> Self {
        self.options.data_defaults.insert(key.into(), value);
        self
    }

    /// Build the TypeDescriptor.
    pub fn build(mut self) -> Result<Arc<TypeDescriptor>, DescriptorError> {
        if !self.fields.is_empty() {
            self.options.state_schema = Some(StateSchema::composite(self.fields)?);
        }
        TypeDescriptor::new(self.name, self.options)
    }
}
