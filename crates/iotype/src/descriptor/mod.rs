// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors.
//!
//! A [`TypeDescriptor`] names a kind of live value, says how to validate it,
//! and says how to turn it into a state object and back. Descriptors form a
//! single-rooted hierarchy through an explicit `supertype` link; behavior not
//! defined at a level is looked up by walking that chain.
//!
//! # Example
//!
//! ```
//! use iotype::{leaves, ObjectHandle, TypeDescriptorBuilder, Value};
//! use serde_json::json;
//!
//! let particle = TypeDescriptorBuilder::new("ParticleIO")
//!     .field("x", leaves::number())
//!     .field("charged", leaves::boolean())
//!     .build()
//!     .unwrap();
//!
//! let live = ObjectHandle::new("ParticleIO").with("x", 2.5).with("charged", true);
//! let state = particle.to_state_object(&Value::from(live)).unwrap();
//! assert_eq!(state, json!({"x": 2.5, "charged": true}));
//! ```

mod builder;
mod options;
mod root;

pub use builder::TypeDescriptorBuilder;
pub use options::{MethodSpec, TypeOptions};

use crate::config::{self, ROOT_TYPE_NAME, TYPE_NAME_SUFFIX};
use crate::error::{DescriptorError, SchemaViolation, StateError};
use crate::schema::{SchemaCheck, SeenFields, StateSchema};
use crate::validator::Validator;
use crate::value::{ObjectHandle, Value, ValueKind};
use crate::StateObject;
use serde::{Deserialize, Serialize};
use serde_json::Map;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Serializes a live value.
pub type ToStateFn = Arc<dyn Fn(&Value) -> Result<StateObject, StateError> + Send + Sync>;
/// Builds a new live value from state.
pub type FromStateFn = Arc<dyn Fn(&StateObject) -> Result<Value, StateError> + Send + Sync>;
/// Mutates an existing live value to match state.
pub type ApplyStateFn = Arc<dyn Fn(&Value, &StateObject) -> Result<(), StateError> + Send + Sync>;
/// Maps state to the arguments a container needs to create a dynamic element.
pub type CreateArgumentsFn =
    Arc<dyn Fn(&StateObject) -> Result<Vec<Value>, StateError> + Send + Sync>;
/// Creates a named child inside a container from state.
pub type AddChildFn =
    Arc<dyn Fn(&Value, &str, &StateObject) -> Result<Value, StateError> + Send + Sync>;

/// How an orchestrator restores instances of a type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeserializationMode {
    /// A fresh value is constructed; no identity preserved.
    #[default]
    DataType,
    /// State carries an identifier that is resolved against a registry.
    ReferenceType,
    /// A container creates the instance from creation arguments.
    DynamicElement,
}

/// How a composite parent restores a field of this type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeserializationMethod {
    /// Replace the attribute with a freshly built value.
    #[default]
    FromStateObject,
    /// Mutate the existing attribute in place.
    ApplyState,
}

/// Runtime description of a serializable type.
pub struct TypeDescriptor {
    type_name: String,
    supertype: Option<Arc<TypeDescriptor>>,
    documentation: String,
    validator: Validator,
    state_schema: Option<StateSchema>,
    to_state: Option<ToStateFn>,
    from_state: Option<FromStateFn>,
    apply_state: Option<ApplyStateFn>,
    create_arguments: Option<CreateArgumentsFn>,
    add_child: Option<AddChildFn>,
    parameter_types: Vec<Arc<TypeDescriptor>>,
    deserialization_mode: DeserializationMode,
    default_deserialization_method: DeserializationMethod,
    methods: BTreeMap<String, MethodSpec>,
    method_order: Vec<String>,
    events: Vec<String>,
    metadata_defaults: Map<String, StateObject>,
    data_defaults: Map<String, StateObject>,
    is_function_type: bool,
}

impl TypeDescriptor {
    /// Build a descriptor. The supertype defaults to the root.
    ///
    /// Construction checks run when [`config::assertions_enabled`] is set.
    pub fn new(
        type_name: impl Into<String>,
        options: TypeOptions,
    ) -> Result<Arc<Self>, DescriptorError> {
        let supertype = options
            .supertype
            .clone()
            .unwrap_or_else(|| Self::root().clone());
        let descriptor = Self::assemble(type_name.into(), Some(supertype), options);
        if config::assertions_enabled() {
            descriptor.check_construction()?;
            if descriptor.is_stateless() {
                log::warn!(
                    "[iotype] {} defines no serialization; its instances serialize to null",
                    descriptor.type_name
                );
            }
        }
        Ok(Arc::new(descriptor))
    }

    fn assemble(
        type_name: String,
        supertype: Option<Arc<TypeDescriptor>>,
        options: TypeOptions,
    ) -> Self {
        let documentation = options
            .documentation
            .unwrap_or_else(|| format!("IO Type for {}", core_type_name(&type_name)));
        let validator = match (&options.validator, &options.state_schema, &supertype) {
            (Some(validator), _, _) => validator.clone(),
            (None, Some(schema), _) if schema.is_composite() => Validator::of_kind(ValueKind::Object),
            (None, _, Some(parent)) => parent.validator.clone(),
            (None, _, None) => Validator::any(),
        };
        Self {
            type_name,
            supertype,
            documentation,
            validator,
            state_schema: options.state_schema,
            to_state: options.to_state_object,
            from_state: options.from_state_object,
            apply_state: options.apply_state,
            create_arguments: options.state_object_to_create_element_arguments,
            add_child: options.add_child_element,
            parameter_types: options.parameter_types,
            deserialization_mode: options.deserialization_mode,
            default_deserialization_method: options.default_deserialization_method,
            methods: options.methods,
            method_order: options.method_order,
            events: options.events,
            metadata_defaults: options.metadata_defaults,
            data_defaults: options.data_defaults,
            is_function_type: options.is_function_type,
        }
    }

    fn check_construction(&self) -> Result<(), DescriptorError> {
        check_type_name(&self.type_name)?;

        let Some(supertype) = &self.supertype else {
            if self.type_name != ROOT_TYPE_NAME {
                return Err(DescriptorError::MissingSupertype(self.type_name.clone()));
            }
            return self.check_root();
        };

        if let Some(schema) = &self.state_schema {
            if !schema.is_composite() {
                if self.to_state.is_none() {
                    return Err(self.missing_serialization("toStateObject"));
                }
                if self.from_state.is_none() {
                    return Err(self.missing_serialization("fromStateObject"));
                }
            }
        }

        if self.documentation.trim().is_empty() {
            return Err(DescriptorError::EmptyDocumentation {
                type_name: self.type_name.clone(),
            });
        }

        if let Some(method) = self.method_order.iter().find(|m| !self.methods.contains_key(*m)) {
            return Err(DescriptorError::UnknownMethodInOrder {
                type_name: self.type_name.clone(),
                method: method.clone(),
            });
        }

        for ancestor in supertype.type_hierarchy() {
            if let Some(event) = self.events.iter().find(|e| ancestor.events.contains(e)) {
                return Err(DescriptorError::DuplicateEvent {
                    type_name: self.type_name.clone(),
                    event: event.clone(),
                    ancestor: ancestor.type_name.clone(),
                });
            }
            if let Some(method) = self.methods.keys().find(|m| ancestor.methods.contains_key(*m)) {
                return Err(DescriptorError::DuplicateMethod {
                    type_name: self.type_name.clone(),
                    method: method.clone(),
                    ancestor: ancestor.type_name.clone(),
                });
            }
        }

        let inherited = supertype.get_all_metadata_defaults();
        for (key, value) in &self.metadata_defaults {
            if inherited.get(key) == Some(value) {
                return Err(DescriptorError::RedundantMetadataDefault {
                    type_name: self.type_name.clone(),
                    key: key.clone(),
                });
            }
        }
        Ok(())
    }

    fn missing_serialization(&self, function: &'static str) -> DescriptorError {
        DescriptorError::MissingSerialization {
            type_name: self.type_name.clone(),
            function,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Unique type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Parent type (`None` only for the root).
    pub fn supertype(&self) -> Option<&Arc<TypeDescriptor>> {
        self.supertype.as_ref()
    }

    /// Returns `true` for the root descriptor.
    pub fn is_root(&self) -> bool {
        self.supertype.is_none()
    }

    /// Documentation text.
    pub fn documentation(&self) -> &str {
        &self.documentation
    }

    /// Validator for live values.
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// State schema declared at this level.
    pub fn state_schema(&self) -> Option<&StateSchema> {
        self.state_schema.as_ref()
    }

    /// Parameter descriptors of a parametric type, in order.
    pub fn parameter_types(&self) -> &[Arc<TypeDescriptor>] {
        &self.parameter_types
    }

    /// Restoration strategy for orchestrators.
    pub fn deserialization_mode(&self) -> DeserializationMode {
        self.deserialization_mode
    }

    /// How a composite parent restores fields of this type.
    pub fn default_deserialization_method(&self) -> DeserializationMethod {
        self.default_deserialization_method
    }

    /// Methods declared at this level.
    pub fn methods(&self) -> &BTreeMap<String, MethodSpec> {
        &self.methods
    }

    /// Documentation order of methods.
    pub fn method_order(&self) -> &[String] {
        &self.method_order
    }

    /// Events declared at this level.
    pub fn events(&self) -> &[String] {
        &self.events
    }

    /// Metadata defaults declared at this level.
    pub fn metadata_defaults(&self) -> &Map<String, StateObject> {
        &self.metadata_defaults
    }

    /// Data defaults declared at this level.
    pub fn data_defaults(&self) -> &Map<String, StateObject> {
        &self.data_defaults
    }

    /// Returns `true` if this type describes functions.
    pub fn is_function_type(&self) -> bool {
        self.is_function_type
    }

    // -----------------------------------------------------------------------
    // Hierarchy
    // -----------------------------------------------------------------------

    /// This descriptor followed by each ancestor up to the root.
    pub fn type_hierarchy(&self) -> impl Iterator<Item = &TypeDescriptor> {
        std::iter::successors(Some(self), |d| d.supertype.as_deref())
    }

    /// Returns `true` if `other` is this descriptor or one of its ancestors.
    pub fn extends(&self, other: &TypeDescriptor) -> bool {
        self.type_hierarchy().any(|d| std::ptr::eq(d, other))
    }

    /// Metadata defaults of the whole chain; descendants win on collision.
    pub fn get_all_metadata_defaults(&self) -> Map<String, StateObject> {
        self.merged(|d| &d.metadata_defaults)
    }

    /// Data defaults of the whole chain; descendants win on collision.
    pub fn get_all_data_defaults(&self) -> Map<String, StateObject> {
        self.merged(|d| &d.data_defaults)
    }

    fn merged(&self, table: impl Fn(&Self) -> &Map<String, StateObject>) -> Map<String, StateObject> {
        let chain: Vec<&Self> = self.type_hierarchy().collect();
        let mut out = Map::new();
        for level in chain.into_iter().rev() {
            for (k, v) in table(level) {
                out.insert(k.clone(), v.clone());
            }
        }
        out
    }

    /// Descriptors referenced by this level's composite schema.
    pub fn related_types(&self) -> Vec<Arc<TypeDescriptor>> {
        self.state_schema
            .as_ref()
            .map(StateSchema::related_types)
            .unwrap_or_default()
    }

    /// Composite schemas in the chain from `self` upward, root-most first.
    fn composite_levels(&self) -> Vec<&StateSchema> {
        let mut levels: Vec<&StateSchema> = self
            .type_hierarchy()
            .filter_map(|d| d.state_schema.as_ref())
            .filter(|s| s.is_composite())
            .collect();
        levels.reverse();
        levels
    }

    /// Returns `true` if no level below the root defines serialization, so
    /// instances go through the root's stateless functions.
    pub fn is_stateless(&self) -> bool {
        self.defining_level(|d| d.to_state.is_some() || d.has_composite_schema())
            .is_root()
    }

    fn has_composite_schema(&self) -> bool {
        self.state_schema.as_ref().is_some_and(StateSchema::is_composite)
    }

    /// First level, starting here, that defines behavior selected by `defines`.
    fn defining_level(&self, defines: impl Fn(&Self) -> bool) -> &Self {
        self.type_hierarchy()
            .find(|d| defines(d))
            .unwrap_or_else(|| Self::root().as_ref())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Returns `true` if the live value satisfies this type's validator.
    pub fn is_value_valid(&self, value: &Value) -> bool {
        self.validator.is_valid(value)
    }

    fn check_value(&self, value: &Value) -> Result<(), StateError> {
        self.validator.check(value).map_err(|reason| {
            log::warn!("[iotype] {} rejected value: {}", self.type_name, reason);
            StateError::InvalidValue {
                type_name: self.type_name.clone(),
                reason,
            }
        })
    }

    /// Walk the hierarchy checking `state`, collecting claimed keys in `seen`.
    ///
    /// The first value schema gives a definite answer. If every level defers,
    /// a composite state is valid only when each of its keys was claimed.
    pub fn check_state_object(
        &self,
        state: &StateObject,
        seen: &mut SeenFields,
    ) -> Result<(), SchemaViolation> {
        for level in self.type_hierarchy() {
            if let Some(schema) = &level.state_schema {
                match schema.check_state_object_valid(state, seen) {
                    SchemaCheck::Valid => return Ok(()),
                    SchemaCheck::Invalid(violation) => return Err(violation),
                    SchemaCheck::Defer => {}
                }
            }
        }
        if let Some(map) = state.as_object() {
            let keys: Vec<String> = map.keys().filter(|k| !seen.contains(*k)).cloned().collect();
            if !keys.is_empty() {
                return Err(SchemaViolation::UnexpectedKeys { keys });
            }
        }
        Ok(())
    }

    /// Returns `true` if `state` matches the schemas of the whole hierarchy.
    pub fn is_state_object_valid(&self, state: &StateObject) -> bool {
        self.check_state_object(state, &mut SeenFields::new()).is_ok()
    }

    /// Like [`is_state_object_valid`](Self::is_state_object_valid), but
    /// reports why the state was rejected.
    pub fn validate_state_object(&self, state: &StateObject) -> Result<(), StateError> {
        self.check_state_object(state, &mut SeenFields::new())
            .map_err(|violation| {
                log::warn!("[iotype] {} rejected state object: {}", self.type_name, violation);
                StateError::InvalidState {
                    type_name: self.type_name.clone(),
                    violation,
                }
            })
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Serialize a live value.
    ///
    /// When this level contributes serialization (an override or a schema),
    /// the produced state is validated before it is returned.
    pub fn to_state_object(&self, instance: &Value) -> Result<StateObject, StateError> {
        self.check_value(instance)?;
        let level = self.defining_level(|d| d.to_state.is_some() || d.has_composite_schema());
        let state = match &level.to_state {
            Some(to_state) => to_state(instance)?,
            None => {
                let mut out = Map::new();
                for schema in level.composite_levels() {
                    schema.default_to_state_object(&self.type_name, instance, &mut out)?;
                }
                StateObject::Object(out)
            }
        };
        if self.to_state.is_some() || self.state_schema.is_some() {
            self.validate_state_object(&state)?;
        }
        Ok(state)
    }

    /// Build a new live value from state. Never reuses an existing instance,
    /// except that reference types resolve to the registered one.
    pub fn from_state_object(&self, state: &StateObject) -> Result<Value, StateError> {
        if self.from_state.is_some() || self.state_schema.is_some() {
            self.validate_state_object(state)?;
        }
        let level = self.defining_level(|d| d.from_state.is_some() || d.has_composite_schema());
        let value = match &level.from_state {
            Some(from_state) => from_state(state)?,
            None => {
                let object = ObjectHandle::new(self.type_name.clone());
                for schema in level.composite_levels() {
                    schema.default_from_state_object(&self.type_name, state, &object)?;
                }
                Value::Object(object)
            }
        };
        self.check_value(&value)?;
        Ok(value)
    }

    /// Mutate an existing live value to match state.
    pub fn apply_state(&self, instance: &Value, state: &StateObject) -> Result<(), StateError> {
        self.check_value(instance)?;
        if self.apply_state.is_some() || self.state_schema.is_some() {
            self.validate_state_object(state)?;
        }
        let level = self.defining_level(|d| d.apply_state.is_some() || d.has_composite_schema());
        match &level.apply_state {
            Some(apply_state) => apply_state(instance, state),
            None => {
                for schema in level.composite_levels() {
                    schema.default_apply_state(&self.type_name, instance, state)?;
                }
                Ok(())
            }
        }
    }

    /// Creation arguments a container uses to build a dynamic element.
    pub fn state_object_to_create_element_arguments(
        &self,
        state: &StateObject,
    ) -> Result<Vec<Value>, StateError> {
        let level = self.defining_level(|d| d.create_arguments.is_some());
        match &level.create_arguments {
            Some(create_arguments) => create_arguments(state),
            None => Ok(Vec::new()),
        }
    }

    /// Ask a container of this type to create the child `name` from state.
    pub fn add_child_element(
        &self,
        container: &Value,
        name: &str,
        state: &StateObject,
    ) -> Result<Value, StateError> {
        match self.type_hierarchy().find_map(|d| d.add_child.as_ref()) {
            Some(add_child) => add_child(container, name, state),
            None => Err(StateError::Unsupported {
                type_name: self.type_name.clone(),
                operation: "addChildElement",
            }),
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &self.type_name)
            .field(
                "supertype",
                &self.supertype.as_ref().map(|s| s.type_name.as_str()),
            )
            .field(
                "parameter_types",
                &self
                    .parameter_types
                    .iter()
                    .map(|p| p.type_name.as_str())
                    .collect::<Vec<_>>(),
            )
            .field("state_schema", &self.state_schema)
            .field("deserialization_mode", &self.deserialization_mode)
            .finish_non_exhaustive()
    }
}

/// Name without parameters, e.g. `ArrayIO` for `ArrayIO<NumberIO>`.
fn core_type_name(type_name: &str) -> &str {
    type_name
        .split(['<', '('])
        .next()
        .unwrap_or(type_name)
}

fn check_type_name(type_name: &str) -> Result<(), DescriptorError> {
    if type_name.is_empty() {
        return Err(DescriptorError::EmptyName);
    }
    if type_name.contains('.') {
        return Err(DescriptorError::NameContainsSeparator(type_name.to_string()));
    }
    if !core_type_name(type_name).ends_with(TYPE_NAME_SUFFIX) {
        return Err(DescriptorError::MissingSuffix {
            name: type_name.to_string(),
            suffix: TYPE_NAME_SUFFIX,
        });
    }
    Ok(())
}
