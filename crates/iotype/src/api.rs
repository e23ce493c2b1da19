// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! API descriptions for documentation and introspection tooling.
//!
//! [`TypeDescriptor::api`] summarizes one descriptor; [`TypeCatalog`]
//! gathers every descriptor reachable from a set of roots and emits them as
//! one JSON document keyed by type name.
//!
//! # Example
//!
//! ```
//! use iotype::{leaves, parametric, TypeCatalog};
//!
//! let mut catalog = TypeCatalog::new();
//! catalog.add(&parametric::array_of(&leaves::number()).unwrap()).unwrap();
//!
//! let names: Vec<_> = catalog.names().collect();
//! assert_eq!(names, ["ArrayIO<NumberIO>", "NumberIO", "ObjectIO"]);
//! ```

use crate::descriptor::{DeserializationMode, MethodSpec, TypeDescriptor};
use crate::error::DescriptorError;
use crate::StateObject;
use serde::Serialize;
use serde_json::Map;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Serializable summary of one descriptor level.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeApi {
    pub type_name: String,
    pub documentation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supertype: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameter_types: Vec<String>,
    pub methods: BTreeMap<String, MethodApi>,
    pub method_order: Vec<String>,
    pub events: Vec<String>,
    pub metadata_defaults: Map<String, StateObject>,
    pub data_defaults: Map<String, StateObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_schema: Option<StateObject>,
    pub deserialization_mode: DeserializationMode,
    #[serde(skip_serializing_if = "is_false")]
    pub is_function_type: bool,
}

fn is_false(flag: &bool) -> bool {
    !flag
}

/// Serializable summary of a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodApi {
    pub return_type: String,
    pub parameter_types: Vec<String>,
    pub documentation: String,
    pub invocable_for_read_only: bool,
}

impl From<&MethodSpec> for MethodApi {
    fn from(spec: &MethodSpec) -> Self {
        Self {
            return_type: spec.return_type.type_name().to_string(),
            parameter_types: names(&spec.parameter_types),
            documentation: spec.documentation.clone(),
            invocable_for_read_only: spec.invocable_for_read_only,
        }
    }
}

fn names(types: &[Arc<TypeDescriptor>]) -> Vec<String> {
    types.iter().map(|t| t.type_name().to_string()).collect()
}

impl TypeDescriptor {
    /// API summary of this level. Defaults are this level's own; use
    /// [`get_all_metadata_defaults`](Self::get_all_metadata_defaults) for the
    /// merged view.
    pub fn api(&self) -> TypeApi {
        TypeApi {
            type_name: self.type_name().to_string(),
            documentation: self.documentation().to_string(),
            supertype: self.supertype().map(|s| s.type_name().to_string()),
            parameter_types: names(self.parameter_types()),
            methods: self
                .methods()
                .iter()
                .map(|(name, spec)| (name.clone(), MethodApi::from(spec)))
                .collect(),
            method_order: self.method_order().to_vec(),
            events: self.events().to_vec(),
            metadata_defaults: self.metadata_defaults().clone(),
            data_defaults: self.data_defaults().clone(),
            state_schema: self.state_schema().map(|s| s.describe()),
            deserialization_mode: self.deserialization_mode(),
            is_function_type: self.is_function_type(),
        }
    }
}

// ---------------------------------------------------------------------------
// TypeCatalog
// ---------------------------------------------------------------------------

/// Every descriptor reachable from the added ones, by type name.
#[derive(Debug, Default)]
pub struct TypeCatalog {
    types: BTreeMap<String, Arc<TypeDescriptor>>,
}

impl TypeCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `descriptor` and everything it refers to: supertypes, parameter
    /// types, schema field types and method signature types.
    ///
    /// Fails if a different descriptor already uses one of the names.
    pub fn add(&mut self, descriptor: &Arc<TypeDescriptor>) -> Result<(), DescriptorError> {
        let mut pending = vec![Arc::clone(descriptor)];
        while let Some(next) = pending.pop() {
            if let Some(existing) = self.types.get(next.type_name()) {
                if Arc::ptr_eq(existing, &next) {
                    continue;
                }
                return Err(DescriptorError::DuplicateTypeName(next.type_name().to_string()));
            }

            pending.extend(next.supertype().cloned());
            pending.extend(next.parameter_types().iter().cloned());
            pending.extend(next.related_types());
            for spec in next.methods().values() {
                pending.push(Arc::clone(&spec.return_type));
                pending.extend(spec.parameter_types.iter().cloned());
            }

            log::trace!("[iotype] catalog added {}", next.type_name());
            self.types.insert(next.type_name().to_string(), next);
        }
        Ok(())
    }

    pub fn get(&self, type_name: &str) -> Option<&Arc<TypeDescriptor>> {
        self.types.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Type names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// API summaries keyed by type name.
    pub fn apis(&self) -> BTreeMap<String, TypeApi> {
        self.types
            .iter()
            .map(|(name, descriptor)| (name.clone(), descriptor.api()))
            .collect()
    }

    /// The whole catalog as `{"types": {name: api, ...}}`.
    pub fn to_json(&self) -> serde_json::Result<StateObject> {
        let mut out = Map::new();
        out.insert("types".to_string(), serde_json::to_value(self.apis())?);
        Ok(StateObject::Object(out))
    }
}
