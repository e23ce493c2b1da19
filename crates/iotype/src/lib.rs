// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # iotype - runtime type descriptors and state serialization
//!
//! Every serializable kind of live value is described by a
//! [`TypeDescriptor`]: a name, a validator, an optional [`StateSchema`], and
//! the functions that turn a value into a JSON state object and back.
//! Descriptors form a single-rooted hierarchy and are composed through
//! memoized parametric constructors.
//!
//! ## Quick Start
//!
//! ```rust
//! use iotype::{leaves, parametric, ObjectHandle, TypeDescriptorBuilder, Value};
//! use serde_json::json;
//!
//! let ball = TypeDescriptorBuilder::new("BallIO")
//!     .field("radius", leaves::number())
//!     .field("tags", parametric::array_of(&leaves::string()).unwrap())
//!     .build()
//!     .unwrap();
//!
//! let live = ObjectHandle::new("BallIO")
//!     .with("radius", 0.5)
//!     .with("tags", vec!["red", "bouncy"]);
//! let state = ball.to_state_object(&Value::from(live)).unwrap();
//! assert_eq!(state, json!({"radius": 0.5, "tags": ["red", "bouncy"]}));
//!
//! let restored = ball.from_state_object(&state).unwrap();
//! assert_eq!(ball.to_state_object(&restored).unwrap(), state);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |  parametric: ArrayIO | MapIO | NullableIO | OrIO | ReferenceIO | ... |
//! |              (one memoized cache per constructor)                   |
//! +---------------------------------------------------------------------+
//! |  descriptor: TypeDescriptor, root ObjectIO, hierarchy walk          |
//! +---------------------------------------------------------------------+
//! |  schema: value / composite StateSchema   |  leaves: BooleanIO, ...  |
//! +---------------------------------------------------------------------+
//! |  value: live Value model   |  validator   |  error   |  config      |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Deserialization strategies
//!
//! | Mode | Restore |
//! |------|---------|
//! | [`DeserializationMode::DataType`] | build a fresh value |
//! | [`DeserializationMode::ReferenceType`] | look the identifier up in an [`InstanceRegistry`]; may report "not yet available" |
//! | [`DeserializationMode::DynamicElement`] | a container creates the element from [`TypeDescriptor::state_object_to_create_element_arguments`] |
//!
//! ## Modules Overview
//!
//! - [`descriptor`] - TypeDescriptor, options and builder (start here)
//! - [`schema`] - state schemas
//! - [`leaves`] - primitive descriptors
//! - [`parametric`] - parametric constructors and their caches
//! - [`registry`] - identifier lookup for reference types
//! - [`api`] - API summaries and catalogs
//! - [`config`] - runtime configuration

pub mod api;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod leaves;
pub mod parametric;
pub mod registry;
pub mod schema;
pub mod validator;
pub mod value;

/// Serialized form of a value.
pub type StateObject = serde_json::Value;

pub use api::{MethodApi, TypeApi, TypeCatalog};
pub use config::RuntimeConfig;
pub use descriptor::{
    DeserializationMethod, DeserializationMode, MethodSpec, TypeDescriptor,
    TypeDescriptorBuilder, TypeOptions,
};
pub use error::{DescriptorError, SchemaViolation, StateError};
pub use registry::{HashMapInstanceRegistry, InstanceRegistry};
pub use schema::{SchemaCheck, SchemaField, StateSchema};
pub use validator::{StateKind, StateValidator, Validator};
pub use value::{
    EnumMember, Enumeration, FunctionHandle, MapValue, ObjectHandle, Value, ValueKind,
};
