// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types.
//!
//! Construction problems are [`DescriptorError`]s. Everything that can go
//! wrong while serializing or restoring is a [`StateError`]; of those, only
//! [`StateError::NotYetAvailable`] is worth retrying.

use thiserror::Error;

/// Author errors detected while building a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("type name must not be empty")]
    EmptyName,

    #[error("type name '{0}' must not contain '.'")]
    NameContainsSeparator(String),

    #[error("type name '{name}' must end with '{suffix}'")]
    MissingSuffix { name: String, suffix: &'static str },

    #[error("'{0}' has no supertype; only the root may omit one")]
    MissingSupertype(String),

    #[error("{type_name}: {function} must be provided for a value state schema")]
    MissingSerialization {
        type_name: String,
        function: &'static str,
    },

    #[error("{type_name}: root type must define {function} directly")]
    IncompleteRoot {
        type_name: String,
        function: &'static str,
    },

    #[error("{type_name}: event '{event}' is already declared by ancestor {ancestor}")]
    DuplicateEvent {
        type_name: String,
        event: String,
        ancestor: String,
    },

    #[error("{type_name}: method '{method}' is already declared by ancestor {ancestor}")]
    DuplicateMethod {
        type_name: String,
        method: String,
        ancestor: String,
    },

    #[error("{type_name}: method order lists unknown method '{method}'")]
    UnknownMethodInOrder { type_name: String, method: String },

    #[error("{type_name}: documentation must not be empty")]
    EmptyDocumentation { type_name: String },

    #[error("{type_name}: metadata default '{key}' repeats the value inherited from an ancestor")]
    RedundantMetadataDefault { type_name: String, key: String },

    #[error("state schema declares field '{0}' more than once")]
    DuplicateField(String),

    #[error("state schema field '{0}' is malformed")]
    MalformedField(String),

    #[error("{constructor} requires at least one parameter")]
    EmptyParameters { constructor: &'static str },

    #[error("{constructor}: value '{value}' is declared more than once")]
    DuplicateValue {
        constructor: &'static str,
        value: String,
    },

    #[error("two different descriptors share the type name '{0}'")]
    DuplicateTypeName(String),
}

/// Why a state object does not match a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("expected a composite state object, found {found}")]
    NotAnObject { found: String },

    #[error("missing field '{field}'")]
    MissingField { field: String },

    #[error("field '{field}' is not a valid {type_name} state")]
    InvalidField { field: String, type_name: String },

    #[error("value {found} does not match {label}")]
    ValueRejected { label: String, found: String },

    #[error("keys not declared by any schema in the hierarchy: {}", .keys.join(", "))]
    UnexpectedKeys { keys: Vec<String> },
}

/// Errors raised while serializing or restoring state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StateError {
    #[error("{type_name}: {reason}")]
    InvalidValue { type_name: String, reason: String },

    #[error("{type_name}: state object rejected: {violation}")]
    InvalidState {
        type_name: String,
        violation: SchemaViolation,
    },

    #[error("{type_name}: live object has no attribute '{attribute}'")]
    MissingAttribute {
        type_name: String,
        attribute: String,
    },

    #[error("{type_name}: unrecognized key '{key}'")]
    UnrecognizedKey { type_name: String, key: String },

    #[error("{type_name}: {operation} is not supported")]
    Unsupported {
        type_name: String,
        operation: &'static str,
    },

    #[error("{type_name}: cannot reference an object without a stable identifier")]
    Unidentified { type_name: String },

    #[error("instance '{id}' is not yet available")]
    NotYetAvailable { id: String },

    #[error("{type_name}: {message}")]
    Failed { type_name: String, message: String },
}

impl StateError {
    /// Returns `true` for the retryable "not yet available" condition.
    pub fn is_not_yet_available(&self) -> bool {
        matches!(self, Self::NotYetAvailable { .. })
    }

    /// Returns `true` for every permanent failure.
    pub fn is_validation_failure(&self) -> bool {
        !self.is_not_yet_available()
    }

    /// Convenience constructor for errors raised by custom serialization functions.
    pub fn failed(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            type_name: type_name.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_yet_available_is_not_a_validation_failure() {
        let err = StateError::NotYetAvailable {
            id: "sim.model.ball".into(),
        };
        assert!(err.is_not_yet_available());
        assert!(!err.is_validation_failure());
        assert!(err.to_string().contains("sim.model.ball"));
    }

    #[test]
    fn violation_messages_name_the_field() {
        let err = StateError::InvalidState {
            type_name: "ParticleIO".into(),
            violation: SchemaViolation::MissingField { field: "x".into() },
        };
        assert!(err.is_validation_failure());
        assert_eq!(
            err.to_string(),
            "ParticleIO: state object rejected: missing field 'x'"
        );

        let extra = SchemaViolation::UnexpectedKeys {
            keys: vec!["a".into(), "b".into()],
        };
        assert!(extra.to_string().ends_with("a, b"));
    }
}
