// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! State schemas: the expected shape of a state object.
//!
//! A *value* schema is a bare validator over the state object plus a label
//! for documentation. A *composite* schema names fields, each bound to the
//! descriptor that serializes it, and supplies default serialization for
//! live objects.
//!
//! Field names may carry a leading `_` marker. A marked field `_value` reads
//! and writes the live attribute `_value` but appears in state as `value`.

use crate::descriptor::{DeserializationMethod, TypeDescriptor};
use crate::error::{DescriptorError, SchemaViolation, StateError};
use crate::validator::{StateKind, StateValidator};
use crate::value::{ObjectHandle, Value};
use crate::StateObject;
use serde_json::Map;
use std::collections::BTreeSet;
use std::sync::Arc;

/// State keys claimed by composite schemas during a hierarchy walk.
pub type SeenFields = BTreeSet<String>;

/// Outcome of checking one schema level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaCheck {
    /// Definitely valid; no further levels need to be consulted.
    Valid,
    /// Definitely invalid.
    Invalid(SchemaViolation),
    /// This level is satisfied; keep walking toward the root.
    Defer,
}

/// One field of a composite schema.
#[derive(Debug, Clone)]
pub struct SchemaField {
    declared: String,
    state_key: String,
    descriptor: Arc<TypeDescriptor>,
}

impl SchemaField {
    /// Name as declared, including any `_` marker.
    pub fn declared_name(&self) -> &str {
        &self.declared
    }

    /// Key used in the state object.
    pub fn state_key(&self) -> &str {
        &self.state_key
    }

    /// Descriptor that serializes this field.
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// Returns `true` if the field was declared with the `_` marker.
    pub fn is_marked(&self) -> bool {
        self.declared != self.state_key
    }

    /// Live attribute this field reads from `object`.
    ///
    /// Marked fields always use the declared name. Unmarked fields use `key`,
    /// falling back to `_key` only when the object has just the underscored one.
    pub fn accessor_name(&self, object: &ObjectHandle) -> String {
        if self.is_marked() || object.has(&self.state_key) {
            return self.declared.clone();
        }
        let underscored = format!("_{}", self.state_key);
        if object.has(&underscored) {
            underscored
        } else {
            self.state_key.clone()
        }
    }
}

/// Expected shape of a state object.
#[derive(Debug, Clone)]
pub enum StateSchema {
    /// Opaque validator over the whole state object.
    Value {
        label: String,
        validator: StateValidator,
    },
    /// Named fields, in declaration order.
    Composite { fields: Vec<SchemaField> },
}

impl StateSchema {
    /// Value schema for leaf shapes.
    pub fn as_value(label: impl Into<String>, validator: StateValidator) -> Self {
        Self::Value {
            label: label.into(),
            validator,
        }
    }

    /// Composite schema from `(field name, descriptor)` pairs.
    pub fn composite<I, S>(fields: I) -> Result<Self, DescriptorError>
    where
        I: IntoIterator<Item = (S, Arc<TypeDescriptor>)>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for (name, descriptor) in fields {
            let declared: String = name.into();
            if declared.starts_with("__") {
                return Err(DescriptorError::MalformedField(declared));
            }
            let state_key = declared.strip_prefix('_').unwrap_or(&declared).to_string();
            if state_key.is_empty() {
                return Err(DescriptorError::MalformedField(declared));
            }
            if !seen.insert(state_key.clone()) {
                return Err(DescriptorError::DuplicateField(state_key));
            }
            out.push(SchemaField {
                declared,
                state_key,
                descriptor,
            });
        }
        Ok(Self::Composite { fields: out })
    }

    /// Discriminates the two variants.
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Composite { .. })
    }

    /// Composite fields (empty for a value schema).
    pub fn fields(&self) -> &[SchemaField] {
        match self {
            Self::Composite { fields } => fields,
            Self::Value { .. } => &[],
        }
    }

    /// Value-schema label.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Value { label, .. } => Some(label),
            Self::Composite { .. } => None,
        }
    }

    /// Serialize each declared field of `instance` into `out`.
    pub fn default_to_state_object(
        &self,
        owner: &str,
        instance: &Value,
        out: &mut Map<String, StateObject>,
    ) -> Result<(), StateError> {
        let fields = self.require_composite(owner, "default toStateObject")?;
        let object = live_object(owner, instance)?;
        for field in fields {
            let accessor = field.accessor_name(object);
            let attribute = object
                .get(&accessor)
                .ok_or_else(|| StateError::MissingAttribute {
                    type_name: owner.to_string(),
                    attribute: accessor.clone(),
                })?;
            let state = field.descriptor.to_state_object(&attribute)?;
            out.insert(field.state_key.clone(), state);
        }
        Ok(())
    }

    /// Populate a freshly created `object` from `state`.
    pub fn default_from_state_object(
        &self,
        owner: &str,
        state: &StateObject,
        object: &ObjectHandle,
    ) -> Result<(), StateError> {
        let fields = self.require_composite(owner, "default fromStateObject")?;
        let map = state_map(owner, state)?;
        for field in fields {
            let sub_state = field_state(owner, map, field)?;
            let value = field.descriptor.from_state_object(sub_state)?;
            object.set(field.declared.clone(), value);
        }
        Ok(())
    }

    /// Apply `state` to an existing live object.
    ///
    /// Fields whose descriptor prefers `fromStateObject` are replaced with a
    /// fresh value. Fields preferring `applyState` are mutated in place, so
    /// outside references to them stay valid, unless the live value or the
    /// state is null, in which case the attribute is replaced.
    pub fn default_apply_state(
        &self,
        owner: &str,
        instance: &Value,
        state: &StateObject,
    ) -> Result<(), StateError> {
        let fields = self.require_composite(owner, "default applyState")?;
        let object = live_object(owner, instance)?;
        let map = state_map(owner, state)?;
        for field in fields {
            let sub_state = field_state(owner, map, field)?;
            let accessor = field.accessor_name(object);
            match field.descriptor.default_deserialization_method() {
                DeserializationMethod::FromStateObject => {
                    let fresh = field.descriptor.from_state_object(sub_state)?;
                    object.set(accessor, fresh);
                }
                DeserializationMethod::ApplyState => {
                    // Clone the attribute out so no lock is held while recursing.
                    let existing =
                        object
                            .get(&accessor)
                            .ok_or_else(|| StateError::MissingAttribute {
                                type_name: owner.to_string(),
                                attribute: accessor.clone(),
                            })?;
                    // Null on either side cannot be mutated into the other.
                    if existing.is_null() || sub_state.is_null() {
                        let fresh = field.descriptor.from_state_object(sub_state)?;
                        object.set(accessor, fresh);
                    } else {
                        field.descriptor.apply_state(&existing, sub_state)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Check one level of the hierarchy.
    ///
    /// Composite levels record the keys they claim into `seen` and defer to
    /// the next level; value levels give a definite answer.
    pub fn check_state_object_valid(&self, state: &StateObject, seen: &mut SeenFields) -> SchemaCheck {
        match self {
            Self::Value { label, validator } => {
                if validator.is_valid(state) {
                    SchemaCheck::Valid
                } else {
                    SchemaCheck::Invalid(SchemaViolation::ValueRejected {
                        label: label.clone(),
                        found: abbreviate(state),
                    })
                }
            }
            Self::Composite { fields } => {
                let Some(map) = state.as_object() else {
                    return SchemaCheck::Invalid(SchemaViolation::NotAnObject {
                        found: abbreviate(state),
                    });
                };
                for field in fields {
                    let Some(sub_state) = map.get(&field.state_key) else {
                        return SchemaCheck::Invalid(SchemaViolation::MissingField {
                            field: field.state_key.clone(),
                        });
                    };
                    seen.insert(field.state_key.clone());
                    if !field.descriptor.is_state_object_valid(sub_state) {
                        return SchemaCheck::Invalid(SchemaViolation::InvalidField {
                            field: field.state_key.clone(),
                            type_name: field.descriptor.type_name().to_string(),
                        });
                    }
                }
                SchemaCheck::Defer
            }
        }
    }

    /// Descriptors referenced by composite fields, in declaration order.
    pub fn related_types(&self) -> Vec<Arc<TypeDescriptor>> {
        self.fields().iter().map(|f| f.descriptor.clone()).collect()
    }

    /// Documentation form: the label, or a map of state key to type name.
    pub fn describe(&self) -> StateObject {
        match self {
            Self::Value { label, .. } => StateObject::String(label.clone()),
            Self::Composite { fields } => StateObject::Object(
                fields
                    .iter()
                    .map(|f| {
                        (
                            f.state_key.clone(),
                            StateObject::String(f.descriptor.type_name().to_string()),
                        )
                    })
                    .collect(),
            ),
        }
    }

    fn require_composite(
        &self,
        owner: &str,
        operation: &'static str,
    ) -> Result<&[SchemaField], StateError> {
        match self {
            Self::Composite { fields } => Ok(fields),
            Self::Value { .. } => Err(StateError::Unsupported {
                type_name: owner.to_string(),
                operation,
            }),
        }
    }
}

fn live_object<'a>(owner: &str, instance: &'a Value) -> Result<&'a ObjectHandle, StateError> {
    instance.as_object().ok_or_else(|| StateError::InvalidValue {
        type_name: owner.to_string(),
        reason: format!("composite state requires a live object, found {}", instance.describe()),
    })
}

fn state_map<'a>(
    owner: &str,
    state: &'a StateObject,
) -> Result<&'a Map<String, StateObject>, StateError> {
    state.as_object().ok_or_else(|| StateError::InvalidState {
        type_name: owner.to_string(),
        violation: SchemaViolation::NotAnObject {
            found: abbreviate(state),
        },
    })
}

fn field_state<'a>(
    owner: &str,
    map: &'a Map<String, StateObject>,
    field: &SchemaField,
) -> Result<&'a StateObject, StateError> {
    map.get(&field.state_key)
        .ok_or_else(|| StateError::InvalidState {
            type_name: owner.to_string(),
            violation: SchemaViolation::MissingField {
                field: field.state_key.clone(),
            },
        })
}

/// Compact rendering of a state object for error messages.
pub(crate) fn abbreviate(state: &StateObject) -> String {
    const LIMIT: usize = 80;
    let text = state.to_string();
    if text.len() <= LIMIT {
        return text;
    }
    let kind = StateKind::of(state);
    let mut end = LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... ({:?})", &text[..end], kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaves;
    use serde_json::json;

    fn point_schema() -> StateSchema {
        StateSchema::composite([("x", leaves::number()), ("_y", leaves::number())]).expect("schema")
    }

    #[test]
    fn composite_strips_marker_from_state_key() {
        let schema = point_schema();
        let keys: Vec<_> = schema.fields().iter().map(|f| f.state_key()).collect();
        assert_eq!(keys, vec!["x", "y"]);
        assert!(schema.fields()[1].is_marked());
        assert!(!schema.fields()[0].is_marked());
    }

    #[test]
    fn composite_rejects_duplicates_and_malformed_names() {
        let err = StateSchema::composite([("x", leaves::number()), ("_x", leaves::number())])
            .unwrap_err();
        assert_eq!(err, DescriptorError::DuplicateField("x".into()));

        let err = StateSchema::composite([("__x", leaves::number())]).unwrap_err();
        assert_eq!(err, DescriptorError::MalformedField("__x".into()));

        let err = StateSchema::composite([("_", leaves::number())]).unwrap_err();
        assert_eq!(err, DescriptorError::MalformedField("_".into()));
    }

    #[test]
    fn accessor_falls_back_to_underscored_attribute() {
        let schema = StateSchema::composite([("mass", leaves::number())]).expect("schema");
        let field = &schema.fields()[0];

        let plain = ObjectHandle::new("BodyIO").with("mass", 1.0);
        assert_eq!(field.accessor_name(&plain), "mass");

        let private = ObjectHandle::new("BodyIO").with("_mass", 1.0);
        assert_eq!(field.accessor_name(&private), "_mass");
    }

    #[test]
    fn accessor_prefers_plain_attribute_when_both_exist() {
        let schema = StateSchema::composite([("mass", leaves::number())]).expect("schema");
        let object = ObjectHandle::new("BodyIO").with("mass", 1.0).with("_mass", 99.0);
        assert_eq!(schema.fields()[0].accessor_name(&object), "mass");

        let mut out = Map::new();
        schema
            .default_to_state_object("BodyIO", &Value::from(object), &mut out)
            .expect("serialize");
        assert_eq!(StateObject::Object(out), json!({"mass": 1.0}));
    }

    #[test]
    fn default_to_state_reads_marked_attribute() {
        let schema = point_schema();
        let object = ObjectHandle::new("PointIO").with("x", 1.0).with("_y", 2.0);

        let mut out = Map::new();
        schema
            .default_to_state_object("PointIO", &Value::from(object), &mut out)
            .expect("serialize");
        assert_eq!(StateObject::Object(out), json!({"x": 1.0, "y": 2.0}));
    }

    #[test]
    fn default_to_state_reports_missing_attribute() {
        let schema = point_schema();
        let object = ObjectHandle::new("PointIO").with("x", 1.0);

        let mut out = Map::new();
        let err = schema
            .default_to_state_object("PointIO", &Value::from(object), &mut out)
            .unwrap_err();
        assert_eq!(
            err,
            StateError::MissingAttribute {
                type_name: "PointIO".into(),
                attribute: "_y".into()
            }
        );
    }

    #[test]
    fn value_schema_refuses_default_serialization() {
        let schema = StateSchema::as_value("boolean", StateValidator::of_kind(StateKind::Bool));
        let mut out = Map::new();
        let err = schema
            .default_to_state_object("FlagIO", &Value::Bool(true), &mut out)
            .unwrap_err();
        assert!(matches!(err, StateError::Unsupported { .. }));
    }

    #[test]
    fn composite_check_records_keys_and_defers() {
        let schema = point_schema();
        let mut seen = SeenFields::new();
        let check = schema.check_state_object_valid(&json!({"x": 1, "y": 2, "z": 3}), &mut seen);
        assert_eq!(check, SchemaCheck::Defer);
        assert_eq!(seen.into_iter().collect::<Vec<_>>(), vec!["x", "y"]);
    }

    #[test]
    fn composite_check_reports_missing_and_invalid_fields() {
        let schema = point_schema();

        let check = schema.check_state_object_valid(&json!({"x": 1}), &mut SeenFields::new());
        assert_eq!(
            check,
            SchemaCheck::Invalid(SchemaViolation::MissingField { field: "y".into() })
        );

        let check =
            schema.check_state_object_valid(&json!({"x": true, "y": 2}), &mut SeenFields::new());
        assert_eq!(
            check,
            SchemaCheck::Invalid(SchemaViolation::InvalidField {
                field: "x".into(),
                type_name: "NumberIO".into()
            })
        );

        let check = schema.check_state_object_valid(&json!([1, 2]), &mut SeenFields::new());
        assert!(matches!(
            check,
            SchemaCheck::Invalid(SchemaViolation::NotAnObject { .. })
        ));
    }

    #[test]
    fn value_check_is_definite() {
        let schema = StateSchema::as_value("boolean", StateValidator::of_kind(StateKind::Bool));
        let mut seen = SeenFields::new();
        assert_eq!(schema.check_state_object_valid(&json!(true), &mut seen), SchemaCheck::Valid);
        assert!(matches!(
            schema.check_state_object_valid(&json!("true"), &mut seen),
            SchemaCheck::Invalid(SchemaViolation::ValueRejected { .. })
        ));
        assert!(seen.is_empty());
    }

    #[test]
    fn related_types_and_description() {
        let schema = StateSchema::composite([("flag", leaves::boolean()), ("x", leaves::number())])
            .expect("schema");
        let related: Vec<_> = schema
            .related_types()
            .iter()
            .map(|d| d.type_name().to_string())
            .collect();
        assert_eq!(related, vec!["BooleanIO", "NumberIO"]);
        assert_eq!(schema.describe(), json!({"flag": "BooleanIO", "x": "NumberIO"}));
    }

    #[test]
    fn abbreviate_truncates_long_states() {
        let long = json!("x".repeat(200));
        let text = abbreviate(&long);
        assert!(text.len() < 120);
        assert!(text.ends_with("(String)"));
    }
}
