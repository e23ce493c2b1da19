// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Validators for live values and for state objects.
//!
//! A validator combines up to three constraints, all of which must hold:
//! an allowed set of kinds, an allowed set of values, and a predicate.
//! A validator with no constraints accepts everything.

use crate::value::{Value, ValueKind};
use crate::StateObject;
use std::fmt;
use std::sync::Arc;

type ValuePredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;
type StatePredicate = Arc<dyn Fn(&StateObject) -> bool + Send + Sync>;

/// Constraints on a live value.
#[derive(Clone, Default)]
pub struct Validator {
    kinds: Vec<ValueKind>,
    valid_values: Option<Vec<Value>>,
    predicate: Option<ValuePredicate>,
    message: Option<String>,
}

impl Validator {
    /// Accepts every value.
    pub fn any() -> Self {
        Self::default()
    }

    /// Accepts values of a single kind.
    pub fn of_kind(kind: ValueKind) -> Self {
        Self::of_kinds([kind])
    }

    /// Accepts values of any of the given kinds.
    pub fn of_kinds(kinds: impl IntoIterator<Item = ValueKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Accepts values for which `predicate` returns `true`.
    pub fn from_predicate(predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self::default().with_predicate(predicate)
    }

    /// Add a predicate.
    pub fn with_predicate(
        mut self,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Restrict to an explicit set of values.
    pub fn with_valid_values(mut self, values: Vec<Value>) -> Self {
        self.valid_values = Some(values);
        self
    }

    /// Message reported on failure.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Allowed kinds (empty means any).
    pub fn kinds(&self) -> &[ValueKind] {
        &self.kinds
    }

    /// Returns `true` if the value satisfies every constraint.
    pub fn is_valid(&self, value: &Value) -> bool {
        self.check(value).is_ok()
    }

    /// Check a value, describing the first unmet constraint.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        if !self.kinds.is_empty() && !self.kinds.contains(&value.kind()) {
            return Err(self.failure(format!(
                "expected {}, found {}",
                join_kinds(&self.kinds),
                value.describe()
            )));
        }
        if let Some(valid) = &self.valid_values {
            if !valid.contains(value) {
                return Err(self.failure(format!(
                    "{} is not one of the {} allowed value(s)",
                    value.describe(),
                    valid.len()
                )));
            }
        }
        if let Some(predicate) = &self.predicate {
            if !predicate(value) {
                return Err(self.failure(format!("{} rejected by predicate", value.describe())));
            }
        }
        Ok(())
    }

    fn failure(&self, detail: String) -> String {
        match &self.message {
            Some(message) => format!("{}: {}", message, detail),
            None => detail,
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("kinds", &self.kinds)
            .field("valid_values", &self.valid_values)
            .field("predicate", &self.predicate.is_some())
            .field("message", &self.message)
            .finish()
    }
}

fn join_kinds(kinds: &[ValueKind]) -> String {
    kinds
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" | ")
}

// ---------------------------------------------------------------------------
// StateValidator
// ---------------------------------------------------------------------------

/// JSON shape of a state object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl StateKind {
    /// Kind of a state object.
    pub fn of(state: &StateObject) -> Self {
        match state {
            StateObject::Null => Self::Null,
            StateObject::Bool(_) => Self::Bool,
            StateObject::Number(_) => Self::Number,
            StateObject::String(_) => Self::String,
            StateObject::Array(_) => Self::Array,
            StateObject::Object(_) => Self::Object,
        }
    }
}

/// Constraints on a state object, used by value schemas.
#[derive(Clone, Default)]
pub struct StateValidator {
    kinds: Vec<StateKind>,
    valid_values: Option<Vec<StateObject>>,
    predicate: Option<StatePredicate>,
}

impl StateValidator {
    /// Accepts state objects of a single kind.
    pub fn of_kind(kind: StateKind) -> Self {
        Self::of_kinds([kind])
    }

    /// Accepts state objects of any of the given kinds.
    pub fn of_kinds(kinds: impl IntoIterator<Item = StateKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Accepts state objects for which `predicate` returns `true`.
    pub fn from_predicate(
        predicate: impl Fn(&StateObject) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::default().with_predicate(predicate)
    }

    /// Add a predicate.
    pub fn with_predicate(
        mut self,
        predicate: impl Fn(&StateObject) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Restrict to an explicit set of state values.
    pub fn with_valid_values(mut self, values: Vec<StateObject>) -> Self {
        self.valid_values = Some(values);
        self
    }

    /// Returns `true` if the state satisfies every constraint.
    pub fn is_valid(&self, state: &StateObject) -> bool {
        (self.kinds.is_empty() || self.kinds.contains(&StateKind::of(state)))
            && self
                .valid_values
                .as_ref()
                .map_or(true, |valid| valid.contains(state))
            && self.predicate.as_ref().map_or(true, |p| p(state))
    }
}

impl fmt::Debug for StateValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateValidator")
            .field("kinds", &self.kinds)
            .field("valid_values", &self.valid_values)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_validator_accepts_everything() {
        let v = Validator::any();
        assert!(v.is_valid(&Value::Null));
        assert!(v.is_valid(&Value::from("x")));
    }

    #[test]
    fn constraints_are_conjunctive() {
        let positive = Validator::of_kind(ValueKind::Number)
            .with_predicate(|v| v.as_f64().map_or(false, |n| n > 0.0))
            .with_message("positive number");

        assert!(positive.is_valid(&Value::from(3.0)));
        assert!(!positive.is_valid(&Value::from(-3.0)));

        let err = positive.check(&Value::from("3")).unwrap_err();
        assert!(err.starts_with("positive number: expected number"));
    }

    #[test]
    fn valid_values_restrict_membership() {
        let v = Validator::of_kind(ValueKind::String)
            .with_valid_values(vec![Value::from("a"), Value::from("b")]);
        assert!(v.is_valid(&Value::from("a")));
        assert!(!v.is_valid(&Value::from("c")));
    }

    #[test]
    fn state_validator_checks_kind_and_values() {
        let v = StateValidator::of_kind(StateKind::String)
            .with_valid_values(vec![json!("LOW"), json!("HIGH")]);
        assert!(v.is_valid(&json!("LOW")));
        assert!(!v.is_valid(&json!("MEDIUM")));
        assert!(!v.is_valid(&json!(1)));
    }
}
