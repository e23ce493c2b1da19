// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Live values handed to descriptors for serialization.
//!
//! Plain data (`Bool`, `Number`, `String`, ...) is compared structurally.
//! Objects, enumeration members and functions are compared by identity,
//! because the same live object may be referenced from several places and
//! restoring state must not break those references.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Discriminant of a [`Value`], used by validators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Map,
    Object,
    Enum,
    Function,
    Plain,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Map => "map",
            Self::Object => "object",
            Self::Enum => "enumeration member",
            Self::Function => "function",
            Self::Plain => "plain data",
        };
        f.write_str(name)
    }
}

/// A live value that a descriptor can validate and serialize.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Map(MapValue),
    Object(ObjectHandle),
    Enum(Arc<EnumMember>),
    Function(FunctionHandle),
    /// Opaque object literal, passed through as-is.
    Plain(serde_json::Value),
}

impl Value {
    /// Kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Number(_) => ValueKind::Number,
            Self::String(_) => ValueKind::String,
            Self::Array(_) => ValueKind::Array,
            Self::Map(_) => ValueKind::Map,
            Self::Object(_) => ValueKind::Object,
            Self::Enum(_) => ValueKind::Enum,
            Self::Function(_) => ValueKind::Function,
            Self::Plain(_) => ValueKind::Plain,
        }
    }

    /// Check if value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as map.
    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Self::Map(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as live object.
    pub fn as_object(&self) -> Option<&ObjectHandle> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as enumeration member.
    pub fn as_enum(&self) -> Option<&Arc<EnumMember>> {
        match self {
            Self::Enum(v) => Some(v),
            _ => None,
        }
    }

    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(v) => v.to_string(),
            Self::Number(v) => v.to_string(),
            Self::String(v) => format!("{:?}", v),
            Self::Array(v) => format!("array of {} element(s)", v.len()),
            Self::Map(v) => format!("map of {} entr(ies)", v.len()),
            Self::Object(o) => format!("object of type {}", o.type_name()),
            Self::Enum(m) => format!("enumeration member {}", m.key()),
            Self::Function(_) => "function".to_string(),
            Self::Plain(v) => format!("plain data {}", v),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            (Self::Enum(a), Self::Enum(b)) => Arc::ptr_eq(a, b),
            (Self::Function(a), Self::Function(b)) => a.ptr_eq(b),
            (Self::Plain(a), Self::Plain(b)) => a == b,
            _ => false,
        }
    }
}

// Conversion traits
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<ObjectHandle> for Value {
    fn from(v: ObjectHandle) -> Self {
        Self::Object(v)
    }
}

impl From<MapValue> for Value {
    fn from(v: MapValue) -> Self {
        Self::Map(v)
    }
}

impl From<Arc<EnumMember>> for Value {
    fn from(v: Arc<EnumMember>) -> Self {
        Self::Enum(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

// ---------------------------------------------------------------------------
// MapValue
// ---------------------------------------------------------------------------

/// Keyed structure with arbitrary keys, iterated in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapValue {
    entries: Vec<(Value, Value)>,
}

impl MapValue {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `key`, returning the previous value.
    ///
    /// A replaced entry keeps its original position.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Look up a value by key.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl FromIterator<(Value, Value)> for MapValue {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

// ---------------------------------------------------------------------------
// ObjectHandle
// ---------------------------------------------------------------------------

/// Attributes and identity of a live object.
#[derive(Debug)]
struct LiveObject {
    type_name: String,
    id: Option<String>,
    attributes: BTreeMap<String, Value>,
}

/// Shared handle to a live object.
///
/// Cloning the handle shares the object. Equality is identity.
#[derive(Clone)]
pub struct ObjectHandle {
    inner: Arc<RwLock<LiveObject>>,
}

impl ObjectHandle {
    /// Create an object with no attributes and no identifier.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(LiveObject {
                type_name: type_name.into(),
                id: None,
                attributes: BTreeMap::new(),
            })),
        }
    }

    /// Create an object carrying a stable identifier.
    pub fn with_id(type_name: impl Into<String>, id: impl Into<String>) -> Self {
        let handle = Self::new(type_name);
        handle.inner.write().id = Some(id.into());
        handle
    }

    /// Builder-style attribute assignment.
    pub fn with(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Name of the type this object was created as.
    pub fn type_name(&self) -> String {
        self.inner.read().type_name.clone()
    }

    /// Stable identifier, if the object has one.
    pub fn id(&self) -> Option<String> {
        self.inner.read().id.clone()
    }

    /// Get an attribute (cloned; objects inside stay shared).
    pub fn get(&self, name: &str) -> Option<Value> {
        self.inner.read().attributes.get(name).cloned()
    }

    /// Set an attribute, returning the previous value.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.inner.write().attributes.insert(name.into(), value.into())
    }

    /// Returns `true` if the attribute exists.
    pub fn has(&self, name: &str) -> bool {
        self.inner.read().attributes.contains_key(name)
    }

    /// Attribute names, sorted.
    pub fn attribute_names(&self) -> Vec<String> {
        self.inner.read().attributes.keys().cloned().collect()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let obj = self.inner.read();
        f.debug_struct("ObjectHandle")
            .field("type_name", &obj.type_name)
            .field("id", &obj.id)
            .field("attributes", &obj.attributes.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// FunctionHandle
// ---------------------------------------------------------------------------

type Callable = dyn Fn(&[Value]) -> Value + Send + Sync;

/// Opaque callable value.
#[derive(Clone)]
pub struct FunctionHandle {
    inner: Arc<Callable>,
}

impl FunctionHandle {
    /// Wrap a closure.
    pub fn new(f: impl Fn(&[Value]) -> Value + Send + Sync + 'static) -> Self {
        Self { inner: Arc::new(f) }
    }

    /// Invoke the function.
    pub fn call(&self, args: &[Value]) -> Value {
        (self.inner)(args)
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for FunctionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FunctionHandle(..)")
    }
}

// ---------------------------------------------------------------------------
// Enumeration
// ---------------------------------------------------------------------------

/// One named singleton of an [`Enumeration`].
#[derive(Debug)]
pub struct EnumMember {
    key: String,
    ordinal: usize,
}

impl EnumMember {
    /// Symbolic key (what gets serialized).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Declaration position. Not used for serialization.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }
}

/// Closed set of named singletons.
#[derive(Debug)]
pub struct Enumeration {
    members: Vec<Arc<EnumMember>>,
}

impl Enumeration {
    /// Create an enumeration from its keys, in declaration order.
    ///
    /// Key validity (non-empty, unique) is checked when a descriptor is
    /// built for the enumeration.
    pub fn new<I, S>(keys: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members = keys
            .into_iter()
            .enumerate()
            .map(|(ordinal, key)| {
                Arc::new(EnumMember {
                    key: key.into(),
                    ordinal,
                })
            })
            .collect();
        Arc::new(Self { members })
    }

    /// Members in declaration order.
    pub fn members(&self) -> &[Arc<EnumMember>] {
        &self.members
    }

    /// Keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.key())
    }

    /// Look up a member by key.
    pub fn get(&self, key: &str) -> Option<&Arc<EnumMember>> {
        self.members.iter().find(|m| m.key == key)
    }

    /// Returns `true` if `member` is one of this enumeration's singletons.
    pub fn contains(&self, member: &Arc<EnumMember>) -> bool {
        self.members.iter().any(|m| Arc::ptr_eq(m, member))
    }
}
