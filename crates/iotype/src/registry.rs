// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Identifier-to-instance lookup for reference types.
//!
//! `ReferenceIO<T>` serializes an instance as its stable identifier and
//! resolves the identifier through an [`InstanceRegistry`] on restore. The
//! host decides when instances are registered; an identifier that is not
//! registered yet is reported as "not yet available" so the caller can retry
//! after other instances have been restored.
//!
//! # Example
//!
//! ```
//! use iotype::registry::{HashMapInstanceRegistry, InstanceRegistry};
//! use iotype::ObjectHandle;
//!
//! let registry = HashMapInstanceRegistry::new();
//! let ball = ObjectHandle::with_id("BallIO", "sim.model.ball");
//! registry.register_object(&ball).unwrap();
//!
//! assert!(registry.contains("sim.model.ball"));
//! ```

use crate::value::{ObjectHandle, Value};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

// ---------------------------------------------------------------------------
// InstanceRegistry trait + HashMap implementation
// ---------------------------------------------------------------------------

/// Resolves stable identifiers to live instances.
pub trait InstanceRegistry: Send + Sync {
    /// Look up an instance by identifier.
    ///
    /// Returns `None` if nothing is registered under `id` (yet).
    fn lookup(&self, id: &str) -> Option<Value>;

    /// Returns `true` if `id` is registered.
    fn contains(&self, id: &str) -> bool {
        self.lookup(id).is_some()
    }
}

/// Simple [`HashMap`]-backed [`InstanceRegistry`].
#[derive(Debug, Default)]
pub struct HashMapInstanceRegistry {
    instances: RwLock<HashMap<String, Value>>,
}

impl HashMapInstanceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` under `id`, returning the instance it replaced.
    pub fn register(&self, id: impl Into<String>, value: Value) -> Option<Value> {
        let id = id.into();
        log::trace!("[iotype] registering instance {}", id);
        self.instances.write().insert(id, value)
    }

    /// Register an object under its own identifier.
    ///
    /// Returns `None` without registering if the object has no identifier.
    pub fn register_object(&self, object: &ObjectHandle) -> Option<String> {
        let id = object.id()?;
        self.register(id.clone(), Value::Object(object.clone()));
        Some(id)
    }

    /// Remove the instance registered under `id`.
    pub fn unregister(&self, id: &str) -> Option<Value> {
        self.instances.write().remove(id)
    }

    /// Number of registered instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.read().len()
    }

    /// Returns `true` if no instances are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.read().is_empty()
    }

    /// Drop every registration.
    pub fn clear(&self) {
        self.instances.write().clear();
    }
}

impl InstanceRegistry for HashMapInstanceRegistry {
    fn lookup(&self, id: &str) -> Option<Value> {
        self.instances.read().get(id).cloned()
    }

    fn contains(&self, id: &str) -> bool {
        self.instances.read().contains_key(id)
    }
}

/// Process-wide registry used by [`reference_of`](crate::parametric::reference_of).
pub fn global() -> &'static Arc<HashMapInstanceRegistry> {
    static REGISTRY: OnceLock<Arc<HashMapInstanceRegistry>> = OnceLock::new();
    REGISTRY.get_or_init(|| Arc::new(HashMapInstanceRegistry::new()))
}
