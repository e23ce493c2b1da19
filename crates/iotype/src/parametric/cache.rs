// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Memoization cache for parametric descriptors.
//!
//! A parametric constructor asked twice for the same parameterization must
//! return the same descriptor instance. Entries are never evicted; the cache
//! lives as long as the constructor that owns it.

use crate::config;
use crate::descriptor::TypeDescriptor;
use crate::error::DescriptorError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Instant;

/// Hashes and compares an `Arc` by address.
///
/// Holding the `Arc` keeps the address alive, so a key can never be confused
/// with a later allocation at the same address.
pub struct ArcKey<T: ?Sized>(pub Arc<T>);

/// Cache key for a single descriptor parameter.
pub type DescriptorKey = ArcKey<TypeDescriptor>;

impl<T: ?Sized> Clone for ArcKey<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> PartialEq for ArcKey<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: ?Sized> Eq for ArcKey<T> {}

impl<T: ?Sized> Hash for ArcKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).cast::<()>().hash(state);
    }
}

impl fmt::Debug for ArcKey<TypeDescriptor> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DescriptorKey({})", self.0.type_name())
    }
}

impl From<&Arc<TypeDescriptor>> for DescriptorKey {
    fn from(descriptor: &Arc<TypeDescriptor>) -> Self {
        Self(Arc::clone(descriptor))
    }
}

/// Cache hit/miss statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LookupStats {
    pub hits: u64,
    pub misses: u64,
    pub last_miss_ns: u64,
}

/// Append-only map from parameterization to canonical descriptor.
pub struct TypeCache<K> {
    name: &'static str,
    inner: RwLock<HashMap<K, Arc<TypeDescriptor>>>,
    stats: RwLock<LookupStats>,
}

impl<K: Eq + Hash> TypeCache<K> {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: RwLock::new(HashMap::new()),
            stats: RwLock::new(LookupStats::default()),
        }
    }

    /// Return the cached descriptor for `key`, building it on first use.
    ///
    /// `build` runs without the lock held, so it may consult other caches.
    /// If two callers race, the first insertion wins and both get it.
    pub fn get_or_try_build<F>(
        &self,
        key: K,
        build: F,
    ) -> Result<Arc<TypeDescriptor>, DescriptorError>
    where
        F: FnOnce() -> Result<Arc<TypeDescriptor>, DescriptorError>,
    {
        if let Some(hit) = self.try_peek(&key) {
            self.record_hit(&hit);
            return Ok(hit);
        }

        let start = Instant::now();
        let built = build()?;

        let canonical = {
            let mut cache = self.inner.write();
            Arc::clone(cache.entry(key).or_insert(built))
        };
        self.record_miss(start);
        log::debug!(
            "[iotype] {} cache built {} ({} entries)",
            self.name,
            canonical.type_name(),
            self.len()
        );
        Ok(canonical)
    }

    /// Look up without building.
    pub fn get(&self, key: &K) -> Option<Arc<TypeDescriptor>> {
        self.try_peek(key)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Every cached descriptor, in no particular order.
    pub fn descriptors(&self) -> Vec<Arc<TypeDescriptor>> {
        self.inner.read().values().cloned().collect()
    }

    #[must_use]
    pub fn stats(&self) -> LookupStats {
        *self.stats.read()
    }

    fn try_peek(&self, key: &K) -> Option<Arc<TypeDescriptor>> {
        self.inner.read().get(key).map(Arc::clone)
    }

    fn record_hit(&self, hit: &TypeDescriptor) {
        let mut stats = self.stats.write();
        stats.hits = stats.hits.saturating_add(1);
        drop(stats);
        if config::current().log_cache_hits {
            log::trace!("[iotype] {} cache hit for {}", self.name, hit.type_name());
        }
    }

    fn record_miss(&self, start: Instant) {
        let mut stats = self.stats.write();
        stats.misses = stats.misses.saturating_add(1);
        stats.last_miss_ns = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
    }
}

impl<K> fmt::Debug for TypeCache<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeCache")
            .field("name", &self.name)
            .field("entries", &self.inner.read().len())
            .field("stats", &*self.stats.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeOptions;
    use crate::leaves;

    fn holder(name: &str) -> Result<Arc<TypeDescriptor>, DescriptorError> {
        TypeDescriptor::new(name, TypeOptions::default())
    }

    #[test]
    fn test_build_once_then_hit() {
        let cache: TypeCache<DescriptorKey> = TypeCache::new("test");
        let key = DescriptorKey::from(&leaves::number());

        let first = cache
            .get_or_try_build(key.clone(), || holder("HolderIO<NumberIO>"))
            .expect("build");
        let second = cache
            .get_or_try_build(key, || panic!("must not rebuild"))
            .expect("hit");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));
    }

    #[test]
    fn test_failed_build_is_not_cached() {
        let cache: TypeCache<DescriptorKey> = TypeCache::new("test");
        let key = DescriptorKey::from(&leaves::string());

        let err = cache.get_or_try_build(key.clone(), || holder("bad.name")).unwrap_err();
        assert!(matches!(err, DescriptorError::NameContainsSeparator(_)));
        assert!(cache.is_empty());
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn test_keys_compare_by_address() {
        let a = DescriptorKey::from(&leaves::number());
        let b = DescriptorKey::from(&leaves::number());
        let c = DescriptorKey::from(&leaves::boolean());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
