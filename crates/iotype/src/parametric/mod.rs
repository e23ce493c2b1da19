// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Parametric descriptor constructors.
//!
//! Each constructor owns a [`TypeCache`] and returns one canonical descriptor
//! per parameterization: asking twice with the same parameter instances
//! yields the same `Arc`. Constructors are plain structs, so tests and hosts
//! can use private instances; the free functions below use the process-wide
//! defaults.
//!
//! | Constructor | Type name | State |
//! |---|---|---|
//! | [`CollectionTypes`] | `ArrayIO<T>` | `[s0, s1, ...]` |
//! | [`MappingTypes`] | `MapIO<K, V>` | `[[k0, v0], ...]` |
//! | [`NullableTypes`] | `NullableIO<T>` | `null` or T's state |
//! | [`UnionTypes`] | `OrIO<A, B, ...>` | `{"index": i, "state": s}` |
//! | [`ReferenceTypes`] | `ReferenceIO<T>` | `{"id": "..."}` |
//! | [`EnumerationTypes`] | `EnumerationIO(A\|B)` | `"A"` |
//! | [`StringUnionTypes`] | `StringUnionIO<"a"\|"b">` | `"a"` |

mod cache;
mod collection;
mod enumeration;
mod mapping;
mod nullable;
mod reference;
mod string_union;
mod union;

pub use cache::{ArcKey, DescriptorKey, LookupStats, TypeCache};
pub use collection::CollectionTypes;
pub use enumeration::EnumerationTypes;
pub use mapping::MappingTypes;
pub use nullable::NullableTypes;
pub use reference::{ReferenceTypes, REFERENCE_ID_KEY};
pub use string_union::StringUnionTypes;
pub use union::{UnionTypes, UNION_INDEX_KEY, UNION_STATE_KEY};

use crate::descriptor::TypeDescriptor;
use crate::error::DescriptorError;
use crate::value::Enumeration;
use std::sync::Arc;

/// `ArrayIO<T>` from the process-wide cache.
pub fn array_of(element: &Arc<TypeDescriptor>) -> Result<Arc<TypeDescriptor>, DescriptorError> {
    CollectionTypes::global().of(element)
}

/// `MapIO<K, V>` from the process-wide cache.
pub fn map_of(
    key: &Arc<TypeDescriptor>,
    value: &Arc<TypeDescriptor>,
) -> Result<Arc<TypeDescriptor>, DescriptorError> {
    MappingTypes::global().of(key, value)
}

/// `NullableIO<T>` from the process-wide cache.
pub fn nullable_of(inner: &Arc<TypeDescriptor>) -> Result<Arc<TypeDescriptor>, DescriptorError> {
    NullableTypes::global().of(inner)
}

/// `OrIO<...>` from the process-wide cache.
pub fn union_of(types: &[Arc<TypeDescriptor>]) -> Result<Arc<TypeDescriptor>, DescriptorError> {
    UnionTypes::global().of(types)
}

/// `ReferenceIO<T>` resolving against the process-wide instance registry.
pub fn reference_of(target: &Arc<TypeDescriptor>) -> Result<Arc<TypeDescriptor>, DescriptorError> {
    ReferenceTypes::global().of(target)
}

/// `EnumerationIO(...)` from the process-wide cache.
pub fn enumeration_of(
    enumeration: &Arc<Enumeration>,
) -> Result<Arc<TypeDescriptor>, DescriptorError> {
    EnumerationTypes::global().of(enumeration)
}

/// `StringUnionIO<...>` from the process-wide cache.
pub fn string_union_of<I, S>(values: I) -> Result<Arc<TypeDescriptor>, DescriptorError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    StringUnionTypes::global().of(values)
}

/// Comma-separated parameter names, as embedded in type names.
fn join_names(types: &[Arc<TypeDescriptor>]) -> String {
    types
        .iter()
        .map(|t| t.type_name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reject an empty or repeated list of names.
fn check_distinct<'a>(
    constructor: &'static str,
    values: impl IntoIterator<Item = &'a str>,
) -> Result<(), DescriptorError> {
    let mut seen = std::collections::BTreeSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(DescriptorError::DuplicateValue {
                constructor,
                value: value.to_string(),
            });
        }
    }
    if seen.is_empty() {
        return Err(DescriptorError::EmptyParameters { constructor });
    }
    Ok(())
}
