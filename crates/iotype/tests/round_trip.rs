// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::float_cmp)] // Test assertions with constants
#![allow(clippy::missing_panics_doc)] // Tests panic on failure

//! Randomized round trips and cache behavior under concurrency.

use iotype::parametric::{self, array_of, map_of, nullable_of, union_of, CollectionTypes};
use iotype::{leaves, MapValue, ObjectHandle, TypeDescriptor, TypeDescriptorBuilder, Value};
use std::sync::Arc;

// ============================================================================
// Random values
// ============================================================================

fn random_number(rng: &mut fastrand::Rng) -> f64 {
    match rng.u8(..20) {
        0 => f64::INFINITY,
        1 => f64::NEG_INFINITY,
        2 => f64::NAN,
        _ => (rng.f64() - 0.5) * 1.0e6,
    }
}

fn random_string(rng: &mut fastrand::Rng) -> String {
    let len = rng.usize(0..12);
    (0..len).map(|_| rng.alphanumeric()).collect()
}

fn particle_type() -> Arc<TypeDescriptor> {
    TypeDescriptorBuilder::new("ParticleIO")
        .field("mass", leaves::number())
        .field("label", leaves::string())
        .field("charged", leaves::boolean())
        .field("trail", array_of(&leaves::number()).expect("trail"))
        .field("tags", map_of(&leaves::string(), &leaves::boolean()).expect("tags"))
        .field(
            "spin",
            nullable_of(&union_of(&[leaves::number(), leaves::string()]).expect("union"))
                .expect("spin"),
        )
        .build()
        .expect("ParticleIO")
}

fn random_particle(rng: &mut fastrand::Rng) -> ObjectHandle {
    let trail: Vec<Value> = (0..rng.usize(0..8))
        .map(|_| Value::from(random_number(rng)))
        .collect();
    let tags: MapValue = (0..rng.usize(0..4))
        .map(|i| (Value::from(format!("t{}", i)), Value::from(rng.bool())))
        .collect();
    let spin = match rng.u8(..3) {
        0 => Value::Null,
        1 => Value::from(random_number(rng)),
        _ => Value::from(random_string(rng)),
    };

    ObjectHandle::new("ParticleIO")
        .with("mass", random_number(rng))
        .with("label", random_string(rng))
        .with("charged", rng.bool())
        .with("trail", Value::Array(trail))
        .with("tags", tags)
        .with("spin", spin)
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_random_particles_round_trip() {
    let particle = particle_type();
    let mut rng = fastrand::Rng::with_seed(0x10_7e);

    for _ in 0..200 {
        let live = random_particle(&mut rng);
        let state = particle
            .to_state_object(&Value::from(live.clone()))
            .expect("to_state");
        assert!(particle.is_state_object_valid(&state));

        let restored = particle.from_state_object(&state).expect("from_state");
        let restored = restored.as_object().expect("object");
        assert!(!restored.ptr_eq(&live));

        for field in ["mass", "label", "charged", "trail", "tags", "spin"] {
            assert_eq!(restored.get(field), live.get(field), "field {}", field);
        }
        assert_eq!(
            particle
                .to_state_object(&Value::from(restored.clone()))
                .expect("re-serialize"),
            state
        );
    }
}

#[test]
fn test_apply_state_matches_from_state() {
    let particle = particle_type();
    let mut rng = fastrand::Rng::with_seed(7);

    for _ in 0..50 {
        let source = random_particle(&mut rng);
        let target = random_particle(&mut rng);
        let state = particle
            .to_state_object(&Value::from(source))
            .expect("to_state");

        particle
            .apply_state(&Value::from(target.clone()), &state)
            .expect("apply_state");
        assert_eq!(
            particle.to_state_object(&Value::from(target)).expect("after apply"),
            state
        );
    }
}

// ============================================================================
// Cache behavior
// ============================================================================

#[test]
fn test_concurrent_lookups_agree() {
    let types = CollectionTypes::new();
    let element = leaves::string();

    let built: Vec<Arc<TypeDescriptor>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| types.of(&element).expect("ArrayIO<StringIO>")))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("thread"))
            .collect()
    });

    assert!(built.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(types.cache().len(), 1);
    let stats = types.cache().stats();
    assert_eq!(stats.hits + stats.misses, 8);
}

#[test]
fn test_schema_fields_are_complete() {
    let particle = particle_type();
    let schema = particle.state_schema().expect("schema");
    assert!(schema.is_composite());
    let mut names: Vec<_> = schema
        .fields()
        .iter()
        .map(|f| f.declared_name().to_string())
        .collect();
    names.sort();
    assert_eq!(names, ["charged", "label", "mass", "spin", "tags", "trail"]);

    // Every field descriptor is the canonical one from the global caches.
    let trail = schema
        .fields()
        .iter()
        .find(|f| f.declared_name() == "trail")
        .expect("trail");
    assert!(Arc::ptr_eq(
        trail.descriptor(),
        &parametric::array_of(&leaves::number()).expect("array")
    ));
}

#[test]
fn test_union_ordinals_are_stable() {
    let union = union_of(&[leaves::boolean(), leaves::number(), leaves::string()]).expect("OrIO");
    let mut rng = fastrand::Rng::with_seed(42);

    for _ in 0..100 {
        let (value, ordinal) = match rng.u8(..3) {
            0 => (Value::from(rng.bool()), 0),
            1 => (Value::from(rng.f64()), 1),
            _ => (Value::from(random_string(&mut rng)), 2),
        };
        let state = union.to_state_object(&value).expect("to_state");
        assert_eq!(state["index"], ordinal);
        assert_eq!(union.from_state_object(&state).expect("from_state"), value);
    }
}
