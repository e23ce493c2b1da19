// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::missing_panics_doc)] // Tests panic on failure
#![allow(clippy::doc_markdown)] // Test documentation

//! Multi-pass restore of a small scene.
//!
//! The orchestrator below applies state to every instance, deferring the
//! ones whose references cannot be resolved yet, and retries until a pass
//! makes no progress.

use iotype::parametric::{NullableTypes, ReferenceTypes};
use iotype::registry::{HashMapInstanceRegistry, InstanceRegistry};
use iotype::{
    leaves, DeserializationMode, ObjectHandle, StateError, StateObject, TypeDescriptor,
    TypeDescriptorBuilder, Value,
};
use serde_json::json;
use std::sync::Arc;

// ============================================================================
// Fixture
// ============================================================================

struct Scene {
    registry: Arc<HashMapInstanceRegistry>,
    wall_type: Arc<TypeDescriptor>,
    ball_type: Arc<TypeDescriptor>,
}

fn scene() -> Scene {
    let registry = Arc::new(HashMapInstanceRegistry::new());
    let references = ReferenceTypes::with_registry(registry.clone());
    let nullables = NullableTypes::new();

    let wall_type = TypeDescriptorBuilder::new("WallIO")
        .field("height", leaves::number())
        .build()
        .expect("WallIO");

    let wall_reference = references.of(&wall_type).expect("ReferenceIO<WallIO>");
    let ball_type = TypeDescriptorBuilder::new("BallIO")
        .field("radius", leaves::number())
        .field("touching", nullables.of(&wall_reference).expect("nullable"))
        .deserialization_mode(DeserializationMode::DynamicElement)
        .create_element_arguments(|state| {
            Ok(vec![Value::from(state["radius"].as_f64().unwrap_or(1.0))])
        })
        .build()
        .expect("BallIO");

    Scene {
        registry,
        wall_type,
        ball_type,
    }
}

struct Entry {
    id: &'static str,
    descriptor: Arc<TypeDescriptor>,
    state: StateObject,
}

/// Outcome of a restore: what was restored, in order, and what never resolved.
#[derive(Debug, Default)]
struct Restore {
    restored: Vec<String>,
    pending: Vec<String>,
    passes: usize,
}

/// Restore `entries` into `registry`, retrying deferred entries.
///
/// Dynamic elements are created from their creation arguments; everything
/// else is looked up as an existing instance. Validation failures abort.
fn restore(
    registry: &HashMapInstanceRegistry,
    existing: &[ObjectHandle],
    entries: Vec<Entry>,
) -> Result<Restore, StateError> {
    let mut outcome = Restore::default();
    let mut pending = entries;

    loop {
        outcome.passes += 1;
        let mut deferred = Vec::new();
        let before = pending.len();

        for entry in pending {
            let instance = match entry.descriptor.deserialization_mode() {
                DeserializationMode::DynamicElement => {
                    let args = entry
                        .descriptor
                        .state_object_to_create_element_arguments(&entry.state)?;
                    assert!(!args.is_empty());
                    ObjectHandle::with_id(entry.descriptor.type_name(), entry.id)
                }
                _ => existing
                    .iter()
                    .find(|o| o.id().as_deref() == Some(entry.id))
                    .cloned()
                    .expect("existing instance"),
            };

            match entry.descriptor.apply_state(&Value::from(instance.clone()), &entry.state) {
                Ok(()) => {
                    registry.register_object(&instance);
                    outcome.restored.push(entry.id.to_string());
                }
                Err(err) if err.is_not_yet_available() => deferred.push(entry),
                Err(err) => return Err(err),
            }
        }

        if deferred.is_empty() || deferred.len() == before {
            outcome.pending = deferred.iter().map(|e| e.id.to_string()).collect();
            return Ok(outcome);
        }
        pending = deferred;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_deferred_reference_resolves_on_second_pass() {
    let scene = scene();
    let wall = ObjectHandle::with_id("WallIO", "sim.wall").with("height", 1.0);

    let entries = vec![
        Entry {
            id: "sim.ball",
            descriptor: scene.ball_type.clone(),
            state: json!({"radius": 0.5, "touching": {"id": "sim.wall"}}),
        },
        Entry {
            id: "sim.wall",
            descriptor: scene.wall_type.clone(),
            state: json!({"height": 3.0}),
        },
    ];

    let outcome = restore(&scene.registry, &[wall.clone()], entries).expect("restore");
    assert_eq!(outcome.restored, vec!["sim.wall", "sim.ball"]);
    assert!(outcome.pending.is_empty());
    assert_eq!(outcome.passes, 2);

    assert_eq!(wall.get("height"), Some(Value::Number(3.0)));
    let ball = scene.registry.lookup("sim.ball").expect("ball registered");
    let ball = ball.as_object().expect("object");
    assert_eq!(ball.get("radius"), Some(Value::Number(0.5)));
    assert_eq!(ball.get("touching"), Some(Value::from(wall)));
}

#[test]
fn test_unresolvable_reference_stays_pending() {
    let scene = scene();
    let entries = vec![Entry {
        id: "sim.ball",
        descriptor: scene.ball_type.clone(),
        state: json!({"radius": 0.5, "touching": {"id": "sim.missing"}}),
    }];

    let outcome = restore(&scene.registry, &[], entries).expect("restore");
    assert!(outcome.restored.is_empty());
    assert_eq!(outcome.pending, vec!["sim.ball"]);
    assert!(scene.registry.is_empty());
}

#[test]
fn test_null_reference_needs_no_lookup() {
    let scene = scene();
    let entries = vec![Entry {
        id: "sim.ball",
        descriptor: scene.ball_type.clone(),
        state: json!({"radius": 2.0, "touching": null}),
    }];

    let outcome = restore(&scene.registry, &[], entries).expect("restore");
    assert_eq!(outcome.restored, vec!["sim.ball"]);
    assert_eq!(outcome.passes, 1);
}

#[test]
fn test_validation_failure_aborts_restore() {
    let scene = scene();
    let entries = vec![Entry {
        id: "sim.ball",
        descriptor: scene.ball_type.clone(),
        state: json!({"radius": "big", "touching": null}),
    }];

    let err = restore(&scene.registry, &[], entries).unwrap_err();
    assert!(err.is_validation_failure());
    assert!(matches!(err, StateError::InvalidState { .. }));
}

#[test]
fn test_saved_state_restores_into_fresh_scene() {
    let saved = {
        let scene = scene();
        let wall = ObjectHandle::with_id("WallIO", "sim.wall").with("height", 4.0);
        let ball = ObjectHandle::with_id("BallIO", "sim.ball")
            .with("radius", 0.25)
            .with("touching", wall.clone());
        vec![
            (
                "sim.ball",
                scene.ball_type.to_state_object(&Value::from(ball)).expect("ball"),
            ),
            (
                "sim.wall",
                scene.wall_type.to_state_object(&Value::from(wall)).expect("wall"),
            ),
        ]
    };
    assert_eq!(saved[0].1, json!({"radius": 0.25, "touching": {"id": "sim.wall"}}));

    let scene = scene();
    let wall = ObjectHandle::with_id("WallIO", "sim.wall");
    let entries = saved
        .into_iter()
        .map(|(id, state)| Entry {
            id,
            descriptor: if id == "sim.wall" {
                scene.wall_type.clone()
            } else {
                scene.ball_type.clone()
            },
            state,
        })
        .collect();

    let outcome = restore(&scene.registry, &[wall.clone()], entries).expect("restore");
    assert!(outcome.pending.is_empty());
    assert_eq!(wall.get("height"), Some(Value::Number(4.0)));
}
