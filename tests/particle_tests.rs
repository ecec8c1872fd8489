//! Particle Integration Tests
//!
//! Tests for:
//! - SegmentAllocator: first-fit, coalescing, disjointness under churn
//! - ParticleSystem: emitter add/remove, slot recycling, exhaustion
//! - Per-frame emission, simulation range and drawing through the backend
//! - Emitter presets from JSON

mod common;

use common::{ParticleCall, RecordingParticles, init_logging};
use gale::particles::{
    CameraMatrices, ParticleBlending, ParticleMaterial, ParticleSettings, ParticleSystem, Range,
    Segment, SegmentAllocator, TextureId, workgroups,
};
use gale::settings::ParticleSystemSettings;
use gale::GaleError;
use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

fn system(capacity: u32, max_emitters: u32) -> (ParticleSystem, RecordingParticles) {
    init_logging();
    let backend = RecordingParticles::new();
    let system = ParticleSystem::new(
        ParticleSystemSettings {
            capacity,
            max_emitters,
            ..Default::default()
        },
        Box::new(backend.clone()),
    );
    (system, backend)
}

/// `count * ceil(life * frequency)` slots: `count * 1`.
fn sized(count: u32) -> ParticleSettings {
    ParticleSettings {
        frequency: Range::splat(1.0),
        life: Range::splat(1.0),
        count: Range::splat(count),
        ..Default::default()
    }
}

fn material(sprite: u32) -> ParticleMaterial {
    ParticleMaterial {
        blending: ParticleBlending::Additive,
        sprite: TextureId(sprite),
        tint: TextureId(100),
        scale: TextureId(200),
    }
}

fn assert_free_list_canonical(ranges: &[(u32, u32)]) {
    for &(start, end) in ranges {
        assert!(start < end, "empty free range in {ranges:?}");
    }
    for pair in ranges.windows(2) {
        assert!(pair[0].1 < pair[1].0, "unsorted or adjacent ranges {ranges:?}");
    }
}

// ============================================================================
// Allocator
// ============================================================================

#[test]
fn allocator_first_fit() {
    let mut alloc = SegmentAllocator::new(30);
    let a = alloc.allocate(10).unwrap();
    let _b = alloc.allocate(10).unwrap();
    let c = alloc.allocate(10).unwrap();
    alloc.free(a);
    alloc.free(c);
    assert_eq!(alloc.free_ranges(), &[(0, 10), (20, 30)]);

    let d = alloc.allocate(5).unwrap();
    assert_eq!(d, Segment { index: 0, length: 5 });
    assert_eq!(alloc.free_ranges(), &[(5, 10), (20, 30)]);

    // too large for the first range
    let e = alloc.allocate(8).unwrap();
    assert_eq!(e.index, 20);
}

#[test]
fn allocator_exhaustion_and_zero_length() {
    let mut alloc = SegmentAllocator::new(16);
    assert!(alloc.allocate(17).is_none());
    assert!(alloc.allocate(0).is_none());
    assert_eq!(alloc.free_ranges(), &[(0, 16)]);
    assert_eq!(alloc.reserved(), 0);
}

#[test]
fn allocator_segments_stay_disjoint_under_churn() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut alloc = SegmentAllocator::new(1024);
    let mut live: Vec<Segment> = Vec::new();

    for _ in 0..2000 {
        if live.is_empty() || rng.random_range(0..3) > 0 {
            if let Some(segment) = alloc.allocate(rng.random_range(1..96)) {
                live.push(segment);
            }
        } else {
            let victim = rng.random_range(0..live.len());
            alloc.free(live.swap_remove(victim));
        }

        for (i, a) in live.iter().enumerate() {
            assert!(a.end() <= alloc.capacity());
            for b in &live[i + 1..] {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
        assert_free_list_canonical(alloc.free_ranges());
        let free: u32 = alloc.free_ranges().iter().map(|(s, e)| e - s).sum();
        assert_eq!(free + alloc.reserved(), alloc.capacity());
        assert_eq!(alloc.reserved(), live.iter().map(|s| s.length).sum::<u32>());
    }

    for segment in live.drain(..) {
        alloc.free(segment);
    }
    assert_eq!(alloc.free_ranges(), &[(0, 1024)]);
    assert_eq!(alloc.high_water_mark(), 0);
}

// ============================================================================
// Emitter pool
// ============================================================================

#[test]
fn add_uploads_emitter_tables() {
    let (mut particles, backend) = system(1000, 8);
    let key = particles.add(sized(40), "smoke").unwrap();
    let emitter = particles.emitter(key).unwrap();

    assert_eq!(emitter.segment(), Segment { index: 0, length: 40 });
    assert_eq!(emitter.slot(), 0);
    assert_eq!(particles.reserved(), 40);

    let calls = backend.calls();
    assert_eq!(calls.len(), 3);
    match &calls[0] {
        ParticleCall::WriteEmitter { slot, values } => {
            assert_eq!(*slot, 0);
            assert_eq!(values.index_length.x, 0);
            assert_eq!(values.index_length.y, 40);
        }
        other => panic!("unexpected call {other:?}"),
    }
    assert_eq!(
        calls[1],
        ParticleCall::WriteFreeStack {
            offset: 0,
            len: 40,
            first: Some(39)
        }
    );
    assert_eq!(calls[2], ParticleCall::WriteFreeHead { slot: 0, head: 40 });
}

#[test]
fn removing_keeps_other_handles_valid() {
    let (mut particles, backend) = system(1000, 8);
    let a = particles.add(sized(10), "a").unwrap();
    let b = particles.add(sized(20), "b").unwrap();
    let c = particles.add(sized(30), "c").unwrap();
    backend.take();

    let removed = particles.remove(b).unwrap();
    assert_eq!(removed.segment(), Segment { index: 10, length: 20 });
    assert_eq!(backend.take(), [ParticleCall::ResetSegment(removed.segment())]);

    assert!(particles.emitter(b).is_none());
    assert_eq!(particles.emitter(a).unwrap().material, "a");
    assert_eq!(particles.emitter(c).unwrap().segment().index, 30);
    let order: Vec<String> = particles
        .emitters()
        .map(|(_, e)| e.material.clone())
        .collect();
    assert_eq!(order, ["a", "c"]);

    assert!(matches!(particles.remove(b), Err(GaleError::UnknownEmitter)));

    // the hole is reused first-fit
    let d = particles.add(sized(15), "d").unwrap();
    assert_eq!(particles.emitter(d).unwrap().segment().index, 10);
    assert_eq!(particles.free_ranges(), &[(25, 30), (60, 1000)]);
}

#[test]
fn emitter_slots_are_recycled_up_to_the_limit() {
    let (mut particles, _backend) = system(1000, 2);
    let a = particles.add(sized(1), "a").unwrap();
    let _b = particles.add(sized(1), "b").unwrap();
    assert!(matches!(
        particles.add(sized(1), "c"),
        Err(GaleError::EmitterLimitReached { max: 2 })
    ));

    let slot = particles.emitter(a).unwrap().slot();
    particles.remove(a).unwrap();
    let c = particles.add(sized(1), "c").unwrap();
    assert_eq!(particles.emitter(c).unwrap().slot(), slot);
}

#[test]
fn exhausted_buffer_yields_inert_emitter() {
    let (mut particles, backend) = system(100, 8);
    let big = particles.add(sized(101), "big").unwrap();
    let emitter = particles.emitter(big).unwrap();

    assert_eq!(emitter.segment(), Segment { index: 100, length: 0 });
    assert!(emitter.is_inert());
    assert!(backend.calls().is_empty());

    particles.load_material("big", material(1));
    assert_eq!(particles.update(1.0), 0);
    particles.draw(&CameraMatrices::default());
    assert!(backend.emissions().is_empty());
    assert!(backend.draws().is_empty());

    // removing it touches neither the free list nor the GPU
    particles.remove(big).unwrap();
    assert_eq!(particles.free_ranges(), &[(0, 100)]);
    assert!(!backend
        .calls()
        .iter()
        .any(|c| matches!(c, ParticleCall::ResetSegment(_))));
}

#[test]
fn clear_releases_everything() {
    let (mut particles, _backend) = system(100, 4);
    particles.add(sized(10), "a").unwrap();
    particles.add(sized(20), "b").unwrap();
    particles.clear();

    assert!(particles.is_empty());
    assert_eq!(particles.reserved(), 0);
    assert_eq!(particles.free_ranges(), &[(0, 100)]);
}

// ============================================================================
// Per-frame
// ============================================================================

#[test]
fn update_emits_per_interval_and_simulates_allocated_prefix() {
    let (mut particles, backend) = system(1000, 8);
    let settings = ParticleSettings {
        frequency: Range::splat(10.0),
        count: Range::splat(2),
        life: Range::splat(1.0),
        ..Default::default()
    };
    let key = particles.add(settings, "spark").unwrap();
    backend.take();

    let emitted = particles.update(0.35);
    assert_eq!(emitted, 8);
    let emissions = backend.emissions();
    assert_eq!(emissions.len(), 1);
    assert_eq!(emissions[0].count, 8);
    assert_eq!(emissions[0].index, particles.emitter(key).unwrap().slot());

    let simulate = backend
        .calls()
        .into_iter()
        .find_map(|c| match c {
            ParticleCall::Simulate { count, .. } => Some(count),
            _ => None,
        })
        .unwrap();
    assert_eq!(simulate, 20);
    assert_eq!(workgroups(simulate), 1);
}

#[test]
fn disabled_and_zero_frequency_emitters_stay_silent() {
    let (mut particles, backend) = system(1000, 8);
    let paused = particles.add(sized(4), "paused").unwrap();
    particles.emitter_mut(paused).unwrap().enabled = false;
    let silent = particles
        .add(
            ParticleSettings {
                frequency: Range::new(0.0, 0.0),
                life: Range::splat(1.0),
                ..Default::default()
            },
            "silent",
        )
        .unwrap();

    for _ in 0..5 {
        assert_eq!(particles.update(0.5), 0);
    }
    assert!(backend.emissions().is_empty());
    assert!(particles.emitter(silent).unwrap().is_inert());
}

#[test]
fn tuning_frequency_to_zero_stops_and_raising_it_resumes() {
    let (mut particles, backend) = system(1000, 8);
    let key = particles.add(sized(4), "tuned").unwrap();
    assert_eq!(particles.update(0.5), 4);

    particles.emitter_mut(key).unwrap().settings_mut().frequency = Range::splat(0.0);
    assert_eq!(particles.update(0.6), 0);
    assert!(particles.emitter(key).unwrap().next_interval().is_infinite());
    assert_eq!(particles.update(5.0), 0);
    assert_eq!(backend.emissions().len(), 1);

    particles.emitter_mut(key).unwrap().settings_mut().frequency = Range::splat(2.0);
    assert_eq!(particles.update(0.1), 4);
    let emitter = particles.emitter(key).unwrap();
    assert!((emitter.next_interval() - 0.5).abs() < 1e-6);
    assert_eq!(backend.emissions().len(), 2);
}

#[test]
fn emission_is_capped_at_segment_length() {
    let (mut particles, backend) = system(1000, 8);
    let key = particles.add(sized(10), "burst").unwrap();
    particles.emitter_mut(key).unwrap().settings_mut().count = Range::splat(500);

    assert_eq!(particles.update(0.1), 10);
    assert_eq!(backend.emissions()[0].count, 10);
}

#[test]
fn draw_uses_loaded_materials_only() {
    let (mut particles, backend) = system(1000, 8);
    let settings = ParticleSettings {
        emissivity: Range::new(0.5, 2.0),
        stretching: 3.0,
        ..sized(16)
    };
    particles.add(sized(8), "unloaded").unwrap();
    particles.add(settings, "fire").unwrap();
    assert!(particles.load_material("fire", material(1)).is_none());
    assert_eq!(particles.load_material("fire", material(2)), Some(material(1)));
    backend.take();

    particles.draw(&CameraMatrices::default());
    let calls = backend.take();
    assert_eq!(
        calls,
        [
            ParticleCall::BeginDraw,
            ParticleCall::BindMaterial(material(2)),
            ParticleCall::Draw(gale::particles::DrawParams {
                base_index: 8,
                instances: 16,
                emissivity: Vec2::new(0.5, 2.0),
                stretching: 3.0,
            }),
        ]
    );
    assert_eq!(particles.materials().len(), 1);
}

// ============================================================================
// Settings
// ============================================================================

#[test]
fn required_length_uses_range_maxima() {
    let settings = ParticleSettings {
        frequency: Range::new(30.0, 60.0),
        count: Range::new(1, 3),
        life: Range::new(1.0, 1.51),
        ..Default::default()
    };
    // 3 * ceil(1.51 * 60)
    assert_eq!(settings.required_length(), 3 * 91);
}

#[test]
fn settings_from_json() {
    let settings = ParticleSettings::from_json(
        r#"{
            "frequency": 30,
            "count": { "min": 1, "max": 3 },
            "life": 2.5,
            "direction": [0.0, 0.0, 1.0],
            "stretching": 2
        }"#,
    )
    .unwrap();

    assert_eq!(settings.frequency, Range::splat(30.0));
    assert_eq!(settings.count, Range::new(1, 3));
    assert_eq!(settings.life, Range::splat(2.5));
    assert_eq!(settings.direction, Vec3::Z);
    assert_eq!(settings.stretching, 2.0);
    // untouched fields keep their defaults
    assert_eq!(settings.velocity, ParticleSettings::default().velocity);

    assert!(matches!(
        ParticleSettings::from_json("{ \"count\": \"many\" }"),
        Err(GaleError::Json(_))
    ));
}
