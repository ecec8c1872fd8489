//! Race Course Demo
//!
//! Runs a small race course headless for a few seconds: a player body flies
//! along -Z through two checkpoints, past a sliding barrier, through a boost
//! ring and into the goal. A checkpoint marker circles the next gate. Physics
//! and particle GPU work are stand-ins that only log what a real backend
//! would do.
//!
//! Run with `RUST_LOG=debug cargo run --example race_course` to see the
//! engine's log output.

use std::collections::HashMap;

use gale::assets::{AssetNode, InstanceBuffer, PhysicsInstance, SceneAsset};
use gale::entities::{
    CheckpointEntity, CheckpointMarkerEntity, FIREWORK_MATERIAL, register_builtin_entities,
};
use gale::particles::{
    CameraMatrices, DrawParams, Emission, EmitterShaderValues, ParticleBackend, ParticleBlending,
    ParticleMaterial, Segment, TextureId,
};
use gale::physics::{BodyId, ContactDispatcher, PhysicsBackend};
use gale::scene::{NodeRef, Scene, Transform};
use gale::utils::FrameTimer;
use gale::{Engine, EngineSettings};
use glam::{Quat, Vec3};

const PLAYER: BodyId = BodyId(1);

// ============================================================================
// Stand-in backends
// ============================================================================

/// Moves bodies by their velocity and reports a sensor contact whenever a
/// body crosses a sensor's Z plane.
#[derive(Default)]
struct LinePhysics {
    positions: HashMap<BodyId, Vec3>,
    velocities: HashMap<BodyId, Vec3>,
    sensors: Vec<(BodyId, f32)>,
}

impl PhysicsBackend for LinePhysics {
    fn step(&mut self, interval: f32, contacts: &mut ContactDispatcher) {
        for (body, velocity) in &self.velocities {
            let position = self.positions.entry(*body).or_default();
            let before = position.z;
            *position += *velocity * interval;
            for &(sensor, z) in &self.sensors {
                if (before - z) * (position.z - z) <= 0.0 && before != position.z {
                    contacts.record(sensor, *body, false);
                }
            }
        }
    }

    fn body_position(&self, body: BodyId) -> Vec3 {
        self.positions.get(&body).copied().unwrap_or_default()
    }

    fn body_rotation(&self, _body: BodyId) -> Quat {
        Quat::IDENTITY
    }

    fn linear_velocity(&self, body: BodyId) -> Vec3 {
        self.velocities.get(&body).copied().unwrap_or_default()
    }

    fn set_linear_velocity(&mut self, body: BodyId, velocity: Vec3) {
        self.velocities.insert(body, velocity);
    }

    fn set_body_position(&mut self, body: BodyId, position: Vec3) {
        self.positions.insert(body, position);
    }

    fn set_body_rotation(&mut self, _body: BodyId, _rotation: Quat) {}
}

#[derive(Default)]
struct LogParticles {
    emitted: u64,
}

impl ParticleBackend for LogParticles {
    fn write_emitter(&mut self, slot: u32, values: &EmitterShaderValues) {
        log::debug!("emitter {slot}: {:?}", values.index_length);
    }

    fn write_free_stack(&mut self, _offset: u32, _indices: &[u32]) {}

    fn write_free_head(&mut self, _slot: u32, _head: i32) {}

    fn reset_segment(&mut self, segment: Segment) {
        log::debug!("reset {}..{}", segment.index, segment.end());
    }

    fn dispatch_emit(&mut self, emission: &Emission) {
        self.emitted += u64::from(emission.count);
    }

    fn dispatch_simulate(&mut self, _count: u32, _dt: f32) {}

    fn begin_draw(&mut self, _camera: &CameraMatrices) {}

    fn bind_material(&mut self, _material: &ParticleMaterial) {}

    fn draw_instanced(&mut self, _params: &DrawParams) {}
}

impl Drop for LogParticles {
    fn drop(&mut self) {
        log::info!("{} particles emitted in total", self.emitted);
    }
}

// ============================================================================
// Course
// ============================================================================

struct Slots(usize);

impl Slots {
    fn next(&mut self) -> usize {
        self.0 += 1;
        self.0 - 1
    }
}

fn propeller(asset: &mut SceneAsset, slots: &mut Slots, parent: usize, name: &str, x: f32) {
    let node = asset.add_node(
        parent,
        AssetNode::new(name).with_transform(Transform::from_translation(Vec3::new(x, 4.0, 0.0))),
    );
    asset.attach_graphics(node, slots.next());
    let blades = asset.add_node(node, AssetNode::new("Propeller.Blades.001"));
    asset.attach_graphics(blades, slots.next());
}

fn build_course(physics: &mut LinePhysics) -> SceneAsset {
    let mut asset = SceneAsset::new("race_course");
    let mut slots = Slots(0);

    let gates = [("Checkpoint.001", -40.0), ("Checkpoint.002", -90.0)];
    for (i, (name, z)) in gates.iter().enumerate() {
        let mut node = AssetNode::new(*name)
            .with_transform(Transform::from_translation(Vec3::new(0.0, 0.0, *z)))
            .with_entity("Checkpoint")
            .with_property("is_first", i == 0);
        if let Some((next, _)) = gates.get(i + 1) {
            node = node.with_property("next_checkpoint", *next);
        }
        let gate = asset.add_node(asset.root, node);

        let body = BodyId(10 + i as u32);
        let sensor = asset.add_node(gate, AssetNode::new("Phys.Box.Sensor"));
        asset.attach_physics(sensor, PhysicsInstance::sensor(*name, body, "checkpoint"));
        physics.sensors.push((body, *z));
        asset.add_node(
            gate,
            AssetNode::new("Gate.Respawn")
                .with_transform(Transform::from_translation(Vec3::new(0.0, 2.0, *z + 8.0))),
        );

        propeller(&mut asset, &mut slots, gate, "Propeller.Left", -6.0);
        propeller(&mut asset, &mut slots, gate, "Propeller.Right", 6.0);
    }

    let barrier = asset.add_node(
        asset.root,
        AssetNode::new("Barrier.001")
            .with_entity("BarrierObstacle")
            .with_property("cycle_time", 1.5_f32),
    );
    for (name, x) in [("Barrier.MoveFrom", -5.0), ("Barrier.MoveTo", 5.0)] {
        asset.add_node(
            barrier,
            AssetNode::new(name)
                .with_transform(Transform::from_translation(Vec3::new(x, 0.0, -75.0))),
        );
    }
    let collider = asset.add_node(barrier, AssetNode::new("Phys.Barrier.BoxCollider"));
    asset.attach_physics(
        collider,
        PhysicsInstance {
            kinematic: true,
            ..PhysicsInstance::new("Barrier", BodyId(40))
        },
    );
    let mesh = asset.add_node(barrier, AssetNode::new("Barrier.Mesh"));
    asset.attach_graphics(mesh, slots.next());

    let ring = asset.add_node(
        asset.root,
        AssetNode::new("BoostRing.001")
            .with_transform(Transform::from_translation(Vec3::new(0.0, 0.0, -60.0)))
            .with_entity("BoostRing")
            .with_property("boost", 15.0_f32),
    );
    let mesh = asset.add_node(ring, AssetNode::new("BoostRing.Mesh"));
    asset.attach_graphics(mesh, slots.next());
    let sensor = asset.add_node(ring, AssetNode::new("Phys.Cylinder.Sensor"));
    asset.attach_physics(sensor, PhysicsInstance::sensor("BoostRing", BodyId(20), "boost"));
    physics.sensors.push((BodyId(20), -60.0));

    let goal = asset.add_node(
        asset.root,
        AssetNode::new("Goal")
            .with_transform(Transform::from_translation(Vec3::new(0.0, 0.0, -120.0)))
            .with_entity("GoalFirework"),
    );
    let sensor = asset.add_node(goal, AssetNode::new("Phys.Box.Sensor"));
    asset.attach_physics(sensor, PhysicsInstance::sensor("Goal", BodyId(30), "goal"));
    physics.sensors.push((BodyId(30), -120.0));
    for (name, x) in [("Jet.Left", -8.0), ("Jet.Right", 8.0)] {
        asset.add_node(
            goal,
            AssetNode::new(name)
                .with_transform(Transform::from_translation(Vec3::new(x, 0.0, -120.0))),
        );
    }

    let player = asset.add_node(asset.root, AssetNode::new("Player").with_tag("player"));
    asset.attach_physics(player, PhysicsInstance::new("Player", PLAYER));
    physics.velocities.insert(PLAYER, Vec3::new(0.0, 0.0, -30.0));

    asset.with_attributes(InstanceBuffer::with_len(slots.0, Some("race_course")))
}

/// The first checkpoint in race order not passed yet.
fn next_gate(scene: &Scene) -> Option<NodeRef> {
    scene
        .entities_of::<CheckpointEntity>()
        .find(|(_, c)| !c.passed())
        .map(|(_, c)| c.base())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut physics = LinePhysics::default();
    let asset = build_course(&mut physics);

    let mut engine = Engine::new(
        EngineSettings::default(),
        Box::new(physics),
        Box::new(LogParticles::default()),
    );
    register_builtin_entities(engine.factory_mut());
    engine.services.particles.load_material(
        FIREWORK_MATERIAL,
        ParticleMaterial {
            blending: ParticleBlending::Additive,
            sprite: TextureId(1),
            tint: TextureId(2),
            scale: TextureId(3),
        },
    );
    engine.load_scene(&asset)?;

    let first = engine.scene().and_then(next_gate);
    let marker = match first {
        Some(gate) => Some(engine.create_entity(CheckpointMarkerEntity::new(gate))?),
        None => None,
    };

    let camera = CameraMatrices::default();
    let mut timer = FrameTimer::fixed(1.0 / 120.0);
    while timer.elapsed.as_secs_f32() < 5.0 {
        let report = engine.frame(timer.tick())?;
        if let (Some(id), Some(scene)) = (marker, engine.scene_mut()) {
            let gate = next_gate(scene);
            if let Some(marker) = scene.entity_mut::<CheckpointMarkerEntity>(id) {
                match gate {
                    Some(gate) if marker.target() != Some(gate) => marker.set_target(gate),
                    None => marker.clear_target(),
                    _ => {}
                }
            }
        }
        engine.draw_particles(&camera);
        if report.emitted > 0 && timer.frame_count % 60 == 0 {
            log::info!("frame {}: {} particles emitted", timer.frame_count, report.emitted);
        }
    }

    if let Some(scene) = engine.scene() {
        let passed = scene
            .entities_of::<CheckpointEntity>()
            .filter(|(_, c)| c.passed())
            .count();
        println!(
            "{} of {} checkpoints passed, {} emitters live",
            passed,
            scene.entities_of::<CheckpointEntity>().count(),
            engine.services.particles.len()
        );
    }

    engine.unload_scene()?;
    Ok(())
}
