//! Shared fixtures for the integration tests: scripted physics and particle
//! backends plus a small race course asset.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use glam::{Quat, Vec3};
use gale::assets::{AssetNode, InstanceBuffer, PhysicsInstance, SceneAsset};
use gale::particles::{
    CameraMatrices, DrawParams, Emission, EmitterShaderValues, ParticleBackend, ParticleMaterial,
    Segment,
};
use gale::physics::{BodyId, ContactDispatcher, PhysicsBackend};
use gale::scene::Transform;
use gale::{Engine, EngineSettings};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

pub fn vec3_approx_eq(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-4
}

// ============================================================================
// Physics
// ============================================================================

/// One scripted contact: `(sensor, other, persistent)`.
pub type ScriptedContact = (BodyId, BodyId, bool);

#[derive(Debug, Default)]
pub struct PhysicsState {
    pub steps: u32,
    pub intervals: Vec<f32>,
    /// Contacts reported on successive steps, front first.
    pub script: VecDeque<Vec<ScriptedContact>>,
    pub poses: HashMap<BodyId, (Vec3, Quat)>,
    pub velocities: HashMap<BodyId, Vec3>,
    /// Contacts the dispatcher refused because nobody listened.
    pub unrouted: u32,
}

/// Physics backend whose contacts are scripted by the test. Bodies move
/// with their linear velocity on every step.
#[derive(Debug, Clone, Default)]
pub struct FakePhysics(pub Rc<RefCell<PhysicsState>>);

impl FakePhysics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_step(&self, contacts: Vec<ScriptedContact>) {
        self.0.borrow_mut().script.push_back(contacts);
    }

    pub fn set_pose(&self, body: BodyId, position: Vec3, rotation: Quat) {
        self.0.borrow_mut().poses.insert(body, (position, rotation));
    }

    pub fn set_velocity(&self, body: BodyId, velocity: Vec3) {
        self.0.borrow_mut().velocities.insert(body, velocity);
    }

    pub fn pose(&self, body: BodyId) -> (Vec3, Quat) {
        self.0
            .borrow()
            .poses
            .get(&body)
            .copied()
            .unwrap_or((Vec3::ZERO, Quat::IDENTITY))
    }

    pub fn velocity(&self, body: BodyId) -> Vec3 {
        self.0
            .borrow()
            .velocities
            .get(&body)
            .copied()
            .unwrap_or(Vec3::ZERO)
    }

    pub fn steps(&self) -> u32 {
        self.0.borrow().steps
    }
}

impl PhysicsBackend for FakePhysics {
    fn step(&mut self, interval: f32, contacts: &mut ContactDispatcher) {
        let mut state = self.0.borrow_mut();
        state.steps += 1;
        state.intervals.push(interval);

        let moving: Vec<(BodyId, Vec3)> = state.velocities.iter().map(|(&b, &v)| (b, v)).collect();
        for (body, velocity) in moving {
            let pose = state.poses.entry(body).or_insert((Vec3::ZERO, Quat::IDENTITY));
            pose.0 += velocity * interval;
        }
        if let Some(step) = state.script.pop_front() {
            for (sensor, other, persistent) in step {
                if !contacts.record(sensor, other, persistent) {
                    state.unrouted += 1;
                }
            }
        }
    }

    fn body_position(&self, body: BodyId) -> Vec3 {
        self.0.borrow().poses.get(&body).map_or(Vec3::ZERO, |p| p.0)
    }

    fn body_rotation(&self, body: BodyId) -> Quat {
        self.0
            .borrow()
            .poses
            .get(&body)
            .map_or(Quat::IDENTITY, |p| p.1)
    }

    fn linear_velocity(&self, body: BodyId) -> Vec3 {
        self.velocity(body)
    }

    fn set_linear_velocity(&mut self, body: BodyId, velocity: Vec3) {
        self.0.borrow_mut().velocities.insert(body, velocity);
    }

    fn set_body_position(&mut self, body: BodyId, position: Vec3) {
        let mut state = self.0.borrow_mut();
        let pose = state.poses.entry(body).or_insert((Vec3::ZERO, Quat::IDENTITY));
        pose.0 = position;
    }

    fn set_body_rotation(&mut self, body: BodyId, rotation: Quat) {
        let mut state = self.0.borrow_mut();
        let pose = state.poses.entry(body).or_insert((Vec3::ZERO, Quat::IDENTITY));
        pose.1 = rotation;
    }
}

// ============================================================================
// Particles
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ParticleCall {
    WriteEmitter { slot: u32, values: EmitterShaderValues },
    WriteFreeStack { offset: u32, len: usize, first: Option<u32> },
    WriteFreeHead { slot: u32, head: i32 },
    ResetSegment(Segment),
    Emit(Emission),
    Simulate { count: u32, dt: f32 },
    BeginDraw,
    BindMaterial(ParticleMaterial),
    Draw(DrawParams),
}

/// Particle backend logging every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingParticles(pub Rc<RefCell<Vec<ParticleCall>>>);

impl RecordingParticles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ParticleCall> {
        self.0.borrow().clone()
    }

    pub fn take(&self) -> Vec<ParticleCall> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn emissions(&self) -> Vec<Emission> {
        self.0
            .borrow()
            .iter()
            .filter_map(|c| match c {
                ParticleCall::Emit(e) => Some(*e),
                _ => None,
            })
            .collect()
    }

    pub fn draws(&self) -> Vec<DrawParams> {
        self.0
            .borrow()
            .iter()
            .filter_map(|c| match c {
                ParticleCall::Draw(d) => Some(*d),
                _ => None,
            })
            .collect()
    }
}

impl ParticleBackend for RecordingParticles {
    fn write_emitter(&mut self, slot: u32, values: &EmitterShaderValues) {
        self.0.borrow_mut().push(ParticleCall::WriteEmitter {
            slot,
            values: *values,
        });
    }

    fn write_free_stack(&mut self, offset: u32, indices: &[u32]) {
        self.0.borrow_mut().push(ParticleCall::WriteFreeStack {
            offset,
            len: indices.len(),
            first: indices.first().copied(),
        });
    }

    fn write_free_head(&mut self, slot: u32, head: i32) {
        self.0
            .borrow_mut()
            .push(ParticleCall::WriteFreeHead { slot, head });
    }

    fn reset_segment(&mut self, segment: Segment) {
        self.0.borrow_mut().push(ParticleCall::ResetSegment(segment));
    }

    fn dispatch_emit(&mut self, emission: &Emission) {
        self.0.borrow_mut().push(ParticleCall::Emit(*emission));
    }

    fn dispatch_simulate(&mut self, count: u32, dt: f32) {
        self.0
            .borrow_mut()
            .push(ParticleCall::Simulate { count, dt });
    }

    fn begin_draw(&mut self, _camera: &CameraMatrices) {
        self.0.borrow_mut().push(ParticleCall::BeginDraw);
    }

    fn bind_material(&mut self, material: &ParticleMaterial) {
        self.0
            .borrow_mut()
            .push(ParticleCall::BindMaterial(*material));
    }

    fn draw_instanced(&mut self, params: &DrawParams) {
        self.0.borrow_mut().push(ParticleCall::Draw(*params));
    }
}

// ============================================================================
// Engine and assets
// ============================================================================

pub struct Harness {
    pub engine: Engine,
    pub physics: FakePhysics,
    pub particles: RecordingParticles,
}

pub fn harness(settings: EngineSettings) -> Harness {
    init_logging();
    let physics = FakePhysics::new();
    let particles = RecordingParticles::new();
    let engine = Engine::new(
        settings,
        Box::new(physics.clone()),
        Box::new(particles.clone()),
    );
    Harness {
        engine,
        physics,
        particles,
    }
}

pub const CHECKPOINT_A_SENSOR: BodyId = BodyId(10);
pub const CHECKPOINT_B_SENSOR: BodyId = BodyId(11);
pub const CRATE_BODY: BodyId = BodyId(20);
pub const BOOST_SENSOR: BodyId = BodyId(30);
pub const GOAL_SENSOR: BodyId = BodyId(40);
pub const BARRIER_BODY: BodyId = BodyId(50);
pub const MILL_BODY: BodyId = BodyId(60);
pub const PLAYER_BODY: BodyId = BodyId(1);
pub const DEBRIS_BODY: BodyId = BodyId(2);

/// Next free attribute slot; the asset's buffer is sized at the end.
struct Slots(usize);

impl Slots {
    fn next(&mut self) -> usize {
        self.0 += 1;
        self.0 - 1
    }
}

fn add_propeller(asset: &mut SceneAsset, slots: &mut Slots, parent: usize, name: &str) {
    let propeller = asset.add_node(parent, AssetNode::new(name));
    asset.attach_graphics(propeller, slots.next());
    let blades = asset.add_node(propeller, AssetNode::new("Propeller.Blades.001"));
    asset.attach_graphics(blades, slots.next());
}

fn add_checkpoint(
    asset: &mut SceneAsset,
    slots: &mut Slots,
    name: &str,
    at: Vec3,
    sensor: BodyId,
    next: Option<&str>,
    first: bool,
) -> usize {
    let mut node = AssetNode::new(name)
        .with_transform(Transform::from_translation(at))
        .with_entity("Checkpoint")
        .with_property("is_first", first);
    if let Some(next) = next {
        node = node.with_property("next_checkpoint", next);
    }
    let checkpoint = asset.add_node(asset.root, node);

    let sensor_node = asset.add_node(checkpoint, AssetNode::new("Phys.Box.Sensor.002"));
    asset.attach_physics(
        sensor_node,
        PhysicsInstance::sensor(format!("{name}.Sensor"), sensor, "checkpoint"),
    );
    asset.add_node(
        checkpoint,
        AssetNode::new("Checkpoint.Respawn")
            .with_transform(Transform::from_translation(at + Vec3::new(0.0, 2.0, 5.0))),
    );
    add_propeller(asset, slots, checkpoint, "Propeller.Left");
    add_propeller(asset, slots, checkpoint, "Propeller.Right");
    checkpoint
}

fn kinematic(name: &str, body: BodyId) -> PhysicsInstance {
    PhysicsInstance {
        kinematic: true,
        ..PhysicsInstance::new(name, body)
    }
}

/// Two checkpoints, a crate, a boost ring, the goal, a sliding barrier, a
/// mill, and a player body.
pub fn race_course_asset() -> SceneAsset {
    let mut asset = SceneAsset::new("race_course");
    let mut slots = Slots(0);

    add_checkpoint(
        &mut asset,
        &mut slots,
        "Checkpoint.A",
        Vec3::new(0.0, 0.0, -20.0),
        CHECKPOINT_A_SENSOR,
        Some("Checkpoint.B"),
        true,
    );
    add_checkpoint(
        &mut asset,
        &mut slots,
        "Checkpoint.B",
        Vec3::new(0.0, 0.0, -60.0),
        CHECKPOINT_B_SENSOR,
        None,
        false,
    );

    let crate_node = asset.add_node(asset.root, AssetNode::new("Crate.001").with_entity("Crate"));
    let collider = asset.add_node(crate_node, AssetNode::new("Phys.Crate.Box"));
    asset.attach_physics(collider, PhysicsInstance::new("Crate.Box", CRATE_BODY));
    let mesh = asset.add_node(
        crate_node,
        AssetNode::new("Crate.Mesh").with_transform(Transform::from_translation(Vec3::new(
            5.0, 1.0, 0.0,
        ))),
    );
    asset.attach_graphics(mesh, slots.next());

    let ring = asset.add_node(
        asset.root,
        AssetNode::new("BoostRing.001")
            .with_entity("BoostRing")
            .with_property("boost", 12.5_f32),
    );
    let ring_mesh = asset.add_node(ring, AssetNode::new("BoostRing.Mesh"));
    asset.attach_graphics(ring_mesh, slots.next());
    let ring_sensor = asset.add_node(ring, AssetNode::new("Phys.Cylinder.Sensor"));
    asset.attach_physics(
        ring_sensor,
        PhysicsInstance::sensor("BoostRing.Sensor", BOOST_SENSOR, "boost"),
    );

    let goal = asset.add_node(asset.root, AssetNode::new("Goal").with_entity("GoalFirework"));
    let goal_sensor = asset.add_node(goal, AssetNode::new("Phys.Box.Sensor"));
    asset.attach_physics(
        goal_sensor,
        PhysicsInstance::sensor("Goal.Sensor", GOAL_SENSOR, "goal"),
    );
    asset.add_node(
        goal,
        AssetNode::new("Jet.Left").with_transform(Transform::from_translation(Vec3::new(
            -4.0, 0.0, 0.0,
        ))),
    );
    asset.add_node(
        goal,
        AssetNode::new("Jet.Right").with_transform(Transform::from_translation(Vec3::new(
            4.0, 0.0, 0.0,
        ))),
    );

    let barrier = asset.add_node(
        asset.root,
        AssetNode::new("Barrier.001")
            .with_entity("BarrierObstacle")
            .with_property("cycle_time", 2.0_f32),
    );
    asset.add_node(
        barrier,
        AssetNode::new("Barrier.MoveFrom")
            .with_transform(Transform::from_translation(Vec3::new(-3.0, 1.0, -40.0))),
    );
    asset.add_node(
        barrier,
        AssetNode::new("Barrier.MoveTo")
            .with_transform(Transform::from_translation(Vec3::new(3.0, 1.0, -40.0))),
    );
    let barrier_collider = asset.add_node(barrier, AssetNode::new("Phys.Barrier.BoxCollider"));
    asset.attach_physics(barrier_collider, kinematic("Barrier", BARRIER_BODY));
    let barrier_mesh = asset.add_node(barrier, AssetNode::new("Barrier.Mesh"));
    asset.attach_graphics(barrier_mesh, slots.next());

    let mill = asset.add_node(
        asset.root,
        AssetNode::new("Mill.001")
            .with_entity("MillObstacle")
            .with_property("cycle_time", 4.0_f32),
    );
    let mill_collider = asset.add_node(mill, AssetNode::new("Phys.MillBlades.Collider"));
    asset.attach_physics(mill_collider, kinematic("MillBlades", MILL_BODY));
    let blades = asset.add_node(mill, AssetNode::new("MillBlades.Mesh"));
    asset.attach_graphics(blades, slots.next());

    let player = asset.add_node(asset.root, AssetNode::new("Player").with_tag("player"));
    asset.attach_physics(player, PhysicsInstance::new("Player", PLAYER_BODY));
    let debris = asset.add_node(asset.root, AssetNode::new("Debris"));
    asset.attach_physics(debris, PhysicsInstance::new("Debris", DEBRIS_BODY));

    asset.with_attributes(InstanceBuffer::with_len(slots.0, Some("race_course")))
}
