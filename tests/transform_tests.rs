//! Transform and instance attribute tests
//!
//! Tests for:
//! - Transform TRS composition and decomposition
//! - Direction helpers and interpolation
//! - Writing node transforms into the shared instance-attribute buffer

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use gale::assets::{AssetNode, InstanceAttributes, InstanceBuffer, SceneAsset};
use gale::scene::{EntityFactory, SceneBuilder, Transform};
use glam::{Mat4, Quat, Vec3};

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-5;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
}

fn sample() -> Transform {
    Transform::from_trs(
        Vec3::new(1.0, -2.0, 3.5),
        Quat::from_rotation_y(FRAC_PI_4) * Quat::from_rotation_x(0.3),
        Vec3::new(2.0, 1.0, 0.5),
    )
}

// ============================================================================
// Transform
// ============================================================================

#[test]
fn transform_default_is_identity() {
    let t = Transform::default();
    assert_eq!(t, Transform::IDENTITY);
    assert_eq!(t.matrix(), Mat4::IDENTITY);
}

#[test]
fn transform_matrix_is_translate_rotate_scale() {
    let t = sample();
    let expected = Mat4::from_translation(t.t) * Mat4::from_quat(t.r) * Mat4::from_scale(t.s);
    assert!(t.matrix().abs_diff_eq(expected, EPSILON));
}

#[test]
fn transform_matrix_applies_scale_first() {
    let t = Transform::from_trs(
        Vec3::new(10.0, 0.0, 0.0),
        Quat::from_rotation_z(FRAC_PI_2),
        Vec3::splat(2.0),
    );
    // scale to (2, 0, 0), rotate to (0, 2, 0), translate
    let p = t.matrix().transform_point3(Vec3::X);
    assert!(vec3_approx(p, Vec3::new(10.0, 2.0, 0.0)));
}

#[test]
fn transform_from_matrix_round_trip() {
    let t = sample();
    let back = Transform::from_matrix(t.matrix());
    assert!(vec3_approx(back.t, t.t));
    assert!(vec3_approx(back.s, t.s));
    assert!(back.r.abs_diff_eq(t.r, EPSILON) || back.r.abs_diff_eq(-t.r, EPSILON));
}

#[test]
fn transform_direction_helpers() {
    let mut t = Transform::new();
    assert_eq!(t.forward(), Vec3::NEG_Z);
    assert_eq!(t.up(), Vec3::Y);

    t.set_rotation_euler(0.0, FRAC_PI_2, 0.0);
    assert!(vec3_approx(t.forward(), Vec3::NEG_X));
    assert!(vec3_approx(t.up(), Vec3::Y));
}

#[test]
fn transform_lerp_endpoints_and_midpoint() {
    let a = Transform::from_translation(Vec3::ZERO);
    let b = Transform::from_trs(Vec3::new(4.0, 0.0, 0.0), Quat::from_rotation_y(FRAC_PI_2), Vec3::splat(3.0));

    assert_eq!(a.lerp(&b, 0.0).t, a.t);
    assert!(vec3_approx(a.lerp(&b, 1.0).t, b.t));

    let mid = a.lerp(&b, 0.5);
    assert!(vec3_approx(mid.t, Vec3::new(2.0, 0.0, 0.0)));
    assert!(vec3_approx(mid.s, Vec3::splat(2.0)));
    assert!(mid.r.abs_diff_eq(Quat::from_rotation_y(FRAC_PI_4), EPSILON));
}

// ============================================================================
// Instance attributes
// ============================================================================

#[test]
fn set_transform_from_node_round_trip() {
    let mut asset = SceneAsset::new("round_trip");
    let node = asset.add_node(0, AssetNode::new("Mesh").with_transform(sample()));
    asset.attach_graphics(node, 2);
    let buffer = InstanceBuffer::with_len(4, Some("instances"));
    let asset = asset.with_attributes(buffer.clone());

    let mut scene = SceneBuilder::new(&asset, &EntityFactory::new())
        .build()
        .unwrap();
    let mesh = scene.find("Mesh").unwrap();

    let store = scene.nodes();
    let graphics = mesh.graphics(store).unwrap();
    let version = buffer.version();
    graphics.set_transform_from_node(store).unwrap();

    let expected = sample().matrix();
    assert_eq!(graphics.attributes(store).unwrap().transform, expected);
    assert_eq!(buffer.get(2).unwrap().transform, expected);
    assert!(buffer.version() > version);
    // neighbouring slots untouched
    assert_eq!(buffer.get(1).unwrap(), InstanceAttributes::default());

    // later edits reach the buffer only through another write
    let store = scene.nodes_mut();
    mesh.transform(store)
        .unwrap()
        .set_position(store, Vec3::new(9.0, 9.0, 9.0))
        .unwrap();
    assert_eq!(buffer.get(2).unwrap().transform, expected);
    graphics.set_transform_from_node(store).unwrap();
    assert_eq!(
        buffer.get(2).unwrap().transform.w_axis.truncate(),
        Vec3::new(9.0, 9.0, 9.0)
    );
}

#[test]
fn instance_buffer_bounds_and_bytes() {
    let buffer = InstanceBuffer::with_len(3, None);
    assert_eq!(buffer.len(), 3);
    assert!(buffer.get(3).is_none());
    assert!(!buffer.write(3, |_| {}));
    assert_eq!(buffer.version(), 0);

    assert!(buffer.write(0, |a| a.transform = Mat4::from_translation(Vec3::X)));
    assert_eq!(buffer.version(), 1);
    assert_eq!(buffer.as_bytes().len(), 3 * std::mem::size_of::<InstanceAttributes>());

    let shared = buffer.clone();
    assert_eq!(shared, buffer);
    assert_ne!(InstanceBuffer::with_len(3, None), buffer);
}
