mod common;

use std::f32::consts::{FRAC_PI_2, PI};

use cgmath::{Matrix4, Vector3};
use common::test_utils::TreeNode;
use instant::Duration;
use shiftview::{
    animation::Easing,
    data_structures::{
        scene_graph::{Hierarchy, wrap_roots},
        transform::Transform,
    },
    input::RotationBridge,
};

/// 90° about X, as authored on the root of the stock helmet asset.
fn upright_root() -> TreeNode {
    TreeNode::new(
        "node_damagedHelmet",
        Transform::from_decomposed([0.0; 3], [0.707_106_8, 0.0, 0.0, 0.707_106_8], [1.0; 3]),
    )
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

fn matrices_close(a: Matrix4<f32>, b: Matrix4<f32>) -> bool {
    let a: &[f32; 16] = a.as_ref();
    let b: &[f32; 16] = b.as_ref();
    a.iter().zip(b).all(|(x, y)| close(*x, *y))
}

#[test]
fn single_root_is_wrapped_in_identity_container() {
    let wrapper = wrap_roots([upright_root()], TreeNode::new("scene", Transform::new()));

    assert_eq!(wrapper.transform, Transform::new());
    assert_eq!(wrapper.children().len(), 1);
    assert_eq!(wrapper.children()[0], upright_root());
}

#[test]
fn container_transform_is_reset() {
    let mut offset = Transform::new();
    offset.position = Vector3::new(1.0, 2.0, 3.0);

    let wrapper = wrap_roots([upright_root()], TreeNode::new("scene", offset));

    assert_eq!(wrapper.transform, Transform::new());
}

#[test]
fn multiple_roots_share_one_container_in_order() {
    let roots = ["left", "right", "top"].map(|name| TreeNode::new(name, Transform::new()));

    let wrapper = wrap_roots(roots, TreeNode::new("scene", Transform::new()));

    let names: Vec<&str> = wrapper.children().iter().map(|node| node.name.as_str()).collect();
    assert_eq!(names, ["left", "right", "top"]);
    assert!(wrapper.children().iter().all(|node| node.children().is_empty()));
}

#[test]
fn centred_pointer_keeps_authored_orientation() {
    let mut wrapper = wrap_roots([upright_root()], TreeNode::new("scene", Transform::new()));
    let authored = upright_root().transform.to_matrix();
    assert!(close(wrapper.children()[0].transform.rotation.x.0, FRAC_PI_2));

    let mut bridge = RotationBridge::new(Duration::from_millis(500), Easing::QuadOut, PI * 0.1);
    assert!(bridge.on_pointer_move(Some(&wrapper.transform), (400.0, 300.0), (800.0, 600.0)));
    bridge.advance(Duration::from_secs(1), Some(&mut wrapper.transform));

    let child = &wrapper.children()[0];
    assert!(close(child.transform.rotation.x.0, FRAC_PI_2), "child pitch {:?}", child.transform.rotation.x);
    assert_eq!(wrapper.transform, Transform::new());
    assert!(matrices_close(wrapper.transform.to_matrix() * child.transform.to_matrix(), authored));
}

#[test]
fn pointer_tilt_rotates_container_not_child() {
    let mut wrapper = wrap_roots([upright_root()], TreeNode::new("scene", Transform::new()));

    let mut bridge = RotationBridge::new(Duration::from_millis(500), Easing::QuadOut, PI * 0.1);
    bridge.on_pointer_move(Some(&wrapper.transform), (800.0, 600.0), (800.0, 600.0));
    bridge.advance(Duration::from_secs(1), Some(&mut wrapper.transform));

    assert!(close(wrapper.transform.rotation.x.0, PI * 0.05));
    assert!(close(wrapper.transform.rotation.y.0, PI * 0.05));
    assert_eq!(wrapper.children()[0], upright_root());
}
