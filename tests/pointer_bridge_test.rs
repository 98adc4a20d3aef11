use std::f32::consts::PI;

use instant::Duration;
use shiftview::{
    animation::Easing,
    data_structures::transform::Transform,
    input::{RotationBridge, pointer_to_rotation},
};

const SWING: f32 = PI * 0.1;

fn bridge() -> RotationBridge {
    RotationBridge::new(Duration::from_millis(500), Easing::QuadOut, SWING)
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn pointer_maps_to_scaled_offsets_from_centre() {
    let (pitch, yaw) = pointer_to_rotation(200.0, 450.0, 800.0, 600.0, SWING);
    assert!(close(pitch, (450.0 / 600.0 - 0.5) * PI * 0.1), "pitch {}", pitch);
    assert!(close(yaw, (200.0 / 800.0 - 0.5) * PI * 0.1), "yaw {}", yaw);

    let (pitch, yaw) = pointer_to_rotation(0.0, 0.0, 1024.0, 768.0, SWING);
    assert!(close(pitch, -0.05 * PI));
    assert!(close(yaw, -0.05 * PI));
}

#[test]
fn targets_stay_within_swing_even_outside_viewport() {
    let limit = 0.05 * PI + 1e-6;
    for x in [-500.0, 0.0, 13.0, 400.0, 799.0, 800.0, 5000.0] {
        for y in [-1.0, 0.0, 299.5, 600.0, 1e6] {
            let (pitch, yaw) = pointer_to_rotation(x, y, 800.0, 600.0, SWING);
            assert!(pitch.abs() <= limit, "pitch {} at ({}, {})", pitch, x, y);
            assert!(yaw.abs() <= limit, "yaw {} at ({}, {})", yaw, x, y);
        }
    }
}

#[test]
fn no_model_means_no_tween() {
    let mut bridge = bridge();
    assert!(!bridge.on_pointer_move(None, (10.0, 10.0), (800.0, 600.0)));
    assert!(bridge.pending().is_none());
    // Advancing without a model is a no-op as well
    bridge.advance(Duration::from_millis(16), None);
}

#[test]
fn tween_eases_model_to_target() {
    let mut bridge = bridge();
    let mut model = Transform::new();
    assert!(bridge.on_pointer_move(Some(&model), (800.0, 600.0), (800.0, 600.0)));

    bridge.advance(Duration::from_millis(250), Some(&mut model));
    let halfway = model.rotation.x.0;
    // QuadOut is three quarters of the way at half time
    assert!((halfway - 0.75 * 0.05 * PI).abs() < 1e-4, "halfway {}", halfway);

    bridge.advance(Duration::from_millis(250), Some(&mut model));
    assert_eq!(model.rotation.x.0, 0.5 * SWING);
    assert_eq!(model.rotation.y.0, 0.5 * SWING);
    assert!(bridge.pending().is_none());
}

#[test]
fn second_pointer_move_wins() {
    let mut bridge = bridge();
    let mut model = Transform::new();
    bridge.on_pointer_move(Some(&model), (0.0, 0.0), (800.0, 600.0));
    bridge.advance(Duration::from_millis(16), Some(&mut model));
    bridge.on_pointer_move(Some(&model), (600.0, 150.0), (800.0, 600.0));

    let (pitch, yaw) = pointer_to_rotation(600.0, 150.0, 800.0, 600.0, SWING);
    assert_eq!(bridge.pending().map(|t| t.target()), Some([pitch, yaw]));

    for _ in 0..40 {
        bridge.advance(Duration::from_millis(16), Some(&mut model));
    }
    assert_eq!(model.rotation.x.0, pitch);
    assert_eq!(model.rotation.y.0, yaw);
}
