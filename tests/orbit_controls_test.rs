use cgmath::{Deg, InnerSpace, Rad};
use shiftview::camera::{Camera, OrbitControls};

fn fovy() -> Rad<f32> {
    Deg(75.0).into()
}

fn azimuth(camera: &Camera) -> f32 {
    let offset = camera.position - camera.target;
    offset.x.atan2(offset.z)
}

#[test]
fn input_without_update_does_not_move_the_camera() {
    let camera = Camera::new((0.0, 0.0, 2.0), (0.0, 0.0, 0.0));
    let before = camera.clone();
    let mut controls = OrbitControls::new(0.05);

    controls.rotate(120.0, 40.0, 600.0);
    controls.pan(10.0, 10.0, 600.0);
    controls.dolly(3.0);

    assert_eq!(camera, before);
}

#[test]
fn update_applies_queued_rotation() {
    let mut camera = Camera::new((0.0, 0.0, 2.0), (0.0, 0.0, 0.0));
    let mut controls = OrbitControls::new(0.05);
    controls.rotate(60.0, 0.0, 600.0);

    assert!(controls.update(&mut camera, fovy()));
    assert!(azimuth(&camera).abs() > 0.0);
    let distance = (camera.position - camera.target).magnitude();
    assert!((distance - 2.0).abs() < 1e-4, "distance {}", distance);
}

#[test]
fn damping_decays_each_step_geometrically() {
    let mut camera = Camera::new((0.0, 0.0, 2.0), (0.0, 0.0, 0.0));
    let mut controls = OrbitControls::new(0.05);
    controls.rotate(10.0, 0.0, 600.0);

    let mut last = azimuth(&camera);
    let mut steps = Vec::new();
    for _ in 0..4 {
        controls.update(&mut camera, fovy());
        let now = azimuth(&camera);
        steps.push(now - last);
        last = now;
    }

    for pair in steps.windows(2) {
        let ratio = pair[1] / pair[0];
        assert!((ratio - 0.95).abs() < 1e-2, "ratio {} in {:?}", ratio, steps);
    }
}

#[test]
fn without_damping_one_update_consumes_everything() {
    let mut camera = Camera::new((0.0, 0.0, 2.0), (0.0, 0.0, 0.0));
    let mut controls = OrbitControls::new(0.05);
    controls.enable_damping = false;
    controls.rotate(30.0, 0.0, 600.0);

    assert!(controls.update(&mut camera, fovy()));
    let settled = camera.position;
    controls.update(&mut camera, fovy());
    assert!((camera.position - settled).magnitude() < 1e-5);
}
