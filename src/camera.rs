//! Camera, projection and orbit controls.
//!
//! The camera always looks at a target point. [`OrbitControls`] turns pointer
//! drags and wheel input into rotation around that target, panning of the target
//! and dollying towards it. Input only accumulates deltas; they are applied (and
//! damped) by [`OrbitControls::update`], which the render loop calls once per
//! frame. No update, no motion.

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// cgmath builds OpenGL clip space (z in -1..1), wgpu expects z in 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const EPS: f32 = 1e-6;

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>>(position: P, target: P) -> Self {
        Self {
            position: position.into(),
            target: target.into(),
            up: Vector3::unit_y(),
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }
}

/// Perspective projection. The matrix is cached and only recomputed through
/// [`Projection::resize`] or [`Projection::update_projection_matrix`].
#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    aspect: f32,
    matrix: Matrix4<f32>,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        let mut projection = Self {
            fovy: fovy.into(),
            znear,
            zfar,
            aspect: width.max(1) as f32 / height.max(1) as f32,
            matrix: Matrix4::from_scale(1.0),
        };
        projection.update_projection_matrix();
        projection
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Set the aspect ratio to `width / height` and refresh the matrix.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
        self.update_projection_matrix();
    }

    pub fn update_projection_matrix(&mut self) {
        self.matrix =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        self.matrix
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controls: OrbitControls,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Drag {
    Rotate,
    Pan,
}

#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Polar angle limits measured from +y.
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    // Pan in viewport heights, converted to world units at update time
    pan_delta: (f32, f32),
    drag: Option<Drag>,
    cursor: Option<(f64, f64)>,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(0.05)
    }
}

impl OrbitControls {
    pub fn new(damping_factor: f32) -> Self {
        Self {
            enable_damping: true,
            damping_factor,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: std::f32::consts::PI,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            pan_delta: (0.0, 0.0),
            drag: None,
            cursor: None,
        }
    }

    /// Queue a rotation for a drag of `(dx, dy)` pixels on a viewport `height` pixels tall.
    /// A drag across the full height turns the camera once around.
    pub fn rotate(&mut self, dx: f32, dy: f32, height: f32) {
        let height = height.max(1.0);
        let tau = 2.0 * std::f32::consts::PI;
        self.theta_delta -= tau * dx / height * self.rotate_speed;
        self.phi_delta -= tau * dy / height * self.rotate_speed;
    }

    pub fn pan(&mut self, dx: f32, dy: f32, height: f32) {
        let height = height.max(1.0);
        self.pan_delta.0 += dx / height * self.pan_speed;
        self.pan_delta.1 += dy / height * self.pan_speed;
    }

    /// Positive `amount` moves towards the target.
    pub fn dolly(&mut self, amount: f32) {
        self.scale *= 0.95f32.powf(amount * self.zoom_speed);
    }

    /// Feed window input. Returns true when the event was used by the controls.
    pub fn handle_window_event(&mut self, event: &WindowEvent, viewport_height: f32) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                self.drag = match (state, button) {
                    (ElementState::Pressed, MouseButton::Left) => Some(Drag::Rotate),
                    (ElementState::Pressed, MouseButton::Right) => Some(Drag::Pan),
                    (ElementState::Released, _) => None,
                    _ => self.drag,
                };
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let current = (position.x, position.y);
                let used = match (self.drag, self.cursor) {
                    (Some(drag), Some(last)) => {
                        let dx = (current.0 - last.0) as f32;
                        let dy = (current.1 - last.1) as f32;
                        match drag {
                            Drag::Rotate => self.rotate(dx, dy, viewport_height),
                            Drag::Pan => self.pan(dx, dy, viewport_height),
                        }
                        true
                    }
                    _ => false,
                };
                self.cursor = Some(current);
                used
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 100.0,
                };
                self.dolly(amount);
                true
            }
            _ => false,
        }
    }

    /// Apply queued input to `camera`. Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut Camera, fovy: Rad<f32>) -> bool {
        let offset = camera.position - camera.target;
        let mut radius = offset.magnitude();
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = if radius > EPS {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            std::f32::consts::FRAC_PI_2
        };

        let factor = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        theta += self.theta_delta * factor;
        phi += self.phi_delta * factor;
        phi = phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(EPS, std::f32::consts::PI - EPS);
        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        // Pan along the camera's own right/up axes, scaled so the target tracks the cursor
        let forward = (camera.target - camera.position).normalize();
        let right = forward.cross(camera.up).normalize();
        let up = right.cross(forward);
        let visible_height = 2.0 * offset.magnitude() * (fovy.0 / 2.0).tan();
        let pan = -right * (self.pan_delta.0 * factor * visible_height)
            + up * (self.pan_delta.1 * factor * visible_height);
        let pan = if pan.x.is_finite() && pan.y.is_finite() && pan.z.is_finite() {
            pan
        } else {
            Vector3::new(0.0, 0.0, 0.0)
        };

        let target = camera.target + pan;
        let sin_phi = phi.sin();
        let new_offset = Vector3::new(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        );
        let position = target + new_offset;

        let moved = (position - camera.position).magnitude() > EPS
            || (target - camera.target).magnitude() > EPS;
        camera.position = position;
        camera.target = target;

        if self.enable_damping {
            let decay = 1.0 - self.damping_factor;
            self.theta_delta *= decay;
            self.phi_delta *= decay;
            self.pan_delta = (self.pan_delta.0 * decay, self.pan_delta.1 * decay);
        } else {
            self.theta_delta = 0.0;
            self.phi_delta = 0.0;
            self.pan_delta = (0.0, 0.0);
        }
        self.scale = 1.0;
        moved
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Deg;

    use super::*;

    #[test]
    fn projection_resize_updates_aspect_and_matrix() {
        let mut projection = Projection::new(800, 600, Deg(75.0), 0.1, 1000.0);
        let before = projection.calc_matrix();
        projection.resize(1000, 500);
        assert_eq!(projection.aspect(), 2.0);
        assert_ne!(projection.calc_matrix(), before);
        let expected = OPENGL_TO_WGPU_MATRIX * perspective(Deg(75.0), 2.0, 0.1, 1000.0);
        assert_eq!(projection.calc_matrix(), expected);
    }

    #[test]
    fn dolly_in_shortens_distance() {
        let mut camera = Camera::new((0.0, 0.0, 2.0), (0.0, 0.0, 0.0));
        let mut controls = OrbitControls::new(0.05);
        controls.enable_damping = false;
        controls.dolly(5.0);
        controls.update(&mut camera, Deg(75.0).into());
        let distance = (camera.position - camera.target).magnitude();
        assert!(distance < 2.0, "distance {}", distance);
    }
}
