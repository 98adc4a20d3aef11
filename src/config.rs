//! Startup constants.
//!
//! Everything the viewer can be tuned with lives in [`Config`]. The defaults
//! reproduce the stock scene: a dusk HDR sky lighting the damaged helmet, seen
//! from two units away with a barely visible RGB shift.

use instant::Duration;

use crate::animation::Easing;

/// Where the two assets come from.
///
/// Absolute `http(s)` URLs are fetched over the network. Anything else is a
/// path below `./assets/` natively or below `<origin>/assets/` in the browser.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetPaths {
    pub environment: String,
    pub model: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            environment:
                "https://dl.polyhaven.org/file/ph-assets/HDRIs/hdr/1k/qwantani_dusk_2_1k.hdr"
                    .to_string(),
            model: "DamagedHelmet.gltf".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub assets: AssetPaths,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub z_near: f32,
    pub z_far: f32,
    /// Distance of the camera from the orbit target along +z.
    pub camera_distance: f32,
    pub shift_amount: f32,
    /// Direction of the RGB shift in radians, 0 is horizontal.
    pub shift_angle: f32,
    pub tween_duration: Duration,
    /// Full swing of the pointer rotation in radians; targets span `±max_swing / 2`.
    pub max_swing: f32,
    pub easing: Easing,
    pub damping_factor: f32,
    pub clear_colour: wgpu::Color,
    pub canvas_id: &'static str,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assets: AssetPaths::default(),
            fov_y: 75.0,
            z_near: 0.1,
            z_far: 1000.0,
            camera_distance: 2.0,
            shift_amount: 0.0004,
            shift_angle: 0.0,
            tween_duration: Duration::from_millis(500),
            max_swing: std::f32::consts::PI * 0.1,
            easing: Easing::QuadOut,
            damping_factor: 0.05,
            clear_colour: wgpu::Color::BLACK,
            canvas_id: "canvas",
        }
    }
}
