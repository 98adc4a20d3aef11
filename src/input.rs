//! Pointer-driven model rotation.
//!
//! The pointer position inside the viewport picks a target pitch and yaw for the
//! model; the model then eases towards it. Every pointer move replaces the running
//! tween, so the model always heads for the latest pointer position.

use cgmath::Rad;
use instant::Duration;

use crate::{
    animation::{Easing, Tween, TweenSlot},
    config::Config,
    data_structures::transform::Transform,
};

/// Map a pointer position to `(pitch, yaw)` in radians.
///
/// Each axis spans `max_swing`, centred on zero: the viewport centre maps to no
/// rotation, the edges to `±max_swing / 2`. Positions outside the viewport are
/// clamped to its edges.
pub fn pointer_to_rotation(x: f64, y: f64, width: f64, height: f64, max_swing: f32) -> (f32, f32) {
    let normalise = |coord: f64, extent: f64| {
        if extent <= 0.0 {
            0.5
        } else {
            (coord / extent).clamp(0.0, 1.0)
        }
    };
    let pitch = (normalise(y, height) - 0.5) as f32 * max_swing;
    let yaw = (normalise(x, width) - 0.5) as f32 * max_swing;
    (pitch, yaw)
}

#[derive(Clone, Debug)]
pub struct RotationBridge {
    duration: Duration,
    easing: Easing,
    max_swing: f32,
    slot: TweenSlot<2>,
}

impl RotationBridge {
    pub fn new(duration: Duration, easing: Easing, max_swing: f32) -> Self {
        Self {
            duration,
            easing,
            max_swing,
            slot: TweenSlot::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.tween_duration, config.easing, config.max_swing)
    }

    /// Retarget the model rotation at the pointer. No model, no tween.
    ///
    /// Returns whether a tween was started.
    pub fn on_pointer_move(
        &mut self,
        model: Option<&Transform>,
        position: (f64, f64),
        viewport: (f64, f64),
    ) -> bool {
        let Some(model) = model else {
            return false;
        };
        let (pitch, yaw) =
            pointer_to_rotation(position.0, position.1, viewport.0, viewport.1, self.max_swing);
        let from = [model.rotation.x.0, model.rotation.y.0];
        self.slot
            .start(Tween::new(from, [pitch, yaw], self.duration, self.easing));
        true
    }

    /// Step the running tween and write pitch/yaw into the model.
    pub fn advance(&mut self, dt: Duration, model: Option<&mut Transform>) {
        let Some(model) = model else {
            return;
        };
        if let Some([pitch, yaw]) = self.slot.advance(dt) {
            model.rotation.x = Rad(pitch);
            model.rotation.y = Rad(yaw);
        }
    }

    pub fn pending(&self) -> Option<&Tween<2>> {
        self.slot.current()
    }
}
