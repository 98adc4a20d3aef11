//! Time-based easing tweens.
//!
//! A [`Tween`] interpolates a fixed-size array of scalars from a start value to a
//! target over a duration, shaped by an [`Easing`] curve. A [`TweenSlot`] is the
//! handle for one animated attribute: starting a new tween replaces whatever was
//! running in the slot, so the most recent target always wins.

use instant::Duration;

/// Easing curves, named after the polynomial they apply to normalised time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    Linear,
    QuadIn,
    /// Decelerating quadratic, `1 - (1 - t)^2`.
    #[default]
    QuadOut,
    QuadInOut,
    CubicOut,
}

impl Easing {
    /// Map normalised time `t` in `[0, 1]` onto eased progress.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tween<const N: usize> {
    from: [f32; N],
    to: [f32; N],
    elapsed: Duration,
    duration: Duration,
    easing: Easing,
}

impl<const N: usize> Tween<N> {
    pub fn new(from: [f32; N], to: [f32; N], duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration,
            easing,
        }
    }

    pub fn target(&self) -> [f32; N] {
        self.to
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Current value. Once finished this is exactly the target, never an approximation.
    pub fn value(&self) -> [f32; N] {
        if self.is_finished() {
            return self.to;
        }
        let t = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
        let progress = self.easing.apply(t);
        let mut value = self.from;
        for (v, (from, to)) in value.iter_mut().zip(self.from.iter().zip(self.to.iter())) {
            *v = from + (to - from) * progress;
        }
        value
    }

    /// Move time forward and return the value at the new point in time.
    pub fn advance(&mut self, dt: Duration) -> [f32; N] {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.value()
    }
}

/// Holds at most one running tween for an attribute.
#[derive(Clone, Debug, Default)]
pub struct TweenSlot<const N: usize> {
    current: Option<Tween<N>>,
}

impl<const N: usize> TweenSlot<N> {
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Install `tween`, dropping any tween still in flight.
    pub fn start(&mut self, tween: Tween<N>) {
        if self.current.as_ref().is_some_and(|t| !t.is_finished()) {
            log::trace!("retargeting in-flight tween");
        }
        self.current = Some(tween);
    }

    pub fn current(&self) -> Option<&Tween<N>> {
        self.current.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Advance the running tween, if any. The slot empties after the final value is handed out.
    pub fn advance(&mut self, dt: Duration) -> Option<[f32; N]> {
        let tween = self.current.as_mut()?;
        let value = tween.advance(dt);
        if tween.is_finished() {
            self.current = None;
        }
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::QuadIn,
            Easing::QuadOut,
            Easing::QuadInOut,
            Easing::CubicOut,
        ] {
            assert_eq!(easing.apply(0.0), 0.0, "{:?}", easing);
            assert_eq!(easing.apply(1.0), 1.0, "{:?}", easing);
        }
        assert!((Easing::QuadOut.apply(0.5) - 0.75).abs() < 1e-6);
        assert!((Easing::QuadIn.apply(0.5) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn quad_out_front_loads_progress() {
        let tween = Tween::new([0.0], [1.0], Duration::from_millis(500), Easing::QuadOut);
        let mut tween = tween;
        let quarter = tween.advance(Duration::from_millis(125))[0];
        assert!(quarter > 0.25, "got {}", quarter);
    }

    #[test]
    fn finished_tween_lands_on_target() {
        let mut tween = Tween::new([0.0, 1.0], [0.3, -0.2], Duration::from_millis(500), Easing::QuadOut);
        tween.advance(Duration::from_millis(499));
        assert!(!tween.is_finished());
        assert_eq!(tween.advance(Duration::from_secs(3)), [0.3, -0.2]);
        assert!(tween.is_finished());
    }

    #[test]
    fn slot_empties_after_completion() {
        let mut slot = TweenSlot::new();
        slot.start(Tween::new([0.0], [2.0], Duration::from_millis(100), Easing::Linear));
        let halfway = slot.advance(Duration::from_millis(50)).unwrap();
        assert!((halfway[0] - 1.0).abs() < 1e-5);
        assert!(slot.is_active());
        assert_eq!(slot.advance(Duration::from_millis(50)), Some([2.0]));
        assert!(!slot.is_active());
        assert_eq!(slot.advance(Duration::from_millis(50)), None);
    }
}
