//! Layer weight ramps
//!
//! Linear per-layer weight interpolation, ticked once per frame. Fade-in
//! runs inside the playback task; fade-out is an independent per-layer
//! task so an interrupted or idle layer recedes instead of holding its
//! last pose at full weight.

/// Linear ramp from the weight observed at start toward a target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightRamp {
    from: f32,
    to: f32,
    duration_secs: f32,
    elapsed_secs: f32,
}

impl WeightRamp {
    pub fn new(from: f32, to: f32, duration_secs: f32) -> Self {
        Self {
            from,
            to,
            duration_secs: duration_secs.max(0.0),
            elapsed_secs: 0.0,
        }
    }

    /// Advance by one frame's elapsed time and return the current weight
    pub fn advance(&mut self, dt_secs: f32) -> f32 {
        self.elapsed_secs += dt_secs;
        self.value()
    }

    /// Current interpolated weight
    pub fn value(&self) -> f32 {
        if self.finished() {
            return self.to;
        }
        let t = (self.elapsed_secs / self.duration_secs).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }

    pub fn finished(&self) -> bool {
        self.duration_secs <= 0.0 || self.elapsed_secs >= self.duration_secs
    }

    pub fn target(&self) -> f32 {
        self.to
    }
}
