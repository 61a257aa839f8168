//! Animated scalar values
//!
//! A value that eases toward a target one frame at a time. Each `tick`
//! covers a fixed share of the remaining distance and snaps once the gap is
//! too small to see, so every animation settles in a finite number of frames.

/// Share of the remaining distance covered per tick
pub const STEP_RATIO: f64 = 0.3;

/// Remaining distance below which the value snaps to its target
pub const SNAP_EPSILON: f64 = 0.0005;

/// A scalar with a current value and a target it animates toward
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatedScalar {
    current: f64,
    target: f64,
}

impl AnimatedScalar {
    /// Create a settled scalar at `value`
    pub fn new(value: f64) -> Self {
        Self {
            current: value,
            target: value,
        }
    }

    /// Jump straight to `value` with no animation
    pub fn set_immediate(&mut self, value: f64) {
        self.current = value;
        self.target = value;
    }

    /// Start animating toward `value`
    pub fn set_target(&mut self, value: f64) {
        self.target = value;
    }

    /// Advance one frame. Returns true if the scalar is settled afterwards.
    pub fn tick(&mut self) -> bool {
        if self.is_settled() {
            return true;
        }

        let next = self.current + (self.target - self.current) * STEP_RATIO;
        if (self.target - next).abs() < SNAP_EPSILON {
            self.current = self.target;
        } else {
            self.current = next;
        }

        self.is_settled()
    }

    /// True when there is no pending animation
    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }
}

impl Default for AnimatedScalar {
    fn default() -> Self {
        Self::new(0.0)
    }
}
