//! Linear gain ramp for click-free choice switching.
//!
//! Every choice owns one [`GainRamp`]. When a choice is switched on or off the
//! ramp moves its gain linearly toward the new target over the configured fade
//! time, so the audio router can cross-fade instead of hard-cutting.
//!
//! ## Usage
//!
//! ```rust
//! use abswitch_core::GainRamp;
//!
//! let mut gain = GainRamp::new(0.0);
//! gain.reset(48000.0, 0.010); // 10 ms fade
//!
//! gain.set_target(1.0);
//! assert!(gain.is_smoothing());
//!
//! // Per block: sample the ramp at the first and last sample.
//! let (start, end) = gain.block_gains(256);
//! assert!(start < end);
//! ```
//!
//! Values are linear gain (0.0 = silence, 1.0 = unity), never decibels.

/// A linearly smoothed gain value with a fixed step count per transition.
///
/// The step count is derived from sample rate and fade duration in
/// [`reset`](Self::reset). A fade duration of zero makes every target change
/// instantaneous.
#[derive(Debug, Clone)]
pub struct GainRamp {
    /// Current gain
    current: f32,
    /// Target gain
    target: f32,
    /// Increment per sample (can be positive or negative)
    increment: f32,
    /// Samples remaining until target reached
    countdown: u32,
    /// Samples per full transition
    steps_to_target: u32,
}

impl GainRamp {
    /// Create a ramp resting at `initial` with no smoothing configured.
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            increment: 0.0,
            countdown: 0,
            steps_to_target: 0,
        }
    }

    /// Create a ramp resting at `initial`, configured for the given sample
    /// rate and fade duration.
    pub fn with_config(initial: f32, sample_rate: f32, duration_seconds: f32) -> Self {
        let mut ramp = Self::new(initial);
        ramp.reset(sample_rate, duration_seconds);
        ramp
    }

    /// Recompute the transition length from sample rate and fade duration.
    ///
    /// The current value is kept. A transition that is in progress is
    /// re-planned from the current value so it still lands on the target,
    /// now over the new number of steps.
    pub fn reset(&mut self, sample_rate: f32, duration_seconds: f32) {
        let samples = libm::floorf(duration_seconds * sample_rate);
        self.steps_to_target = if samples.is_finite() && samples > 0.0 {
            samples as u32
        } else {
            0
        };

        if self.countdown > 0 {
            if self.steps_to_target == 0 {
                self.set_current_and_target(self.target);
            } else {
                self.countdown = self.steps_to_target;
                self.increment = (self.target - self.current) / self.steps_to_target as f32;
            }
        }
    }

    /// Number of samples a full transition takes.
    #[inline]
    pub fn steps_to_target(&self) -> u32 {
        self.steps_to_target
    }

    /// Start moving toward `target`.
    ///
    /// Setting the target the ramp is already heading to is a no-op, so
    /// repeated notifications never restart a fade.
    pub fn set_target(&mut self, target: f32) {
        if target == self.target {
            return;
        }

        if self.steps_to_target == 0 {
            self.set_current_and_target(target);
            return;
        }

        self.target = target;
        self.countdown = self.steps_to_target;
        self.increment = (self.target - self.current) / self.steps_to_target as f32;
    }

    /// Jump to `value` immediately, cancelling any transition.
    pub fn set_current_and_target(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.increment = 0.0;
        self.countdown = 0;
    }

    /// Advance one sample and return the new gain.
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        if self.countdown == 0 {
            return self.target;
        }

        self.countdown -= 1;
        if self.countdown > 0 {
            self.current += self.increment;
        } else {
            self.current = self.target; // Snap to exact target
        }
        self.current
    }

    /// Advance `samples` samples at once and return the gain reached.
    #[inline]
    pub fn skip(&mut self, samples: u32) -> f32 {
        if samples >= self.countdown {
            self.set_current_and_target(self.target);
            return self.target;
        }

        self.current += self.increment * samples as f32;
        self.countdown -= samples;
        self.current
    }

    /// Start and end gain for a block of `block_len` samples.
    ///
    /// Queries the ramp at the first sample, skips the `block_len - 2`
    /// samples in between, then queries the last sample. Callers apply a
    /// straight line between the two values across the block.
    #[inline]
    pub fn block_gains(&mut self, block_len: usize) -> (f32, f32) {
        let start = self.next_value();
        let inner = u32::try_from(block_len.saturating_sub(2)).unwrap_or(u32::MAX);
        self.skip(inner);
        let end = self.next_value();
        (start, end)
    }

    /// Current gain without advancing.
    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Gain the ramp is moving toward.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Whether a transition is still in progress.
    #[inline]
    pub fn is_smoothing(&self) -> bool {
        self.countdown > 0
    }
}

impl Default for GainRamp {
    fn default() -> Self {
        Self::new(0.0)
    }
}
