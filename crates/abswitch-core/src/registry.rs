//! Fixed-size registry of choice slots.
//!
//! [`ChoiceRegistry`] holds [`MAX_CHOICES`] slots, each a [`GainRamp`] plus the
//! boolean on/off target it mirrors. It is sized once and never resized; how
//! many slots actually take part in routing is decided per block by the
//! active choice count.
//!
//! The registry is owned by the audio thread. The control plane never touches
//! it directly: it publishes choice states through shared atomics, and the
//! audio thread copies them in with [`ChoiceRegistry::set_choice_target`] at
//! the start of each block. A state change therefore becomes audible from the
//! next processed block on.

use crate::MAX_CHOICES;
use crate::ramp::GainRamp;
use crate::selection::{ActivationOrigin, ChoiceStates};

/// Gain ramps and on/off targets for every choice slot.
#[derive(Debug, Clone)]
pub struct ChoiceRegistry {
    ramps: [GainRamp; MAX_CHOICES],
    active: [bool; MAX_CHOICES],
}

impl ChoiceRegistry {
    /// Create a registry with every choice off and silent.
    pub fn new() -> Self {
        Self {
            ramps: core::array::from_fn(|_| GainRamp::new(0.0)),
            active: [false; MAX_CHOICES],
        }
    }

    /// Number of slots (always [`MAX_CHOICES`]).
    #[inline]
    pub const fn len(&self) -> usize {
        MAX_CHOICES
    }

    /// Always `false`; present for API symmetry with `len`.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Switch a choice on or off. Idempotent.
    ///
    /// Sets the ramp target to 1.0 or 0.0; the ramp fades there over the
    /// configured fade time. Out-of-range indices are ignored.
    pub fn set_choice_target(&mut self, choice: usize, on: bool) {
        if let Some((ramp, active)) = self.ramps.get_mut(choice).zip(self.active.get_mut(choice)) {
            *active = on;
            ramp.set_target(if on { 1.0 } else { 0.0 });
        }
    }

    /// Whether a choice's target is on.
    #[inline]
    pub fn is_choice_on(&self, choice: usize) -> bool {
        self.active.get(choice).copied().unwrap_or(false)
    }

    /// Read access to a choice's ramp.
    #[inline]
    pub fn gain_ramp(&self, choice: usize) -> Option<&GainRamp> {
        self.ramps.get(choice)
    }

    /// Mutable access to a choice's ramp, for the audio router.
    #[inline]
    pub fn gain_ramp_mut(&mut self, choice: usize) -> Option<&mut GainRamp> {
        self.ramps.get_mut(choice)
    }

    /// Recompute every ramp's transition length. Current values are kept.
    ///
    /// Called whenever the sample rate or the fade time changes.
    pub fn reset_all_ramps(&mut self, sample_rate: f32, fade_seconds: f32) {
        #[cfg(feature = "tracing")]
        tracing::debug!("resetting choice ramps: sr={sample_rate} fade={fade_seconds}s");

        for ramp in &mut self.ramps {
            ramp.reset(sample_rate, fade_seconds);
        }
    }

    /// Jump every choice straight to the given state without fading.
    ///
    /// Used when audio processing (re)starts, so restored selections are
    /// heard immediately instead of fading in.
    pub fn snap_to_states<S: ChoiceStates + ?Sized>(&mut self, states: &S) {
        for choice in 0..MAX_CHOICES {
            let on = states.is_active(choice);
            self.active[choice] = on;
            self.ramps[choice].set_current_and_target(if on { 1.0 } else { 0.0 });
        }
    }

    /// Finish every in-flight transition immediately.
    pub fn snap_to_targets(&mut self) {
        for ramp in &mut self.ramps {
            let target = ramp.target();
            ramp.set_current_and_target(target);
        }
    }

    /// Whether any ramp is still fading.
    pub fn any_smoothing(&self) -> bool {
        self.ramps.iter().any(GainRamp::is_smoothing)
    }
}

impl Default for ChoiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ChoiceStates for ChoiceRegistry {
    fn is_active(&self, choice: usize) -> bool {
        self.is_choice_on(choice)
    }

    fn set_active(&mut self, choice: usize, active: bool, _origin: ActivationOrigin) {
        self.set_choice_target(choice, active);
    }
}
