//! Selection policy: which choices play after an activation request.
//!
//! Every event that switches a choice (UI click, remote `/switch` message,
//! host automation) is expressed as one [`ActivationRequest`] and handed to
//! [`SelectionPolicy::submit`]. The policy applies it to a [`ChoiceStates`]
//! store according to the global [`SelectionMode`]:
//!
//! - [`SelectionMode::ExclusiveSolo`]: switching an inactive choice on
//!   switches every other choice off, one request per choice. The ramps of
//!   the old and new choice overlap for the fade time, which produces the
//!   cross-fade. Any request for a choice that is already on only
//!   re-asserts it.
//! - [`SelectionMode::ToggleMode`]: only the requested choice changes.
//!
//! Deactivations issued by the policy itself carry
//! [`ActivationOrigin::Policy`] and are applied verbatim, so they can never
//! cascade into another round of muting.

use crate::MAX_CHOICES;

/// Global switching behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Activating one choice mutes all others.
    #[default]
    ExclusiveSolo,
    /// Each choice is switched independently.
    ToggleMode,
}

impl SelectionMode {
    /// Decode from the raw `switch_mode` parameter value.
    #[inline]
    pub fn from_param(value: f32) -> Self {
        if value < 0.5 {
            Self::ExclusiveSolo
        } else {
            Self::ToggleMode
        }
    }

    /// Raw parameter value for this mode.
    #[inline]
    pub const fn to_param(self) -> f32 {
        match self {
            Self::ExclusiveSolo => 0.0,
            Self::ToggleMode => 1.0,
        }
    }

    /// Display label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::ExclusiveSolo => "Exclusive Solo",
            Self::ToggleMode => "Toggle Mode",
        }
    }
}

/// Where an activation request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationOrigin {
    /// Button click in an editor.
    UserInterface,
    /// Remote control message.
    Remote,
    /// Host parameter write (automation or generic host UI).
    Automation,
    /// Side effect of the selection policy itself.
    Policy,
}

/// Request to switch one choice on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationRequest {
    /// Zero-based choice index.
    pub choice: usize,
    /// Desired state.
    pub active: bool,
    /// Event source.
    pub origin: ActivationOrigin,
}

impl ActivationRequest {
    /// Request to switch `choice` on.
    pub const fn activate(choice: usize, origin: ActivationOrigin) -> Self {
        Self {
            choice,
            active: true,
            origin,
        }
    }

    /// Request to switch `choice` off.
    pub const fn deactivate(choice: usize, origin: ActivationOrigin) -> Self {
        Self {
            choice,
            active: false,
            origin,
        }
    }

    /// Request that flips `choice` relative to its current state.
    pub fn toggle(choice: usize, currently_active: bool, origin: ActivationOrigin) -> Self {
        Self {
            choice,
            active: !currently_active,
            origin,
        }
    }

    /// Whether this request was issued by the policy.
    #[inline]
    pub fn is_policy(&self) -> bool {
        self.origin == ActivationOrigin::Policy
    }
}

/// Storage for the authoritative on/off state of every choice.
///
/// Implemented by the plugin's atomic shared state and by
/// [`ChoiceRegistry`](crate::ChoiceRegistry). Each `set_active` call is one
/// observable change; implementations decide how listeners learn about it.
pub trait ChoiceStates {
    /// Whether `choice` is currently switched on.
    fn is_active(&self, choice: usize) -> bool;

    /// Store the state of `choice`.
    fn set_active(&mut self, choice: usize, active: bool, origin: ActivationOrigin);
}

/// Applies activation requests under the current [`SelectionMode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionPolicy {
    mode: SelectionMode,
}

impl SelectionPolicy {
    /// Create a policy in the given mode.
    pub const fn new(mode: SelectionMode) -> Self {
        Self { mode }
    }

    /// Current mode.
    #[inline]
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Change the mode. Existing choice states are left untouched.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
    }

    /// Apply `request` to `states`.
    ///
    /// Requests for choices outside `0..MAX_CHOICES` are ignored.
    pub fn submit<S: ChoiceStates + ?Sized>(&self, request: ActivationRequest, states: &mut S) {
        if request.choice >= MAX_CHOICES {
            return;
        }

        if request.is_policy() || self.mode == SelectionMode::ToggleMode {
            states.set_active(request.choice, request.active, request.origin);
            return;
        }

        if states.is_active(request.choice) {
            // Already on: either request only re-asserts it. Other choices
            // keep their state.
            states.set_active(request.choice, true, request.origin);
            return;
        }
        if !request.active {
            return;
        }

        states.set_active(request.choice, true, request.origin);
        self.mute_all_except(request.choice, states);
    }

    fn mute_all_except<S: ChoiceStates + ?Sized>(&self, keep: usize, states: &mut S) {
        #[cfg(feature = "tracing")]
        tracing::debug!("exclusive solo: muting all choices except {keep}");

        for choice in (0..MAX_CHOICES).filter(|&c| c != keep) {
            self.submit(
                ActivationRequest::deactivate(choice, ActivationOrigin::Policy),
                states,
            );
        }
    }
}
