//! Control-plane adapter.
//!
//! Every way of switching a choice ends up in [`ControlPlane::submit`]:
//!
//! ```text
//! button click ──► click_choice ───┐
//! /switch msg  ──► remote_switch ──┼──► submit(ActivationRequest) ──► SelectionPolicy
//! host param   ──► param_changed ──┘                                   │
//!                                                                      ▼
//!                                                      SwitchShared choice params
//! ```
//!
//! The policy writes choice states into [`SwitchShared`]; the audio thread
//! picks them up at the start of the next block and reports any value the
//! host did not write itself back as a parameter event.

use abswitch_core::params::{self, CHANNEL_SIZE, FADE_TIME, NUMBER_OF_CHOICES, SWITCH_MODE};
use abswitch_core::{ActivationOrigin, ActivationRequest, MAX_CHOICES, SelectionPolicy};

use crate::shared::{SwitchShared, UiEvent};

/// Routes activation requests and setting changes into [`SwitchShared`].
///
/// Cheap to construct; hold one per call site rather than storing it.
#[derive(Clone, Copy)]
pub struct ControlPlane<'a> {
    shared: &'a SwitchShared,
}

impl<'a> ControlPlane<'a> {
    /// Wrap the plugin's shared state.
    pub fn new(shared: &'a SwitchShared) -> Self {
        Self { shared }
    }

    /// The shared state this control plane writes to.
    pub fn shared(&self) -> &'a SwitchShared {
        self.shared
    }

    /// Apply one activation request under the current selection mode.
    ///
    /// Requests for choices outside `0..MAX_CHOICES` are ignored. Requests
    /// that did not come from the host trigger a host flush, so the host
    /// learns about the new values even while the transport is stopped.
    pub fn submit(&self, request: ActivationRequest) {
        if request.choice >= MAX_CHOICES {
            tracing::debug!(choice = request.choice, "ignoring out-of-range choice");
            return;
        }

        let policy = SelectionPolicy::new(self.shared.selection_mode());
        let mut states = self.shared;
        policy.submit(request, &mut states);

        if request.origin != ActivationOrigin::Automation {
            self.shared.request_process();
        }
    }

    /// A parameter received a new raw value.
    ///
    /// Choice parameters become activation requests; everything else is
    /// stored (clamped) directly. Fade-time changes are picked up by the
    /// audio thread, which re-plans every ramp.
    pub fn param_changed(&self, index: usize, value: f32, origin: ActivationOrigin) {
        if let Some(choice) = params::choice_of_param(index) {
            let active = params::choice_is_on(value);
            self.submit(ActivationRequest {
                choice,
                active,
                origin,
            });
            return;
        }

        let previous = self.shared.get_value(index);
        self.shared.set_value(index, value);
        let current = self.shared.get_value(index);
        if previous == current {
            return;
        }

        match index {
            SWITCH_MODE => {
                tracing::debug!(mode = self.shared.selection_mode().label(), "switch mode changed");
            }
            NUMBER_OF_CHOICES => {
                tracing::debug!(choices = self.shared.active_choices(), "choice count changed");
                self.shared.push_ui_event(UiEvent::ChoiceCountChanged);
            }
            CHANNEL_SIZE => {
                tracing::debug!(stride = self.shared.stride(), "channel size changed");
            }
            FADE_TIME => {
                tracing::debug!(fade_ms = self.shared.fade_ms(), "fade time changed");
            }
            _ => {}
        }

        if origin != ActivationOrigin::Automation {
            self.shared.request_process();
        }
    }

    /// A choice button was clicked: flip that choice.
    pub fn click_choice(&self, choice: usize) {
        let current = self.shared.is_choice_on(choice);
        self.submit(ActivationRequest::toggle(
            choice,
            current,
            ActivationOrigin::UserInterface,
        ));
    }

    /// A remote `/switch` command arrived with a 1-based choice number.
    ///
    /// Flips that choice regardless of the selection mode. Returns `false`
    /// (and changes nothing) if the number is out of range.
    pub fn remote_switch(&self, one_based: i32) -> bool {
        let Some(choice) = one_based
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .filter(|&i| i < MAX_CHOICES)
        else {
            tracing::debug!(index = one_based, "remote switch index out of range");
            return false;
        };

        tracing::debug!(choice, "remote switch");
        let current = self.shared.is_choice_on(choice);
        self.submit(ActivationRequest::toggle(
            choice,
            current,
            ActivationOrigin::Remote,
        ));
        true
    }

    /// Store the editor size and ask the editor to resize.
    pub fn set_editor_size(&self, width: u32, height: u32) {
        if self.shared.editor_size() != (width, height) {
            self.shared.store_editor_size(width, height);
            self.shared.push_ui_event(UiEvent::ResizeEditor);
        }
    }

    /// Replace the choice labels (one line per choice).
    pub fn set_label_text(&self, text: impl Into<String>) {
        let text = text.into();
        if *self.shared.label_text() != text {
            self.shared.store_label_text(text);
            self.shared.push_ui_event(UiEvent::LabelTextChanged);
        }
    }

    /// Change the choice button size in pixels.
    pub fn set_button_size(&self, px: u32) {
        if self.shared.button_size() != px {
            self.shared.store_button_size(px);
            self.shared.push_ui_event(UiEvent::ButtonSizeChanged);
        }
    }

    /// Change the remote listener port.
    pub fn set_remote_port(&self, port: u16) {
        if self.shared.osc().set_port(port) {
            tracing::debug!(port, "remote port changed");
            self.shared.push_ui_event(UiEvent::RemoteStatusChanged);
        }
    }

    /// Enable or disable connecting the remote listener on load.
    pub fn set_remote_auto_connect(&self, enabled: bool) {
        if self.shared.osc().set_auto_connect(enabled) {
            self.shared.push_ui_event(UiEvent::RemoteStatusChanged);
        }
    }

    /// Record whether the remote listener is bound.
    pub fn set_remote_connected(&self, connected: bool) {
        if self.shared.osc().set_connected(connected) {
            tracing::info!(connected, port = self.shared.osc().port(), "remote listener");
            self.shared.push_ui_event(UiEvent::RemoteStatusChanged);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abswitch_core::SelectionMode;
    use abswitch_core::params::FIRST_CHOICE;

    fn on_choices(shared: &SwitchShared) -> Vec<usize> {
        (0..MAX_CHOICES).filter(|&c| shared.is_choice_on(c)).collect()
    }

    #[test]
    fn click_in_exclusive_mode_solos() {
        let shared = SwitchShared::new(None);
        let control = ControlPlane::new(&shared);

        control.click_choice(0);
        control.click_choice(2);
        assert_eq!(on_choices(&shared), vec![2]);

        // Clicking the active choice keeps it on.
        control.click_choice(2);
        assert_eq!(on_choices(&shared), vec![2]);
    }

    #[test]
    fn click_in_toggle_mode_is_independent() {
        let shared = SwitchShared::new(None);
        let control = ControlPlane::new(&shared);
        control.param_changed(SWITCH_MODE, 1.0, ActivationOrigin::UserInterface);
        assert_eq!(shared.selection_mode(), SelectionMode::ToggleMode);

        control.click_choice(0);
        control.click_choice(3);
        assert_eq!(on_choices(&shared), vec![0, 3]);
        control.click_choice(0);
        assert_eq!(on_choices(&shared), vec![3]);
    }

    #[test]
    fn host_deactivate_of_solo_choice_reasserts() {
        let shared = SwitchShared::new(None);
        let control = ControlPlane::new(&shared);
        control.param_changed(FIRST_CHOICE + 1, 1.0, ActivationOrigin::Automation);
        control.param_changed(FIRST_CHOICE + 1, 0.0, ActivationOrigin::Automation);
        assert_eq!(on_choices(&shared), vec![1]);
    }

    #[test]
    fn remote_switch_toggles() {
        let shared = SwitchShared::new(None);
        let control = ControlPlane::new(&shared);
        control.param_changed(SWITCH_MODE, 1.0, ActivationOrigin::UserInterface);

        assert!(control.remote_switch(2));
        assert_eq!(on_choices(&shared), vec![1]);
        assert!(control.remote_switch(2));
        assert!(on_choices(&shared).is_empty());

        assert!(!control.remote_switch(0));
        assert!(!control.remote_switch(33));
        assert!(!control.remote_switch(i32::MIN));
        assert!(control.remote_switch(32));
        assert_eq!(on_choices(&shared), vec![31]);
    }

    #[test]
    fn choice_count_change_raises_event_once() {
        let shared = SwitchShared::new(None);
        let control = ControlPlane::new(&shared);

        control.param_changed(NUMBER_OF_CHOICES, 8.0, ActivationOrigin::Automation);
        control.param_changed(NUMBER_OF_CHOICES, 8.0, ActivationOrigin::Automation);
        assert_eq!(shared.active_choices(), 10);
        assert_eq!(shared.drain_ui_events(), vec![UiEvent::ChoiceCountChanged]);
    }

    #[test]
    fn settings_raise_events() {
        let shared = SwitchShared::new(None);
        let control = ControlPlane::new(&shared);

        control.set_editor_size(740, 300);
        assert!(shared.drain_ui_events().is_empty());

        control.set_editor_size(800, 400);
        control.set_label_text("Mix A\nMix B");
        control.set_button_size(90);
        control.set_remote_port(9000);
        control.set_remote_auto_connect(true);
        control.set_remote_connected(true);

        assert_eq!(shared.editor_size(), (800, 400));
        assert_eq!(shared.label_text().as_str(), "Mix A\nMix B");
        assert_eq!(shared.button_size(), 90);
        assert_eq!(shared.osc().port(), 9000);
        assert!(shared.osc().auto_connect());
        assert!(shared.osc().is_connected());
        assert_eq!(
            shared.drain_ui_events(),
            vec![
                UiEvent::ResizeEditor,
                UiEvent::LabelTextChanged,
                UiEvent::ButtonSizeChanged,
                UiEvent::RemoteStatusChanged,
            ]
        );
    }

    #[test]
    fn out_of_range_param_is_ignored() {
        let shared = SwitchShared::new(None);
        let control = ControlPlane::new(&shared);
        control.param_changed(999, 1.0, ActivationOrigin::Automation);
        control.submit(ActivationRequest::activate(MAX_CHOICES, ActivationOrigin::Remote));
        assert!(on_choices(&shared).is_empty());
    }
}
