//! Thread-safe shared state for the abswitch CLAP plugin.
//!
//! [`SwitchShared`] lives for the lifetime of the plugin instance and is
//! reachable from the main thread (params, state), the audio thread and any
//! remote-control receiver thread. Parameter values are stored as atomic
//! `u32` (f32 bit-cast) for lock-free access; the editor-facing settings sit
//! beside them as plain atomics plus an `ArcSwap` for the label text.
//!
//! Changes the presentation layer has to react to are queued as
//! [`UiEvent`]s and picked up with [`SwitchShared::drain_ui_events`].
//! Queuing never blocks or allocates, so the audio thread may raise events
//! while applying host automation.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU16, AtomicU32, Ordering};

use abswitch_core::params::{self, CHANNEL_SIZE, FADE_TIME, NUMBER_OF_CHOICES, SWITCH_MODE};
use abswitch_core::{ActivationOrigin, ChoiceStates, ParamDescriptor, SelectionMode};
use arc_swap::ArcSwap;
use parking_lot::Mutex;

/// Default UDP port for the remote-control listener.
pub const DEFAULT_OSC_PORT: u16 = 9222;
/// Default editor width in pixels.
pub const DEFAULT_EDITOR_WIDTH: u32 = 740;
/// Default editor height in pixels.
pub const DEFAULT_EDITOR_HEIGHT: u32 = 300;
/// Default choice button size in pixels.
pub const DEFAULT_BUTTON_SIZE: u32 = 120;

/// Something the editor has to refresh.
///
/// Events carry no payload; the editor reads the current value from
/// [`SwitchShared`] when it handles one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    /// Stored editor size changed (e.g. after a state load).
    ResizeEditor,
    /// Number of active choices changed; rebuild the button row.
    ChoiceCountChanged,
    /// Label text changed.
    LabelTextChanged,
    /// Button size changed.
    ButtonSizeChanged,
    /// Remote listener port, auto-connect or connection status changed.
    RemoteStatusChanged,
}

impl UiEvent {
    /// Every variant, in declaration order.
    pub const ALL: [UiEvent; 5] = [
        UiEvent::ResizeEditor,
        UiEvent::ChoiceCountChanged,
        UiEvent::LabelTextChanged,
        UiEvent::ButtonSizeChanged,
        UiEvent::RemoteStatusChanged,
    ];

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Remote-control listener settings.
///
/// The socket itself is owned by whoever runs the listener; this only holds
/// what is persisted and displayed.
#[derive(Debug)]
pub struct OscSettings {
    port: AtomicU16,
    auto_connect: AtomicBool,
    connected: AtomicBool,
}

impl OscSettings {
    fn new() -> Self {
        Self {
            port: AtomicU16::new(DEFAULT_OSC_PORT),
            auto_connect: AtomicBool::new(false),
            connected: AtomicBool::new(false),
        }
    }

    /// UDP port to listen on.
    pub fn port(&self) -> u16 {
        self.port.load(Ordering::Acquire)
    }

    /// Whether the listener should connect as soon as state is loaded.
    pub fn auto_connect(&self) -> bool {
        self.auto_connect.load(Ordering::Acquire)
    }

    /// Whether the listener is currently bound.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Returns `true` if the value changed.
    pub(crate) fn set_port(&self, port: u16) -> bool {
        self.port.swap(port, Ordering::AcqRel) != port
    }

    /// Returns `true` if the value changed.
    pub(crate) fn set_auto_connect(&self, enabled: bool) -> bool {
        self.auto_connect.swap(enabled, Ordering::AcqRel) != enabled
    }

    /// Returns `true` if the value changed.
    pub(crate) fn set_connected(&self, connected: bool) -> bool {
        self.connected.swap(connected, Ordering::AcqRel) != connected
    }
}

/// Inner storage for plugin shared state.
///
/// Holds all data behind an `Arc` so that `SwitchShared` can be cheaply
/// cloned into `'static + Send` closures (remote listener threads).
struct SwitchSharedData {
    /// Parameter descriptors, indexed by parameter position.
    descriptors: Vec<ParamDescriptor>,
    /// Current parameter values as f32 bit-cast to u32 for atomic access.
    values: Vec<AtomicU32>,
    /// Last value the host has seen for each parameter, same encoding.
    ///
    /// Outlives audio processor activations, so changes made while the
    /// processor is inactive are still reported on the next flush.
    host_values: Vec<AtomicU32>,
    editor_width: AtomicU32,
    editor_height: AtomicU32,
    button_size: AtomicU32,
    /// Newline-separated label per choice.
    label_text: ArcSwap<String>,
    osc: OscSettings,
    /// Pending editor refreshes, oldest first, without duplicates.
    ///
    /// Sized for every variant up front; coalescing keeps it from growing.
    ui_events: Mutex<VecDeque<UiEvent>>,
    /// Events raised while `ui_events` was locked, one bit per variant.
    ui_events_missed: AtomicU8,
    /// Asks the host to schedule a `process()`/`flush()` call.
    ///
    /// Without this, changes made off the audio thread wait for the next
    /// audio block, which never comes while the transport is stopped.
    request_process: Option<Box<dyn Fn() + Send + Sync>>,
}

/// Shared state accessible from all plugin threads.
///
/// The choice-state parameters are the authoritative on/off state of every
/// choice: [`SwitchShared`] implements [`ChoiceStates`] over them, so the
/// selection policy can run on whichever thread an event arrives on. The
/// audio thread mirrors them into its gain ramps once per block.
#[derive(Clone)]
pub struct SwitchShared {
    inner: Arc<SwitchSharedData>,
}

impl SwitchShared {
    /// Create shared state with every parameter at its default.
    ///
    /// `request_process` is called whenever a change has to reach the host
    /// outside of a regular audio block. Pass `None` for standalone/test use.
    pub fn new(request_process: Option<Box<dyn Fn() + Send + Sync>>) -> Self {
        let descriptors: Vec<ParamDescriptor> =
            (0..params::param_count()).filter_map(params::descriptor).collect();
        let values = descriptors
            .iter()
            .map(|d| AtomicU32::new(d.default.to_bits()))
            .collect();
        let host_values = descriptors
            .iter()
            .map(|d| AtomicU32::new(d.default.to_bits()))
            .collect();

        Self {
            inner: Arc::new(SwitchSharedData {
                descriptors,
                values,
                host_values,
                editor_width: AtomicU32::new(DEFAULT_EDITOR_WIDTH),
                editor_height: AtomicU32::new(DEFAULT_EDITOR_HEIGHT),
                button_size: AtomicU32::new(DEFAULT_BUTTON_SIZE),
                label_text: ArcSwap::from_pointee(String::new()),
                osc: OscSettings::new(),
                ui_events: Mutex::new(VecDeque::with_capacity(UiEvent::ALL.len())),
                ui_events_missed: AtomicU8::new(0),
                request_process,
            }),
        }
    }

    // ── Parameters ──────────────────────────────────────────────────────────

    /// Number of parameters.
    pub fn param_count(&self) -> usize {
        self.inner.descriptors.len()
    }

    /// Get parameter descriptor by index.
    pub fn descriptor(&self, index: usize) -> Option<&ParamDescriptor> {
        self.inner.descriptors.get(index)
    }

    /// All parameter descriptors.
    pub fn descriptors(&self) -> &[ParamDescriptor] {
        &self.inner.descriptors
    }

    /// Find parameter index by stable `ParamId`.
    pub fn index_by_id(&self, id: u32) -> Option<usize> {
        params::index_by_id(abswitch_core::ParamId(id))
    }

    /// Read the current value of a parameter (lock-free).
    pub fn get_value(&self, index: usize) -> Option<f32> {
        self.inner
            .values
            .get(index)
            .map(|v| f32::from_bits(v.load(Ordering::Acquire)))
    }

    /// Write a parameter value (lock-free). Clamps to descriptor bounds.
    pub fn set_value(&self, index: usize, value: f32) {
        if let Some((atomic, desc)) = self
            .inner
            .values
            .get(index)
            .zip(self.inner.descriptors.get(index))
        {
            let clamped = desc.clamp(value);
            atomic.store(clamped.to_bits(), Ordering::Release);
        }
    }

    fn value_or_default(&self, index: usize) -> f32 {
        self.get_value(index)
            .or_else(|| self.descriptor(index).map(|d| d.default))
            .unwrap_or(0.0)
    }

    /// Current switching behavior.
    pub fn selection_mode(&self) -> SelectionMode {
        SelectionMode::from_param(self.value_or_default(SWITCH_MODE))
    }

    /// Number of choices taking part in routing (2..=32).
    pub fn active_choices(&self) -> usize {
        params::active_choices(self.value_or_default(NUMBER_OF_CHOICES))
    }

    /// Channels per choice (1..=32).
    pub fn stride(&self) -> usize {
        params::stride(self.value_or_default(CHANNEL_SIZE))
    }

    /// Fade time in milliseconds.
    pub fn fade_ms(&self) -> f32 {
        self.value_or_default(FADE_TIME)
    }

    /// Whether `choice` is switched on. Out-of-range choices are off.
    pub fn is_choice_on(&self, choice: usize) -> bool {
        params::choice_param_index(choice)
            .and_then(|index| self.get_value(index))
            .is_some_and(params::choice_is_on)
    }

    // ── Editor settings ─────────────────────────────────────────────────────

    /// Last stored editor size `(width, height)` in pixels.
    pub fn editor_size(&self) -> (u32, u32) {
        (
            self.inner.editor_width.load(Ordering::Acquire),
            self.inner.editor_height.load(Ordering::Acquire),
        )
    }

    pub(crate) fn store_editor_size(&self, width: u32, height: u32) {
        self.inner.editor_width.store(width, Ordering::Release);
        self.inner.editor_height.store(height, Ordering::Release);
    }

    /// Choice button size in pixels.
    pub fn button_size(&self) -> u32 {
        self.inner.button_size.load(Ordering::Acquire)
    }

    pub(crate) fn store_button_size(&self, px: u32) {
        self.inner.button_size.store(px, Ordering::Release);
    }

    /// Label text, one line per choice.
    pub fn label_text(&self) -> Arc<String> {
        self.inner.label_text.load_full()
    }

    pub(crate) fn store_label_text(&self, text: String) {
        self.inner.label_text.store(Arc::new(text));
    }

    /// Remote-control listener settings.
    pub fn osc(&self) -> &OscSettings {
        &self.inner.osc
    }

    // ── UI events ───────────────────────────────────────────────────────────

    /// Queue an editor refresh. Already-queued events are not duplicated.
    ///
    /// Never blocks: if the editor is draining the queue right now, the
    /// event is parked in a flag and handed out by the next drain.
    pub fn push_ui_event(&self, event: UiEvent) {
        match self.inner.ui_events.try_lock() {
            Some(mut queue) => {
                if !queue.contains(&event) {
                    queue.push_back(event);
                }
            }
            None => {
                self.inner
                    .ui_events_missed
                    .fetch_or(event.bit(), Ordering::AcqRel);
            }
        }
    }

    /// Take every pending editor refresh, oldest first.
    pub fn drain_ui_events(&self) -> Vec<UiEvent> {
        let mut queue = self.inner.ui_events.lock();
        let missed = self.inner.ui_events_missed.swap(0, Ordering::AcqRel);
        for event in UiEvent::ALL {
            if missed & event.bit() != 0 && !queue.contains(&event) {
                queue.push_back(event);
            }
        }
        queue.drain(..).collect()
    }

    // ── Host view ───────────────────────────────────────────────────────────

    /// Record a value the host itself wrote.
    pub(crate) fn note_host_value(&self, index: usize, value: f32) {
        if let Some(slot) = self.inner.host_values.get(index) {
            slot.store(value.to_bits(), Ordering::Release);
        }
    }

    /// Visit every parameter whose value the host has not seen yet, marking
    /// each one as reported.
    ///
    /// Allocation-free; called from both the audio thread and the main-thread
    /// params flush.
    pub fn drain_host_updates(&self, mut report: impl FnMut(usize, f32)) {
        for (index, (value, seen)) in self
            .inner
            .values
            .iter()
            .zip(&self.inner.host_values)
            .enumerate()
        {
            let bits = value.load(Ordering::Acquire);
            if seen.swap(bits, Ordering::AcqRel) != bits {
                report(index, f32::from_bits(bits));
            }
        }
    }

    // ── Host notification ───────────────────────────────────────────────────

    /// Ask the host for a `process()` or `flush()` call.
    ///
    /// No-op if no callback is set (standalone mode).
    pub fn request_process(&self) {
        if let Some(cb) = &self.inner.request_process {
            cb();
        }
    }
}

impl clack_plugin::prelude::PluginShared<'_> for SwitchShared {}

impl ChoiceStates for &SwitchShared {
    fn is_active(&self, choice: usize) -> bool {
        self.is_choice_on(choice)
    }

    fn set_active(&mut self, choice: usize, active: bool, origin: ActivationOrigin) {
        if let Some(index) = params::choice_param_index(choice) {
            tracing::trace!(choice, active, ?origin, "choice state");
            self.set_value(index, if active { 1.0 } else { 0.0 });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abswitch_core::MAX_CHOICES;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn defaults() {
        let shared = SwitchShared::new(None);
        assert_eq!(shared.param_count(), params::param_count());
        assert_eq!(shared.selection_mode(), SelectionMode::ExclusiveSolo);
        assert_eq!(shared.active_choices(), 5);
        assert_eq!(shared.stride(), 2);
        assert_eq!(shared.fade_ms(), 50.0);
        assert_eq!(shared.editor_size(), (740, 300));
        assert_eq!(shared.button_size(), 120);
        assert_eq!(shared.osc().port(), 9222);
        assert!(!shared.osc().auto_connect());
        assert!(!shared.osc().is_connected());
        assert!(shared.label_text().is_empty());
        for choice in 0..MAX_CHOICES {
            assert!(!shared.is_choice_on(choice));
        }
    }

    #[test]
    fn defaults_match_descriptors() {
        let shared = SwitchShared::new(None);
        for (i, desc) in shared.descriptors().iter().enumerate() {
            assert_eq!(shared.get_value(i), Some(desc.default), "param {}", desc.name);
        }
    }

    #[test]
    fn set_value_clamps() {
        let shared = SwitchShared::new(None);
        shared.set_value(FADE_TIME, 5000.0);
        assert_eq!(shared.fade_ms(), 1000.0);
        shared.set_value(FADE_TIME, -1.0);
        assert_eq!(shared.fade_ms(), 0.0);
    }

    #[test]
    fn out_of_range_safe() {
        let shared = SwitchShared::new(None);
        assert_eq!(shared.get_value(999), None);
        assert!(shared.descriptor(999).is_none());
        shared.set_value(999, 1.0);
        assert!(!shared.is_choice_on(MAX_CHOICES));
    }

    #[test]
    fn index_by_id_uses_stable_ids() {
        let shared = SwitchShared::new(None);
        assert_eq!(shared.index_by_id(3), Some(FADE_TIME));
        assert_eq!(shared.index_by_id(100), Some(params::FIRST_CHOICE));
        assert_eq!(shared.index_by_id(99), None);
    }

    #[test]
    fn choice_states_write_params() {
        let shared = SwitchShared::new(None);
        let mut states = &shared;
        states.set_active(4, true, ActivationOrigin::Remote);
        assert!(shared.is_choice_on(4));
        assert_eq!(shared.get_value(params::FIRST_CHOICE + 4), Some(1.0));
        states.set_active(MAX_CHOICES, true, ActivationOrigin::Remote);
    }

    #[test]
    fn ui_events_coalesce() {
        let shared = SwitchShared::new(None);
        shared.push_ui_event(UiEvent::ResizeEditor);
        shared.push_ui_event(UiEvent::LabelTextChanged);
        shared.push_ui_event(UiEvent::ResizeEditor);
        assert_eq!(
            shared.drain_ui_events(),
            vec![UiEvent::ResizeEditor, UiEvent::LabelTextChanged]
        );
        assert!(shared.drain_ui_events().is_empty());
    }

    #[test]
    fn ui_event_raised_during_drain_is_kept() {
        let shared = SwitchShared::new(None);
        shared.push_ui_event(UiEvent::ResizeEditor);
        {
            let _held = shared.inner.ui_events.lock();
            shared.push_ui_event(UiEvent::ChoiceCountChanged);
            shared.push_ui_event(UiEvent::ResizeEditor);
        }
        assert_eq!(
            shared.drain_ui_events(),
            vec![UiEvent::ResizeEditor, UiEvent::ChoiceCountChanged]
        );
        assert!(shared.drain_ui_events().is_empty());
    }

    #[test]
    fn ui_queue_never_outgrows_its_capacity() {
        let shared = SwitchShared::new(None);
        let capacity = shared.inner.ui_events.lock().capacity();
        for _ in 0..3 {
            for event in UiEvent::ALL {
                shared.push_ui_event(event);
            }
        }
        assert_eq!(shared.inner.ui_events.lock().capacity(), capacity);
        assert_eq!(shared.drain_ui_events(), UiEvent::ALL.to_vec());
    }

    #[test]
    fn host_updates_report_unseen_values_once() {
        let shared = SwitchShared::new(None);
        let mut seen = Vec::new();
        shared.drain_host_updates(|i, v| seen.push((i, v)));
        assert!(seen.is_empty());

        shared.set_value(FADE_TIME, 120.0);
        shared.set_value(params::FIRST_CHOICE + 2, 1.0);
        shared.drain_host_updates(|i, v| seen.push((i, v)));
        assert_eq!(seen, vec![(FADE_TIME, 120.0), (params::FIRST_CHOICE + 2, 1.0)]);

        seen.clear();
        shared.drain_host_updates(|i, v| seen.push((i, v)));
        assert!(seen.is_empty());
    }

    #[test]
    fn host_written_values_are_not_echoed() {
        let shared = SwitchShared::new(None);
        shared.note_host_value(FADE_TIME, 300.0);
        shared.set_value(FADE_TIME, 300.0);
        let mut seen = Vec::new();
        shared.drain_host_updates(|i, v| seen.push((i, v)));
        assert!(seen.is_empty());
    }

    #[test]
    fn request_process_calls_host() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let shared = SwitchShared::new(Some(Box::new(move || {
            counter.fetch_add(1, Ordering::Relaxed);
        })));
        shared.request_process();
        shared.clone().request_process();
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }
}
