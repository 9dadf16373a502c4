//! Audio processor for the abswitch CLAP plugin.
//!
//! [`SwitchAudioProcessor`] owns the [`ChoiceRegistry`] (one gain ramp per
//! choice) and a planar scratch buffer sized at activation. Each block runs
//! three steps:
//!
//! 1. Host `ParamValue` events go through the [`ControlPlane`] with
//!    [`ActivationOrigin::Automation`].
//! 2. `sync()` re-plans the ramps if the fade time changed, mirrors every
//!    choice state into its ramp target and reports values the host did not
//!    write itself (policy mutes, clicks, remote switches) back as
//!    `ParamValue` events.
//! 3. Input channels are copied into scratch, routed, and copied out.
//!
//! # Parameter Sync
//!
//! The shared param array is the source of truth. [`SwitchShared`] also
//! keeps the last value the host knows about for every parameter; host
//! events update it directly, everything else shows up as a divergence and
//! is emitted. That record outlives activations, so values restored or
//! clicked while the processor was inactive are reported on the first
//! flush after it.

use abswitch_core::params::{self, FADE_TIME};
use abswitch_core::{
    ActivationOrigin, ChoiceRegistry, MAX_CHOICES, MAX_IO_CHANNELS, PlanarBlock, RouteConfig,
    route_block,
};
use clack_extensions::params::PluginAudioProcessorParams;
use clack_plugin::events::EventFlags;
use clack_plugin::events::event_types::ParamValueEvent;
use clack_plugin::prelude::*;
use clack_plugin::utils::Cookie;

use crate::control::ControlPlane;
use crate::main_thread::SwitchMainThread;
use crate::shared::SwitchShared;

/// Build the host notification for one parameter.
pub(crate) fn param_value_event(
    shared: &SwitchShared,
    index: usize,
    value: f32,
) -> Option<ParamValueEvent> {
    let desc = shared.descriptor(index)?;
    Some(
        ParamValueEvent::new(
            0,
            ClapId::new(desc.id.0),
            Pckn::match_all(),
            f64::from(value),
            Cookie::empty(),
        )
        .with_flags(EventFlags::IS_LIVE),
    )
}

/// Apply incoming host `ParamValue` events through the control plane.
///
/// Each value is recorded as seen by the host before it is applied, so only
/// what the policy changes on top of it is reported back.
pub(crate) fn apply_host_events(shared: &SwitchShared, input: &InputEvents) {
    let control = ControlPlane::new(shared);
    for event in input {
        let Some(clack_plugin::events::spaces::CoreEventSpace::ParamValue(ev)) =
            event.as_core_event()
        else {
            continue;
        };
        let Some(param_id) = ev.param_id() else {
            continue;
        };
        let Some(index) = shared.index_by_id(param_id.get()) else {
            continue;
        };
        let Some(desc) = shared.descriptor(index) else {
            continue;
        };

        let value = desc.clamp(ev.value() as f32);
        shared.note_host_value(index, value);
        control.param_changed(index, value, ActivationOrigin::Automation);
    }
}

/// Report every parameter the host has not seen yet to `output`.
pub(crate) fn report_host_updates(shared: &SwitchShared, output: &mut OutputEvents) {
    shared.drain_host_updates(|index, value| {
        if let Some(ev) = param_value_event(shared, index, value) {
            let _ = output.try_push(ev);
        }
    });
}

/// Audio-thread processor for the switcher.
///
/// Created during `activate()`, destroyed during `deactivate()`. All buffers
/// are allocated in `activate()`; `process()` never allocates.
pub struct SwitchAudioProcessor<'a> {
    shared: &'a SwitchShared,
    /// Gain ramps, owned exclusively by the audio thread.
    registry: ChoiceRegistry,
    sample_rate: f32,
    /// Fade time the ramps are currently planned for.
    fade_ms: f32,
    /// Planar scratch, `MAX_IO_CHANNELS * max_frames`.
    scratch: Vec<f32>,
    max_frames: usize,
}

impl<'a> PluginAudioProcessor<'a, SwitchShared, SwitchMainThread<'a>>
    for SwitchAudioProcessor<'a>
{
    fn activate(
        _host: HostAudioProcessorHandle<'a>,
        _main_thread: &mut SwitchMainThread<'a>,
        shared: &'a SwitchShared,
        audio_config: PluginAudioConfiguration,
    ) -> Result<Self, PluginError> {
        let processor = Self::new(
            shared,
            audio_config.sample_rate as f32,
            audio_config.max_frames_count as usize,
        );

        tracing::info!(
            sample_rate = processor.sample_rate,
            max_frames = processor.max_frames,
            "audio processor activated"
        );

        Ok(processor)
    }

    fn process(
        &mut self,
        _process: Process,
        mut audio: Audio,
        events: Events,
    ) -> Result<ProcessStatus, PluginError> {
        self.handle_events(events.input);
        self.sync(events.output);
        self.process_audio(&mut audio)?;

        Ok(ProcessStatus::ContinueIfNotQuiet)
    }

    fn deactivate(self, _main_thread: &mut SwitchMainThread<'_>) {
        tracing::debug!("audio processor deactivated");
    }

    fn reset(&mut self) {
        self.registry.snap_to_targets();
    }
}

impl<'a> SwitchAudioProcessor<'a> {
    /// Build a processor for the given stream configuration.
    ///
    /// Ramps are planned for the current fade time and jump straight to the
    /// stored choice states, so a restored selection is heard immediately.
    pub fn new(shared: &'a SwitchShared, sample_rate: f32, max_frames: usize) -> Self {
        let fade_ms = shared.fade_ms();
        let mut registry = ChoiceRegistry::new();
        registry.reset_all_ramps(sample_rate, params::fade_seconds(fade_ms));
        registry.snap_to_states(&shared);

        Self {
            shared,
            registry,
            sample_rate,
            fade_ms,
            scratch: vec![0.0; MAX_IO_CHANNELS * max_frames],
            max_frames,
        }
    }

    /// Gain ramps, for inspection.
    pub fn registry(&self) -> &ChoiceRegistry {
        &self.registry
    }

    // ── Parameter handling ─────────────────────────────────────────────────

    fn handle_events(&mut self, input: &InputEvents) {
        apply_host_events(self.shared, input);
    }

    /// Bring ramps and host in line with the shared state.
    fn sync(&mut self, output: &mut OutputEvents) {
        self.sync_ramps();
        report_host_updates(self.shared, output);
    }

    /// Pick up fade-time and choice-state changes.
    pub fn sync_ramps(&mut self) {
        let fade_ms = self.shared.get_value(FADE_TIME).unwrap_or(self.fade_ms);
        if fade_ms.to_bits() != self.fade_ms.to_bits() {
            self.fade_ms = fade_ms;
            self.registry
                .reset_all_ramps(self.sample_rate, params::fade_seconds(fade_ms));
        }

        for choice in 0..MAX_CHOICES {
            self.registry
                .set_choice_target(choice, self.shared.is_choice_on(choice));
        }
    }

    // ── Audio processing ──────────────────────────────────────────────────

    fn process_audio(&mut self, audio: &mut Audio) -> Result<(), PluginError> {
        for mut port_pair in audio {
            let channels = port_pair.channels()?;
            let Some(mut channels) = channels.into_f32() else {
                continue;
            };

            let n_ch = channels.channel_pair_count().min(MAX_IO_CHANNELS);
            let mut frames = self.max_frames;
            for ch in 0..n_ch {
                let len = match channels.channel_pair(ch) {
                    Some(ChannelPair::InputOutput(input, output)) => input.len().min(output.len()),
                    Some(ChannelPair::InPlace(buf)) => buf.len(),
                    Some(ChannelPair::InputOnly(input)) => input.len(),
                    Some(ChannelPair::OutputOnly(output)) => output.len(),
                    None => continue,
                };
                frames = frames.min(len);
            }
            if n_ch == 0 || frames == 0 {
                continue;
            }

            // Copy in.
            for ch in 0..n_ch {
                let dest = &mut self.scratch[ch * frames..(ch + 1) * frames];
                match channels.channel_pair(ch) {
                    Some(
                        ChannelPair::InputOutput(input, _) | ChannelPair::InputOnly(input),
                    ) => dest.copy_from_slice(&input[..frames]),
                    Some(ChannelPair::InPlace(buf)) => dest.copy_from_slice(&buf[..frames]),
                    Some(ChannelPair::OutputOnly(_)) | None => dest.fill(0.0),
                }
            }

            self.route(n_ch, frames);

            // Copy out.
            for ch in 0..n_ch {
                let src = &self.scratch[ch * frames..(ch + 1) * frames];
                match channels.channel_pair(ch) {
                    Some(
                        ChannelPair::InputOutput(_, output) | ChannelPair::OutputOnly(output),
                    ) => output[..frames].copy_from_slice(src),
                    Some(ChannelPair::InPlace(buf)) => buf[..frames].copy_from_slice(src),
                    Some(ChannelPair::InputOnly(_)) | None => {}
                }
            }

            // Only the main port is routed.
            break;
        }

        Ok(())
    }

    /// Route `channels` × `frames` samples already in the scratch buffer.
    pub fn route(&mut self, channels: usize, frames: usize) {
        let config = RouteConfig::new(self.shared.stride(), self.shared.active_choices());
        if let Some(mut block) = PlanarBlock::new(&mut self.scratch, channels, frames) {
            route_block(&mut self.registry, config, &mut block);
        }
    }

    /// Planar scratch buffer; channel `ch` occupies `ch * frames..(ch + 1) * frames`.
    pub fn scratch_mut(&mut self) -> &mut [f32] {
        &mut self.scratch
    }
}

impl PluginAudioProcessorParams for SwitchAudioProcessor<'_> {
    fn flush(&mut self, input: &InputEvents, output: &mut OutputEvents) {
        self.handle_events(input);
        self.sync(output);
    }
}
