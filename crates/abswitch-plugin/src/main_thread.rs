//! Main-thread plugin implementation for the abswitch CLAP plugin.
//!
//! Handles parameter metadata queries, state save/restore, and audio port
//! configuration. All methods run on the host's main thread, never on the
//! audio thread.

use std::io::Write;

use abswitch_core::{MAX_IO_CHANNELS, ParamFlags};
use clack_extensions::audio_ports::{
    AudioPortFlags, AudioPortInfo, AudioPortInfoWriter, PluginAudioPortsImpl,
};
use clack_extensions::latency::PluginLatencyImpl;
use clack_extensions::params::{
    ParamDisplayWriter, ParamInfo, ParamInfoFlags, ParamInfoWriter, PluginMainThreadParams,
};
use clack_extensions::state::PluginStateImpl;
use clack_plugin::prelude::*;
use clack_plugin::stream::{InputStream, OutputStream};
use clack_plugin::utils::Cookie;

use crate::audio::{apply_host_events, report_host_updates};
use crate::control::ControlPlane;
use crate::shared::SwitchShared;
use crate::state::{self, StateError};

/// Main-thread state for the abswitch plugin.
///
/// Provides parameter metadata to the host (count, info, display formatting),
/// handles state save/restore, and declares audio port configuration.
pub struct SwitchMainThread<'a> {
    shared: &'a SwitchShared,
}

impl<'a> SwitchMainThread<'a> {
    /// Create a new main-thread handler referencing the shared state.
    pub fn new(shared: &'a SwitchShared) -> Self {
        Self { shared }
    }

    /// Control plane over this instance's shared state.
    pub fn control(&self) -> ControlPlane<'a> {
        ControlPlane::new(self.shared)
    }
}

impl<'a> PluginMainThread<'a, SwitchShared> for SwitchMainThread<'a> {}

// ── Parameter Extension ─────────────────────────────────────────────────────

/// Map `ParamFlags` to CLAP `ParamInfoFlags`.
fn map_flags(flags: ParamFlags) -> ParamInfoFlags {
    let mut clap_flags = ParamInfoFlags::empty();

    if flags.contains(ParamFlags::AUTOMATABLE) {
        clap_flags |= ParamInfoFlags::IS_AUTOMATABLE;
    }
    if flags.contains(ParamFlags::STEPPED) {
        clap_flags |= ParamInfoFlags::IS_STEPPED;
    }

    clap_flags
}

impl PluginMainThreadParams for SwitchMainThread<'_> {
    fn count(&mut self) -> u32 {
        self.shared.param_count() as u32
    }

    fn get_info(&mut self, param_index: u32, info: &mut ParamInfoWriter) {
        let Some(desc) = self.shared.descriptor(param_index as usize) else {
            return;
        };

        info.set(&ParamInfo {
            id: ClapId::new(desc.id.0),
            name: desc.name.as_bytes(),
            module: desc.group.as_bytes(),
            min_value: f64::from(desc.min),
            max_value: f64::from(desc.max),
            default_value: f64::from(desc.default),
            flags: map_flags(desc.flags),
            cookie: Cookie::default(),
        });
    }

    fn get_value(&mut self, param_id: ClapId) -> Option<f64> {
        let index = self.shared.index_by_id(param_id.get())?;
        self.shared.get_value(index).map(f64::from)
    }

    fn value_to_text(
        &mut self,
        param_id: ClapId,
        value: f64,
        writer: &mut ParamDisplayWriter,
    ) -> core::fmt::Result {
        use core::fmt::Write;

        let desc = self
            .shared
            .index_by_id(param_id.get())
            .and_then(|index| self.shared.descriptor(index));
        match desc {
            Some(desc) => desc.write_value(value as f32, writer),
            None => write!(writer, "{value:.2}"),
        }
    }

    fn text_to_value(&mut self, param_id: ClapId, text: &core::ffi::CStr) -> Option<f64> {
        let index = self.shared.index_by_id(param_id.get())?;
        let desc = self.shared.descriptor(index)?;
        let s = text.to_str().ok()?;
        desc.parse_value(s).map(f64::from)
    }

    /// Apply host events while the audio processor is inactive.
    ///
    /// Values the selection policy changed on top of what the host wrote
    /// (muted choices, a re-asserted solo), and anything restored or clicked
    /// since the last flush, are reported straight back.
    fn flush(&mut self, input: &InputEvents, output: &mut OutputEvents) {
        apply_host_events(self.shared, input);
        report_host_updates(self.shared, output);
    }
}

// ── State Extension ─────────────────────────────────────────────────────────

/// State format: see [`crate::state`].
///
/// A document that cannot be parsed is logged and skipped; the host call
/// still succeeds so a damaged project opens with default settings.
impl PluginStateImpl for SwitchMainThread<'_> {
    fn save(&mut self, output: &mut OutputStream) -> Result<(), PluginError> {
        let json = state::save(self.shared)
            .map_err(|_| PluginError::Message("Failed to serialize state"))?;

        output
            .write_all(&json)
            .map_err(|_| PluginError::Message("Failed to write state"))?;

        Ok(())
    }

    fn load(&mut self, input: &mut InputStream) -> Result<(), PluginError> {
        match state::read_from(&self.control(), input) {
            Ok(()) => Ok(()),
            Err(StateError::Read(_)) => Err(PluginError::Message("Failed to read state")),
            Err(err) => {
                tracing::warn!(%err, "ignoring unreadable state");
                Ok(())
            }
        }
    }
}

// ── Latency Extension ───────────────────────────────────────────────────────

impl PluginLatencyImpl for SwitchMainThread<'_> {
    fn get(&mut self) -> u32 {
        0
    }
}

// ── Audio Ports Extension ───────────────────────────────────────────────────

impl PluginAudioPortsImpl for SwitchMainThread<'_> {
    fn count(&mut self, _is_input: bool) -> u32 {
        1
    }

    fn get(&mut self, index: u32, _is_input: bool, writer: &mut AudioPortInfoWriter) {
        if index == 0 {
            writer.set(&AudioPortInfo {
                id: ClapId::new(0),
                name: b"Main",
                channel_count: MAX_IO_CHANNELS as u32,
                flags: AudioPortFlags::IS_MAIN,
                port_type: None,
                in_place_pair: None,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_to_clap() {
        let flags = map_flags(ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED));
        assert!(flags.contains(ParamInfoFlags::IS_AUTOMATABLE));
        assert!(flags.contains(ParamInfoFlags::IS_STEPPED));
        assert!(!flags.contains(ParamInfoFlags::IS_HIDDEN));
        assert!(map_flags(ParamFlags::NONE).is_empty());
    }
}
