//! CLAP plugin adapter for the abswitch A/B comparison switcher.
//!
//! Wraps the [`abswitch_core`] selection and cross-fade engine as a single
//! CLAP audio effect. Up to 32 choices each occupy a group of `stride`
//! channels on one wide input bus; the plugin fades between them and writes
//! the mix to the first group of the output bus.
//!
//! # Architecture
//!
//! ```text
//! Editor / OSC thread     Audio thread             Main thread
//! ───────────────────     ────────────             ───────────
//! ControlPlane::submit    mirrors choice params    param queries
//! writes choice params ─► into ramp targets        state save/load
//! queues UiEvents         owns ChoiceRegistry      param flush
//!                         reports changes to host
//! ```
//!
//! All inter-thread communication goes through [`SwitchShared`]: atomics for
//! params and settings, `ArcSwap` for label text, `Mutex` for the UI event
//! queue.
//!
//! # Parameter mapping
//!
//! | Index | CLAP ID | String ID          | Meaning                        |
//! |-------|---------|--------------------|--------------------------------|
//! | 0     | 0       | `switch_mode`      | Exclusive / Toggle             |
//! | 1     | 1       | `number_of_choices`| Active choices (2..=32)        |
//! | 2     | 2       | `channel_size`     | Channels per choice (1..=32)   |
//! | 3     | 3       | `fade_time`        | Cross-fade time in ms          |
//! | 4..36 | 100..132| `choice_state_N`   | Choice N on/off                |

pub mod audio;
pub mod control;
pub mod main_thread;
pub mod osc;
pub mod shared;
pub mod state;

pub use audio::SwitchAudioProcessor;
pub use control::ControlPlane;
pub use main_thread::SwitchMainThread;
pub use shared::{OscSettings, SwitchShared, UiEvent};
pub use state::{PersistedState, StateError};

use clack_extensions::audio_ports::PluginAudioPorts;
use clack_extensions::latency::PluginLatency;
use clack_extensions::params::PluginParams;
use clack_extensions::state::PluginState;
use clack_plugin::prelude::*;

/// CLAP plugin ID.
pub const PLUGIN_ID: &str = "com.abswitch.abswitch";

/// Display name shown by hosts.
pub const PLUGIN_NAME: &str = "ABSwitch";

/// A/B switcher plugin type.
///
/// This is the `Plugin` impl that ties together [`SwitchShared`],
/// [`SwitchAudioProcessor`], and [`SwitchMainThread`].
pub struct ABSwitchPlugin;

impl Plugin for ABSwitchPlugin {
    type AudioProcessor<'a> = SwitchAudioProcessor<'a>;
    type Shared<'a> = SwitchShared;
    type MainThread<'a> = SwitchMainThread<'a>;

    fn declare_extensions(builder: &mut PluginExtensions<Self>, _shared: Option<&SwitchShared>) {
        builder.register::<PluginAudioPorts>();
        builder.register::<PluginLatency>();
        builder.register::<PluginParams>();
        builder.register::<PluginState>();
    }
}

impl DefaultPluginFactory for ABSwitchPlugin {
    fn get_descriptor() -> PluginDescriptor {
        use clack_plugin::plugin::features::{AUDIO_EFFECT, UTILITY};
        PluginDescriptor::new(PLUGIN_ID, PLUGIN_NAME).with_features([AUDIO_EFFECT, UTILITY])
    }

    fn new_shared(host: HostSharedHandle<'_>) -> Result<SwitchShared, PluginError> {
        // SAFETY: CLAP specification §plugin-instance guarantees the host outlives
        // the plugin. We extend the lifetime to 'static to store in the closure.
        #[allow(unsafe_code)]
        let host: HostSharedHandle<'static> = unsafe { core::mem::transmute(host) };

        tracing::info!(id = PLUGIN_ID, "abswitch plugin instance created");

        let request_process: Box<dyn Fn() + Send + Sync> = Box::new(move || {
            host.request_process();
        });

        Ok(SwitchShared::new(Some(request_process)))
    }

    fn new_main_thread<'a>(
        _host: HostMainThreadHandle<'a>,
        shared: &'a SwitchShared,
    ) -> Result<SwitchMainThread<'a>, PluginError> {
        Ok(SwitchMainThread::new(shared))
    }
}

