//! ABSwitch Core - selection and cross-fade engine for A/B comparisons
//!
//! This crate holds everything the switcher does to audio, with no plugin
//! format attached. A multichannel input is split into equally sized channel
//! groups ("choices"); exactly the selected choices are summed into the
//! output, and every switch fades over a configurable time instead of
//! clicking.
//!
//! # Core Abstractions
//!
//! - [`GainRamp`] - Linear gain ramp with a fixed step count
//! - [`ChoiceRegistry`] - One ramp and on/off target per choice slot
//! - [`SelectionPolicy`] - Exclusive-solo or toggle switching rules
//! - [`route_block`] - Per-block fade-and-sum of the choice groups
//! - [`PlanarBlock`] - Borrowed channel-major audio block
//!
//! ## Parameters
//!
//! - [`params`] - Host parameter layout, stable IDs, value decoders
//! - [`ParamDescriptor`] - Range, flags and display rules for one parameter
//!
//! # no_std Support
//!
//! The engine is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! abswitch-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use abswitch_core::{
//!     ActivationOrigin, ActivationRequest, ChoiceRegistry, PlanarBlock, RouteConfig,
//!     SelectionMode, SelectionPolicy, route_block,
//! };
//!
//! let mut registry = ChoiceRegistry::new();
//! registry.reset_all_ramps(48000.0, 0.05);
//!
//! let policy = SelectionPolicy::new(SelectionMode::ExclusiveSolo);
//! policy.submit(ActivationRequest::activate(1, ActivationOrigin::UserInterface), &mut registry);
//!
//! // Two stereo choices, 64 frames.
//! let mut audio = vec![0.25_f32; 4 * 64];
//! let mut block = PlanarBlock::new(&mut audio, 4, 64).unwrap();
//! route_block(&mut registry, RouteConfig::new(2, 2), &mut block);
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: no allocation or locking in the routing path
//! - **Bounded**: fixed [`MAX_CHOICES`] slots, sized once
//! - **Thread-agnostic policy**: [`ChoiceStates`] lets the policy run against
//!   atomics on any thread or against the registry directly

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod buffer;
pub mod param_info;
pub mod params;
pub mod ramp;
pub mod registry;
pub mod router;
pub mod selection;

/// Number of choice slots.
pub const MAX_CHOICES: usize = 32;

/// Largest number of channels per choice.
pub const MAX_STRIDE: usize = 32;

/// Channels on the plugin's single input and output port.
pub const MAX_IO_CHANNELS: usize = 64;

// Re-export main types at crate root
pub use buffer::{PlanarBlock, add_from_with_ramp, apply_gain_ramp};
pub use param_info::{ParamDescriptor, ParamDisplay, ParamFlags, ParamId, ParamUnit};
pub use ramp::GainRamp;
pub use registry::ChoiceRegistry;
pub use router::{RouteConfig, route_block};
pub use selection::{
    ActivationOrigin, ActivationRequest, ChoiceStates, SelectionMode, SelectionPolicy,
};
