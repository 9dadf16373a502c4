//! Per-block audio routing.
//!
//! The input is split into channel groups of `stride` channels; choice *k*
//! reads channels `k*stride .. k*stride + stride`. The router fades each
//! choice with its own [`GainRamp`](crate::GainRamp) and sums every audible
//! choice into the first group, which is the plugin's output width. All
//! channels past the output width are silenced.
//!
//! ```text
//! in  ch: | A0 A1 | B0 B1 | C0 C1 | ...
//!            │       │       │
//!          × gA    × gB    × gC
//!            └───────┴───────┘
//! out ch: | A0·gA + B0·gB + C0·gC | ... | 0 0 0 ...
//! ```
//!
//! Each block queries a ramp only twice (first and last sample) and applies a
//! straight line between them. Choices that are silent and not fading are
//! skipped entirely.

use crate::MAX_CHOICES;
use crate::buffer::{PlanarBlock, add_from_with_ramp, apply_gain_ramp};
use crate::registry::ChoiceRegistry;

/// Routing layout for one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteConfig {
    /// Channels per choice, `1..=32`.
    pub stride: usize,
    /// Choices taking part in routing, `2..=MAX_CHOICES`.
    pub active_choices: usize,
}

impl RouteConfig {
    /// Build a layout, clamping both values into their valid ranges.
    pub fn new(stride: usize, active_choices: usize) -> Self {
        Self {
            stride: stride.clamp(1, crate::MAX_STRIDE),
            active_choices: active_choices.clamp(2, MAX_CHOICES),
        }
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self::new(2, 5)
    }
}

/// Route one block in place.
///
/// `block` holds the host's channels (inputs copied in, outputs read back
/// out). Source channels beyond `block.channels()` are treated as silent.
/// A zero-length block is left alone and does not advance any ramp.
pub fn route_block(registry: &mut ChoiceRegistry, config: RouteConfig, block: &mut PlanarBlock<'_>) {
    let n_samples = block.frames();
    if n_samples == 0 {
        return;
    }

    let n_ch = block.channels();
    let stride = config.stride;
    let base_width = n_ch.min(stride);

    // Choice 0: the base group is already in place, only its gain changes.
    if let Some(ramp) = registry.gain_ramp_mut(0) {
        if !ramp.is_smoothing() && ramp.target() == 0.0 {
            for ch in 0..base_width {
                block.clear(ch);
            }
        } else {
            let (start, end) = ramp.block_gains(n_samples);
            for ch in 0..base_width {
                apply_gain_ramp(block.channel_mut(ch), start, end);
            }
        }
    }

    // Remaining choices are summed on top of the base group.
    for choice in 1..config.active_choices {
        let Some(ramp) = registry.gain_ramp_mut(choice) else {
            break;
        };
        if !ramp.is_smoothing() && ramp.target() == 0.0 {
            continue;
        }

        let (start, end) = ramp.block_gains(n_samples);
        for ch in 0..stride {
            let source = choice * stride + ch;
            if source < n_ch {
                let (dest, src) = block.dest_and_source(ch, source);
                add_from_with_ramp(dest, src, start, end);
            }
        }
    }

    for ch in stride..n_ch {
        block.clear(ch);
    }
}
