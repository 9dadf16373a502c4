//! Parameter metadata for host communication.
//!
//! Each host-visible parameter is described by a [`ParamDescriptor`]: range,
//! default, stable [`ParamId`], capability [`ParamFlags`] and a
//! [`ParamDisplay`] rule that turns raw values into the strings a host shows
//! (and back).
//!
//! # Example
//!
//! ```rust
//! use abswitch_core::{ParamDescriptor, ParamDisplay, ParamId};
//!
//! let size = ParamDescriptor::stepped("Output Channel Size", "Size", 0.0, 31.0, 1.0)
//!     .with_id(ParamId(2), "channel_size")
//!     .with_display(ParamDisplay::Offset { offset: 1, suffix: " ch" });
//!
//! assert_eq!(size.format_value(1.0), "2 ch");
//! assert_eq!(size.parse_value("8 ch"), Some(7.0));
//! ```

use alloc::string::String;
use core::fmt::Write;

/// Stable parameter identifier that survives reordering.
///
/// Maps directly to CLAP `clap_id`. Once assigned, a `ParamId` must never
/// change for a given parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId(pub u32);

/// Parameter capability flags for plugin host communication.
///
/// Bitflag type that maps to CLAP `clap_param_info_flags`. Use
/// [`union`](Self::union) to combine.
///
/// ```rust
/// use abswitch_core::ParamFlags;
///
/// let flags = ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED);
/// assert!(flags.contains(ParamFlags::STEPPED));
/// assert!(!ParamFlags::AUTOMATABLE.contains(ParamFlags::STEPPED));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamFlags(u8);

impl ParamFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Host can automate this parameter (default for all params).
    pub const AUTOMATABLE: Self = Self(1 << 0);
    /// Parameter has discrete steps (enum-like, integer values).
    pub const STEPPED: Self = Self(1 << 1);

    /// Returns `true` if all bits in `other` are set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for ParamFlags {
    fn default() -> Self {
        Self::AUTOMATABLE
    }
}

/// Unit type for parameter display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Milliseconds (ms).
    Milliseconds,
    /// Channel count.
    Channels,
    /// No unit.
    None,
}

impl ParamUnit {
    /// Returns the unit suffix string for display.
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Milliseconds => " ms",
            ParamUnit::Channels => " ch",
            ParamUnit::None => "",
        }
    }
}

/// How a raw value is shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDisplay {
    /// Rounded value followed by the unit suffix.
    Plain,
    /// Integer value shifted by `offset` (raw 0 shows as `offset`).
    Offset {
        /// Added to the raw value for display.
        offset: i32,
        /// Appended after the number.
        suffix: &'static str,
    },
    /// Two-state switch; values `>= 0.5` show `on`.
    Labels {
        /// Label below 0.5.
        off: &'static str,
        /// Label at or above 0.5.
        on: &'static str,
    },
}

/// Describes a single parameter's metadata for display and validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Full parameter name (e.g., "Fade-Length", "Choice A").
    pub name: &'static str,
    /// Short name, max 8 characters.
    pub short_name: &'static str,
    /// Unit type.
    pub unit: ParamUnit,
    /// Minimum raw value.
    pub min: f32,
    /// Maximum raw value.
    pub max: f32,
    /// Default raw value.
    pub default: f32,
    /// Step increment (1.0 for every switch parameter).
    pub step: f32,
    /// Stable numeric ID for host automation and persistence.
    pub id: ParamId,
    /// Human-readable stable ID, used as the key in saved state.
    pub string_id: &'static str,
    /// Capability flags.
    pub flags: ParamFlags,
    /// Parameter group for host tree display (empty = top level).
    pub group: &'static str,
    /// Display rule.
    pub display: ParamDisplay,
}

impl ParamDescriptor {
    /// Integer-stepped parameter with no unit.
    pub const fn stepped(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::None,
            min,
            max,
            default,
            step: 1.0,
            id: ParamId(0),
            string_id: "",
            flags: ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED),
            group: "",
            display: ParamDisplay::Plain,
        }
    }

    /// Two-state switch (0 or 1) shown with the given labels.
    pub const fn switch(
        name: &'static str,
        short_name: &'static str,
        off: &'static str,
        on: &'static str,
    ) -> Self {
        Self::stepped(name, short_name, 0.0, 1.0, 0.0).with_display(ParamDisplay::Labels { off, on })
    }

    /// Time parameter in whole milliseconds.
    pub const fn time_ms(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::Milliseconds,
            min,
            max,
            default,
            step: 1.0,
            id: ParamId(0),
            string_id: "",
            flags: ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED),
            group: "",
            display: ParamDisplay::Plain,
        }
    }

    /// Sets the stable parameter ID and string ID.
    pub const fn with_id(mut self, id: ParamId, string_id: &'static str) -> Self {
        self.id = id;
        self.string_id = string_id;
        self
    }

    /// Sets the parameter group.
    pub const fn with_group(mut self, group: &'static str) -> Self {
        self.group = group;
        self
    }

    /// Sets the unit.
    pub const fn with_unit(mut self, unit: ParamUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Sets the display rule.
    pub const fn with_display(mut self, display: ParamDisplay) -> Self {
        self.display = display;
        self
    }

    /// Clamps a value to this parameter's valid range.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// Write the display string for `value` into `out`.
    ///
    /// Allocation-free, so it can fill a host-provided text buffer directly.
    pub fn write_value<W: Write + ?Sized>(&self, value: f32, out: &mut W) -> core::fmt::Result {
        match self.display {
            ParamDisplay::Plain => {
                write!(out, "{}{}", libm::roundf(value) as i64, self.unit.suffix())
            }
            ParamDisplay::Offset { offset, suffix } => {
                write!(out, "{}{suffix}", libm::roundf(value) as i64 + i64::from(offset))
            }
            ParamDisplay::Labels { off, on } => {
                out.write_str(if value >= 0.5 { on } else { off })
            }
        }
    }

    /// Display string for `value`.
    pub fn format_value(&self, value: f32) -> String {
        let mut s = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_value(value, &mut s);
        s
    }

    /// Parse a display string back into a raw value.
    ///
    /// Accepts the exact output of [`format_value`](Self::format_value) as
    /// well as a bare number without the unit suffix. Results are clamped.
    pub fn parse_value(&self, text: &str) -> Option<f32> {
        let text = text.trim();
        match self.display {
            ParamDisplay::Plain => {
                let number = strip_suffix_ignore_case(text, self.unit.suffix().trim());
                number.trim().parse::<f32>().ok().map(|v| self.clamp(v))
            }
            ParamDisplay::Offset { offset, suffix } => {
                let number = strip_suffix_ignore_case(text, suffix.trim());
                let shown = number.trim().parse::<f32>().ok()?;
                Some(self.clamp(shown - offset as f32))
            }
            ParamDisplay::Labels { off, on } => {
                if text.eq_ignore_ascii_case(on) {
                    Some(self.max)
                } else if text.eq_ignore_ascii_case(off) {
                    Some(self.min)
                } else {
                    text.parse::<f32>().ok().map(|v| self.clamp(v))
                }
            }
        }
    }
}

fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> &'a str {
    if suffix.is_empty() || text.len() < suffix.len() {
        return text;
    }
    let split = text.len() - suffix.len();
    match (text.get(..split), text.get(split..)) {
        (Some(head), Some(tail)) if tail.eq_ignore_ascii_case(suffix) => head,
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fade() -> ParamDescriptor {
        ParamDescriptor::time_ms("Fade-Length", "Fade", 0.0, 1000.0, 50.0)
            .with_id(ParamId(3), "fade_time")
    }

    #[test]
    fn plain_format_and_parse() {
        let desc = fade();
        assert_eq!(desc.format_value(50.0), "50 ms");
        assert_eq!(desc.parse_value("250 ms"), Some(250.0));
        assert_eq!(desc.parse_value(" 12MS "), Some(12.0));
        assert_eq!(desc.parse_value("75"), Some(75.0));
        assert_eq!(desc.parse_value("5000"), Some(1000.0));
        assert_eq!(desc.parse_value("abc"), None);
    }

    #[test]
    fn offset_format_and_parse() {
        let desc = ParamDescriptor::stepped("Number of choices", "Choices", 0.0, 30.0, 3.0)
            .with_display(ParamDisplay::Offset {
                offset: 2,
                suffix: "",
            });
        assert_eq!(desc.format_value(0.0), "2");
        assert_eq!(desc.format_value(30.0), "32");
        assert_eq!(desc.parse_value("5"), Some(3.0));
        assert_eq!(desc.parse_value("1"), Some(0.0));
    }

    #[test]
    fn label_format_and_parse() {
        let desc = ParamDescriptor::switch("Choice A", "A", "OFF", "ON");
        assert_eq!(desc.format_value(0.0), "OFF");
        assert_eq!(desc.format_value(0.5), "ON");
        assert_eq!(desc.parse_value("on"), Some(1.0));
        assert_eq!(desc.parse_value("OFF"), Some(0.0));
        assert_eq!(desc.parse_value("1"), Some(1.0));
        assert_eq!(desc.parse_value("maybe"), None);
    }

    #[test]
    fn clamp_limits() {
        let desc = fade();
        assert_eq!(desc.clamp(-1.0), 0.0);
        assert_eq!(desc.clamp(2000.0), 1000.0);
        assert_eq!(desc.clamp(10.0), 10.0);
    }

    #[test]
    fn flags() {
        let flags = ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED);
        assert!(flags.contains(ParamFlags::AUTOMATABLE));
        assert!(!ParamFlags::NONE.contains(ParamFlags::STEPPED));
        assert_eq!(ParamFlags::default(), ParamFlags::AUTOMATABLE);
        assert!(fade().flags.contains(ParamFlags::AUTOMATABLE));
        // Fade time moves in whole milliseconds.
        assert!(fade().flags.contains(ParamFlags::STEPPED));
        assert_eq!(fade().step, 1.0);
    }
}
