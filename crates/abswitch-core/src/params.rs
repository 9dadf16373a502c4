//! Host parameter layout.
//!
//! Four global parameters followed by one on/off parameter per choice slot:
//!
//! | index | id      | string id           | raw range | default |
//! |-------|---------|---------------------|-----------|---------|
//! | 0     | 0       | `switch_mode`       | 0..1      | 0       |
//! | 1     | 1       | `number_of_choices` | 0..30     | 3       |
//! | 2     | 2       | `channel_size`      | 0..31     | 1       |
//! | 3     | 3       | `fade_time`         | 0..1000   | 50      |
//! | 4+k   | 100+k   | `choice_state_k`    | 0..1      | 0       |
//!
//! IDs are stable and never reordered; saved state is keyed by string id.

use crate::MAX_CHOICES;
use crate::param_info::{ParamDescriptor, ParamDisplay, ParamId, ParamUnit};
use crate::selection::SelectionMode;

/// Index of the switch mode parameter.
pub const SWITCH_MODE: usize = 0;
/// Index of the number-of-choices parameter.
pub const NUMBER_OF_CHOICES: usize = 1;
/// Index of the output channel size parameter.
pub const CHANNEL_SIZE: usize = 2;
/// Index of the fade time parameter.
pub const FADE_TIME: usize = 3;
/// Index of the first choice state parameter.
pub const FIRST_CHOICE: usize = 4;

/// Total number of host parameters.
pub const PARAM_COUNT: usize = FIRST_CHOICE + MAX_CHOICES;

/// Numeric id of choice 0's state parameter; choice `k` is this plus `k`.
pub const CHOICE_ID_BASE: u32 = 100;

/// Default raw number-of-choices value (shows as 5).
pub const DEFAULT_NUMBER_OF_CHOICES: f32 = 3.0;
/// Default raw channel size value (shows as 2 ch).
pub const DEFAULT_CHANNEL_SIZE: f32 = 1.0;
/// Default fade time in milliseconds.
pub const DEFAULT_FADE_MS: f32 = 50.0;
/// Longest fade time in milliseconds.
pub const MAX_FADE_MS: f32 = 1000.0;

const CHOICE_NAMES: [&str; MAX_CHOICES] = [
    "Choice A", "Choice B", "Choice C", "Choice D", "Choice E", "Choice F", "Choice G",
    "Choice H", "Choice I", "Choice J", "Choice K", "Choice L", "Choice M", "Choice N",
    "Choice O", "Choice P", "Choice Q", "Choice R", "Choice S", "Choice T", "Choice U",
    "Choice V", "Choice W", "Choice X", "Choice Y", "Choice Z", "Choice [", "Choice \\",
    "Choice ]", "Choice ^", "Choice _", "Choice `",
];

const CHOICE_STRING_IDS: [&str; MAX_CHOICES] = [
    "choice_state_0", "choice_state_1", "choice_state_2", "choice_state_3",
    "choice_state_4", "choice_state_5", "choice_state_6", "choice_state_7",
    "choice_state_8", "choice_state_9", "choice_state_10", "choice_state_11",
    "choice_state_12", "choice_state_13", "choice_state_14", "choice_state_15",
    "choice_state_16", "choice_state_17", "choice_state_18", "choice_state_19",
    "choice_state_20", "choice_state_21", "choice_state_22", "choice_state_23",
    "choice_state_24", "choice_state_25", "choice_state_26", "choice_state_27",
    "choice_state_28", "choice_state_29", "choice_state_30", "choice_state_31",
];

/// Number of host parameters.
#[inline]
pub const fn param_count() -> usize {
    PARAM_COUNT
}

/// Descriptor for the parameter at `index`.
pub fn descriptor(index: usize) -> Option<ParamDescriptor> {
    let desc = match index {
        SWITCH_MODE => ParamDescriptor::switch(
            "Switch Mode",
            "Mode",
            SelectionMode::ExclusiveSolo.label(),
            SelectionMode::ToggleMode.label(),
        )
        .with_id(ParamId(0), "switch_mode"),
        NUMBER_OF_CHOICES => ParamDescriptor::stepped(
            "Number of choices",
            "Choices",
            0.0,
            (MAX_CHOICES - 2) as f32,
            DEFAULT_NUMBER_OF_CHOICES,
        )
        .with_id(ParamId(1), "number_of_choices")
        .with_display(ParamDisplay::Offset {
            offset: 2,
            suffix: "",
        }),
        CHANNEL_SIZE => ParamDescriptor::stepped(
            "Output Channel Size",
            "Size",
            0.0,
            (crate::MAX_STRIDE - 1) as f32,
            DEFAULT_CHANNEL_SIZE,
        )
        .with_id(ParamId(2), "channel_size")
        .with_unit(ParamUnit::Channels)
        .with_display(ParamDisplay::Offset {
            offset: 1,
            suffix: " ch",
        }),
        FADE_TIME => {
            ParamDescriptor::time_ms("Fade-Length", "Fade", 0.0, MAX_FADE_MS, DEFAULT_FADE_MS)
                .with_id(ParamId(3), "fade_time")
        }
        _ => {
            let choice = choice_of_param(index)?;
            ParamDescriptor::switch(CHOICE_NAMES[choice], short_choice_name(choice), "OFF", "ON")
                .with_id(ParamId(CHOICE_ID_BASE + choice as u32), CHOICE_STRING_IDS[choice])
                .with_group("Choices")
        }
    };
    Some(desc)
}

/// Parameter index for a stable numeric id.
pub fn index_by_id(id: ParamId) -> Option<usize> {
    match id.0 {
        0..=3 => Some(id.0 as usize),
        raw if raw >= CHOICE_ID_BASE => choice_param_index((raw - CHOICE_ID_BASE) as usize),
        _ => None,
    }
}

/// Parameter index for a string id.
pub fn index_by_string_id(string_id: &str) -> Option<usize> {
    (0..PARAM_COUNT).find(|&i| descriptor(i).is_some_and(|d| d.string_id == string_id))
}

/// Parameter index of `choice`'s on/off state.
#[inline]
pub fn choice_param_index(choice: usize) -> Option<usize> {
    (choice < MAX_CHOICES).then_some(FIRST_CHOICE + choice)
}

/// Choice slot controlled by the parameter at `index`, if any.
#[inline]
pub fn choice_of_param(index: usize) -> Option<usize> {
    index
        .checked_sub(FIRST_CHOICE)
        .filter(|&choice| choice < MAX_CHOICES)
}

/// Display name of a choice slot ("Choice A", "Choice B", ...).
pub fn choice_name(choice: usize) -> Option<&'static str> {
    CHOICE_NAMES.get(choice).copied()
}

fn short_choice_name(choice: usize) -> &'static str {
    // "Choice X" -> "X"
    &CHOICE_NAMES[choice][7..]
}

/// Number of choices taking part in routing for a raw `number_of_choices`.
#[inline]
pub fn active_choices(value: f32) -> usize {
    (libm::roundf(value).max(0.0) as usize + 2).clamp(2, MAX_CHOICES)
}

/// Channels per choice for a raw `channel_size`.
#[inline]
pub fn stride(value: f32) -> usize {
    (libm::roundf(value).max(0.0) as usize + 1).clamp(1, crate::MAX_STRIDE)
}

/// Whether a raw choice state value means "on".
#[inline]
pub fn choice_is_on(value: f32) -> bool {
    value >= 0.5
}

/// Fade time in seconds for a raw `fade_time` value.
#[inline]
pub fn fade_seconds(value: f32) -> f32 {
    value.clamp(0.0, MAX_FADE_MS) / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param_info::ParamFlags;

    #[test]
    fn layout_is_complete() {
        assert_eq!(param_count(), 36);
        for i in 0..param_count() {
            let desc = descriptor(i).unwrap();
            assert_eq!(index_by_id(desc.id), Some(i), "id round trip for {}", desc.name);
            assert_eq!(index_by_string_id(desc.string_id), Some(i));
            assert!(desc.flags.contains(ParamFlags::AUTOMATABLE));
            assert!(desc.default >= desc.min && desc.default <= desc.max);
        }
        assert!(descriptor(param_count()).is_none());
    }

    #[test]
    fn choice_names_follow_ascii() {
        assert_eq!(choice_name(0), Some("Choice A"));
        assert_eq!(choice_name(25), Some("Choice Z"));
        assert_eq!(choice_name(31), Some("Choice `"));
        assert_eq!(choice_name(32), None);
        assert_eq!(descriptor(FIRST_CHOICE + 1).unwrap().short_name, "B");
    }

    #[test]
    fn choice_index_mapping() {
        assert_eq!(choice_param_index(0), Some(FIRST_CHOICE));
        assert_eq!(choice_param_index(MAX_CHOICES), None);
        assert_eq!(choice_of_param(FIRST_CHOICE + 5), Some(5));
        assert_eq!(choice_of_param(FADE_TIME), None);
        assert_eq!(choice_of_param(PARAM_COUNT), None);
        assert_eq!(index_by_id(ParamId(131)), Some(FIRST_CHOICE + 31));
        assert_eq!(index_by_id(ParamId(132)), None);
        assert_eq!(index_by_id(ParamId(50)), None);
    }

    #[test]
    fn every_param_is_stepped() {
        for i in 0..param_count() {
            let desc = descriptor(i).unwrap();
            assert!(desc.flags.contains(ParamFlags::STEPPED), "{}", desc.name);
            assert_eq!(desc.step, 1.0);
        }
    }

    #[test]
    fn display_strings() {
        let mode = descriptor(SWITCH_MODE).unwrap();
        assert_eq!(mode.format_value(0.0), "Exclusive Solo");
        assert_eq!(mode.format_value(1.0), "Toggle Mode");
        assert_eq!(mode.parse_value("toggle mode"), Some(1.0));

        let count = descriptor(NUMBER_OF_CHOICES).unwrap();
        assert_eq!(count.format_value(DEFAULT_NUMBER_OF_CHOICES), "5");

        let size = descriptor(CHANNEL_SIZE).unwrap();
        assert_eq!(size.format_value(DEFAULT_CHANNEL_SIZE), "2 ch");
        assert_eq!(size.parse_value("32 ch"), Some(31.0));

        let fade = descriptor(FADE_TIME).unwrap();
        assert_eq!(fade.format_value(50.0), "50 ms");

        let choice = descriptor(FIRST_CHOICE).unwrap();
        assert_eq!(choice.format_value(1.0), "ON");
        assert_eq!(choice.parse_value("OFF"), Some(0.0));
    }

    #[test]
    fn decoders() {
        assert_eq!(active_choices(0.0), 2);
        assert_eq!(active_choices(3.0), 5);
        assert_eq!(active_choices(30.0), 32);
        assert_eq!(active_choices(99.0), 32);
        assert_eq!(active_choices(-4.0), 2);

        assert_eq!(stride(0.0), 1);
        assert_eq!(stride(1.0), 2);
        assert_eq!(stride(31.0), 32);
        assert_eq!(stride(1.4), 2);

        assert!(choice_is_on(0.5));
        assert!(!choice_is_on(0.49));

        assert_eq!(fade_seconds(50.0), 0.05);
        assert_eq!(fade_seconds(5000.0), 1.0);
    }
}
