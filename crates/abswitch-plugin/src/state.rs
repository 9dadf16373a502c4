//! Persisted plugin state.
//!
//! State is a JSON object keyed by stable string IDs, so it survives
//! parameter reordering across versions:
//!
//! ```json
//! {
//!   "version": 1,
//!   "params": {"switch_mode": 0.0, "fade_time": 50.0, "choice_state_0": 1.0},
//!   "osc_port": 9222,
//!   "osc_enabled": false,
//!   "editor_width": 740,
//!   "editor_height": 300,
//!   "label_text": "Mix A\nMix B",
//!   "button_size": 120
//! }
//! ```
//!
//! Saving always writes every field. Loading is lenient: each recognized
//! field is applied on its own, anything missing or of the wrong type keeps
//! its current value, unknown parameter IDs are skipped and values are
//! clamped. Only bytes that are not a JSON object at all are an error.

use std::collections::BTreeMap;
use std::io::Read;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::control::ControlPlane;
use crate::shared::{SwitchShared, UiEvent};

/// Current state format version.
pub const STATE_VERSION: u32 = 1;

/// Errors that can occur while restoring state.
#[derive(Debug, Error)]
pub enum StateError {
    /// Failed to read the host stream
    #[error("failed to read state: {0}")]
    Read(#[from] std::io::Error),

    /// Bytes are not valid JSON
    #[error("failed to parse state JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON is valid but not an object
    #[error("state is not a JSON object")]
    NotAnObject,
}

/// Snapshot of everything the plugin persists.
///
/// Every field is optional so a partial document can be represented;
/// [`PersistedState::capture`] always fills all of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PersistedState {
    /// Format version.
    pub version: Option<u32>,
    /// Parameter values by string ID.
    pub params: BTreeMap<String, f64>,
    /// Remote listener port.
    pub osc_port: Option<u16>,
    /// Connect the remote listener on load.
    pub osc_enabled: Option<bool>,
    /// Editor width in pixels.
    pub editor_width: Option<u32>,
    /// Editor height in pixels.
    pub editor_height: Option<u32>,
    /// Newline-separated choice labels.
    pub label_text: Option<String>,
    /// Choice button size in pixels.
    pub button_size: Option<u32>,
}

impl PersistedState {
    /// Snapshot the current shared state.
    pub fn capture(shared: &SwitchShared) -> Self {
        let params = shared
            .descriptors()
            .iter()
            .enumerate()
            .filter_map(|(i, desc)| {
                let value = shared.get_value(i)?;
                Some((desc.string_id.to_owned(), f64::from(value)))
            })
            .collect();
        let (width, height) = shared.editor_size();

        Self {
            version: Some(STATE_VERSION),
            params,
            osc_port: Some(shared.osc().port()),
            osc_enabled: Some(shared.osc().auto_connect()),
            editor_width: Some(width),
            editor_height: Some(height),
            label_text: Some(shared.label_text().as_str().to_owned()),
            button_size: Some(shared.button_size()),
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, StateError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse JSON bytes, keeping every field that has the expected type.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StateError> {
        let value: Value = serde_json::from_slice(bytes)?;
        let Value::Object(obj) = value else {
            return Err(StateError::NotAnObject);
        };

        let params = obj
            .get("params")
            .and_then(Value::as_object)
            .map(|params| {
                params
                    .iter()
                    .filter_map(|(key, val)| Some((key.clone(), val.as_f64()?)))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            version: get_u32(&obj, "version"),
            params,
            osc_port: obj
                .get("osc_port")
                .and_then(Value::as_u64)
                .and_then(|p| u16::try_from(p).ok()),
            osc_enabled: obj.get("osc_enabled").and_then(Value::as_bool),
            editor_width: get_u32(&obj, "editor_width"),
            editor_height: get_u32(&obj, "editor_height"),
            label_text: obj
                .get("label_text")
                .and_then(Value::as_str)
                .map(str::to_owned),
            button_size: get_u32(&obj, "button_size"),
        })
    }

    /// Write this state into the plugin through `control`.
    ///
    /// Parameter values are stored directly rather than replayed through the
    /// selection policy, so a saved multi-choice toggle setup comes back as
    /// it was. Editor size is only applied when both dimensions are present.
    pub fn apply(&self, control: &ControlPlane<'_>) {
        let shared = control.shared();

        if let Some(version) = self.version
            && version > STATE_VERSION
        {
            tracing::warn!(version, "loading state from a newer format version");
        }

        let choices_before = shared.active_choices();
        for (key, &value) in &self.params {
            match abswitch_core::params::index_by_string_id(key) {
                Some(index) => shared.set_value(index, value as f32),
                None => tracing::debug!(key = key.as_str(), "skipping unknown parameter in state"),
            }
        }
        if shared.active_choices() != choices_before {
            shared.push_ui_event(UiEvent::ChoiceCountChanged);
        }

        if let Some(port) = self.osc_port {
            control.set_remote_port(port);
        }
        if let Some(enabled) = self.osc_enabled {
            control.set_remote_auto_connect(enabled);
        }
        if let (Some(width), Some(height)) = (self.editor_width, self.editor_height) {
            shared.store_editor_size(width, height);
            shared.push_ui_event(UiEvent::ResizeEditor);
        }
        if let Some(text) = &self.label_text {
            shared.store_label_text(text.clone());
            shared.push_ui_event(UiEvent::LabelTextChanged);
        }
        if let Some(px) = self.button_size {
            shared.store_button_size(px);
            shared.push_ui_event(UiEvent::ButtonSizeChanged);
        }

        shared.request_process();
    }
}

fn get_u32(obj: &Map<String, Value>, key: &str) -> Option<u32> {
    obj.get(key)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
}

/// Serialize the current state of `shared`.
pub fn save(shared: &SwitchShared) -> Result<Vec<u8>, StateError> {
    let bytes = PersistedState::capture(shared).to_bytes()?;
    tracing::debug!(bytes = bytes.len(), "state saved");
    Ok(bytes)
}

/// Restore state from `bytes`.
///
/// On error nothing is applied.
pub fn load(control: &ControlPlane<'_>, bytes: &[u8]) -> Result<(), StateError> {
    let state = PersistedState::from_bytes(bytes)?;
    state.apply(control);
    tracing::debug!(params = state.params.len(), "state loaded");
    Ok(())
}

/// Read a whole state document from `reader` and restore it.
pub fn read_from<R: Read + ?Sized>(
    control: &ControlPlane<'_>,
    reader: &mut R,
) -> Result<(), StateError> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    load(control, &buf)
}
