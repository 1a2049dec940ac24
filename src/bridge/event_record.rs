//! Event records
//!
//! A serializable snapshot of one input occurrence. Records hold plain values
//! only, never a reference back to the native event that produced them.

use serde::{Deserialize, Serialize};

/// Immutable snapshot of one pointer/wheel/click occurrence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventRecord {
    pub button: i16,
    pub buttons: u16,
    pub alt_key: bool,
    pub ctrl_key: bool,
    pub meta_key: bool,
    pub shift_key: bool,
    pub movement_x: f32,
    pub movement_y: f32,
    pub client_x: f32,
    pub client_y: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub page_x: f32,
    pub page_y: f32,
    pub x: f32,
    pub y: f32,
    pub pointer_id: i32,
    pub pointer_type: String,
    pub delta_x: f32,
    pub delta_y: f32,
    pub delta_z: f32,
    pub delta_mode: u32,
}

impl EventRecord {
    /// Record located at an offset inside the surface, other fields defaulted
    pub fn at_offset(offset_x: f32, offset_y: f32) -> Self {
        Self {
            offset_x,
            offset_y,
            client_x: offset_x,
            client_y: offset_y,
            page_x: offset_x,
            page_y: offset_y,
            x: offset_x,
            y: offset_y,
            pointer_type: "mouse".into(),
            ..Default::default()
        }
    }

    /// Whether the primary button is held
    pub fn primary_pressed(&self) -> bool {
        self.buttons & 1 != 0
    }
}

/// A native input event as delivered to the UI-side host element
///
/// Carries the mutable bits a real event has (default-prevented flag) next to
/// the values that get snapshotted into an [`EventRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeEvent {
    /// Native event name (`pointerdown`, `wheel`, ...)
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub record: EventRecord,
    #[serde(default)]
    pub default_prevented: bool,
}

impl NativeEvent {
    pub fn new(kind: impl Into<String>, record: EventRecord) -> Self {
        Self {
            kind: kind.into(),
            record,
            default_prevented: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Detached copy of the event's values
    pub fn snapshot(&self) -> EventRecord {
        self.record.clone()
    }
}
