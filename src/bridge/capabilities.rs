//! Capability registry
//!
//! The fixed vocabulary of input events the bridge understands. The UI-side
//! event adapter and the worker-side event manager both read this one table,
//! so the two sides cannot disagree about which events connect.

use serde::Serialize;

/// One registry entry: logical handler key, native event name, passive flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    /// Handler key used by the render engine (`onPointerMove`)
    pub key: &'static str,
    /// Native event name on the host element (`pointermove`)
    pub event_name: &'static str,
    /// Passive listeners must not suppress the default action
    pub passive: bool,
}

impl Capability {
    const fn active(key: &'static str, event_name: &'static str) -> Self {
        Self {
            key,
            event_name,
            passive: false,
        }
    }

    const fn passive(key: &'static str, event_name: &'static str) -> Self {
        Self {
            key,
            event_name,
            passive: true,
        }
    }

    /// Pointer-down starts a capture, pointer-up ends it
    pub fn capture_change(&self) -> Option<CaptureChange> {
        match self.event_name {
            "pointerdown" => Some(CaptureChange::Acquire),
            "pointerup" => Some(CaptureChange::Release),
            _ => None,
        }
    }
}

/// Pointer capture transition triggered by a forwarded event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CaptureChange {
    Acquire,
    Release,
}

/// Every event kind forwarded across the bridge
pub static DOM_EVENTS: [Capability; 10] = [
    Capability::active("onClick", "click"),
    Capability::active("onContextMenu", "contextmenu"),
    Capability::active("onDoubleClick", "dblclick"),
    Capability::passive("onWheel", "wheel"),
    Capability::passive("onPointerDown", "pointerdown"),
    Capability::passive("onPointerUp", "pointerup"),
    Capability::passive("onPointerLeave", "pointerleave"),
    Capability::passive("onPointerMove", "pointermove"),
    Capability::passive("onPointerCancel", "pointercancel"),
    Capability::passive("onLostPointerCapture", "lostpointercapture"),
];

/// Look up a capability by its native event name
pub fn by_event_name(event_name: &str) -> Option<&'static Capability> {
    DOM_EVENTS.iter().find(|c| c.event_name == event_name)
}

/// Look up a capability by its handler key
pub fn by_key(key: &str) -> Option<&'static Capability> {
    DOM_EVENTS.iter().find(|c| c.key == key)
}
