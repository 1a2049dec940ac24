//! Wire protocol
//!
//! Every message is an envelope `{ "type": string, "payload": object }`.
//! Payloads are plain JSON values so the worker can dispatch on the type tag
//! and ignore kinds it does not know.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use super::event_record::EventRecord;
use super::surface::SurfaceId;
use crate::config::scale::OVERRIDE_KEY;
use crate::error::BridgeError;

/// User-supplied scene options forwarded opaquely to the render root
pub type Options = Map<String, Value>;

/// Message type tags
pub mod kind {
    pub const INIT: &str = "init";
    pub const RESIZE: &str = "resize";
    pub const PROPS: &str = "props";
    pub const DOM_EVENTS: &str = "dom_events";
    pub const DOM_EVENTS_DISCONNECT: &str = "dom_events_disconnect";
    pub const READY: &str = "ready";
}

fn empty_payload() -> Value {
    Value::Object(Map::new())
}

/// Transport envelope shared by both directions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "empty_payload")]
    pub payload: Value,
}

impl Envelope {
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// Decode the payload into the type a handler expects
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, BridgeError> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }

    pub fn to_json(&self) -> Result<String, BridgeError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, BridgeError> {
        Ok(serde_json::from_str(text)?)
    }
}

// =============================================================================
// Payloads
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitPayload {
    #[serde(default)]
    pub options: Options,
    /// Identifies the handle travelling in the transfer list
    pub surface_handle: SurfaceId,
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizePayload {
    pub width: u32,
    pub height: u32,
}

/// Option mapping with an optional scale override under `dpr`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropsPayload(pub Options);

impl PropsPayload {
    /// Split the scale override from the remaining options
    pub fn into_parts(mut self) -> (Option<f32>, Options) {
        let scale = self
            .0
            .remove(OVERRIDE_KEY)
            .and_then(|v| v.as_f64())
            .map(|v| v as f32);
        (scale, self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomEventPayload {
    pub event_name: String,
    #[serde(flatten)]
    pub record: EventRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyPayload {
    pub surface_handle: SurfaceId,
}

// =============================================================================
// Typed messages
// =============================================================================

/// Messages the UI thread sends to the worker
#[derive(Debug, Clone, PartialEq)]
pub enum ToWorker {
    Init(InitPayload),
    Resize(ResizePayload),
    Props(PropsPayload),
    DomEvents(DomEventPayload),
}

impl ToWorker {
    pub fn kind(&self) -> &'static str {
        match self {
            ToWorker::Init(_) => kind::INIT,
            ToWorker::Resize(_) => kind::RESIZE,
            ToWorker::Props(_) => kind::PROPS,
            ToWorker::DomEvents(_) => kind::DOM_EVENTS,
        }
    }

    pub fn to_envelope(&self) -> Result<Envelope, BridgeError> {
        let payload = match self {
            ToWorker::Init(p) => serde_json::to_value(p)?,
            ToWorker::Resize(p) => serde_json::to_value(p)?,
            ToWorker::Props(p) => serde_json::to_value(p)?,
            ToWorker::DomEvents(p) => serde_json::to_value(p)?,
        };
        Ok(Envelope::new(self.kind(), payload))
    }
}

/// Control signals the worker sends back to the UI thread
#[derive(Debug, Clone, PartialEq)]
pub enum ToMain {
    /// The worker's event manager disconnected; hit-testing is torn down
    DomEventsDisconnect,
    /// The render root was constructed for this surface
    Ready(ReadyPayload),
}

impl ToMain {
    pub fn to_envelope(&self) -> Result<Envelope, BridgeError> {
        Ok(match self {
            ToMain::DomEventsDisconnect => Envelope::new(kind::DOM_EVENTS_DISCONNECT, empty_payload()),
            ToMain::Ready(p) => Envelope::new(kind::READY, serde_json::to_value(p)?),
        })
    }

    /// `None` for kinds this side does not understand
    pub fn from_envelope(envelope: &Envelope) -> Option<Result<Self, BridgeError>> {
        match envelope.kind.as_str() {
            kind::DOM_EVENTS_DISCONNECT => Some(Ok(ToMain::DomEventsDisconnect)),
            kind::READY => Some(envelope.decode().map(ToMain::Ready)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn init_envelope_shape() {
        let msg = ToWorker::Init(InitPayload {
            options: Options::new(),
            surface_handle: SurfaceId(3),
            width: 300,
            height: 150,
            pixel_ratio: 2.0,
        });
        let env = msg.to_envelope().unwrap();
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value["type"], json!("init"));
        assert_eq!(value["payload"]["surfaceHandle"], json!(3));
        assert_eq!(value["payload"]["pixelRatio"], json!(2.0));
    }

    #[test]
    fn dom_events_payload_is_flat() {
        let msg = ToWorker::DomEvents(DomEventPayload {
            event_name: "pointermove".into(),
            record: EventRecord::at_offset(10.0, 20.0),
        });
        let env = msg.to_envelope().unwrap();
        assert_eq!(env.payload["eventName"], json!("pointermove"));
        assert_eq!(env.payload["offsetY"], json!(20.0));
    }

    #[test]
    fn props_scale_override_is_split_off() {
        let props: PropsPayload =
            serde_json::from_value(json!({ "dpr": 1.5, "shadows": true })).unwrap();
        let (scale, options) = props.into_parts();
        assert_eq!(scale, Some(1.5));
        assert_eq!(options.get("shadows"), Some(&json!(true)));
        assert!(!options.contains_key("dpr"));

        let (scale, _) = PropsPayload::default().into_parts();
        assert_eq!(scale, None);
    }

    #[test]
    fn envelope_without_payload_decodes() {
        let env = Envelope::from_json(r#"{"type":"dom_events_disconnect"}"#).unwrap();
        assert_eq!(ToMain::from_envelope(&env).unwrap().unwrap(), ToMain::DomEventsDisconnect);
    }

    #[test]
    fn unknown_control_kind_is_not_understood() {
        let env = Envelope::new("telemetry", json!({}));
        assert!(ToMain::from_envelope(&env).is_none());
    }
}
