//! UI-thread half of the offscreen render bridge and the shared vocabulary
//!
//! This module holds everything both sides agree on (capability registry,
//! event records, wire protocol, transport channel, surface handles) plus the
//! UI-thread components: the event adapter and the bridge controller.

pub mod adapter;
pub mod capabilities;
pub mod channel;
pub mod controller;
pub mod event_record;
pub mod protocol;
pub mod surface;
pub mod window;

// Re-export commonly used types
pub use adapter::{Dispatch, EventAdapter};
pub use capabilities::{Capability, CaptureChange, DOM_EVENTS};
pub use channel::{channel, MainPort, Outbox, Packet, WorkerPort};
pub use controller::{BridgeController, SessionState};
pub use event_record::{EventRecord, NativeEvent};
pub use protocol::{Envelope, Options, ToMain, ToWorker};
pub use surface::{CanvasElement, Frame, FrameView, HostElement, SurfaceHandle, SurfaceId};
pub use window::{HostWindow, ResizeSubscription, WindowEvents};
