//! Event adapter (UI thread)
//!
//! Listens on the host element for every registry entry, snapshots each
//! native event into an [`EventRecord`](super::event_record::EventRecord) and
//! posts it to the worker as a `dom_events` message. Also reports window
//! resizes as `resize` messages using the element's content-box size.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::capabilities::{CaptureChange, Capability, DOM_EVENTS};
use super::channel::MainPort;
use super::event_record::NativeEvent;
use super::protocol::{DomEventPayload, ResizePayload, ToWorker};
use super::surface::HostElement;
use super::window::{HostWindow, ResizeSubscription};
use crate::error::BridgeError;

/// What happened to one native event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dispatch {
    pub forwarded: bool,
    pub default_prevented: bool,
    pub capture: Option<CaptureChange>,
}

pub struct EventAdapter {
    port: MainPort,
    element: Arc<dyn HostElement>,
    listeners: Vec<&'static Capability>,
}

impl EventAdapter {
    /// Attach one listener per registry entry
    pub fn attach(port: MainPort, element: Arc<dyn HostElement>) -> Self {
        let listeners: Vec<_> = DOM_EVENTS.iter().collect();
        debug!("[Adapter] Attached {} listeners", listeners.len());
        Self {
            port,
            element,
            listeners,
        }
    }

    pub fn listeners(&self) -> &[&'static Capability] {
        &self.listeners
    }

    /// Run the listener registered for `event.kind`, if any
    pub fn handle_event(&self, event: &mut NativeEvent) -> Result<Dispatch, BridgeError> {
        let Some(capability) = self
            .listeners
            .iter()
            .copied()
            .find(|c| c.event_name == event.kind)
        else {
            return Ok(Dispatch::default());
        };

        // The worker makes the real decision, so active kinds never run the host default
        if !capability.passive {
            event.prevent_default();
        }

        let capture = capability.capture_change();
        match capture {
            Some(CaptureChange::Acquire) => self.element.set_pointer_capture(event.record.pointer_id),
            Some(CaptureChange::Release) => {
                self.element.release_pointer_capture(event.record.pointer_id)
            }
            None => {}
        }

        self.port.send(&ToWorker::DomEvents(DomEventPayload {
            event_name: capability.event_name.to_string(),
            record: event.snapshot(),
        }))?;

        Ok(Dispatch {
            forwarded: true,
            default_prevented: event.default_prevented,
            capture,
        })
    }

    /// Register the window resize listener; dropping the guard removes it
    pub fn watch_resize(&self, window: Arc<dyn HostWindow>) -> ResizeSubscription {
        let port = self.port.clone();
        let element = self.element.clone();
        ResizeSubscription::register(
            window,
            Box::new(move || {
                let (width, height) = element.client_size();
                if let Err(e) = port.send(&ToWorker::Resize(ResizePayload { width, height })) {
                    debug!("[Adapter] Dropped resize {}x{}: {}", width, height, e);
                }
            }),
        )
    }
}
