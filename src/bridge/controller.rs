//! Bridge controller (UI thread)
//!
//! Owns the host element, performs the one-time surface handoff, wires the
//! event adapter onto the channel and relays option changes as `props`.
//!
//! Session lifecycle:
//! - `Uninitialized`: nothing sent yet (or the host cannot transfer surfaces)
//! - `Initializing`: `init` sent together with the surface handle
//! - `Active`: the worker reported `ready` for that surface
//! - `Disconnected`: the view unmounted or the channel closed
//!
//! Unmounting only releases UI-side listeners. The worker session lives as
//! long as its channel, so mounting again on the same channel resumes it
//! without a second `init`.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::adapter::{Dispatch, EventAdapter};
use super::channel::{ChannelId, MainPort};
use super::event_record::NativeEvent;
use super::protocol::{InitPayload, Options, PropsPayload, ToMain, ToWorker};
use super::surface::{HostElement, SurfaceId};
use super::window::{HostWindow, ResizeSubscription};
use crate::error::BridgeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Uninitialized,
    Initializing,
    Active,
    Disconnected,
}

/// Called when the worker reports its event manager disconnected
pub type DisconnectObserver = Box<dyn Fn() + Send + Sync>;

pub struct BridgeController {
    element: Arc<dyn HostElement>,
    window: Arc<dyn HostWindow>,
    state: SessionState,
    options: Options,
    port: Option<MainPort>,
    adapter: Option<EventAdapter>,
    resize: Option<ResizeSubscription>,
    /// Channel that already received `init`
    initialized: Option<ChannelId>,
    surface: Option<SurfaceId>,
    acknowledged: bool,
    /// Options the worker last received through `init` or `props`
    delivered: Option<Options>,
    transfer_failed: bool,
    hit_testing: bool,
    observers: Vec<DisconnectObserver>,
}

impl BridgeController {
    pub fn new(element: Arc<dyn HostElement>, window: Arc<dyn HostWindow>, options: Options) -> Self {
        Self {
            element,
            window,
            state: SessionState::Uninitialized,
            options,
            port: None,
            adapter: None,
            resize: None,
            initialized: None,
            surface: None,
            acknowledged: false,
            delivered: None,
            transfer_failed: false,
            hit_testing: false,
            observers: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Whether the worker's event manager is currently connected
    pub fn hit_testing(&self) -> bool {
        self.hit_testing
    }

    /// Worker rendering was abandoned because the host cannot transfer surfaces
    pub fn is_degraded(&self) -> bool {
        self.transfer_failed
    }

    pub fn on_events_disconnect(&mut self, observer: DisconnectObserver) {
        self.observers.push(observer);
    }

    /// Mount the view on `port`; a missing port leaves the bridge idle
    pub fn mount(&mut self, port: Option<MainPort>) {
        let Some(port) = port else {
            debug!("[Bridge] Mounted without a channel");
            return;
        };
        if self.initialized == Some(port.id()) {
            debug!("[Bridge] Remounted on the initialized channel; resuming session");
            self.state = if self.acknowledged {
                SessionState::Active
            } else {
                SessionState::Initializing
            };
            self.wire(port);
            // Options changed while unmounted
            if self.delivered.as_ref() != Some(&self.options) {
                self.send_props();
            }
            return;
        }
        if self.transfer_failed {
            return;
        }

        let handle = match self.element.transfer_control_to_offscreen() {
            Ok(handle) => handle,
            Err(BridgeError::AlreadyTransferred) => {
                warn!("[Bridge] Surface already belongs to another channel; refusing this one");
                return;
            }
            Err(e) => {
                warn!("[Bridge] Offscreen transfer unavailable, worker rendering disabled: {}", e);
                self.transfer_failed = true;
                return;
            }
        };

        let surface = handle.id();
        let (width, height) = self.element.client_size();
        let init = ToWorker::Init(InitPayload {
            options: self.options.clone(),
            surface_handle: surface,
            width,
            height,
            pixel_ratio: self.element.device_pixel_ratio(),
        });
        let sent = init
            .to_envelope()
            .and_then(|envelope| port.post_message(envelope, Some(handle)));
        if let Err(e) = sent {
            warn!("[Bridge] Failed to send init: {}", e);
            self.state = SessionState::Disconnected;
            return;
        }

        info!("[Bridge] Surface {:?} transferred ({}x{})", surface, width, height);
        self.initialized = Some(port.id());
        self.surface = Some(surface);
        self.acknowledged = false;
        self.delivered = Some(self.options.clone());
        self.state = SessionState::Initializing;
        self.wire(port);
    }

    fn wire(&mut self, port: MainPort) {
        let adapter = EventAdapter::attach(port.clone(), self.element.clone());
        // Replace before registering so the previous guard is released first
        self.resize = None;
        self.resize = Some(adapter.watch_resize(self.window.clone()));
        self.adapter = Some(adapter);
        self.port = Some(port);
    }

    /// Release UI-side listeners; the worker session is left running
    pub fn unmount(&mut self) {
        self.resize = None;
        self.adapter = None;
        if self.state != SessionState::Uninitialized {
            self.state = SessionState::Disconnected;
        }
    }

    /// Replace the scene options, relaying them as `props` once `init` went out
    pub fn set_options(&mut self, options: Options) {
        if options == self.options {
            return;
        }
        self.options = options;

        if self.initialized.is_none() || self.state == SessionState::Disconnected {
            return;
        }
        self.send_props();
    }

    fn send_props(&mut self) {
        let Some(port) = &self.port else {
            return;
        };
        let props = ToWorker::Props(PropsPayload(self.options.clone()));
        match port.send(&props) {
            Ok(()) => self.delivered = Some(self.options.clone()),
            Err(e) => self.channel_failed(e),
        }
    }

    /// Forward a native input event from the host element
    pub fn handle_event(&mut self, event: &mut NativeEvent) -> Dispatch {
        if self.state == SessionState::Disconnected {
            return Dispatch::default();
        }
        let Some(adapter) = &self.adapter else {
            return Dispatch::default();
        };
        match adapter.handle_event(event) {
            Ok(dispatch) => dispatch,
            Err(e) => {
                self.channel_failed(e);
                Dispatch::default()
            }
        }
    }

    /// Drain worker-to-UI control messages
    pub fn poll(&mut self) -> Vec<ToMain> {
        let mut received = Vec::new();
        let Some(port) = self.port.clone() else {
            return received;
        };

        loop {
            let envelope = match port.try_recv() {
                Ok(Some(envelope)) => envelope,
                Ok(None) => break,
                Err(e) => {
                    self.channel_failed(e);
                    break;
                }
            };
            match ToMain::from_envelope(&envelope) {
                Some(Ok(message)) => {
                    self.apply(&message);
                    received.push(message);
                }
                Some(Err(e)) => warn!("[Bridge] Malformed `{}` from worker: {}", envelope.kind, e),
                None => debug!("[Bridge] Ignoring `{}` from worker", envelope.kind),
            }
        }
        received
    }

    fn apply(&mut self, message: &ToMain) {
        match message {
            ToMain::Ready(ready) => {
                if Some(ready.surface_handle) != self.surface {
                    debug!("[Bridge] Ready for unknown surface {:?}", ready.surface_handle);
                    return;
                }
                self.acknowledged = true;
                self.hit_testing = true;
                if self.state == SessionState::Initializing {
                    self.state = SessionState::Active;
                }
            }
            ToMain::DomEventsDisconnect => {
                self.hit_testing = false;
                for observer in &self.observers {
                    observer();
                }
            }
        }
    }

    fn channel_failed(&mut self, error: BridgeError) {
        warn!("[Bridge] Channel failure: {}", error);
        self.resize = None;
        self.adapter = None;
        self.port = None;
        self.state = SessionState::Disconnected;
    }
}
