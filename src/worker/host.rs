//! Worker render host
//!
//! Owns the worker-side session and dispatches incoming envelopes through a
//! table keyed by message type:
//!
//! - `init`: build the render root on the transferred surface and start rendering
//! - `resize`: record the new size and reconfigure with the current scale
//! - `props`: merge options (and an optional `dpr` override) and reconfigure
//! - `dom_events`: re-emit the record through the synthetic emitter
//!
//! Anything other than `init` is dropped until a root exists, and unknown
//! types are ignored. Each handler treats its message as the complete,
//! newest state, so redundant or replayed messages are harmless.

use std::any::Any;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use tracing::{debug, error, info, warn};

use super::emitter::{Emitter, SyntheticEvent, DISCONNECT};
use super::engine::{
    clamp_scale, InteractionState, RenderEngine, RenderRoot, RootConfig, SurfaceSize,
};
use super::events::{PointerEvents, PointerQueue, SharedInteraction};
use super::shim::SyntheticSurface;
use crate::bridge::capabilities;
use crate::bridge::channel::{Outbox, Packet};
use crate::bridge::protocol::{
    kind, DomEventPayload, Envelope, InitPayload, Options, PropsPayload, ReadyPayload,
    ResizePayload, ToMain,
};
use crate::bridge::surface::{SurfaceHandle, SurfaceId};
use crate::config::scale::MIN_SCALE;
use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    Idle,
    Configured,
}

/// The render root plus the host's authoritative copy of its configuration
pub struct Session<R> {
    root: Option<R>,
    surface: Option<SurfaceId>,
    size: SurfaceSize,
    dpr: f32,
    options: Options,
}

impl<R> Default for Session<R> {
    fn default() -> Self {
        Self {
            root: None,
            surface: None,
            size: SurfaceSize::default(),
            dpr: MIN_SCALE,
            options: Options::new(),
        }
    }
}

impl<R> Session<R> {
    pub fn state(&self) -> HostState {
        if self.root.is_some() {
            HostState::Configured
        } else {
            HostState::Idle
        }
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn scale(&self) -> f32 {
        self.dpr
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn surface(&self) -> Option<SurfaceId> {
        self.surface
    }

    pub fn root(&self) -> Option<&R> {
        self.root.as_ref()
    }

    pub fn config(&self) -> RootConfig {
        RootConfig {
            size: self.size,
            dpr: self.dpr,
            options: self.options.clone(),
        }
    }
}

type Handler<E> = fn(&mut RenderHost<E>, &Envelope, Option<SurfaceHandle>);

pub struct RenderHost<E: RenderEngine> {
    engine: E,
    session: Session<E::Root>,
    emitter: Rc<Emitter>,
    surface: Rc<SyntheticSurface>,
    events: PointerEvents,
    interaction: SharedInteraction,
    pending: PointerQueue,
    outbox: Outbox,
}

impl<E: RenderEngine> RenderHost<E> {
    pub fn new(engine: E, outbox: Outbox) -> Self {
        let emitter = Rc::new(Emitter::new());
        let interaction: SharedInteraction = Rc::new(RefCell::new(InteractionState::default()));
        let pending: PointerQueue = Rc::new(RefCell::new(VecDeque::new()));

        // Registered once: every event manager disconnect is reported back
        let relay = outbox.clone();
        emitter.on(
            DISCONNECT,
            Rc::new(move |_: &SyntheticEvent| {
                if let Err(e) = relay.post(&ToMain::DomEventsDisconnect) {
                    debug!("[Worker] Could not report disconnect: {}", e);
                }
            }),
        );

        Self {
            engine,
            session: Session::default(),
            surface: Rc::new(SyntheticSurface::new(emitter.clone())),
            events: PointerEvents::new(emitter.clone(), interaction.clone(), pending.clone()),
            emitter,
            interaction,
            pending,
            outbox,
        }
    }

    pub fn state(&self) -> HostState {
        self.session.state()
    }

    pub fn session(&self) -> &Session<E::Root> {
        &self.session
    }

    pub fn events(&self) -> &PointerEvents {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut PointerEvents {
        &mut self.events
    }

    pub fn interaction(&self) -> InteractionState {
        *self.interaction.borrow()
    }

    fn handler_for(kind: &str) -> Option<Handler<E>> {
        match kind {
            kind::INIT => Some(Self::handle_init),
            kind::RESIZE => Some(Self::handle_resize),
            kind::PROPS => Some(Self::handle_props),
            kind::DOM_EVENTS => Some(Self::handle_dom_events),
            _ => None,
        }
    }

    /// Process one packet to completion
    pub fn handle(&mut self, packet: Packet) {
        let Packet { envelope, transfer } = packet;
        match Self::handler_for(&envelope.kind) {
            Some(handler) => handler(self, &envelope, transfer),
            None => debug!("[Worker] Ignoring unknown message `{}`", envelope.kind),
        }
    }

    /// Advance the render loop by one frame
    pub fn frame(&mut self) {
        if let Some(root) = self.session.root.as_mut() {
            root.frame();
        }
    }

    fn decode<T: serde::de::DeserializeOwned>(envelope: &Envelope) -> Option<T> {
        match envelope.decode() {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!("[Worker] Malformed `{}` payload: {}", envelope.kind, e);
                None
            }
        }
    }

    // =========================================================================
    // Handlers
    // =========================================================================

    fn handle_init(&mut self, envelope: &Envelope, transfer: Option<SurfaceHandle>) {
        let Some(payload) = Self::decode::<InitPayload>(envelope) else {
            return;
        };
        if let Err(e) = self.init(payload, transfer) {
            error!("[Worker] {}", e);
        }
    }

    fn init(
        &mut self,
        payload: InitPayload,
        transfer: Option<SurfaceHandle>,
    ) -> Result<(), EngineError> {
        // A replayed init carries no surface and must not disturb a live session
        let surface = match transfer {
            Some(handle) if handle.id() == payload.surface_handle => handle,
            other => {
                return Err(EngineError::MissingSurface {
                    expected: payload.surface_handle.0,
                    found: other.map(|h| h.id().0),
                })
            }
        };
        let surface_id = surface.id();

        // A fresh surface replaces whatever session existed
        self.events.disconnect();
        self.session = Session::default();
        self.pending.borrow_mut().clear();

        let engine = &mut self.engine;
        let mut root = panic::catch_unwind(AssertUnwindSafe(|| engine.create_root(surface)))
            .map_err(|payload| EngineError::Panicked(panic_message(payload)))??;

        // A `dpr` option overrides the element's pixel ratio
        let (scale, options) = PropsPayload(payload.options).into_parts();
        self.session = Session {
            root: None,
            surface: Some(surface_id),
            size: SurfaceSize::new(payload.width, payload.height),
            dpr: clamp_scale(scale.unwrap_or(payload.pixel_ratio)),
            options,
        };
        let config = self.session.config();
        root.configure(&config);
        self.apply_size(config.size);
        self.session.root = Some(root);

        self.events.connect(self.surface.clone());
        if let Some(root) = self.session.root.as_mut() {
            root.render();
        }

        info!(
            "[Worker] Render root ready on surface {:?} ({}x{} @{})",
            surface_id, config.size.width, config.size.height, config.dpr
        );
        if let Err(e) = self.outbox.post(&ToMain::Ready(ReadyPayload {
            surface_handle: surface_id,
        })) {
            debug!("[Worker] Could not acknowledge init: {}", e);
        }
        Ok(())
    }

    fn handle_resize(&mut self, envelope: &Envelope, _transfer: Option<SurfaceHandle>) {
        if self.state() == HostState::Idle {
            debug!("[Worker] Dropping resize before init");
            return;
        }
        let Some(ResizePayload { width, height }) = Self::decode::<ResizePayload>(envelope) else {
            return;
        };
        self.session.size = SurfaceSize::new(width, height);
        self.reconfigure();
    }

    fn handle_props(&mut self, envelope: &Envelope, _transfer: Option<SurfaceHandle>) {
        if self.state() == HostState::Idle {
            debug!("[Worker] Dropping props before init");
            return;
        }
        let Some(props) = Self::decode::<PropsPayload>(envelope) else {
            return;
        };
        let (scale, options) = props.into_parts();
        if let Some(scale) = scale {
            self.session.dpr = clamp_scale(scale);
        }
        self.session.options.extend(options);
        self.reconfigure();
    }

    fn handle_dom_events(&mut self, envelope: &Envelope, _transfer: Option<SurfaceHandle>) {
        if self.state() == HostState::Idle {
            return;
        }
        let Some(DomEventPayload { event_name, record }) = Self::decode::<DomEventPayload>(envelope)
        else {
            return;
        };
        // Only registry names reach the emitter; it also carries control signals
        if capabilities::by_event_name(&event_name).is_none() {
            debug!("[Worker] Ignoring unregistered event `{}`", event_name);
            return;
        }

        if let Some(camera) = self.session.root.as_mut().and_then(|root| root.camera()) {
            self.interaction.borrow_mut().camera = camera;
        }

        let event = SyntheticEvent::new(event_name, record);
        self.emitter.emit(&event.event_name, &event);

        let inputs: Vec<_> = self.pending.borrow_mut().drain(..).collect();
        if let Some(root) = self.session.root.as_mut() {
            for input in &inputs {
                root.handle_pointer(input);
            }
        }
    }

    fn reconfigure(&mut self) {
        let config = self.session.config();
        self.apply_size(config.size);
        if let Some(root) = self.session.root.as_mut() {
            root.configure(&config);
        }
    }

    fn apply_size(&self, size: SurfaceSize) {
        self.surface.apply_size(size);
        self.interaction.borrow_mut().size = size;
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".into()
    }
}
