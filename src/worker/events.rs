//! Pointer event manager for worker-hosted render roots
//!
//! Connects to a [`SurfaceTarget`] and subscribes one handler per registry
//! entry. Each handler reads the connected surface's client size, maps the
//! record's offset into normalized device coordinates, casts the picking ray from the active camera and queues the
//! result for the render root.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use bevy::math::Vec2;

use super::emitter::{Emitter, Listener, SyntheticEvent, DISCONNECT};
use super::engine::{InteractionState, PointerInput, Ray, SurfaceSize};
use super::shim::SurfaceTarget;
use crate::bridge::capabilities::{Capability, DOM_EVENTS};
use crate::bridge::event_record::EventRecord;
use crate::config::events::MANAGER_PRIORITY;

pub type SharedInteraction = Rc<RefCell<InteractionState>>;
pub type PointerQueue = Rc<RefCell<VecDeque<PointerInput>>>;

type Connection = Rc<RefCell<Option<Rc<dyn SurfaceTarget>>>>;

/// Map an offset position to normalized device coordinates and cast the ray
///
/// Offsets are used instead of client coordinates because captured pointers
/// keep reporting positions relative to the surface after leaving it.
pub fn compute(event: &EventRecord, state: &mut InteractionState) {
    let width = state.size.width.max(1) as f32;
    let height = state.size.height.max(1) as f32;
    state.pointer = Vec2::new(
        (event.offset_x / width) * 2.0 - 1.0,
        -(event.offset_y / height) * 2.0 + 1.0,
    );
    state.ray = Ray::from_camera(state.pointer, &state.camera);
}

pub struct PointerEvents {
    pub priority: i32,
    enabled: Rc<Cell<bool>>,
    handlers: Vec<(&'static Capability, Listener)>,
    connected: Connection,
    emitter: Rc<Emitter>,
}

impl PointerEvents {
    pub fn new(emitter: Rc<Emitter>, state: SharedInteraction, queue: PointerQueue) -> Self {
        let enabled = Rc::new(Cell::new(true));
        let connected: Connection = Rc::default();
        let handlers = DOM_EVENTS
            .iter()
            .map(|capability| {
                let listener: Listener = {
                    let enabled = enabled.clone();
                    let connected = connected.clone();
                    let state = state.clone();
                    let queue = queue.clone();
                    Rc::new(move |event: &SyntheticEvent| {
                        if !enabled.get() {
                            return;
                        }
                        let mut state = state.borrow_mut();
                        if let Some(target) = connected.borrow().as_ref() {
                            let (width, height) = target.client_size();
                            state.size = SurfaceSize::new(width, height);
                        }
                        compute(&event.record, &mut state);
                        queue.borrow_mut().push_back(PointerInput {
                            capability,
                            pointer: state.pointer,
                            ray: state.ray,
                            record: event.record.clone(),
                        });
                    })
                };
                (capability, listener)
            })
            .collect();

        Self {
            priority: MANAGER_PRIORITY,
            enabled,
            handlers,
            connected,
            emitter,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.borrow().is_some()
    }

    /// Subscribe every handler on `target`, dropping any previous connection first
    pub fn connect(&mut self, target: Rc<dyn SurfaceTarget>) {
        self.disconnect();
        for (capability, handler) in &self.handlers {
            target.add_event_listener(capability.event_name, handler.clone());
        }
        *self.connected.borrow_mut() = Some(target);
    }

    /// Unsubscribe and emit the disconnect signal; no-op when not connected
    pub fn disconnect(&mut self) {
        let Some(target) = self.connected.borrow_mut().take() else {
            return;
        };
        for (capability, handler) in &self.handlers {
            target.remove_event_listener(capability.event_name, handler);
        }
        self.emitter.emit(DISCONNECT, &SyntheticEvent::signal(DISCONNECT));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::engine::SurfaceSize;
    use crate::worker::shim::SyntheticSurface;

    struct Fixture {
        emitter: Rc<Emitter>,
        surface: Rc<SyntheticSurface>,
        state: SharedInteraction,
        queue: PointerQueue,
        events: PointerEvents,
        disconnects: Rc<Cell<u32>>,
    }

    fn fixture() -> Fixture {
        let emitter = Rc::new(Emitter::new());
        let state: SharedInteraction = Rc::default();
        state.borrow_mut().size = SurfaceSize::new(800, 600);
        let queue: PointerQueue = Rc::default();
        let disconnects = Rc::new(Cell::new(0));
        {
            let disconnects = disconnects.clone();
            emitter.on(
                DISCONNECT,
                Rc::new(move |_: &SyntheticEvent| disconnects.set(disconnects.get() + 1)),
            );
        }
        let surface = Rc::new(SyntheticSurface::new(emitter.clone()));
        surface.apply_size(SurfaceSize::new(800, 600));
        Fixture {
            surface,
            events: PointerEvents::new(emitter.clone(), state.clone(), queue.clone()),
            emitter,
            state,
            queue,
            disconnects,
        }
    }

    #[test]
    fn center_maps_to_origin() {
        let mut state = InteractionState {
            size: SurfaceSize::new(800, 600),
            ..Default::default()
        };
        compute(&EventRecord::at_offset(400.0, 300.0), &mut state);
        assert_eq!(state.pointer, Vec2::new(0.0, 0.0));
    }

    #[test]
    fn top_left_maps_to_minus_one_one() {
        let mut state = InteractionState {
            size: SurfaceSize::new(800, 600),
            ..Default::default()
        };
        compute(&EventRecord::at_offset(0.0, 0.0), &mut state);
        assert_eq!(state.pointer, Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn manager_defaults() {
        let f = fixture();
        assert_eq!(f.events.priority, 1);
        assert!(f.events.enabled());
        assert!(!f.events.is_connected());
    }

    #[test]
    fn connected_handlers_queue_pointer_input() {
        let mut f = fixture();
        f.events.connect(f.surface.clone());

        let event = SyntheticEvent::new("pointermove", EventRecord::at_offset(400.0, 300.0));
        f.emitter.emit("pointermove", &event);

        let queued = f.queue.borrow_mut().pop_front().unwrap();
        assert_eq!(queued.capability.key, "onPointerMove");
        assert_eq!(queued.pointer, Vec2::ZERO);
        assert_eq!(f.state.borrow().pointer, Vec2::ZERO);
    }

    #[test]
    fn handlers_use_the_connected_surface_size() {
        let mut f = fixture();
        f.events.connect(f.surface.clone());
        f.surface.apply_size(SurfaceSize::new(200, 100));

        let event = SyntheticEvent::new("pointermove", EventRecord::at_offset(100.0, 50.0));
        f.emitter.emit("pointermove", &event);

        assert_eq!(f.state.borrow().size, SurfaceSize::new(200, 100));
        assert_eq!(f.queue.borrow_mut().pop_front().unwrap().pointer, Vec2::ZERO);
    }

    #[test]
    fn reconnect_never_duplicates_handlers() {
        let mut f = fixture();
        f.events.connect(f.surface.clone());
        f.events.connect(f.surface.clone());

        for capability in DOM_EVENTS.iter() {
            assert_eq!(f.emitter.listener_count(capability.event_name), 1);
        }
        f.emitter.emit("click", &SyntheticEvent::signal("click"));
        assert_eq!(f.queue.borrow().len(), 1);
        // The stale connection was torn down once
        assert_eq!(f.disconnects.get(), 1);
    }

    #[test]
    fn disconnect_without_connection_is_silent() {
        let mut f = fixture();
        f.events.disconnect();
        assert_eq!(f.disconnects.get(), 0);
    }

    #[test]
    fn disconnect_unsubscribes_and_signals_once() {
        let mut f = fixture();
        f.events.connect(f.surface.clone());
        f.events.disconnect();
        f.events.disconnect();

        assert_eq!(f.disconnects.get(), 1);
        assert!(!f.events.is_connected());
        f.emitter.emit("pointermove", &SyntheticEvent::signal("pointermove"));
        assert!(f.queue.borrow().is_empty());
    }

    #[test]
    fn disabled_manager_ignores_input() {
        let mut f = fixture();
        f.events.connect(f.surface.clone());
        f.events.set_enabled(false);
        f.emitter.emit("wheel", &SyntheticEvent::signal("wheel"));
        assert!(f.queue.borrow().is_empty());
    }
}
