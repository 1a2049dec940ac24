//! Synthetic surface for the worker thread
//!
//! The render engine's event manager expects an interactive surface to
//! connect to. The worker has no native one, so this adapter implements only
//! the calls the event manager makes: listener registration (backed by the
//! synthetic emitter), pointer capture (no-ops) and a client size query.
//! Nothing on the worker asks whether a pointer is captured.

use std::cell::Cell;
use std::rc::Rc;

use super::emitter::{Emitter, Listener};
use super::engine::SurfaceSize;

/// The subset of an interactive surface the pointer event manager relies on
pub trait SurfaceTarget {
    fn add_event_listener(&self, event_name: &str, listener: Listener);

    fn remove_event_listener(&self, event_name: &str, listener: &Listener);

    fn set_pointer_capture(&self, pointer_id: i32);

    fn release_pointer_capture(&self, pointer_id: i32);

    /// Last configured size in CSS pixels
    fn client_size(&self) -> (u32, u32);
}

pub struct SyntheticSurface {
    emitter: Rc<Emitter>,
    size: Cell<(u32, u32)>,
}

impl SyntheticSurface {
    pub fn new(emitter: Rc<Emitter>) -> Self {
        Self {
            emitter,
            size: Cell::new((0, 0)),
        }
    }

    /// Record the configured size. Never touches styles: the real element
    /// lives on the UI thread.
    pub fn apply_size(&self, size: SurfaceSize) {
        self.size.set((size.width, size.height));
    }
}

impl SurfaceTarget for SyntheticSurface {
    fn add_event_listener(&self, event_name: &str, listener: Listener) {
        self.emitter.on(event_name, listener);
    }

    fn remove_event_listener(&self, event_name: &str, listener: &Listener) {
        self.emitter.off(event_name, listener);
    }

    // Capture is handled by the UI-side adapter
    fn set_pointer_capture(&self, _pointer_id: i32) {}

    fn release_pointer_capture(&self, _pointer_id: i32) {}

    fn client_size(&self) -> (u32, u32) {
        self.size.get()
    }
}
