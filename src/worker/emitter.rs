//! Synthetic event emitter
//!
//! A small name-keyed listener table living on the worker thread. Input
//! records arriving over the channel are re-emitted here, and the synthetic
//! surface's `add_event_listener`/`remove_event_listener` are backed by it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::bridge::event_record::EventRecord;

/// Signal emitted when the pointer event manager disconnects
pub const DISCONNECT: &str = "disconnect";

/// Event delivered to worker-side listeners
///
/// Wraps a forwarded record. `prevent_default` and `stop_propagation` exist so
/// engine code can call them unconditionally; the real default action was
/// already decided on the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticEvent {
    pub event_name: String,
    pub record: EventRecord,
}

impl SyntheticEvent {
    pub fn new(event_name: impl Into<String>, record: EventRecord) -> Self {
        Self {
            event_name: event_name.into(),
            record,
        }
    }

    /// A payload-less control signal
    pub fn signal(event_name: &str) -> Self {
        Self::new(event_name, EventRecord::default())
    }

    pub fn prevent_default(&self) {}

    pub fn stop_propagation(&self) {}
}

pub type Listener = Rc<dyn Fn(&SyntheticEvent)>;

#[derive(Default)]
pub struct Emitter {
    listeners: RefCell<HashMap<String, Vec<Listener>>>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, event_name: &str, listener: Listener) {
        self.listeners
            .borrow_mut()
            .entry(event_name.to_string())
            .or_default()
            .push(listener);
    }

    /// Remove one registration of `listener` (matched by identity)
    pub fn off(&self, event_name: &str, listener: &Listener) {
        let mut listeners = self.listeners.borrow_mut();
        if let Some(list) = listeners.get_mut(event_name) {
            if let Some(pos) = list.iter().position(|l| Rc::ptr_eq(l, listener)) {
                list.remove(pos);
            }
            if list.is_empty() {
                listeners.remove(event_name);
            }
        }
    }

    pub fn emit(&self, event_name: &str, event: &SyntheticEvent) {
        // Listeners may subscribe or unsubscribe while running
        let snapshot = match self.listeners.borrow().get(event_name) {
            Some(list) => list.clone(),
            None => return,
        };
        for listener in snapshot {
            listener(event);
        }
    }

    pub fn listener_count(&self, event_name: &str) -> usize {
        self.listeners
            .borrow()
            .get(event_name)
            .map_or(0, |list| list.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counting(hits: &Rc<Cell<u32>>) -> Listener {
        let hits = hits.clone();
        Rc::new(move |_: &SyntheticEvent| hits.set(hits.get() + 1))
    }

    #[test]
    fn emit_reaches_only_matching_listeners() {
        let emitter = Emitter::new();
        let moves = Rc::new(Cell::new(0));
        let clicks = Rc::new(Cell::new(0));
        emitter.on("pointermove", counting(&moves));
        emitter.on("click", counting(&clicks));

        emitter.emit("pointermove", &SyntheticEvent::signal("pointermove"));
        assert_eq!((moves.get(), clicks.get()), (1, 0));
    }

    #[test]
    fn off_removes_by_identity() {
        let emitter = Emitter::new();
        let hits = Rc::new(Cell::new(0));
        let first = counting(&hits);
        let second = counting(&hits);
        emitter.on("wheel", first.clone());
        emitter.on("wheel", second);

        emitter.off("wheel", &first);
        assert_eq!(emitter.listener_count("wheel"), 1);
        emitter.emit("wheel", &SyntheticEvent::signal("wheel"));
        assert_eq!(hits.get(), 1);

        // Removing something never registered is harmless
        emitter.off("wheel", &first);
        emitter.off("click", &first);
        assert_eq!(emitter.listener_count("wheel"), 1);
    }

    #[test]
    fn listener_may_unsubscribe_itself() {
        let emitter = Rc::new(Emitter::new());
        let hits = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Listener>>> = Rc::new(RefCell::new(None));

        let listener: Listener = {
            let emitter = emitter.clone();
            let hits = hits.clone();
            let slot = slot.clone();
            Rc::new(move |_: &SyntheticEvent| {
                hits.set(hits.get() + 1);
                if let Some(me) = slot.borrow().as_ref() {
                    emitter.off("click", me);
                }
            })
        };
        *slot.borrow_mut() = Some(listener.clone());
        emitter.on("click", listener);

        emitter.emit("click", &SyntheticEvent::signal("click"));
        emitter.emit("click", &SyntheticEvent::signal("click"));
        assert_eq!(hits.get(), 1);

        // Break the reference cycle
        slot.borrow_mut().take();
    }
}
