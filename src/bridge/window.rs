//! Window-level resize notifications
//!
//! Listeners are owned by [`ResizeSubscription`] guards; dropping the guard
//! removes the listener, so a remounted bridge never leaves a stale one behind.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub type ResizeListener = Box<dyn Fn() + Send + Sync>;

/// Identifier of a registered window listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// A window that reports resizes
pub trait HostWindow: Send + Sync {
    fn add_resize_listener(&self, listener: ResizeListener) -> ListenerId;

    fn remove_resize_listener(&self, id: ListenerId);
}

/// In-process window event source
#[derive(Default)]
pub struct WindowEvents {
    next_id: AtomicU64,
    listeners: Mutex<BTreeMap<ListenerId, Arc<ResizeListener>>>,
}

impl WindowEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every registered resize listener
    pub fn dispatch_resize(&self) {
        // Snapshot first so listeners may (un)register while running
        let listeners: Vec<_> = match self.listeners.lock() {
            Ok(guard) => guard.values().cloned().collect(),
            Err(_) => return,
        };
        for listener in listeners {
            listener();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().map(|guard| guard.len()).unwrap_or(0)
    }
}

impl HostWindow for WindowEvents {
    fn add_resize_listener(&self, listener: ResizeListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        if let Ok(mut guard) = self.listeners.lock() {
            guard.insert(id, Arc::new(listener));
        }
        id
    }

    fn remove_resize_listener(&self, id: ListenerId) {
        if let Ok(mut guard) = self.listeners.lock() {
            guard.remove(&id);
        }
    }
}

/// Scoped registration of a resize listener
pub struct ResizeSubscription {
    window: Arc<dyn HostWindow>,
    id: ListenerId,
}

impl ResizeSubscription {
    pub fn register(window: Arc<dyn HostWindow>, listener: ResizeListener) -> Self {
        let id = window.add_resize_listener(listener);
        Self { window, id }
    }
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        self.window.remove_resize_listener(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn dropping_subscription_removes_listener() {
        let window = Arc::new(WindowEvents::new());
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        let sub = ResizeSubscription::register(
            window.clone(),
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        window.dispatch_resize();
        assert_eq!(window.listener_count(), 1);

        drop(sub);
        window.dispatch_resize();
        assert_eq!(window.listener_count(), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
