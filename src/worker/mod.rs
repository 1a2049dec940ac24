//! Worker half of the offscreen render bridge
//!
//! Everything here runs on the render worker thread and is single-threaded:
//! shared state uses `Rc`/`RefCell`, and each message is handled to
//! completion before the next one is received.

pub mod emitter;
pub mod engine;
pub mod events;
pub mod host;
pub mod runtime;
pub mod shim;

// Re-export commonly used items
pub use engine::{CameraState, PointerInput, Ray, RenderEngine, RenderRoot, RootConfig, SurfaceSize};
pub use host::{HostState, RenderHost};
pub use runtime::spawn_worker;
