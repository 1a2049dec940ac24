//! Bevy render engine
//!
//! Implements the worker's render engine seam with headless Bevy apps:
//! components, resources, systems and plugins for one offscreen scene.

pub mod app;
pub mod components;
pub mod plugins;
pub mod resources;
pub mod systems;

// Re-export commonly used items
pub use app::{default_content, BevyEngine, BevyRoot, ContentFn};
