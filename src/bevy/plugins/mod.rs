//! Bevy plugins
//!
//! Custom plugins the offscreen engine installs on top of the headless
//! default plugin set.

pub mod image_copy;

pub use image_copy::ImageCopyPlugin;
