//! Bevy systems
//!
//! This module contains all the systems that operate on entities
//! and resources in the Bevy ECS.

pub mod camera;
pub mod frame_extraction;
pub mod picking;
pub mod scene;
pub mod surface;

pub use camera::update_camera_from_pointer;
pub use frame_extraction::extract_and_present_frame;
pub use picking::{clear_pointer_inbox, highlight_picked, pick_from_pointer};
pub use scene::{spawn_default_content, spawn_offscreen_camera};
pub use surface::{apply_clear_color, apply_surface_config};
