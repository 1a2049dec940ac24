//! Configuration constants and settings for the offscreen render bridge
//!
//! This module contains all configurable parameters such as the default surface
//! size, frame pacing, pixel-ratio bounds and input tuning.

/// Width of the host surface before the UI reports a real layout size
pub const DEFAULT_WIDTH: u32 = 800;

/// Height of the host surface before the UI reports a real layout size
pub const DEFAULT_HEIGHT: u32 = 600;

/// Target frames per second for the worker render loop
pub const TARGET_FPS: f64 = 60.0;

/// Number of pre-roll frames to skip before presenting output
/// This allows the scene to fully load and stabilize
pub const PRE_ROLL_FRAMES: u32 = 30;

/// Seconds to wait for the renderer to finish initializing a new root
pub const PLUGIN_READY_TIMEOUT: u64 = 10;

/// Render scale (device pixel ratio) settings
pub mod scale {
    /// Lowest scale the render root accepts
    pub const MIN_SCALE: f32 = 1.0;

    /// Highest scale the render root accepts
    pub const MAX_SCALE: f32 = 2.0;

    /// Options key carrying a scale override in `props` messages
    pub const OVERRIDE_KEY: &str = "dpr";
}

/// Pointer event manager settings
pub mod events {
    /// Priority reported by the worker-side pointer event manager
    pub const MANAGER_PRIORITY: i32 = 1;

    /// Clip-space depth used when unprojecting the pointer into a picking ray
    pub const PICK_DEPTH: f32 = 0.5;
}

/// Camera control settings
pub mod camera {
    /// Rotation speed multiplier for pointer drag
    pub const ROTATION_SPEED: f32 = 0.005;

    /// Zoom speed multiplier for the wheel (per wheel delta pixel)
    pub const ZOOM_SPEED: f32 = 0.005;

    /// Minimum camera distance from center point
    pub const MIN_DISTANCE: f32 = 2.0;

    /// Maximum camera distance from center point
    pub const MAX_DISTANCE: f32 = 20.0;

    /// Maximum pitch angle (radians) to prevent camera flipping
    pub const MAX_PITCH: f32 = 1.5;

    /// Minimum pitch angle (radians) to prevent camera flipping
    pub const MIN_PITCH: f32 = -1.5;
}

/// Image compression settings
pub mod compression {
    /// JPEG quality level (0-100, higher = better quality but larger size)
    pub const JPEG_QUALITY: u8 = 85;
}
