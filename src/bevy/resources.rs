//! Bevy resource definitions
//!
//! This module contains all global resources used by Bevy systems.
//! Resources are singleton data that can be accessed by any system.

use std::collections::HashSet;

use bevy::prelude::*;
use crossbeam_channel::{Receiver, Sender};

use crate::bridge::protocol::Options;
use crate::bridge::surface::SurfaceHandle;
use crate::worker::engine::{PointerInput, RootConfig};

// =============================================================================
// Surface
// =============================================================================

/// The transferred surface; frame extraction is its only writer
#[derive(Resource)]
pub struct SurfaceRes(pub SurfaceHandle);

/// Latest configuration applied by the bridge
#[derive(Resource)]
pub struct SurfaceConfig {
    /// Physical render target size (logical size times scale)
    pub width: u32,
    pub height: u32,
    pub options: Options,
}

impl SurfaceConfig {
    pub fn from_root_config(config: &RootConfig) -> Self {
        let (width, height) = config.physical_size();
        Self {
            width,
            height,
            options: config.options.clone(),
        }
    }
}

/// Handle to the offscreen render target texture
#[derive(Resource)]
pub struct RenderTargetHandle(pub Handle<Image>);

// =============================================================================
// Input
// =============================================================================

/// Pointer inputs forwarded by the host since the last frame
#[derive(Resource, Default)]
pub struct PointerInbox(pub Vec<PointerInput>);

/// Result of hit-testing forwarded pointer rays
#[derive(Resource, Default)]
pub struct PickingState {
    pub hovered: Option<Entity>,
    pub selected: HashSet<Entity>,
}

/// Orbit camera state for spherical coordinate camera control
#[derive(Resource)]
pub struct OrbitCameraState {
    /// Horizontal rotation angle (radians)
    pub yaw: f32,
    /// Vertical rotation angle (radians), clamped to avoid gimbal lock
    pub pitch: f32,
    /// Distance from the camera to the center point
    pub distance: f32,
    /// The point the camera orbits around
    pub center: Vec3,
}

impl Default for OrbitCameraState {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.4, // Slight downward angle
            distance: 6.5,
            center: Vec3::ZERO,
        }
    }
}

// =============================================================================
// Frame Management
// =============================================================================

/// Counter for total frames presented
#[derive(Resource, Default)]
pub struct FrameCount(pub u32);

/// Number of pre-roll frames to skip before presenting output
#[derive(Resource, Default)]
pub struct PreRollFrames(pub u32);

// =============================================================================
// Channel Communication (Main World <-> Render World)
// =============================================================================

/// Raw GPU readback of one frame, rows padded to the copy alignment
pub struct CapturedFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Receives data from render world
#[derive(Resource, Deref)]
pub struct MainWorldReceiver(pub Receiver<CapturedFrame>);

/// Sends data to main world
#[derive(Resource, Deref)]
pub struct RenderWorldSender(pub Sender<CapturedFrame>);
