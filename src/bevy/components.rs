//! Bevy component definitions
//!
//! This module contains all component markers and data structures used
//! to tag and identify entities in the Bevy ECS (Entity Component System).

use bevy::prelude::*;

/// Marker component for the offscreen rendering camera
///
/// Entities with this component render into the transferred surface and are
/// the origin of picking rays.
#[derive(Component)]
pub struct OffscreenCamera;

/// Marker component for cameras that can be controlled by user input
///
/// Entities with this component respond to forwarded pointer drags and
/// wheel input for orbit camera control (rotation, zoom).
#[derive(Component)]
pub struct CameraController;

/// Entity that can be hit by picking rays
///
/// Hit-testing uses an axis-aligned box of `half_extents` (scaled by the
/// entity's largest scale component) around its global translation.
#[derive(Component, Clone, Copy)]
pub struct Pickable {
    pub half_extents: Vec3,
    pub base_color: Color,
    pub hover_color: Color,
}
