//! Camera control system
//!
//! Orbit camera controls driven by the pointer inputs the bridge forwards
//! from the UI thread.

use bevy::{math::Vec3, prelude::*};

use crate::bevy::components::CameraController;
use crate::bevy::resources::{OrbitCameraState, PointerInbox};
use crate::config::camera::*;

/// Update camera transform from forwarded pointer input
/// Implements orbit camera control:
/// - Primary button drag: rotate camera (yaw/pitch)
/// - Wheel: zoom (adjust distance)
pub fn update_camera_from_pointer(
    inbox: Res<PointerInbox>,
    mut orbit_state: ResMut<OrbitCameraState>,
    mut camera_query: Query<&mut Transform, With<CameraController>>,
) {
    if inbox.0.is_empty() && !orbit_state.is_added() {
        return;
    }

    for input in &inbox.0 {
        let record = &input.record;
        match input.capability.event_name {
            "pointermove" if record.primary_pressed() => {
                orbit_state.yaw -= record.movement_x * ROTATION_SPEED;
                orbit_state.pitch -= record.movement_y * ROTATION_SPEED;
                // Clamp pitch to prevent camera flipping
                orbit_state.pitch = orbit_state.pitch.clamp(MIN_PITCH, MAX_PITCH);
            }
            "wheel" => {
                orbit_state.distance += record.delta_y * ZOOM_SPEED;
                orbit_state.distance = orbit_state.distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
            }
            _ => {}
        }
    }

    for mut transform in camera_query.iter_mut() {
        *transform = orbit_transform(&orbit_state);
    }
}

/// Camera transform for an orbit state in spherical coordinates
pub fn orbit_transform(orbit: &OrbitCameraState) -> Transform {
    let x = orbit.distance * orbit.pitch.cos() * orbit.yaw.sin();
    let y = orbit.distance * orbit.pitch.sin();
    let z = orbit.distance * orbit.pitch.cos() * orbit.yaw.cos();
    Transform::from_translation(orbit.center + Vec3::new(x, y, z)).looking_at(orbit.center, Vec3::Y)
}
