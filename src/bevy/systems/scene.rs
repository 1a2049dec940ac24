//! Scene setup systems
//!
//! `spawn_offscreen_camera` is always installed; the rest of the scene is
//! content that a root starts rendering once the bridge asks it to.

use bevy::{
    asset::Assets,
    core_pipeline::tonemapping::Tonemapping,
    math::{primitives::Cuboid, Quat, Vec3},
    pbr::{MeshMaterial3d, StandardMaterial},
    prelude::*,
};
use tracing::info;

use crate::bevy::components::{CameraController, OffscreenCamera, Pickable};

/// Spawn the orbit camera that renders into the transferred surface
///
/// The render target is attached by `apply_surface_config`.
pub fn spawn_offscreen_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Camera::default(),
        Tonemapping::None,
        Transform::from_xyz(0.0, 2.5, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
        OffscreenCamera,
        CameraController,
    ));
}

/// Default content: two pickable cubes and a light rig
pub fn spawn_default_content(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    info!("[Bevy] Setting up scene...");

    let cubes = [
        (1.5, Color::srgb(0.2, 0.4, 0.9), Vec3::ZERO),
        (0.6, Color::srgb(0.9, 0.2, 0.3), Vec3::new(2.2, 0.3, 0.0)),
    ];
    for (edge, color, position) in cubes {
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(edge, edge, edge))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: color,
                metallic: 0.6,
                perceptual_roughness: 0.3,
                ..default()
            })),
            Transform::from_translation(position),
            Pickable {
                half_extents: Vec3::splat(edge / 2.0),
                base_color: color,
                hover_color: Color::srgb(1.0, 0.6, 0.2),
            },
        ));
    }

    // Primary point light
    commands.spawn((
        PointLight {
            intensity: 2_000_000.0,
            shadows_enabled: true,
            color: Color::srgb(1.0, 0.95, 0.85),
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0),
    ));

    // Fill light (blue tint)
    commands.spawn((
        PointLight {
            intensity: 800_000.0,
            color: Color::srgb(0.4, 0.6, 1.0),
            ..default()
        },
        Transform::from_xyz(-3.0, 4.0, -2.0),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 3000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(bevy::math::EulerRot::XYZ, -0.6, 0.4, 0.0)),
    ));

    info!("[Bevy] Scene setup complete");
}
