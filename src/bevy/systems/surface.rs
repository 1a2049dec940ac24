//! Render target management
//!
//! Keeps the offscreen render target in step with the configuration the
//! bridge applies. Every size change replaces the target texture and its
//! image copier, then points the offscreen camera at the new target.

use bevy::{
    asset::Assets,
    camera::RenderTarget,
    image::Image,
    prelude::*,
    render::{
        render_resource::{Extent3d, TextureFormat, TextureUsages},
        renderer::RenderDevice,
    },
};
use tracing::debug;

use crate::bevy::components::OffscreenCamera;
use crate::bevy::plugins::image_copy::ImageCopier;
use crate::bevy::resources::{RenderTargetHandle, SurfaceConfig};

/// Recreate the render target when the configured physical size changes
pub fn apply_surface_config(
    mut commands: Commands,
    config: Res<SurfaceConfig>,
    mut images: ResMut<Assets<Image>>,
    render_device: Res<RenderDevice>,
    current: Option<Res<RenderTargetHandle>>,
    copiers: Query<Entity, With<ImageCopier>>,
    new_cameras: Query<(), Added<OffscreenCamera>>,
    mut cameras: Query<&mut Camera, With<OffscreenCamera>>,
) {
    let size = Extent3d {
        width: config.width.max(1),
        height: config.height.max(1),
        depth_or_array_layers: 1,
    };

    let unchanged = current
        .as_ref()
        .and_then(|target| images.get(&target.0))
        .is_some_and(|image| image.width() == size.width && image.height() == size.height);
    if unchanged && new_cameras.is_empty() {
        return;
    }

    debug!("[Bevy] Render target {}x{}", size.width, size.height);

    if let Some(old) = current {
        images.remove(&old.0);
    }
    for entity in copiers.iter() {
        commands.entity(entity).despawn();
    }

    let mut render_target_image =
        Image::new_target_texture(size.width, size.height, TextureFormat::bevy_default());
    render_target_image.texture_descriptor.usage |= TextureUsages::COPY_SRC;
    let handle = images.add(render_target_image);

    commands.spawn(ImageCopier::new(handle.clone(), size, &render_device));
    commands.insert_resource(RenderTargetHandle(handle.clone()));

    for mut camera in cameras.iter_mut() {
        camera.target = RenderTarget::Image(handle.clone().into());
    }
}

/// Apply the `clearColor` option, an `[r, g, b]` triple in 0..1
pub fn apply_clear_color(config: Res<SurfaceConfig>, mut clear: ResMut<ClearColor>) {
    if !config.is_changed() {
        return;
    }
    let Some(rgb) = config.options.get("clearColor").and_then(|v| v.as_array()) else {
        return;
    };
    let channel = |i: usize| rgb.get(i).and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
    clear.0 = Color::srgb(channel(0), channel(1), channel(2));
}
