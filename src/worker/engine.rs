//! Render engine seam
//!
//! The host drives any engine through [`RenderEngine`] and [`RenderRoot`].
//! This module also holds the engine-independent picking math: the pointer
//! in normalized device coordinates and the ray cast through it.

use bevy::math::{Mat4, Vec2, Vec3};

use crate::bridge::capabilities::Capability;
use crate::bridge::event_record::EventRecord;
use crate::bridge::protocol::Options;
use crate::bridge::surface::SurfaceHandle;
use crate::config::events::PICK_DEPTH;
use crate::config::scale::{MAX_SCALE, MIN_SCALE};
use crate::error::EngineError;

/// Logical surface size as handed to the render root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
    /// Worker surfaces have no style to update
    pub update_style: bool,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            update_style: false,
        }
    }
}

/// Complete configuration applied to a render root
#[derive(Debug, Clone, PartialEq)]
pub struct RootConfig {
    pub size: SurfaceSize,
    pub dpr: f32,
    pub options: Options,
}

impl RootConfig {
    /// Physical pixel size of the backing surface
    pub fn physical_size(&self) -> (u32, u32) {
        let scale = |v: u32| ((v as f32 * self.dpr).round() as u32).max(1);
        (scale(self.size.width), scale(self.size.height))
    }
}

/// Clamp a device pixel ratio into the supported render scale range
pub fn clamp_scale(pixel_ratio: f32) -> f32 {
    if pixel_ratio.is_nan() {
        return MIN_SCALE;
    }
    pixel_ratio.clamp(MIN_SCALE, MAX_SCALE)
}

// =============================================================================
// Camera & Picking
// =============================================================================

/// The active camera as needed for picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub world_from_view: Mat4,
    pub clip_from_view: Mat4,
    pub orthographic: bool,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            world_from_view: Mat4::IDENTITY,
            clip_from_view: Mat4::perspective_rh(75f32.to_radians(), 1.0, 0.1, 1000.0),
            orthographic: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Default for Ray {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            direction: Vec3::NEG_Z,
        }
    }
}

impl Ray {
    /// Cast a ray from `camera` through the point `ndc`
    pub fn from_camera(ndc: Vec2, camera: &CameraState) -> Self {
        let world_from_clip = camera.world_from_view * camera.clip_from_view.inverse();
        let through = world_from_clip.project_point3(ndc.extend(PICK_DEPTH));

        if camera.orthographic {
            let forward = camera.world_from_view.transform_vector3(Vec3::NEG_Z);
            return Self {
                origin: through,
                direction: forward.normalize_or_zero(),
            };
        }

        let origin = camera.world_from_view.transform_point3(Vec3::ZERO);
        Self {
            origin,
            direction: (through - origin).normalize_or_zero(),
        }
    }

    /// Distance along the ray to an axis-aligned box, if it is hit
    pub fn intersect_aabb(&self, min: Vec3, max: Vec3) -> Option<f32> {
        let inv = self.direction.recip();
        let t1 = (min - self.origin) * inv;
        let t2 = (max - self.origin) * inv;
        let near = t1.min(t2).max_element();
        let far = t1.max(t2).min_element();
        (far >= near.max(0.0)).then_some(near.max(0.0))
    }
}

/// Pointer and picking state shared by the event manager and the host
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InteractionState {
    pub size: SurfaceSize,
    /// Pointer in normalized device coordinates
    pub pointer: Vec2,
    pub ray: Ray,
    pub camera: CameraState,
}

/// A forwarded input after the event manager computed its picking ray
#[derive(Debug, Clone, PartialEq)]
pub struct PointerInput {
    pub capability: &'static Capability,
    pub pointer: Vec2,
    pub ray: Ray,
    pub record: EventRecord,
}

// =============================================================================
// Engine traits
// =============================================================================

/// Builds render roots bound to transferred surfaces
pub trait RenderEngine {
    type Root: RenderRoot;

    fn create_root(&mut self, surface: SurfaceHandle) -> Result<Self::Root, EngineError>;
}

/// One engine-owned scene bound to one surface
pub trait RenderRoot {
    /// Apply a complete configuration; called on init, resize and props
    fn configure(&mut self, config: &RootConfig);

    /// Start rendering the content payload
    fn render(&mut self);

    /// The camera picking rays are cast from, once the scene has one
    fn camera(&mut self) -> Option<CameraState>;

    fn handle_pointer(&mut self, input: &PointerInput);

    /// Advance one frame of the render loop
    fn frame(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn scale_is_clamped() {
        assert_eq!(clamp_scale(5.0), 2.0);
        assert_eq!(clamp_scale(0.0), 1.0);
        assert_eq!(clamp_scale(1.5), 1.5);
        assert_eq!(clamp_scale(f32::NAN), 1.0);
    }

    #[test]
    fn physical_size_uses_scale() {
        let config = RootConfig {
            size: SurfaceSize::new(300, 150),
            dpr: 2.0,
            options: Options::new(),
        };
        assert_eq!(config.physical_size(), (600, 300));
    }

    #[test]
    fn center_ray_looks_down_the_view_axis() {
        let camera = CameraState {
            world_from_view: Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0)),
            ..CameraState::default()
        };
        let ray = Ray::from_camera(Vec2::ZERO, &camera);
        assert!(close(ray.origin, Vec3::new(0.0, 0.0, 5.0)));
        assert!(close(ray.direction, Vec3::NEG_Z));
    }

    #[test]
    fn corner_ray_leans_up_and_left() {
        let ray = Ray::from_camera(Vec2::new(-1.0, 1.0), &CameraState::default());
        assert!(ray.direction.x < 0.0);
        assert!(ray.direction.y > 0.0);
        assert!(ray.direction.z < 0.0);
    }

    #[test]
    fn orthographic_rays_are_parallel() {
        let camera = CameraState {
            world_from_view: Mat4::IDENTITY,
            clip_from_view: Mat4::orthographic_rh(-2.0, 2.0, -1.0, 1.0, 0.1, 100.0),
            orthographic: true,
        };
        let a = Ray::from_camera(Vec2::new(-1.0, 0.0), &camera);
        let b = Ray::from_camera(Vec2::new(1.0, 0.0), &camera);
        assert!(close(a.direction, b.direction));
        assert!((a.origin.x + 2.0).abs() < 1e-4);
        assert!((b.origin.x - 2.0).abs() < 1e-4);
    }

    #[test]
    fn aabb_hit_and_miss() {
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::NEG_Z,
        };
        let hit = ray.intersect_aabb(Vec3::splat(-0.5), Vec3::splat(0.5));
        assert!((hit.unwrap() - 4.5).abs() < 1e-4);

        let off = Ray {
            origin: Vec3::new(3.0, 0.0, 5.0),
            direction: Vec3::NEG_Z,
        };
        assert!(off.intersect_aabb(Vec3::splat(-0.5), Vec3::splat(0.5)).is_none());
    }
}
