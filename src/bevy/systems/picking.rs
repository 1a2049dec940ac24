//! Pointer picking
//!
//! Hit-tests the picking rays of forwarded pointer inputs against
//! [`Pickable`] entities. The nearest hit becomes hovered; a click on a
//! hovered entity toggles its selection.

use bevy::{
    pbr::{MeshMaterial3d, StandardMaterial},
    prelude::*,
};

use crate::bevy::components::Pickable;
use crate::bevy::resources::{PickingState, PointerInbox};
use crate::worker::engine::Ray;

/// Nearest pickable hit by `ray`
pub fn nearest_hit<'a>(
    ray: &Ray,
    candidates: impl IntoIterator<Item = (Entity, &'a GlobalTransform, &'a Pickable)>,
) -> Option<Entity> {
    candidates
        .into_iter()
        .filter_map(|(entity, transform, pickable)| {
            let (scale, _, center) = transform.to_scale_rotation_translation();
            let half = pickable.half_extents * scale.abs().max_element();
            ray.intersect_aabb(center - half, center + half)
                .map(|distance| (entity, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(entity, _)| entity)
}

/// Update hover and selection from this frame's pointer inputs
pub fn pick_from_pointer(
    inbox: Res<PointerInbox>,
    mut picking: ResMut<PickingState>,
    pickables: Query<(Entity, &GlobalTransform, &Pickable)>,
) {
    for input in &inbox.0 {
        match input.capability.event_name {
            "pointerleave" | "pointercancel" | "lostpointercapture" => {
                if picking.hovered.is_some() {
                    picking.hovered = None;
                }
            }
            name => {
                let hit = nearest_hit(&input.ray, pickables.iter());
                if picking.hovered != hit {
                    picking.hovered = hit;
                }
                if name == "click" {
                    if let Some(entity) = hit {
                        if !picking.selected.remove(&entity) {
                            picking.selected.insert(entity);
                        }
                    }
                }
            }
        }
    }
}

/// Reflect hover in material color and selection in scale
pub fn highlight_picked(
    picking: Res<PickingState>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut pickables: Query<(
        Entity,
        &Pickable,
        &MeshMaterial3d<StandardMaterial>,
        &mut Transform,
    )>,
) {
    if !picking.is_changed() {
        return;
    }

    for (entity, pickable, material, mut transform) in pickables.iter_mut() {
        let color = if picking.hovered == Some(entity) {
            pickable.hover_color
        } else {
            pickable.base_color
        };
        if let Some(material) = materials.get_mut(&material.0) {
            material.base_color = color;
        }
        transform.scale = Vec3::splat(if picking.selected.contains(&entity) {
            1.25
        } else {
            1.0
        });
    }
}

/// Forwarded inputs are consumed once per frame
pub fn clear_pointer_inbox(mut inbox: ResMut<PointerInbox>) {
    inbox.0.clear();
}
