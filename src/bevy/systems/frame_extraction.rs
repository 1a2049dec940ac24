//! Frame extraction system
//!
//! Takes the newest GPU readback from the render world, strips the row
//! padding, and presents it to the transferred surface.

use bevy::{prelude::*, render::renderer::RenderDevice};
use tracing::{debug, info};

use crate::bevy::resources::{FrameCount, MainWorldReceiver, PreRollFrames, SurfaceRes};
use crate::bridge::surface::Frame;

/// Log a line every this many presented frames
const LOG_EVERY: u32 = 600;

/// Present the latest rendered frame to the surface
pub fn extract_and_present_frame(
    receiver: Res<MainWorldReceiver>,
    surface: Res<SurfaceRes>,
    mut count: ResMut<FrameCount>,
    mut pre_roll: ResMut<PreRollFrames>,
) {
    // Wait for scene to be fully rendered
    if pre_roll.0 > 0 {
        while receiver.try_recv().is_ok() {}
        pre_roll.0 -= 1;
        if pre_roll.0 % 10 == 0 && pre_roll.0 > 0 {
            debug!("[Bevy] Pre-roll frames remaining: {}", pre_roll.0);
        }
        return;
    }

    let Some(captured) = receiver.try_iter().last() else {
        return;
    };

    let Some(rgba) = remove_row_padding(&captured.data, captured.width, captured.height) else {
        return;
    };

    surface.0.present(Frame {
        width: captured.width,
        height: captured.height,
        rgba,
    });
    count.0 += 1;

    if count.0 % LOG_EVERY == 1 {
        info!(
            "[Bevy] Frame {} | {}x{} | Size: {:.1}KB",
            count.0,
            captured.width,
            captured.height,
            captured.data.len() as f64 / 1024.0
        );
    }
}

/// Remove GPU buffer row padding alignment, returning pure RGBA data
///
/// Returns `None` when `data` is too short for the given size.
pub fn remove_row_padding(data: &[u8], width: u32, height: u32) -> Option<Vec<u8>> {
    let row_bytes = width as usize * 4;
    let aligned_row_bytes = RenderDevice::align_copy_bytes_per_row(row_bytes);
    let rows = height as usize;

    if data.len() < aligned_row_bytes * rows.saturating_sub(1) + row_bytes || rows == 0 {
        return None;
    }

    if row_bytes == aligned_row_bytes {
        return Some(data[..row_bytes * rows].to_vec());
    }

    Some(
        data.chunks(aligned_row_bytes)
            .take(rows)
            .flat_map(|row| &row[..row_bytes])
            .copied()
            .collect(),
    )
}
