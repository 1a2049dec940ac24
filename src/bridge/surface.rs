//! Drawing surfaces and their transferable handles
//!
//! The host element owns the presentation side of a surface. Calling
//! [`HostElement::transfer_control_to_offscreen`] hands the writable side to
//! the caller exactly once; afterwards the element only answers size queries
//! and exposes a read-only [`FrameView`] for presenting finished frames.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a surface handle, carried in `init` payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(pub u64);

impl SurfaceId {
    fn next() -> Self {
        SurfaceId(NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

// =============================================================================
// Frame Buffer
// =============================================================================

/// One finished RGBA8 frame (4 bytes per pixel, no row padding)
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Thread-safe frame slot shared between the surface writer and the presenter
#[derive(Clone, Default)]
pub struct SharedFrameBuffer(pub Arc<Mutex<Option<Frame>>>);

/// Read-only access to the latest frame of a transferred surface
#[derive(Clone, Default)]
pub struct FrameView(SharedFrameBuffer);

impl FrameView {
    /// Copy of the newest frame, if the worker has produced one
    pub fn latest(&self) -> Option<Frame> {
        self.0 .0.lock().ok().and_then(|guard| guard.clone())
    }

    /// Borrow the newest frame without copying the pixels
    pub fn with_latest<R>(&self, f: impl FnOnce(&Frame) -> R) -> Option<R> {
        let guard = self.0 .0.lock().ok()?;
        guard.as_ref().map(f)
    }
}

/// Exclusive, transferable handle to a drawing surface
///
/// Not `Clone`: whoever holds it is the only writer of the surface's frames.
#[derive(Debug)]
pub struct SurfaceHandle {
    id: SurfaceId,
    frames: SharedFrameBuffer,
}

impl std::fmt::Debug for SharedFrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedFrameBuffer").finish_non_exhaustive()
    }
}

impl SurfaceHandle {
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// Replace the presented frame
    pub fn present(&self, frame: Frame) {
        if let Ok(mut guard) = self.frames.0.lock() {
            *guard = Some(frame);
        }
    }
}

// =============================================================================
// Host Element
// =============================================================================

/// The UI-side element that owns a drawing surface
pub trait HostElement: Send + Sync {
    /// Content-box size in logical pixels
    fn client_size(&self) -> (u32, u32);

    fn device_pixel_ratio(&self) -> f32;

    /// Hand the surface to an offscreen writer; succeeds at most once
    fn transfer_control_to_offscreen(&self) -> Result<SurfaceHandle, BridgeError>;

    fn set_pointer_capture(&self, pointer_id: i32);

    fn release_pointer_capture(&self, pointer_id: i32);
}

/// In-process host element backed by a shared frame slot
pub struct CanvasElement {
    size: Mutex<(u32, u32)>,
    pixel_ratio: f32,
    transferable: bool,
    transferred: AtomicBool,
    frames: SharedFrameBuffer,
    captures: Mutex<HashSet<i32>>,
}

impl CanvasElement {
    pub fn new(width: u32, height: u32, pixel_ratio: f32) -> Self {
        Self {
            size: Mutex::new((width, height)),
            pixel_ratio,
            transferable: true,
            transferred: AtomicBool::new(false),
            frames: SharedFrameBuffer::default(),
            captures: Mutex::new(HashSet::new()),
        }
    }

    /// An element whose host cannot transfer surfaces
    pub fn without_transfer(width: u32, height: u32, pixel_ratio: f32) -> Self {
        Self {
            transferable: false,
            ..Self::new(width, height, pixel_ratio)
        }
    }

    /// Layout changed; the next resize notification reports this size
    pub fn set_client_size(&self, width: u32, height: u32) {
        if let Ok(mut guard) = self.size.lock() {
            *guard = (width, height);
        }
    }

    pub fn frame_view(&self) -> FrameView {
        FrameView(self.frames.clone())
    }

    pub fn is_transferred(&self) -> bool {
        self.transferred.load(Ordering::Acquire)
    }

    pub fn has_pointer_capture(&self, pointer_id: i32) -> bool {
        self.captures
            .lock()
            .map(|set| set.contains(&pointer_id))
            .unwrap_or(false)
    }
}

impl HostElement for CanvasElement {
    fn client_size(&self) -> (u32, u32) {
        self.size.lock().map(|guard| *guard).unwrap_or((0, 0))
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    fn transfer_control_to_offscreen(&self) -> Result<SurfaceHandle, BridgeError> {
        if !self.transferable {
            return Err(BridgeError::Unsupported);
        }
        if self.transferred.swap(true, Ordering::AcqRel) {
            return Err(BridgeError::AlreadyTransferred);
        }
        Ok(SurfaceHandle {
            id: SurfaceId::next(),
            frames: self.frames.clone(),
        })
    }

    fn set_pointer_capture(&self, pointer_id: i32) {
        if let Ok(mut set) = self.captures.lock() {
            set.insert(pointer_id);
        }
    }

    fn release_pointer_capture(&self, pointer_id: i32) {
        if let Ok(mut set) = self.captures.lock() {
            set.remove(&pointer_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_happens_once() {
        let canvas = CanvasElement::new(10, 10, 1.0);
        let first = canvas.transfer_control_to_offscreen();
        assert!(first.is_ok());
        assert!(canvas.is_transferred());
        assert!(matches!(
            canvas.transfer_control_to_offscreen(),
            Err(BridgeError::AlreadyTransferred)
        ));
    }

    #[test]
    fn unsupported_host_never_transfers() {
        let canvas = CanvasElement::without_transfer(10, 10, 1.0);
        assert!(matches!(
            canvas.transfer_control_to_offscreen(),
            Err(BridgeError::Unsupported)
        ));
        assert!(!canvas.is_transferred());
    }

    #[test]
    fn frames_written_by_handle_are_visible_to_view() {
        let canvas = CanvasElement::new(2, 1, 1.0);
        let view = canvas.frame_view();
        assert!(view.latest().is_none());

        let handle = canvas.transfer_control_to_offscreen().unwrap();
        handle.present(Frame {
            width: 2,
            height: 1,
            rgba: vec![0; 8],
        });
        assert_eq!(view.with_latest(|f| (f.width, f.rgba.len())), Some((2, 8)));
    }

    #[test]
    fn size_is_still_queryable_after_transfer() {
        let canvas = CanvasElement::new(640, 480, 2.0);
        let _handle = canvas.transfer_control_to_offscreen().unwrap();
        canvas.set_client_size(320, 240);
        assert_eq!(canvas.client_size(), (320, 240));
    }

    #[test]
    fn pointer_capture_is_tracked() {
        let canvas = CanvasElement::new(1, 1, 1.0);
        canvas.set_pointer_capture(4);
        assert!(canvas.has_pointer_capture(4));
        canvas.release_pointer_capture(4);
        assert!(!canvas.has_pointer_capture(4));
    }
}
