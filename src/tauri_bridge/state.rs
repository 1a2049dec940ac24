//! Desktop bridge state
//!
//! The Tauri process plays the UI thread: it owns the channel's main port,
//! the window event source and, once the webview reports its layout, the
//! host element and bridge controller.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bridge::{
    BridgeController, CanvasElement, Envelope, FrameView, MainPort, Options, SessionState,
    WindowEvents,
};

/// Host element and controller of the mounted view
pub struct MountedView {
    pub canvas: Arc<CanvasElement>,
    pub controller: BridgeController,
}

pub struct DesktopBridge {
    port: MainPort,
    window: Arc<WindowEvents>,
    view: Mutex<Option<MountedView>>,
}

impl DesktopBridge {
    pub fn new(port: MainPort) -> Self {
        Self {
            port,
            window: Arc::new(WindowEvents::new()),
            view: Mutex::new(None),
        }
    }

    pub fn window(&self) -> &WindowEvents {
        &self.window
    }

    pub fn view(&self) -> Result<MutexGuard<'_, Option<MountedView>>, String> {
        self.view.lock().map_err(|e| e.to_string())
    }

    /// Mount the view; a second mount resumes the existing session
    pub fn mount(
        &self,
        width: u32,
        height: u32,
        pixel_ratio: f32,
        options: Options,
    ) -> Result<SessionState, String> {
        let mut view = self.view()?;
        let mounted = view.get_or_insert_with(|| {
            let canvas = Arc::new(CanvasElement::new(width, height, pixel_ratio));
            let mut controller = BridgeController::new(canvas.clone(), self.window.clone(), options.clone());
            controller.on_events_disconnect(Box::new(|| {
                info!("[Tauri] Worker pointer events disconnected");
            }));
            MountedView { canvas, controller }
        });

        mounted.canvas.set_client_size(width, height);
        mounted.controller.mount(Some(self.port.clone()));
        mounted.controller.set_options(options);
        // Report a size that changed while unmounted
        self.window.dispatch_resize();

        Ok(mounted.controller.state())
    }

    pub fn unmount(&self) -> Result<SessionState, String> {
        let mut view = self.view()?;
        Ok(match view.as_mut() {
            Some(mounted) => {
                mounted.controller.unmount();
                mounted.controller.state()
            }
            None => SessionState::Uninitialized,
        })
    }

    /// Latest frames of the mounted view's surface
    pub fn frames(&self) -> Option<FrameView> {
        let view = self.view.lock().ok()?;
        view.as_ref().map(|mounted| mounted.canvas.frame_view())
    }
}

/// Session summary returned by `poll_bridge`
#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BridgeStatus {
    pub state: SessionState,
    pub hit_testing: bool,
    pub degraded: bool,
    /// Worker control messages drained by this poll
    pub messages: Vec<Envelope>,
}

/// Frame response containing Base64-encoded RGBA pixel data
#[derive(Serialize, Deserialize)]
pub struct FrameResponse {
    /// Base64-encoded RGBA pixel data (avoids slow JSON array serialization)
    pub data: String,
    pub width: u32,
    pub height: u32,
}
