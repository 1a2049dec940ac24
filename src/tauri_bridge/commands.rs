//! Tauri command handlers
//!
//! This module contains all the Tauri command functions that can be invoked
//! from the frontend JavaScript code. Together they make the webview the
//! host element: it reports layout, forwards native input and presents
//! frames.

use base64::{engine::general_purpose::STANDARD, Engine};
use tauri::State;

use super::state::{BridgeStatus, DesktopBridge, FrameResponse};
use crate::bridge::{Capability, Dispatch, NativeEvent, Options, SessionState, DOM_EVENTS};

/// The forwarded event vocabulary, so the frontend attaches matching listeners
#[tauri::command]
pub fn capabilities() -> Vec<Capability> {
    DOM_EVENTS.to_vec()
}

/// Mount the render view at its current layout size
#[tauri::command]
pub fn mount_view(
    state: State<DesktopBridge>,
    width: u32,
    height: u32,
    pixel_ratio: f32,
    options: Option<Options>,
) -> Result<SessionState, String> {
    state.mount(width, height, pixel_ratio, options.unwrap_or_default())
}

/// Release UI-side listeners; the worker keeps rendering
#[tauri::command]
pub fn unmount_view(state: State<DesktopBridge>) -> Result<SessionState, String> {
    state.unmount()
}

/// Forward one native input event from the render view
#[tauri::command]
pub fn dispatch_dom_event(
    state: State<DesktopBridge>,
    mut event: NativeEvent,
) -> Result<Dispatch, String> {
    let mut view = state.view()?;
    Ok(match view.as_mut() {
        Some(mounted) => mounted.controller.handle_event(&mut event),
        None => Dispatch::default(),
    })
}

/// The render view's layout changed
#[tauri::command]
pub fn resize_surface(state: State<DesktopBridge>, width: u32, height: u32) -> Result<(), String> {
    {
        let view = state.view()?;
        let Some(mounted) = view.as_ref() else {
            return Ok(());
        };
        mounted.canvas.set_client_size(width, height);
    }
    // Listeners send through the controller's port, not the view lock
    state.window().dispatch_resize();
    Ok(())
}

/// Replace the scene options
#[tauri::command]
pub fn set_scene_options(state: State<DesktopBridge>, options: Options) -> Result<(), String> {
    let mut view = state.view()?;
    if let Some(mounted) = view.as_mut() {
        mounted.controller.set_options(options);
    }
    Ok(())
}

/// Drain worker control messages and report the session state
#[tauri::command]
pub fn poll_bridge(state: State<DesktopBridge>) -> Result<BridgeStatus, String> {
    let mut view = state.view()?;
    let Some(mounted) = view.as_mut() else {
        return Ok(BridgeStatus {
            state: SessionState::Uninitialized,
            hit_testing: false,
            degraded: false,
            messages: Vec::new(),
        });
    };

    let messages = mounted
        .controller
        .poll()
        .iter()
        .filter_map(|message| message.to_envelope().ok())
        .collect();

    Ok(BridgeStatus {
        state: mounted.controller.state(),
        hit_testing: mounted.controller.hit_testing(),
        degraded: mounted.controller.is_degraded(),
        messages,
    })
}

/// Get the current rendered frame as Base64-encoded RGBA data
#[tauri::command]
pub fn get_frame(state: State<DesktopBridge>) -> Result<FrameResponse, String> {
    let frames = state.frames().ok_or("View not mounted")?;
    frames
        .with_latest(|frame| FrameResponse {
            data: STANDARD.encode(&frame.rgba),
            width: frame.width,
            height: frame.height,
        })
        .ok_or_else(|| "No frame yet (scene still loading)".into())
}
