//! Offscreen render bridge
//!
//! Drives a 3D render loop on a dedicated worker thread from a UI thread.
//! The UI side hands its drawing surface over once, forwards pointer and
//! wheel input as serializable records, and mirrors scene options; the
//! worker side rebuilds those inputs for the render engine and draws into
//! the transferred surface.
//!
//! Architecture:
//! - UI thread: bridge controller + event adapter posting JSON envelopes
//! - Worker thread: render host re-emitting input through a synthetic surface
//! - Bevy runs headless on the worker, ticked once per frame interval
//! - GPU texture -> Buffer -> CPU channel -> transferred surface -> presenter
//!
//! # Module Structure
//!
//! - `config`: Configuration constants and settings
//! - `error`: Bridge and engine error types
//! - `bridge`: UI-thread half and the shared wire vocabulary
//! - `worker`: Worker-thread render host, event manager and runtime loop
//! - `bevy`: Bevy implementation of the render engine
//! - `tauri_bridge` (feature `desktop`): Tauri shell hosting the UI thread

pub mod bevy;
pub mod bridge;
pub mod config;
pub mod error;
pub mod worker;

#[cfg(feature = "desktop")]
mod tauri_bridge;

/// Main entry point for the desktop application
#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use tauri::Manager;
    use tracing::{error, info};
    use tracing_subscriber::EnvFilter;

    use tauri_bridge::DesktopBridge;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,wgpu=warn,naga=warn")),
        )
        .init();

    info!("[Tauri] Starting...");

    let (main_port, worker_port) = bridge::channel();
    if let Err(e) = worker::spawn_worker(worker_port, crate::bevy::BevyEngine::default) {
        error!("[Tauri] Failed to start render worker: {}", e);
    }

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .manage(DesktopBridge::new(main_port))
        // Register custom protocol "frame://" for direct binary transfer
        .register_asynchronous_uri_scheme_protocol("frame", |ctx, request, responder| {
            let frames = ctx.app_handle().state::<DesktopBridge>().frames();

            // Encode off the protocol thread
            std::thread::spawn(move || {
                let response = tauri_bridge::protocol::handle_frame_protocol(
                    request.uri().path(),
                    frames.as_ref(),
                );
                responder.respond(response);
            });
        })
        .invoke_handler(tauri::generate_handler![
            tauri_bridge::commands::capabilities,
            tauri_bridge::commands::mount_view,
            tauri_bridge::commands::unmount_view,
            tauri_bridge::commands::dispatch_dom_event,
            tauri_bridge::commands::resize_surface,
            tauri_bridge::commands::set_scene_options,
            tauri_bridge::commands::poll_bridge,
            tauri_bridge::commands::get_frame,
        ])
        .run(tauri::generate_context!())
        .expect("Tauri error");
}
