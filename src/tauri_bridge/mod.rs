//! Desktop shell
//!
//! Makes a Tauri webview the UI-thread host of the bridge: command handlers
//! for layout and input, and a custom protocol presenting the worker's frames.

pub mod commands;
pub mod protocol;
pub mod state;

// Re-export commonly used types
pub use state::DesktopBridge;
