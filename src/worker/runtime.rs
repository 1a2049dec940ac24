//! Worker thread runtime
//!
//! Runs a [`RenderHost`] on its own thread: messages are handled one at a
//! time as they arrive, and the render root is ticked once per frame
//! interval in between. The loop ends when the UI side drops its port.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::info;

use super::engine::RenderEngine;
use super::host::RenderHost;
use crate::bridge::channel::WorkerPort;
use crate::config::TARGET_FPS;

/// Frame interval for the configured target frame rate
pub fn frame_interval() -> Duration {
    Duration::from_secs_f64(1.0 / TARGET_FPS)
}

/// Drive `host` from `port` until the channel closes
pub fn run<E: RenderEngine>(host: &mut RenderHost<E>, port: &WorkerPort, interval: Duration) {
    let mut next_frame = Instant::now() + interval;
    loop {
        let timeout = next_frame.saturating_duration_since(Instant::now());
        match port.recv_timeout(timeout) {
            Ok(Some(packet)) => host.handle(packet),
            Ok(None) => {}
            Err(_) => {
                info!("[Worker] Channel closed, stopping render loop");
                break;
            }
        }

        let now = Instant::now();
        if now >= next_frame {
            host.frame();
            next_frame = now + interval;
        }
    }
}

/// Start a render worker thread
///
/// The engine is built on the worker thread itself, so engines holding
/// thread-bound state never cross threads.
pub fn spawn_worker<E, F>(port: WorkerPort, make_engine: F) -> std::io::Result<JoinHandle<()>>
where
    E: RenderEngine,
    F: FnOnce() -> E + Send + 'static,
{
    thread::Builder::new()
        .name("render-worker".into())
        .spawn(move || {
            info!("[Worker] Thread started");
            let mut host = RenderHost::new(make_engine(), port.outbox());
            run(&mut host, &port, frame_interval());
        })
}
