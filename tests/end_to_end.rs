//! UI thread and render worker wired together over a real channel
//!
//! The engine is a recording fake so these run without a GPU.

use std::sync::{Arc, Mutex};
use std::thread::sleep;
use std::time::{Duration, Instant};

use bevy::math::{Mat4, Vec3};

use offscreen_bridge_lib::bridge::protocol::kind;
use offscreen_bridge_lib::bridge::{
    channel, BridgeController, CanvasElement, CaptureChange, EventRecord, Frame,
    MainPort, NativeEvent, Options, SessionState, SurfaceHandle, ToMain, WindowEvents,
};
use offscreen_bridge_lib::error::EngineError;
use offscreen_bridge_lib::worker::{
    spawn_worker, CameraState, PointerInput, RenderEngine, RenderRoot, RootConfig,
};
use serde_json::json;

#[derive(Default)]
struct Log {
    configs: Vec<RootConfig>,
    pointers: Vec<(String, PointerInput)>,
}

type SharedLog = Arc<Mutex<Log>>;

struct RecordingEngine {
    log: SharedLog,
}

struct RecordingRoot {
    log: SharedLog,
    surface: SurfaceHandle,
    physical: (u32, u32),
}

impl RenderEngine for RecordingEngine {
    type Root = RecordingRoot;

    fn create_root(&mut self, surface: SurfaceHandle) -> Result<RecordingRoot, EngineError> {
        Ok(RecordingRoot {
            log: self.log.clone(),
            surface,
            physical: (1, 1),
        })
    }
}

impl RenderRoot for RecordingRoot {
    fn configure(&mut self, config: &RootConfig) {
        self.physical = config.physical_size();
        self.log.lock().unwrap().configs.push(config.clone());
    }

    fn render(&mut self) {}

    fn camera(&mut self) -> Option<CameraState> {
        Some(CameraState {
            world_from_view: Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0)),
            ..CameraState::default()
        })
    }

    fn handle_pointer(&mut self, input: &PointerInput) {
        self.log
            .lock()
            .unwrap()
            .pointers
            .push((input.capability.event_name.to_string(), input.clone()));
    }

    fn frame(&mut self) {
        let (width, height) = self.physical;
        self.surface.present(Frame {
            width,
            height,
            rgba: vec![255; (width * height * 4) as usize],
        });
    }
}

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        sleep(Duration::from_millis(5));
    }
    false
}

struct Rig {
    controller: BridgeController,
    port: MainPort,
    canvas: Arc<CanvasElement>,
    window: Arc<WindowEvents>,
    log: SharedLog,
    worker: std::thread::JoinHandle<()>,
}

fn start(options: Options) -> Rig {
    let (main, worker_port) = channel();
    let log = SharedLog::default();
    let engine_log = log.clone();
    let worker = spawn_worker(worker_port, move || RecordingEngine { log: engine_log }).unwrap();

    let canvas = Arc::new(CanvasElement::new(400, 200, 3.0));
    let window = Arc::new(WindowEvents::new());
    let mut controller = BridgeController::new(canvas.clone(), window.clone(), options);
    controller.mount(Some(main.clone()));

    Rig {
        controller,
        port: main,
        canvas,
        window,
        log,
        worker,
    }
}

fn await_ready(rig: &mut Rig) -> Vec<ToMain> {
    let mut seen = Vec::new();
    assert!(wait_until(|| {
        seen.extend(rig.controller.poll());
        rig.controller.state() == SessionState::Active
    }));
    seen
}

#[test]
fn session_becomes_active_with_clamped_scale() {
    let mut options = Options::new();
    options.insert("shadows".into(), json!(true));
    let mut rig = start(options);
    assert_eq!(rig.controller.state(), SessionState::Initializing);
    assert!(rig.canvas.is_transferred());

    let seen = await_ready(&mut rig);
    assert!(matches!(seen.as_slice(), [ToMain::Ready(_)]));
    assert!(rig.controller.hit_testing());

    let log = rig.log.lock().unwrap();
    let first = &log.configs[0];
    assert_eq!((first.size.width, first.size.height), (400, 200));
    assert_eq!(first.dpr, 2.0);
    assert_eq!(first.options.get("shadows"), Some(&json!(true)));
}

#[test]
fn pointer_at_center_reaches_the_root_with_a_center_ray() {
    let mut rig = start(Options::new());
    await_ready(&mut rig);

    let mut event = NativeEvent::new("pointermove", EventRecord::at_offset(200.0, 100.0));
    let dispatch = rig.controller.handle_event(&mut event);
    assert!(dispatch.forwarded);
    assert!(!event.default_prevented);

    assert!(wait_until(|| !rig.log.lock().unwrap().pointers.is_empty()));
    let log = rig.log.lock().unwrap();
    let (name, input) = &log.pointers[0];
    assert_eq!(name, "pointermove");
    assert!(input.pointer.length() < 1e-5);
    assert!((input.ray.direction - Vec3::NEG_Z).length() < 1e-4);
}

#[test]
fn pointer_capture_follows_down_and_up() {
    let mut rig = start(Options::new());
    await_ready(&mut rig);

    let mut record = EventRecord::at_offset(10.0, 10.0);
    record.pointer_id = 3;
    let mut down = NativeEvent::new("pointerdown", record.clone());
    assert_eq!(
        rig.controller.handle_event(&mut down).capture,
        Some(CaptureChange::Acquire)
    );
    assert!(rig.canvas.has_pointer_capture(3));

    let mut up = NativeEvent::new("pointerup", record);
    rig.controller.handle_event(&mut up);
    assert!(!rig.canvas.has_pointer_capture(3));

    let mut click = NativeEvent::new("click", EventRecord::at_offset(10.0, 10.0));
    assert!(rig.controller.handle_event(&mut click).default_prevented);
}

#[test]
fn resize_and_props_reconfigure_the_root() {
    let mut rig = start(Options::new());
    await_ready(&mut rig);

    rig.canvas.set_client_size(800, 600);
    rig.window.dispatch_resize();
    assert!(wait_until(|| {
        let log = rig.log.lock().unwrap();
        log.configs
            .last()
            .is_some_and(|c| (c.size.width, c.size.height) == (800, 600) && c.dpr == 2.0)
    }));

    let mut options = Options::new();
    options.insert("dpr".into(), json!(1.5));
    options.insert("wireframe".into(), json!(false));
    rig.controller.set_options(options);
    assert!(wait_until(|| {
        let log = rig.log.lock().unwrap();
        log.configs.last().is_some_and(|c| {
            c.dpr == 1.5 && c.size.width == 800 && c.options.get("wireframe") == Some(&json!(false))
        })
    }));
}

#[test]
fn worker_frames_are_visible_through_the_element() {
    let mut rig = start(Options::new());
    await_ready(&mut rig);

    let view = rig.canvas.frame_view();
    assert!(wait_until(|| view.latest().is_some()));
    let (width, height) = view.with_latest(|f| (f.width, f.height)).unwrap();
    assert_eq!((width, height), (800, 400));
}

#[test]
fn remount_resumes_without_second_init() {
    let mut rig = start(Options::new());
    await_ready(&mut rig);
    let configs_before = rig.log.lock().unwrap().configs.len();

    rig.controller.unmount();
    assert_eq!(rig.controller.state(), SessionState::Disconnected);
    assert_eq!(rig.window.listener_count(), 0);

    rig.controller.mount(Some(rig.port.clone()));
    assert_eq!(rig.controller.state(), SessionState::Active);
    assert_eq!(rig.window.listener_count(), 1);

    // The resumed session only sees the resize, never a fresh init
    rig.canvas.set_client_size(300, 300);
    rig.window.dispatch_resize();
    assert!(wait_until(|| rig.log.lock().unwrap().configs.len() == configs_before + 1));
    let log = rig.log.lock().unwrap();
    let last = log.configs.last().unwrap();
    assert_eq!((last.size.width, last.size.height), (300, 300));
    assert!(rig.controller.poll().is_empty());
}

#[test]
fn dropping_the_controller_stops_the_worker() {
    let mut rig = start(Options::new());
    await_ready(&mut rig);

    drop(rig.controller);
    drop(rig.port);
    assert!(wait_until(|| rig.worker.is_finished()));
    rig.worker.join().unwrap();
}

#[test]
fn ready_is_the_only_control_message_after_init() {
    let mut rig = start(Options::new());
    let seen = await_ready(&mut rig);
    let kinds: Vec<_> = seen
        .iter()
        .map(|m| m.to_envelope().unwrap().kind)
        .collect();
    assert_eq!(kinds, [kind::READY]);
}
