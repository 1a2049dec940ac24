//! Bevy application setup
//!
//! [`BevyEngine`] builds one headless Bevy app per transferred surface. The
//! worker owns the app and ticks it itself through [`RenderRoot::frame`], so
//! no schedule runner is installed.

use std::time::{Duration, Instant};

use bevy::{
    app::{App, PluginsState},
    camera::Projection,
    prelude::*,
    tasks::tick_global_task_pools_on_main_thread,
    window::ExitCondition,
};
use tracing::info;

use crate::bevy::components::OffscreenCamera;
use crate::bevy::plugins::ImageCopyPlugin;
use crate::bevy::resources::*;
use crate::bevy::systems::*;
use crate::bridge::protocol::Options;
use crate::bridge::surface::SurfaceHandle;
use crate::config::{DEFAULT_HEIGHT, DEFAULT_WIDTH, PLUGIN_READY_TIMEOUT, PRE_ROLL_FRAMES};
use crate::error::EngineError;
use crate::worker::engine::{CameraState, PointerInput, RenderEngine, RenderRoot, RootConfig};

/// Adds the systems that make up a root's content payload
pub type ContentFn = fn(&mut App);

/// Content rendered when none is given: pickable cubes under a light rig
pub fn default_content(app: &mut App) {
    app.add_systems(Startup, spawn_default_content);
}

/// Render engine backed by headless Bevy apps
pub struct BevyEngine {
    content: ContentFn,
}

impl Default for BevyEngine {
    fn default() -> Self {
        Self::with_content(default_content)
    }
}

impl BevyEngine {
    pub fn with_content(content: ContentFn) -> Self {
        Self { content }
    }
}

impl RenderEngine for BevyEngine {
    type Root = BevyRoot;

    fn create_root(&mut self, surface: SurfaceHandle) -> Result<BevyRoot, EngineError> {
        let app = create_app(surface)?;
        Ok(BevyRoot {
            app,
            content: Some(self.content),
            rendering: false,
        })
    }
}

/// Create and configure the Bevy application for one surface
pub fn create_app(surface: SurfaceHandle) -> Result<App, EngineError> {
    let surface_id = surface.id();
    let mut app = App::new();

    // Use DefaultPlugins but configure for headless operation
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: None,
                exit_condition: ExitCondition::DontExit,
                ..default()
            })
            .set(ImagePlugin::default_nearest()),
    );
    app.add_plugins(ImageCopyPlugin);

    // Register systems
    app.add_systems(Startup, spawn_offscreen_camera);
    app.add_systems(
        Update,
        (
            apply_surface_config,
            apply_clear_color,
            update_camera_from_pointer,
            pick_from_pointer,
            highlight_picked,
        )
            .chain(),
    );
    app.add_systems(Last, (extract_and_present_frame, clear_pointer_inbox));

    // Insert resources
    app.insert_resource(SurfaceRes(surface));
    app.insert_resource(SurfaceConfig {
        width: DEFAULT_WIDTH,
        height: DEFAULT_HEIGHT,
        options: Options::new(),
    });
    app.insert_resource(PointerInbox::default());
    app.insert_resource(PickingState::default());
    app.insert_resource(OrbitCameraState::default());
    app.insert_resource(FrameCount::default());
    app.insert_resource(PreRollFrames(PRE_ROLL_FRAMES));

    // Renderer initialization completes asynchronously
    let deadline = Instant::now() + Duration::from_secs(PLUGIN_READY_TIMEOUT);
    while app.plugins_state() == PluginsState::Adding {
        if Instant::now() >= deadline {
            return Err(EngineError::Construction(
                "render plugins did not become ready".into(),
            ));
        }
        tick_global_task_pools_on_main_thread();
        std::thread::yield_now();
    }
    app.finish();
    app.cleanup();

    info!("[Bevy] App configured for surface {}", surface_id.0);
    Ok(app)
}

/// One headless Bevy app rendering into one surface
pub struct BevyRoot {
    app: App,
    /// Taken when rendering starts
    content: Option<ContentFn>,
    rendering: bool,
}

impl BevyRoot {
    pub fn app(&self) -> &App {
        &self.app
    }
}

impl RenderRoot for BevyRoot {
    fn configure(&mut self, config: &RootConfig) {
        self.app
            .insert_resource(SurfaceConfig::from_root_config(config));
    }

    fn render(&mut self) {
        if let Some(content) = self.content.take() {
            content(&mut self.app);
        }
        self.rendering = true;
    }

    fn camera(&mut self) -> Option<CameraState> {
        let world = self.app.world_mut();
        let mut query = world.query_filtered::<
            (&Camera, &GlobalTransform, Option<&Projection>),
            With<OffscreenCamera>,
        >();
        let (camera, transform, projection) = query.iter(world).next()?;

        // Zero until the camera has been laid out against its target
        let clip_from_view = camera.clip_from_view();
        if clip_from_view.determinant() == 0.0 {
            return None;
        }

        Some(CameraState {
            world_from_view: Mat4::from(transform.affine()),
            clip_from_view,
            orthographic: matches!(projection, Some(Projection::Orthographic(_))),
        })
    }

    fn handle_pointer(&mut self, input: &PointerInput) {
        if let Some(mut inbox) = self.app.world_mut().get_resource_mut::<PointerInbox>() {
            inbox.0.push(input.clone());
        }
    }

    fn frame(&mut self) {
        if self.rendering {
            self.app.update();
        }
    }
}
