//! Scene manager: owns the active scene, the camera and the frame dispatch.

use super::catalog::SceneCatalog;
use super::graph::RenderTree;
use super::scene::{
    FrameContext, FrameControl, PlayerControl, Scene, SceneId, SceneSetup, SwitchRequest,
};
use crate::assets::AssetLoader;
use crate::camera::Camera;
use crate::camera_controller::CameraController;
use crate::config::CameraConfig;
use crate::error::SceneError;
use crate::input::InputSource;
use crate::motion::MotionController;
use crate::render::RenderContext;

/// Drives one scene at a time.
///
/// The manager is responsible for:
/// - Building scenes through the [`SceneCatalog`] and rolling back failed builds
/// - Detaching the outgoing scene's subtree and retracting its lights and fog
/// - Firing `init_scene` on the second frame after a load
/// - Running the free-look controller for player-controlled scenes
/// - Handing the camera between the controller and the [`MotionController`]
///
/// Camera heading, pitch and focus live here rather than on a scene, so they
/// carry over when the active scene changes.
///
/// # Example
///
/// ```ignore
/// let mut manager = SceneManager::new(
///     scene::standard_catalog(&config),
///     RenderContext::new(Box::new(HeadlessPipeline::new())),
///     Box::new(loader),
///     Box::new(KeyframeMotion::new()),
///     config.camera.clone(),
/// );
/// manager.load_scene(SceneId::Intro)?;
///
/// // once per rendered frame
/// if manager.run_frame(now, &mut input) == FrameControl::Stop {
///     event_loop.exit();
/// }
/// ```
pub struct SceneManager {
    catalog: SceneCatalog,
    tree: RenderTree,
    render: RenderContext,
    assets: Box<dyn AssetLoader>,
    motion: Box<dyn MotionController>,
    scene: Option<Scene>,
    scene_frame: u32,
    controller: CameraController,
    camera: Camera,
    controls: PlayerControl,
    /// Switch requested during the current frame, applied after `event_run`.
    pending_switch: Option<SwitchRequest>,
    /// Whether the motion controller owned the camera last frame.
    motion_was_active: bool,
}

impl SceneManager {
    pub fn new(
        catalog: SceneCatalog,
        render: RenderContext,
        assets: Box<dyn AssetLoader>,
        motion: Box<dyn MotionController>,
        camera: CameraConfig,
    ) -> Self {
        Self {
            catalog,
            tree: RenderTree::new(),
            render,
            assets,
            motion,
            scene: None,
            scene_frame: 0,
            controller: CameraController::new(camera),
            camera: Camera::new(),
            controls: PlayerControl::default(),
            pending_switch: None,
            motion_was_active: false,
        }
    }

    /// Build `id` and make it the active scene.
    ///
    /// If the build fails, the partial subtree is removed and the previous scene
    /// stays active untouched. Nothing reaches the render pipeline until the
    /// build has succeeded.
    pub fn load_scene(&mut self, id: SceneId) -> Result<(), SceneError> {
        if !self.catalog.contains(id) {
            log::error!("no factory registered for scene `{}`", id);
            return Err(SceneError::UnknownScene(id));
        }
        log::debug!("building scene `{}`", id);
        let mut setup = SceneSetup::new(id, &mut self.tree, self.assets.as_mut());
        let behavior = match self.catalog.build(id, &mut setup) {
            Ok(behavior) => behavior,
            Err(err) => {
                let removed = setup.abort();
                log::error!(
                    "building scene `{}` failed, rolled back {} nodes: {}",
                    id,
                    removed,
                    err
                );
                return Err(err);
            }
        };
        let scene = setup.finish(behavior);
        self.install(scene);
        Ok(())
    }

    fn install(&mut self, scene: Scene) {
        if let Some(mut old) = self.scene.take() {
            self.render.retract();
            self.motion.stop();
            let removed = old.teardown(&mut self.tree);
            log::info!("left scene `{}` ({} nodes detached)", old.id, removed);
        }

        self.tree.set_active_root(scene.models.root());
        self.render.apply(&scene.effects);
        self.controls = PlayerControl::default();
        self.motion_was_active = false;
        self.pending_switch = None;
        self.scene_frame = 1;

        log::info!(
            "entered scene `{}` ({} models, {} nodes live)",
            scene.id,
            scene.models.len(),
            self.tree.node_count()
        );
        self.scene = Some(scene);
    }

    /// Per-frame entry point. `now` is the frame timestamp in seconds.
    ///
    /// Returns the active scene's continue/stop signal.
    pub fn run_frame(&mut self, now: f64, input: &mut dyn InputSource) -> FrameControl {
        let Some(scene) = self.scene.as_mut() else {
            return FrameControl::Continue;
        };
        self.scene_frame = self.scene_frame.saturating_add(1);

        if self.scene_frame == 2 {
            log::debug!("initializing scene `{}`", scene.id);
            let mut ctx = FrameContext {
                now,
                scene_frame: self.scene_frame,
                input: &mut *input,
                camera: &mut self.camera,
                motion: self.motion.as_mut(),
                controls: &mut self.controls,
                tree: &mut self.tree,
                models: &scene.models,
                switch: &mut self.pending_switch,
            };
            scene.behavior.init_scene(&mut ctx);
        }

        if self.motion.has_control() {
            self.motion.advance(now, &mut self.camera);
        }
        let motion_active = self.motion.has_control();
        if self.motion_was_active && !motion_active {
            log::debug!("motion released the camera, resuming free-look from its pose");
            self.controller.sync_from_camera(&self.camera);
        }
        self.motion_was_active = motion_active;

        if scene.player_controlled && !self.controls.is_suspended() && !motion_active {
            let outcome = self.controller.step(now, &mut *input, &mut self.camera);
            if outcome.switch_requested {
                self.pending_switch = Some(SwitchRequest::Next);
            }
        }

        let control = {
            let mut ctx = FrameContext {
                now,
                scene_frame: self.scene_frame,
                input: &mut *input,
                camera: &mut self.camera,
                motion: self.motion.as_mut(),
                controls: &mut self.controls,
                tree: &mut self.tree,
                models: &scene.models,
                switch: &mut self.pending_switch,
            };
            scene.behavior.event_run(&mut ctx)
        };

        if let Some(request) = self.pending_switch.take() {
            self.apply_switch(request);
        }
        control
    }

    fn apply_switch(&mut self, request: SwitchRequest) {
        let Some(current) = self.active_scene() else {
            return;
        };
        let target = match request {
            SwitchRequest::To(id) => id,
            SwitchRequest::Next => match self.catalog.next_after(current) {
                Some(id) => id,
                None => {
                    log::warn!("no scene follows `{}`, ignoring switch request", current);
                    return;
                }
            },
        };
        if let Err(err) = self.load_scene(target) {
            log::warn!("staying in `{}`: {}", current, err);
        }
    }

    /// Frames since the active scene was loaded. 1 right after [`load_scene`](Self::load_scene).
    pub fn scene_frame(&self) -> u32 {
        self.scene_frame
    }

    pub fn active_scene(&self) -> Option<SceneId> {
        self.scene.as_ref().map(|s| s.id)
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn controller(&self) -> &CameraController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut CameraController {
        &mut self.controller
    }

    pub fn controls(&self) -> PlayerControl {
        self.controls
    }

    pub fn motion(&self) -> &dyn MotionController {
        self.motion.as_ref()
    }

    pub fn tree(&self) -> &RenderTree {
        &self.tree
    }

    pub fn render(&self) -> &RenderContext {
        &self.render
    }

    pub fn catalog(&self) -> &SceneCatalog {
        &self.catalog
    }
}
