//! The playable intro: a moonlit corn field with a scripted flythrough.
//!
//! Initialization is staged instead of blocking. `init_scene` parks the camera at
//! the flythrough's first pose and suspends player input; `event_run` then waits
//! out the settle delay, starts the path and hands the camera back to the player
//! once the path is done.

use glam::Vec3;

use super::registry::ModelSpec;
use super::scene::{FrameContext, FrameControl, SceneBehavior, SceneSetup};
use crate::config::IntroConfig;
use crate::error::SceneError;
use crate::motion::{KeyframeMotion, MotionPath, Pose};
use crate::render::{Fog, LightDescriptor};

const FARMHOUSE: Vec3 = Vec3::new(-35.0, 40.0, 0.0);

/// First pose of the flythrough: high over the field's near corner.
pub const START_POSE: Pose = Pose {
    position: Vec3::new(-20.0, -30.0, 25.0),
    heading: -40.0,
    pitch: -25.0,
};

const FOG: Fog = Fog {
    color: Vec3::new(0.04, 0.05, 0.09),
    density: 0.012,
};

/// Where the intro's initialization has got to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum IntroStage {
    /// Built, `init_scene` has not run yet.
    Dormant,
    /// Camera parked, waiting for the tree to settle.
    Settling { ready_at: f64 },
    /// Flythrough running.
    Playing,
    /// Player has the camera.
    FreeLook,
}

pub struct IntroScene {
    config: IntroConfig,
    stage: IntroStage,
}

impl IntroScene {
    pub fn new(config: IntroConfig) -> Self {
        Self {
            config,
            stage: IntroStage::Dormant,
        }
    }

    pub fn stage(&self) -> IntroStage {
        self.stage
    }

    /// Build the field, the farmhouse and the night lighting.
    pub fn build(
        setup: &mut SceneSetup<'_>,
        config: &IntroConfig,
    ) -> Result<Box<dyn SceneBehavior>, SceneError> {
        let center = field_center(config);
        let extent = field_extent(config);

        let terrain = setup.add_model(
            ModelSpec::mesh("terrain.egg")
                .key("terrain")
                .at(Vec3::new(center.x, center.y, -0.1))
                .scale_xyz(Vec3::new(extent + 80.0, extent + 80.0, 1.0)),
        )?;
        setup.prepare(terrain);

        let farmhouse =
            setup.add_model(ModelSpec::mesh("farmhouse.egg").key("farmhouse").at(FARMHOUSE))?;
        setup.prepare(farmhouse);

        setup.add_model(
            ModelSpec::actor("corn.egg")
                .key("corn")
                .clip("sway", "corn-sway.egg"),
        )?;
        for x in 0..config.field_size {
            for y in 0..config.field_size {
                let position = Vec3::new(
                    x as f32 * config.field_spacing,
                    y as f32 * config.field_spacing,
                    0.0,
                );
                setup.add_model(ModelSpec::instance("corn").at(position))?;
            }
        }
        log::debug!(
            "corn field: {0}x{0} instances over {1:.0} units",
            config.field_size,
            extent
        );

        // Moon
        setup.add_light(
            LightDescriptor::spot(Vec3::new(center.x - 60.0, center.y - 80.0, 90.0))
                .temperature(8000.0)
                .ies("soft-spot")
                .shadows(2048)
                .radius(250.0)
                .energy(6.0)
                .fov(60.0)
                .look_at(center),
        );
        // Porch lamp
        setup.add_light(
            LightDescriptor::point(FARMHOUSE + Vec3::new(2.0, -4.0, 3.0))
                .temperature(2400.0)
                .shadows(512)
                .radius(12.0)
                .energy(3.0),
        );
        // Lantern at the field's edge
        setup.add_light(
            LightDescriptor::point(Vec3::new(center.x, -6.0, 1.5))
                .temperature(1900.0)
                .radius(8.0)
                .energy(1.5),
        );
        setup.fog(FOG);

        Ok(Box::new(IntroScene::new(config.clone())))
    }
}

impl SceneBehavior for IntroScene {
    fn init_scene(&mut self, ctx: &mut FrameContext<'_>) {
        match ctx.model("corn") {
            Some(corn) if ctx.tree.loop_clip(corn, "sway") => {}
            _ => log::warn!("corn has no `sway` clip, the field stays still"),
        }
        ctx.input.hide_cursor();

        ctx.motion.set_pose(START_POSE);
        ctx.controls.suspend();
        self.stage = IntroStage::Settling {
            ready_at: ctx.now + self.config.settle_seconds,
        };
        log::debug!("intro settling for {:.2}s", self.config.settle_seconds);
    }

    fn event_run(&mut self, ctx: &mut FrameContext<'_>) -> FrameControl {
        match self.stage {
            IntroStage::Settling { ready_at } if ctx.now >= ready_at => {
                match ctx.motion.start(
                    &self.config.motion_path,
                    self.config.motion_duration,
                    ctx.now,
                ) {
                    Ok(()) => self.stage = IntroStage::Playing,
                    Err(err) => {
                        log::warn!("skipping intro flythrough: {}", err);
                        ctx.motion.stop();
                        ctx.controls.resume();
                        self.stage = IntroStage::FreeLook;
                    }
                }
            }
            IntroStage::Playing if !ctx.motion.is_playing() => {
                ctx.controls.resume();
                self.stage = IntroStage::FreeLook;
                log::info!("intro flythrough done, player has the camera");
            }
            _ => {}
        }
        FrameControl::Continue
    }
}

fn field_extent(config: &IntroConfig) -> f32 {
    config.field_size.saturating_sub(1) as f32 * config.field_spacing
}

fn field_center(config: &IntroConfig) -> Vec3 {
    let half = field_extent(config) * 0.5;
    Vec3::new(half, half, 0.0)
}

/// The intro camera path: sweep over the field, then drop to eye height at its edge.
pub fn flythrough(config: &IntroConfig) -> MotionPath {
    let center = field_center(config);
    MotionPath::new()
        .key(0.0, START_POSE)
        .key(0.5, Pose::new(Vec3::new(center.x, -20.0, 12.0), 0.0, -15.0))
        .key(1.0, Pose::new(Vec3::new(center.x, -8.0, 2.0), 0.0, 0.0))
}

/// A motion controller with the intro path registered under its configured name.
pub fn intro_motion(config: &IntroConfig) -> KeyframeMotion {
    KeyframeMotion::new().with_path(config.motion_path.clone(), flythrough(config))
}
