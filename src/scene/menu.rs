//! Title screen: a static backdrop, the title mesh and one warm key light.

use glam::Vec3;

use super::registry::ModelSpec;
use super::scene::{FrameContext, FrameControl, SceneBehavior, SceneSetup};
use crate::error::SceneError;
use crate::input::Button;
use crate::render::LightDescriptor;

const CAMERA_POSITION: Vec3 = Vec3::new(0.0, -12.0, 3.0);
const TITLE_POSITION: Vec3 = Vec3::new(0.0, 0.0, 3.5);

/// The menu. The camera is fixed; the switch button moves on to the next scene.
#[derive(Debug, Default)]
pub struct MenuScene;

impl MenuScene {
    pub fn build(setup: &mut SceneSetup<'_>) -> Result<Box<dyn SceneBehavior>, SceneError> {
        setup.player_controlled(false);

        let backdrop = setup.add_model(
            ModelSpec::mesh("backdrop.egg")
                .key("backdrop")
                .at(Vec3::new(0.0, 20.0, 0.0))
                .scale(20.0),
        )?;
        setup.prepare(backdrop);

        let title = setup.add_model(ModelSpec::mesh("title.egg").key("title").at(TITLE_POSITION))?;
        setup.prepare(title);

        setup.add_light(
            LightDescriptor::spot(Vec3::new(-6.0, -10.0, 9.0))
                .temperature(3200.0)
                .energy(6.0)
                .radius(40.0)
                .fov(45.0)
                .shadows(1024)
                .look_at(TITLE_POSITION),
        );

        Ok(Box::new(MenuScene))
    }
}

impl SceneBehavior for MenuScene {
    fn init_scene(&mut self, ctx: &mut FrameContext<'_>) {
        ctx.camera.position = CAMERA_POSITION;
        ctx.camera.look_at(TITLE_POSITION);
    }

    fn event_run(&mut self, ctx: &mut FrameContext<'_>) -> FrameControl {
        if ctx.input.button_pressed(Button::SwitchScene) {
            ctx.request_next_scene();
        }
        FrameControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::motion::KeyframeMotion;
    use crate::render::{HeadlessPipeline, RenderContext};
    use crate::scene::{SceneId, SceneManager, standard_catalog};
    use crate::testing::{ScriptedInput, bundled_assets};
    use glam::Vec2;

    fn menu_manager() -> (SceneManager, HeadlessPipeline) {
        let mut config = RuntimeConfig::default();
        config.intro.field_size = 2;
        let pipeline = HeadlessPipeline::new();
        let mut manager = SceneManager::new(
            standard_catalog(&config),
            RenderContext::new(Box::new(pipeline.clone())),
            Box::new(bundled_assets()),
            Box::new(KeyframeMotion::new()),
            config.camera.clone(),
        );
        manager.load_scene(SceneId::Menu).unwrap();
        (manager, pipeline)
    }

    #[test]
    fn menu_fixes_camera_and_ignores_pointer() {
        let (mut manager, pipeline) = menu_manager();
        let mut input = ScriptedInput::new();
        assert!(!manager.scene().unwrap().is_player_controlled());

        input.move_pointer(Vec2::new(30.0, 30.0));
        manager.run_frame(0.0, &mut input);
        manager.run_frame(0.016, &mut input);

        assert_eq!(manager.camera().position, CAMERA_POSITION);
        let toward_title = (TITLE_POSITION - CAMERA_POSITION).normalize();
        assert!(manager.camera().forward().abs_diff_eq(toward_title, 1e-4));
        assert_eq!(input.recentred, 0);
        assert_eq!(pipeline.state().prepared.len(), 2);
        assert_eq!(pipeline.state().lights.len(), 1);
    }

    #[test]
    fn switch_button_starts_intro() {
        let (mut manager, _) = menu_manager();
        let mut input = ScriptedInput::new();
        manager.run_frame(0.0, &mut input);

        input.hold(Button::SwitchScene);
        manager.run_frame(0.016, &mut input);

        assert_eq!(manager.active_scene(), Some(SceneId::Intro));
        assert_eq!(manager.scene_frame(), 1);
    }
}
