use glam::Vec2;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::error::EventLoopError;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::config::{KeyBindings, WindowConfig};
use crate::input::Input;
use crate::scene::{FrameControl, SceneManager};

/// Open a window and drive `manager` once per redraw until the window closes
/// or the active scene returns [`FrameControl::Stop`].
///
/// # Example
/// ```ignore
/// let config = RuntimeConfig::load("poultrygeist.toml")?;
/// let mut manager = SceneManager::new(/* ... */);
/// manager.load_scene(SceneId::Menu)?;
/// poultrygeist::run(config.window, config.bindings, manager)?;
/// ```
pub fn run(
    window: WindowConfig,
    bindings: KeyBindings,
    manager: SceneManager,
) -> Result<(), EventLoopError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GameApp::Pending {
        window,
        bindings,
        manager: Some(manager),
    };

    event_loop.run_app(&mut app)
}

enum GameApp {
    Pending {
        window: WindowConfig,
        bindings: KeyBindings,
        manager: Option<SceneManager>,
    },
    Running {
        window: Window,
        manager: SceneManager,
        input: Input,
        start_time: Instant,
    },
}

impl ApplicationHandler for GameApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let GameApp::Pending {
            window: config,
            bindings,
            manager,
        } = self
        else {
            return;
        };

        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(LogicalSize::new(config.width, config.height));
        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => window,
            Err(err) => {
                log::error!("failed to create window: {}", err);
                event_loop.exit();
                return;
            }
        };
        let Some(manager) = manager.take() else {
            return;
        };

        let size = window.inner_size();
        let input = Input::new(
            bindings.clone(),
            Vec2::new(size.width as f32, size.height as f32),
        );
        window.set_cursor_visible(false);
        window.request_redraw();
        log::info!("window open at {}x{}", size.width, size.height);

        *self = GameApp::Running {
            window,
            manager,
            input,
            start_time: Instant::now(),
        };
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let GameApp::Running {
            window,
            manager,
            input,
            start_time,
        } = self
        else {
            return;
        };

        input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let now = start_time.elapsed().as_secs_f64();
                let control = manager.run_frame(now, input);

                // Pointer recentring and cursor hiding are requested by the frame, applied here.
                if let Some(target) = input.take_pointer_warp() {
                    let position = PhysicalPosition::new(f64::from(target.x), f64::from(target.y));
                    if let Err(err) = window.set_cursor_position(position) {
                        log::trace!("cursor warp unsupported: {}", err);
                    }
                }
                if input.take_cursor_hide() {
                    window.set_cursor_visible(false);
                }
                input.end_frame();

                if control == FrameControl::Stop {
                    log::info!("scene asked to stop");
                    event_loop.exit();
                    return;
                }
                window.request_redraw();
            }
            _ => {}
        }
    }
}
