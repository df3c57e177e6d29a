use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::config::KeyBindings;

/// Logical buttons the runtime reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    Forward,
    Backward,
    SwitchScene,
}

/// The input collaborator seen by the camera controller and scenes.
pub trait InputSource {
    /// Returns true while the button is held.
    fn button_down(&self, button: Button) -> bool;

    /// Returns true if the button went down this frame.
    fn button_pressed(&self, button: Button) -> bool;

    /// Pointer position in viewport pixels, or `None` when the pointer is outside the viewport.
    fn pointer_position(&self) -> Option<Vec2>;

    /// Center of the viewport in pixels.
    fn viewport_center(&self) -> Vec2;

    /// Move the pointer back to the viewport center.
    fn recenter_pointer(&mut self);

    /// Hide the OS cursor.
    fn hide_cursor(&mut self);
}

/// Tracks keyboard and pointer state from winit window events.
///
/// Pointer recentring and cursor hiding are recorded as requests; the event-loop
/// driver owns the window and applies them with [`take_pointer_warp`](Self::take_pointer_warp)
/// and [`take_cursor_hide`](Self::take_cursor_hide).
pub struct Input {
    bindings: KeyBindings,
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    pointer: Option<Vec2>,
    viewport: Vec2,
    pending_warp: Option<Vec2>,
    hide_requested: bool,
}

impl Input {
    pub fn new(bindings: KeyBindings, viewport: Vec2) -> Self {
        Self {
            bindings,
            keys_down: HashSet::new(),
            keys_pressed: HashSet::new(),
            pointer: None,
            viewport,
            pending_warp: None,
            hide_requested: false,
        }
    }

    /// Call at the end of each frame to reset per-frame state.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => {
                            if !self.keys_down.contains(&key) {
                                self.keys_pressed.insert(key);
                            }
                            self.keys_down.insert(key);
                        }
                        ElementState::Released => {
                            self.keys_down.remove(&key);
                        }
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer = Some(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                self.pointer = None;
            }
            WindowEvent::Resized(size) => {
                self.viewport = Vec2::new(size.width as f32, size.height as f32);
            }
            WindowEvent::Focused(false) => {
                self.keys_down.clear();
            }
            _ => {}
        }
    }

    /// Take the pending pointer warp target, if any.
    pub fn take_pointer_warp(&mut self) -> Option<Vec2> {
        self.pending_warp.take()
    }

    /// Returns true once after [`InputSource::hide_cursor`] was called.
    pub fn take_cursor_hide(&mut self) -> bool {
        std::mem::take(&mut self.hide_requested)
    }

    fn key_for(&self, button: Button) -> KeyCode {
        match button {
            Button::Forward => self.bindings.forward,
            Button::Backward => self.bindings.backward,
            Button::SwitchScene => self.bindings.switch_scene,
        }
    }
}

impl InputSource for Input {
    fn button_down(&self, button: Button) -> bool {
        self.keys_down.contains(&self.key_for(button))
    }

    fn button_pressed(&self, button: Button) -> bool {
        self.keys_pressed.contains(&self.key_for(button))
    }

    fn pointer_position(&self) -> Option<Vec2> {
        self.pointer
    }

    fn viewport_center(&self) -> Vec2 {
        self.viewport * 0.5
    }

    fn recenter_pointer(&mut self) {
        let center = self.viewport_center();
        // The warp's own CursorMoved lands on the center, so the next delta stays relative.
        if self.pointer.is_some() {
            self.pointer = Some(center);
        }
        self.pending_warp = Some(center);
    }

    fn hide_cursor(&mut self) {
        self.hide_requested = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalSize;

    fn input() -> Input {
        Input::new(KeyBindings::default(), Vec2::new(800.0, 600.0))
    }

    #[test]
    fn recenter_requests_warp_to_viewport_center() {
        let mut input = input();
        input.pointer = Some(Vec2::new(10.0, 20.0));

        input.recenter_pointer();

        assert_eq!(input.pointer_position(), Some(Vec2::new(400.0, 300.0)));
        assert_eq!(input.take_pointer_warp(), Some(Vec2::new(400.0, 300.0)));
        assert_eq!(input.take_pointer_warp(), None);
    }

    #[test]
    fn resize_moves_viewport_center() {
        let mut input = input();
        input.handle_event(&WindowEvent::Resized(PhysicalSize::new(1920, 1080)));
        assert_eq!(input.viewport_center(), Vec2::new(960.0, 540.0));
    }

    #[test]
    fn bindings_map_logical_buttons() {
        let mut input = input();
        input.keys_down.insert(KeyCode::KeyW);
        input.keys_pressed.insert(KeyCode::Tab);

        assert!(input.button_down(Button::Forward));
        assert!(!input.button_down(Button::Backward));
        assert!(input.button_pressed(Button::SwitchScene));

        input.end_frame();
        assert!(!input.button_pressed(Button::SwitchScene));
        assert!(input.button_down(Button::Forward));
    }

    #[test]
    fn hide_request_is_taken_once() {
        let mut input = input();
        input.hide_cursor();
        assert!(input.take_cursor_hide());
        assert!(!input.take_cursor_hide());
    }
}
