//! Test fixtures shared by the unit tests.

use std::collections::HashSet;

use glam::Vec2;

use crate::assets::{MemoryAssetLoader, QualityTier};
use crate::input::{Button, InputSource};

/// Input whose state is set directly by the test.
#[derive(Debug)]
pub(crate) struct ScriptedInput {
    pub down: HashSet<Button>,
    pub pressed: HashSet<Button>,
    pub pointer: Option<Vec2>,
    pub center: Vec2,
    pub recentred: usize,
    pub hidden: bool,
}

impl ScriptedInput {
    pub fn new() -> Self {
        let center = Vec2::new(400.0, 300.0);
        Self {
            down: HashSet::new(),
            pressed: HashSet::new(),
            pointer: Some(center),
            center,
            recentred: 0,
            hidden: false,
        }
    }

    /// Place the pointer `delta` pixels away from the viewport center.
    pub fn move_pointer(&mut self, delta: Vec2) {
        self.pointer = Some(self.center + delta);
    }

    pub fn hold(&mut self, button: Button) {
        if self.down.insert(button) {
            self.pressed.insert(button);
        }
    }

    pub fn release(&mut self, button: Button) {
        self.down.remove(&button);
    }

    /// Clear per-frame edges, as the driver does between frames.
    pub fn end_frame(&mut self) {
        self.pressed.clear();
    }
}

impl InputSource for ScriptedInput {
    fn button_down(&self, button: Button) -> bool {
        self.down.contains(&button)
    }

    fn button_pressed(&self, button: Button) -> bool {
        self.pressed.contains(&button)
    }

    fn pointer_position(&self) -> Option<Vec2> {
        self.pointer
    }

    fn viewport_center(&self) -> Vec2 {
        self.center
    }

    fn recenter_pointer(&mut self) {
        self.recentred += 1;
        if self.pointer.is_some() {
            self.pointer = Some(self.center);
        }
    }

    fn hide_cursor(&mut self) {
        self.hidden = true;
    }
}

/// Loader that knows every asset the bundled scenes use.
pub(crate) fn bundled_assets() -> MemoryAssetLoader {
    crate::scene::bundled_asset_loader(QualityTier::Low)
}
