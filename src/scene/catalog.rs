//! Scene factories and the transition table.

use std::collections::HashMap;

use super::scene::{SceneBehavior, SceneId, SceneSetup};
use crate::error::SceneError;

/// Builds a scene's content and returns its per-frame behavior.
pub type SceneFactory =
    Box<dyn Fn(&mut SceneSetup<'_>) -> Result<Box<dyn SceneBehavior>, SceneError>>;

/// Registered scenes plus which scene follows which.
///
/// # Example
///
/// ```ignore
/// let mut catalog = SceneCatalog::new();
/// catalog
///     .register(SceneId::Menu, |setup| MenuScene::build(setup))
///     .register(SceneId::Intro, move |setup| IntroScene::build(setup, &intro))
///     .toggle(SceneId::Intro, SceneId::Menu);
/// ```
#[derive(Default)]
pub struct SceneCatalog {
    factories: HashMap<SceneId, SceneFactory>,
    transitions: HashMap<SceneId, SceneId>,
}

impl SceneCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for a scene id, replacing any earlier one.
    pub fn register<F>(&mut self, id: SceneId, factory: F) -> &mut Self
    where
        F: Fn(&mut SceneSetup<'_>) -> Result<Box<dyn SceneBehavior>, SceneError> + 'static,
    {
        self.factories.insert(id, Box::new(factory));
        self
    }

    /// Make `to` the next scene after `from`.
    pub fn transition(&mut self, from: SceneId, to: SceneId) -> &mut Self {
        self.transitions.insert(from, to);
        self
    }

    /// Make `a` and `b` switch to each other.
    pub fn toggle(&mut self, a: SceneId, b: SceneId) -> &mut Self {
        self.transition(a, b).transition(b, a)
    }

    pub fn contains(&self, id: SceneId) -> bool {
        self.factories.contains_key(&id)
    }

    /// Scene that follows `id`, if the table has one.
    pub fn next_after(&self, id: SceneId) -> Option<SceneId> {
        self.transitions.get(&id).copied()
    }

    pub(crate) fn build(
        &self,
        id: SceneId,
        setup: &mut SceneSetup<'_>,
    ) -> Result<Box<dyn SceneBehavior>, SceneError> {
        let factory = self.factories.get(&id).ok_or(SceneError::UnknownScene(id))?;
        factory(setup)
    }
}
