//! Per-scene model registry and the instancing contract.

use std::collections::HashMap;

use glam::Vec3;
use hecs::Entity;

use super::graph::{RenderTree, Transform};
use crate::assets::AssetLoader;
use crate::error::SceneError;

/// Key a model is registered under: an explicit name or a positional index.
///
/// Auto-assigned keys are `Index(len)` at insertion time, so mixing them with
/// explicit integer keys can collide. The later insertion wins.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ModelKey {
    Name(String),
    Index(usize),
}

impl std::fmt::Display for ModelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelKey::Name(name) => f.write_str(name),
            ModelKey::Index(index) => write!(f, "#{}", index),
        }
    }
}

impl From<&str> for ModelKey {
    fn from(s: &str) -> Self {
        ModelKey::Name(s.to_string())
    }
}

impl From<String> for ModelKey {
    fn from(s: String) -> Self {
        ModelKey::Name(s)
    }
}

impl From<usize> for ModelKey {
    fn from(i: usize) -> Self {
        ModelKey::Index(i)
    }
}

/// Arguments to [`ModelRegistry::add_model`].
///
/// # Example
///
/// ```ignore
/// // An animated actor with a clip table
/// registry.add_model(tree, assets, ModelSpec::actor("corn.egg")
///     .clip("sway", "corn-sway.egg")
///     .key("corn"))?;
///
/// // A placeholder sharing the actor's geometry
/// registry.add_model(tree, assets, ModelSpec::instance("corn")
///     .at(Vec3::new(5.0, 5.0, 0.0)))?;
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ModelSpec {
    /// Asset name. Ignored for instances.
    pub source: String,
    pub position: Vec3,
    pub scale: Vec3,
    /// Registered model whose geometry this entry shares.
    pub instance_source: Option<ModelKey>,
    pub is_actor: bool,
    pub key: Option<ModelKey>,
    /// `(clip name, clip asset name)` pairs for actors.
    pub animation_clips: Vec<(String, String)>,
    /// Registered model to attach under. The scene root if absent or unknown.
    pub parent: Option<ModelKey>,
}

impl ModelSpec {
    fn base(source: String) -> Self {
        Self {
            source,
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            instance_source: None,
            is_actor: false,
            key: None,
            animation_clips: Vec::new(),
            parent: None,
        }
    }

    /// A static mesh.
    pub fn mesh(source: impl Into<String>) -> Self {
        Self::base(source.into())
    }

    /// An animated actor.
    pub fn actor(source: impl Into<String>) -> Self {
        Self {
            is_actor: true,
            ..Self::base(source.into())
        }
    }

    /// A placeholder instancing an already registered model.
    pub fn instance(of: impl Into<ModelKey>) -> Self {
        Self {
            instance_source: Some(of.into()),
            ..Self::base(String::new())
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    pub fn scale_xyz(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn key(mut self, key: impl Into<ModelKey>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn clip(mut self, name: impl Into<String>, asset: impl Into<String>) -> Self {
        self.animation_clips.push((name.into(), asset.into()));
        self
    }

    pub fn parent(mut self, parent: impl Into<ModelKey>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

/// Named visual nodes owned by one scene, all hanging from the scene's root.
#[derive(Debug)]
pub struct ModelRegistry {
    root: Entity,
    models: HashMap<ModelKey, Entity>,
}

impl ModelRegistry {
    /// Create a registry with a fresh subtree root in `tree`.
    pub fn new(tree: &mut RenderTree, name: impl Into<String>) -> Self {
        Self {
            root: tree.create_root(name),
            models: HashMap::new(),
        }
    }

    /// Root of this scene's subtree.
    pub fn root(&self) -> Entity {
        self.root
    }

    pub fn get(&self, key: impl Into<ModelKey>) -> Option<Entity> {
        self.models.get(&key.into()).copied()
    }

    pub fn contains(&self, key: impl Into<ModelKey>) -> bool {
        self.models.contains_key(&key.into())
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ModelKey> {
        self.models.keys()
    }

    /// Create a node (or an instancing placeholder) and register it.
    ///
    /// Returns the node so callers can hand it to the render pipeline's
    /// `prepare_scene`.
    pub fn add_model(
        &mut self,
        tree: &mut RenderTree,
        assets: &mut dyn AssetLoader,
        spec: ModelSpec,
    ) -> Result<Entity, SceneError> {
        let transform = Transform::new().position(spec.position).scale(spec.scale);

        let node = match &spec.instance_source {
            Some(source_key) => {
                let source = self
                    .models
                    .get(source_key)
                    .copied()
                    .ok_or_else(|| SceneError::MissingInstanceSource(source_key.clone()))?;
                let placeholder = tree.attach_new_node(self.root, format!("{}-placeholder", source_key));
                tree.set_transform(placeholder, transform);
                if !tree.instance_to(source, placeholder) {
                    tree.detach_subtree(placeholder);
                    return Err(SceneError::MissingInstanceSource(source_key.clone()));
                }
                placeholder
            }
            None => {
                let parent = spec
                    .parent
                    .as_ref()
                    .and_then(|k| self.models.get(k).copied())
                    .unwrap_or(self.root);

                if spec.is_actor {
                    let actor = assets.load_actor(&spec.source, &spec.animation_clips)?;
                    let node = tree.attach_new_node(parent, &spec.source);
                    tree.set_geometry(node, actor.model.geometry);
                    tree.make_actor(node, actor.clips);
                    tree.set_transform(node, transform);
                    node
                } else {
                    let model = assets.load_model(&spec.source)?;
                    let node = tree.attach_new_node(parent, &spec.source);
                    tree.set_geometry(node, model.geometry);
                    tree.set_transform(node, transform);
                    node
                }
            }
        };

        let key = spec.key.unwrap_or(ModelKey::Index(self.models.len()));
        if self.models.insert(key.clone(), node).is_some() {
            log::warn!("model key `{}` registered twice, keeping the newer node", key);
        }
        Ok(node)
    }

    /// Detach the whole subtree and forget every entry. Returns nodes removed.
    pub fn teardown(&mut self, tree: &mut RenderTree) -> usize {
        self.models.clear();
        tree.detach_subtree(self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::bundled_assets;

    #[test]
    fn instancing_corn_creates_one_placeholder() {
        let mut tree = RenderTree::new();
        let mut assets = bundled_assets();
        let mut registry = ModelRegistry::new(&mut tree, "field");
        let corn = registry
            .add_model(&mut tree, &mut assets, ModelSpec::actor("corn.egg").key("corn"))
            .unwrap();
        let before = registry.len();

        let placeholder = registry
            .add_model(
                &mut tree,
                &mut assets,
                ModelSpec::instance("corn").at(Vec3::new(5.0, 5.0, 0.0)),
            )
            .unwrap();

        assert_eq!(registry.len(), before + 1);
        assert_eq!(
            tree.transform(placeholder).unwrap().position,
            Vec3::new(5.0, 5.0, 0.0)
        );
        assert_eq!(tree.geometry(placeholder), tree.geometry(corn));
        assert!(tree.is_instance(placeholder));
        assert_eq!(tree.parent(placeholder), Some(registry.root()));
    }

    #[test]
    fn instancing_unknown_source_fails_and_adds_nothing() {
        let mut tree = RenderTree::new();
        let mut assets = bundled_assets();
        let mut registry = ModelRegistry::new(&mut tree, "field");
        let nodes = tree.node_count();

        let err = registry
            .add_model(&mut tree, &mut assets, ModelSpec::instance("corn"))
            .unwrap_err();

        assert!(matches!(err, SceneError::MissingInstanceSource(ModelKey::Name(ref k)) if k == "corn"));
        assert!(registry.is_empty());
        assert_eq!(tree.node_count(), nodes);
    }

    #[test]
    fn instancing_an_empty_node_is_rejected() {
        let mut tree = RenderTree::new();
        let mut assets = bundled_assets();
        let mut registry = ModelRegistry::new(&mut tree, "field");
        let nodes = tree.node_count();
        registry.models.insert(ModelKey::from("hollow"), registry.root());

        let err = registry
            .add_model(&mut tree, &mut assets, ModelSpec::instance("hollow"))
            .unwrap_err();

        assert!(matches!(err, SceneError::MissingInstanceSource(_)));
        assert_eq!(tree.node_count(), nodes);
    }

    #[test]
    fn auto_keys_are_positional() {
        let mut tree = RenderTree::new();
        let mut assets = bundled_assets();
        let mut registry = ModelRegistry::new(&mut tree, "scene");

        let a = registry
            .add_model(&mut tree, &mut assets, ModelSpec::mesh("terrain.egg"))
            .unwrap();
        let b = registry
            .add_model(&mut tree, &mut assets, ModelSpec::mesh("title.egg"))
            .unwrap();

        assert_eq!(registry.get(0usize), Some(a));
        assert_eq!(registry.get(1usize), Some(b));
    }

    #[test]
    fn parent_key_attaches_under_registered_node() {
        let mut tree = RenderTree::new();
        let mut assets = bundled_assets();
        let mut registry = ModelRegistry::new(&mut tree, "scene");
        let house = registry
            .add_model(&mut tree, &mut assets, ModelSpec::mesh("farmhouse.egg").key("house"))
            .unwrap();

        let attached = registry
            .add_model(
                &mut tree,
                &mut assets,
                ModelSpec::mesh("title.egg").parent("house").scale(2.0),
            )
            .unwrap();
        let orphan = registry
            .add_model(&mut tree, &mut assets, ModelSpec::mesh("title.egg").parent("barn"))
            .unwrap();

        assert_eq!(tree.parent(attached), Some(house));
        assert_eq!(tree.transform(attached).unwrap().scale, Vec3::splat(2.0));
        assert_eq!(tree.parent(orphan), Some(registry.root()));
    }

    #[test]
    fn actor_keeps_clip_table() {
        let mut tree = RenderTree::new();
        let mut assets = bundled_assets();
        let mut registry = ModelRegistry::new(&mut tree, "scene");

        let corn = registry
            .add_model(
                &mut tree,
                &mut assets,
                ModelSpec::actor("corn.egg").clip("sway", "corn-sway.egg"),
            )
            .unwrap();

        assert!(tree.is_actor(corn));
        assert!(tree.loop_clip(corn, "sway"));
    }

    #[test]
    fn asset_failure_propagates_unchanged() {
        let mut tree = RenderTree::new();
        let mut assets = bundled_assets();
        let mut registry = ModelRegistry::new(&mut tree, "scene");

        let err = registry
            .add_model(&mut tree, &mut assets, ModelSpec::mesh("missing.egg"))
            .unwrap_err();

        assert!(matches!(err, SceneError::Asset(crate::error::AssetError::Unknown(_))));
    }

    #[test]
    fn teardown_detaches_everything() {
        let mut tree = RenderTree::new();
        let mut assets = bundled_assets();
        let mut registry = ModelRegistry::new(&mut tree, "scene");
        registry
            .add_model(&mut tree, &mut assets, ModelSpec::actor("corn.egg").key("corn"))
            .unwrap();
        for i in 0..4 {
            registry
                .add_model(
                    &mut tree,
                    &mut assets,
                    ModelSpec::instance("corn").at(Vec3::X * i as f32),
                )
                .unwrap();
        }

        assert_eq!(registry.teardown(&mut tree), 6);
        assert!(registry.is_empty());
        assert_eq!(tree.node_count(), 0);
    }
}
