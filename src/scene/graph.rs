//! The render tree: visual nodes stored as `hecs` entities.
//!
//! Every node carries a [`Node`] name, a local [`Transform`] and a [`Children`]
//! list. Non-root nodes also carry a [`Parent`]. Geometry comes from one of three
//! places:
//!
//! - [`Geometry`]: the node owns a static mesh or an actor's mesh
//! - [`InstanceOf`]: the node is a placeholder sharing another node's geometry
//! - nothing: an empty grouping node (scene roots, bare placeholders)
//!
//! Each scene builds its own subtree under a root created with
//! [`RenderTree::create_root`]. The tree's *active root* marks which subtree the
//! renderer should draw.

use std::collections::HashMap;
use std::path::PathBuf;

use glam::{Quat, Vec3};
use hecs::{Entity, World};

use crate::assets::GeometryId;

/// Debug name of a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub name: String,
}

/// Local position, rotation and scale of a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Per-axis scale.
    pub fn scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Parent(pub Entity);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Children(pub Vec<Entity>);

/// Geometry owned by this node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry(pub GeometryId);

/// Placeholder that draws another node's geometry with its own transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstanceOf {
    pub source: Entity,
    pub geometry: GeometryId,
}

/// Animated actor state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Actor {
    /// Clip name to clip asset path.
    pub clips: HashMap<String, PathBuf>,
    /// Clip currently looping, if any.
    pub looping: Option<String>,
}

/// Hierarchy of visual nodes for all live scenes.
pub struct RenderTree {
    world: World,
    active_root: Option<Entity>,
}

impl Default for RenderTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderTree {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            active_root: None,
        }
    }

    /// Read-only access to the underlying ECS world, for renderers and queries.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Spawn a parentless node to hang a scene's subtree from.
    pub fn create_root(&mut self, name: impl Into<String>) -> Entity {
        self.world.spawn((
            Node { name: name.into() },
            Transform::default(),
            Children::default(),
        ))
    }

    /// Spawn an empty node under `parent`.
    ///
    /// Falls back to a parentless node if `parent` no longer exists.
    pub fn attach_new_node(&mut self, parent: Entity, name: impl Into<String>) -> Entity {
        let name = name.into();
        if !self.world.contains(parent) {
            log::warn!("attach_new_node: parent {:?} is gone, `{}` becomes a root", parent, name);
            return self.create_root(name);
        }
        let node = self.world.spawn((
            Node { name },
            Transform::default(),
            Children::default(),
            Parent(parent),
        ));
        if let Ok(mut children) = self.world.get::<&mut Children>(parent) {
            children.0.push(node);
        }
        node
    }

    pub fn contains(&self, node: Entity) -> bool {
        self.world.contains(node)
    }

    /// Number of live nodes across all subtrees.
    pub fn node_count(&self) -> usize {
        self.world.len() as usize
    }

    pub fn name(&self, node: Entity) -> Option<String> {
        self.world.get::<&Node>(node).ok().map(|n| n.name.clone())
    }

    pub fn transform(&self, node: Entity) -> Option<Transform> {
        self.world.get::<&Transform>(node).ok().map(|t| *t)
    }

    pub fn set_transform(&mut self, node: Entity, transform: Transform) {
        if let Ok(mut t) = self.world.get::<&mut Transform>(node) {
            *t = transform;
        }
    }

    pub fn parent(&self, node: Entity) -> Option<Entity> {
        self.world.get::<&Parent>(node).ok().map(|p| p.0)
    }

    pub fn children(&self, node: Entity) -> Vec<Entity> {
        self.world
            .get::<&Children>(node)
            .map(|c| c.0.clone())
            .unwrap_or_default()
    }

    /// Give a node its own geometry.
    pub fn set_geometry(&mut self, node: Entity, geometry: GeometryId) {
        let _ = self.world.insert_one(node, Geometry(geometry));
    }

    /// Geometry a node draws, whether owned or instanced.
    pub fn geometry(&self, node: Entity) -> Option<GeometryId> {
        if let Ok(g) = self.world.get::<&Geometry>(node) {
            return Some(g.0);
        }
        self.world.get::<&InstanceOf>(node).ok().map(|i| i.geometry)
    }

    /// Returns true if the node draws geometry it does not own.
    pub fn is_instance(&self, node: Entity) -> bool {
        self.world.get::<&InstanceOf>(node).is_ok()
    }

    /// Share `source`'s geometry onto `placeholder`.
    ///
    /// Returns false if `source` draws no geometry.
    pub fn instance_to(&mut self, source: Entity, placeholder: Entity) -> bool {
        let Some(geometry) = self.geometry(source) else {
            return false;
        };
        self.world
            .insert_one(placeholder, InstanceOf { source, geometry })
            .is_ok()
    }

    /// Mark a node as an animated actor with the given clip table.
    pub fn make_actor(&mut self, node: Entity, clips: HashMap<String, PathBuf>) {
        let _ = self.world.insert_one(
            node,
            Actor {
                clips,
                looping: None,
            },
        );
    }

    pub fn is_actor(&self, node: Entity) -> bool {
        self.world.get::<&Actor>(node).is_ok()
    }

    /// Start looping a named clip on an actor. Returns false for non-actors or unknown clips.
    pub fn loop_clip(&mut self, node: Entity, clip: &str) -> bool {
        match self.world.get::<&mut Actor>(node) {
            Ok(mut actor) if actor.clips.contains_key(clip) => {
                actor.looping = Some(clip.to_string());
                true
            }
            _ => false,
        }
    }

    pub fn looping_clip(&self, node: Entity) -> Option<String> {
        self.world
            .get::<&Actor>(node)
            .ok()
            .and_then(|a| a.looping.clone())
    }

    /// Number of nodes drawing `geometry`, owned or instanced.
    pub fn geometry_users(&self, geometry: GeometryId) -> usize {
        let owned = self
            .world
            .query::<&Geometry>()
            .iter()
            .filter(|(_, g)| g.0 == geometry)
            .count();
        let shared = self
            .world
            .query::<&InstanceOf>()
            .iter()
            .filter(|(_, i)| i.geometry == geometry)
            .count();
        owned + shared
    }

    pub fn active_root(&self) -> Option<Entity> {
        self.active_root
    }

    /// Point the renderer at a scene's subtree.
    pub fn set_active_root(&mut self, root: Entity) {
        self.active_root = Some(root);
    }

    /// Despawn `root` and everything below it. Returns the number of nodes removed.
    pub fn detach_subtree(&mut self, root: Entity) -> usize {
        if !self.world.contains(root) {
            return 0;
        }
        if let Some(parent) = self.parent(root) {
            if let Ok(mut siblings) = self.world.get::<&mut Children>(parent) {
                siblings.0.retain(|&c| c != root);
            }
        }

        let mut stack = vec![root];
        let mut removed = 0;
        while let Some(node) = stack.pop() {
            stack.extend(self.children(node));
            if self.world.despawn(node).is_ok() {
                removed += 1;
            }
        }

        if self.active_root == Some(root) {
            self.active_root = None;
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_links_parent_and_children() {
        let mut tree = RenderTree::new();
        let root = tree.create_root("root");
        let child = tree.attach_new_node(root, "child");

        assert_eq!(tree.parent(child), Some(root));
        assert_eq!(tree.children(root), vec![child]);
        assert_eq!(tree.name(child).as_deref(), Some("child"));
    }

    #[test]
    fn instance_shares_source_geometry() {
        let mut tree = RenderTree::new();
        let root = tree.create_root("root");
        let source = tree.attach_new_node(root, "corn");
        let placeholder = tree.attach_new_node(root, "corn-placeholder");
        tree.set_geometry(source, GeometryId(7));

        assert!(tree.instance_to(source, placeholder));
        assert_eq!(tree.geometry(placeholder), Some(GeometryId(7)));
        assert!(tree.is_instance(placeholder));
        assert_eq!(tree.geometry_users(GeometryId(7)), 2);
    }

    #[test]
    fn instancing_from_empty_node_fails() {
        let mut tree = RenderTree::new();
        let root = tree.create_root("root");
        let empty = tree.attach_new_node(root, "empty");
        let placeholder = tree.attach_new_node(root, "placeholder");

        assert!(!tree.instance_to(empty, placeholder));
        assert_eq!(tree.geometry(placeholder), None);
    }

    #[test]
    fn loop_clip_requires_known_clip() {
        let mut tree = RenderTree::new();
        let root = tree.create_root("root");
        let corn = tree.attach_new_node(root, "corn");
        let mut clips = HashMap::new();
        clips.insert("sway".to_string(), PathBuf::from("low/corn-sway.egg"));
        tree.make_actor(corn, clips);

        assert!(!tree.loop_clip(corn, "dance"));
        assert!(tree.loop_clip(corn, "sway"));
        assert_eq!(tree.looping_clip(corn).as_deref(), Some("sway"));
        assert!(!tree.loop_clip(root, "sway"));
    }

    #[test]
    fn detach_subtree_removes_descendants_only() {
        let mut tree = RenderTree::new();
        let keep = tree.create_root("keep");
        let kept_child = tree.attach_new_node(keep, "kept");
        let drop = tree.create_root("drop");
        let a = tree.attach_new_node(drop, "a");
        let b = tree.attach_new_node(a, "b");
        tree.set_active_root(drop);

        assert_eq!(tree.detach_subtree(drop), 3);
        assert!(!tree.contains(a));
        assert!(!tree.contains(b));
        assert!(tree.contains(kept_child));
        assert_eq!(tree.node_count(), 2);
        assert_eq!(tree.active_root(), None);
    }

    #[test]
    fn detach_inner_node_unlinks_from_parent() {
        let mut tree = RenderTree::new();
        let root = tree.create_root("root");
        let inner = tree.attach_new_node(root, "inner");
        tree.attach_new_node(inner, "leaf");

        assert_eq!(tree.detach_subtree(inner), 2);
        assert!(tree.children(root).is_empty());
    }
}
