//! Render-pipeline collaborator contract and scene-scoped global effects.
//!
//! The renderer itself lives outside this crate. Scenes only need two things from
//! it: preparing a static mesh for deferred rendering, and registering lights.
//! Prepared meshes, lights and fog are all renderer state that outlives a single
//! call, so scenes never install them directly; they declare [`SceneEffect`]s and
//! the [`RenderContext`] applies them on activation and retracts them on teardown.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec3;
use hecs::Entity;

/// Opaque handle to a light registered with the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LightHandle(pub(crate) usize);

/// Light color, either explicit or derived from a color temperature.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightColor {
    /// Linear RGB in `[0, 1]`.
    Rgb(Vec3),
    /// Black-body temperature in Kelvin.
    Temperature(f32),
}

impl LightColor {
    /// Resolve to RGB in `[0, 1]`.
    pub fn to_rgb(self) -> Vec3 {
        match self {
            LightColor::Rgb(rgb) => rgb,
            LightColor::Temperature(kelvin) => temperature_to_rgb(kelvin),
        }
    }
}

/// Approximate black-body color for 1000K..40000K.
fn temperature_to_rgb(kelvin: f32) -> Vec3 {
    let t = kelvin.clamp(1000.0, 40000.0) / 100.0;

    let r = if t <= 66.0 {
        255.0
    } else {
        329.698_73 * (t - 60.0).powf(-0.133_204_76)
    };
    let g = if t <= 66.0 {
        99.470_8 * t.ln() - 161.119_57
    } else {
        288.122_17 * (t - 60.0).powf(-0.075_514_85)
    };
    let b = if t >= 66.0 {
        255.0
    } else if t <= 19.0 {
        0.0
    } else {
        138.517_73 * (t - 10.0).ln() - 305.044_8
    };

    Vec3::new(r, g, b).clamp(Vec3::ZERO, Vec3::splat(255.0)) / 255.0
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightKind {
    Point,
    Spot,
}

/// Everything the pipeline needs to register a light.
///
/// # Example
///
/// ```
/// use poultrygeist::{LightDescriptor, Vec3};
///
/// let moon = LightDescriptor::spot(Vec3::new(40.0, 40.0, 60.0))
///     .temperature(8000.0)
///     .shadows(2048)
///     .fov(60.0)
///     .look_at(Vec3::ZERO);
/// assert!(moon.casts_shadows);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LightDescriptor {
    pub kind: LightKind,
    pub color: LightColor,
    pub position: Vec3,
    /// Optional IES photometric profile name.
    pub ies_profile: Option<String>,
    pub casts_shadows: bool,
    pub shadow_map_resolution: u32,
    /// Falloff radius.
    pub radius: f32,
    pub energy: f32,
    /// Spot cone field of view in degrees.
    pub fov: f32,
    pub look_at: Option<Vec3>,
}

impl LightDescriptor {
    fn new(kind: LightKind, position: Vec3) -> Self {
        Self {
            kind,
            color: LightColor::Rgb(Vec3::ONE),
            position,
            ies_profile: None,
            casts_shadows: false,
            shadow_map_resolution: 512,
            radius: 10.0,
            energy: 1.0,
            fov: 90.0,
            look_at: None,
        }
    }

    pub fn point(position: Vec3) -> Self {
        Self::new(LightKind::Point, position)
    }

    pub fn spot(position: Vec3) -> Self {
        Self::new(LightKind::Spot, position)
    }

    pub fn color(mut self, rgb: Vec3) -> Self {
        self.color = LightColor::Rgb(rgb);
        self
    }

    pub fn temperature(mut self, kelvin: f32) -> Self {
        self.color = LightColor::Temperature(kelvin);
        self
    }

    pub fn ies(mut self, profile: impl Into<String>) -> Self {
        self.ies_profile = Some(profile.into());
        self
    }

    /// Enable shadow casting with the given shadow-map resolution.
    pub fn shadows(mut self, resolution: u32) -> Self {
        self.casts_shadows = true;
        self.shadow_map_resolution = resolution;
        self
    }

    pub fn radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn energy(mut self, energy: f32) -> Self {
        self.energy = energy;
        self
    }

    pub fn fov(mut self, degrees: f32) -> Self {
        self.fov = degrees;
        self
    }

    pub fn look_at(mut self, target: Vec3) -> Self {
        self.look_at = Some(target);
        self
    }
}

/// Exponential distance fog.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
    pub color: Vec3,
    pub density: f32,
}

/// Global renderer state a scene wants while it is active.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneEffect {
    /// A static-mesh node handed to the pipeline for deferred rendering.
    Prepare(Entity),
    Light(LightDescriptor),
    Fog(Fog),
}

/// The external render pipeline.
pub trait RenderPipeline {
    /// Prepare a static-mesh node for deferred rendering. Called once per node.
    fn prepare_scene(&mut self, node: Entity);

    /// Forget a node passed to [`prepare_scene`](Self::prepare_scene).
    fn release(&mut self, node: Entity);

    /// Register a light.
    fn add_light(&mut self, light: &LightDescriptor) -> LightHandle;

    /// Unregister a light previously returned by [`add_light`](Self::add_light).
    fn remove_light(&mut self, handle: LightHandle);

    /// Install or clear global fog.
    fn set_fog(&mut self, fog: Option<Fog>);
}

/// Owns the pipeline and tracks which global effects the active scene installed.
pub struct RenderContext {
    pipeline: Box<dyn RenderPipeline>,
    prepared: Vec<Entity>,
    lights: Vec<LightHandle>,
    fog_installed: bool,
}

impl RenderContext {
    pub fn new(pipeline: Box<dyn RenderPipeline>) -> Self {
        Self {
            pipeline,
            prepared: Vec::new(),
            lights: Vec::new(),
            fog_installed: false,
        }
    }

    /// Install a scene's effects. Anything still applied is retracted first.
    pub fn apply(&mut self, effects: &[SceneEffect]) {
        self.retract();
        for effect in effects {
            match effect {
                SceneEffect::Prepare(node) => {
                    self.pipeline.prepare_scene(*node);
                    self.prepared.push(*node);
                }
                SceneEffect::Light(light) => {
                    let handle = self.pipeline.add_light(light);
                    self.lights.push(handle);
                }
                SceneEffect::Fog(fog) => {
                    self.pipeline.set_fog(Some(*fog));
                    self.fog_installed = true;
                }
            }
        }
        log::debug!(
            "applied {} scene effects ({} prepared, {} lights)",
            effects.len(),
            self.prepared.len(),
            self.lights.len()
        );
    }

    /// Undo everything [`apply`](Self::apply) installed.
    pub fn retract(&mut self) {
        if self.prepared.is_empty() && self.lights.is_empty() && !self.fog_installed {
            return;
        }
        log::debug!(
            "retracting {} prepared nodes, {} lights",
            self.prepared.len(),
            self.lights.len()
        );
        for node in self.prepared.drain(..) {
            self.pipeline.release(node);
        }
        for handle in self.lights.drain(..) {
            self.pipeline.remove_light(handle);
        }
        if self.fog_installed {
            self.pipeline.set_fog(None);
            self.fog_installed = false;
        }
    }

    /// Number of lights currently installed by the active scene.
    pub fn applied_lights(&self) -> usize {
        self.lights.len()
    }

    /// Nodes currently prepared on behalf of the active scene.
    pub fn prepared_nodes(&self) -> &[Entity] {
        &self.prepared
    }
}

/// What a [`HeadlessPipeline`] has been told so far.
#[derive(Debug, Default)]
pub struct HeadlessState {
    pub prepared: Vec<Entity>,
    pub lights: HashMap<LightHandle, LightDescriptor>,
    pub fog: Option<Fog>,
    next_light: usize,
}

/// A pipeline that records calls instead of drawing.
///
/// Clones share state, so a caller can keep one clone for inspection after handing
/// another to the [`RenderContext`].
#[derive(Clone, Debug, Default)]
pub struct HeadlessPipeline {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> std::cell::Ref<'_, HeadlessState> {
        self.state.borrow()
    }
}

impl RenderPipeline for HeadlessPipeline {
    fn prepare_scene(&mut self, node: Entity) {
        log::trace!("prepare_scene({:?})", node);
        self.state.borrow_mut().prepared.push(node);
    }

    fn release(&mut self, node: Entity) {
        let mut state = self.state.borrow_mut();
        let before = state.prepared.len();
        state.prepared.retain(|&n| n != node);
        if state.prepared.len() == before {
            log::warn!("release: {:?} was never prepared", node);
        }
    }

    fn add_light(&mut self, light: &LightDescriptor) -> LightHandle {
        let mut state = self.state.borrow_mut();
        let handle = LightHandle(state.next_light);
        state.next_light += 1;
        state.lights.insert(handle, light.clone());
        handle
    }

    fn remove_light(&mut self, handle: LightHandle) {
        if self.state.borrow_mut().lights.remove(&handle).is_none() {
            log::warn!("remove_light: unknown handle {:?}", handle);
        }
    }

    fn set_fog(&mut self, fog: Option<Fog>) {
        self.state.borrow_mut().fog = fog;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn temperature_color_is_warm_or_cool() {
        let candle = LightColor::Temperature(1900.0).to_rgb();
        let sky = LightColor::Temperature(12000.0).to_rgb();

        assert_relative_eq!(candle.x, 1.0);
        assert!(candle.z < 0.2);
        assert!(sky.z > sky.x);
        assert_relative_eq!(sky.z, 1.0);
    }

    #[test]
    fn explicit_rgb_passes_through() {
        let rgb = Vec3::new(0.2, 0.4, 0.6);
        assert_eq!(LightColor::Rgb(rgb).to_rgb(), rgb);
    }

    #[test]
    fn apply_then_retract_restores_pipeline() {
        let pipeline = HeadlessPipeline::new();
        let mut ctx = RenderContext::new(Box::new(pipeline.clone()));
        let fog = Fog {
            color: Vec3::splat(0.1),
            density: 0.02,
        };

        ctx.apply(&[
            SceneEffect::Light(LightDescriptor::point(Vec3::Z)),
            SceneEffect::Light(LightDescriptor::spot(Vec3::X).shadows(1024)),
            SceneEffect::Fog(fog),
        ]);
        assert_eq!(pipeline.state().lights.len(), 2);
        assert_eq!(pipeline.state().fog, Some(fog));
        assert_eq!(ctx.applied_lights(), 2);

        ctx.retract();
        assert!(pipeline.state().lights.is_empty());
        assert_eq!(pipeline.state().fog, None);
        assert_eq!(ctx.applied_lights(), 0);
    }

    #[test]
    fn apply_replaces_previous_effects() {
        let pipeline = HeadlessPipeline::new();
        let mut ctx = RenderContext::new(Box::new(pipeline.clone()));

        ctx.apply(&[SceneEffect::Light(LightDescriptor::point(Vec3::Z))]);
        ctx.apply(&[SceneEffect::Light(LightDescriptor::point(Vec3::Y))]);

        let state = pipeline.state();
        assert_eq!(state.lights.len(), 1);
        assert!(state.lights.values().all(|l| l.position == Vec3::Y));
    }

    #[test]
    fn retract_releases_prepared_nodes() {
        let pipeline = HeadlessPipeline::new();
        let mut ctx = RenderContext::new(Box::new(pipeline.clone()));
        let mut world = hecs::World::new();
        let floor = world.spawn(());
        let walls = world.spawn(());
        let loft = world.spawn(());

        ctx.apply(&[SceneEffect::Prepare(floor), SceneEffect::Prepare(walls)]);
        assert_eq!(pipeline.state().prepared, vec![floor, walls]);
        assert_eq!(ctx.prepared_nodes(), &[floor, walls]);

        // Re-applying swaps the prepared set instead of growing it
        ctx.apply(&[SceneEffect::Prepare(loft)]);
        assert_eq!(pipeline.state().prepared, vec![loft]);

        ctx.retract();
        assert!(pipeline.state().prepared.is_empty());
        assert!(ctx.prepared_nodes().is_empty());
    }
}
