//! Asset resolution for static meshes and animated actors.
//!
//! Scenes ask for assets by name; the loader maps the name through the active
//! [`QualityTier`] to a concrete path and hands back a [`GeometryId`]. Loading the
//! same path twice yields the same id, which is what lets instanced nodes share
//! geometry.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AssetError;

/// Asset quality tier. Selects the subdirectory assets are resolved from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Low,
    #[default]
    High,
}

impl QualityTier {
    /// Subdirectory name for this tier.
    pub fn as_str(self) -> &'static str {
        match self {
            QualityTier::Low => "low",
            QualityTier::High => "high",
        }
    }
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-safe handle to a piece of loaded geometry.
///
/// Two nodes carrying the same id draw the same mesh data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeometryId(pub(crate) usize);

/// A resolved static mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelAsset {
    /// Name the scene asked for.
    pub name: String,
    /// Resolved path (tier applied).
    pub path: PathBuf,
    pub geometry: GeometryId,
}

/// A resolved animated actor: its mesh plus a clip name to clip path table.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorAsset {
    pub model: ModelAsset,
    pub clips: HashMap<String, PathBuf>,
}

/// Resolves asset names to meshes and actors.
///
/// Errors are surfaced unchanged to scene construction, which treats them as fatal.
pub trait AssetLoader {
    /// Active quality tier.
    fn quality(&self) -> QualityTier;

    /// Resolve a static mesh.
    fn load_model(&mut self, name: &str) -> Result<ModelAsset, AssetError>;

    /// Resolve an actor and its clips. `clips` pairs a clip name with a clip asset name.
    fn load_actor(
        &mut self,
        name: &str,
        clips: &[(String, String)],
    ) -> Result<ActorAsset, AssetError>;
}

/// Hands out one [`GeometryId`] per distinct path.
#[derive(Debug, Default)]
struct GeometryCache {
    ids: HashMap<PathBuf, GeometryId>,
}

impl GeometryCache {
    fn intern(&mut self, path: &Path) -> GeometryId {
        let next = GeometryId(self.ids.len());
        *self.ids.entry(path.to_path_buf()).or_insert(next)
    }
}

/// Loads assets from `<root>/<tier>/<name>` on disk.
#[derive(Debug)]
pub struct FileAssetLoader {
    root: PathBuf,
    quality: QualityTier,
    cache: GeometryCache,
}

impl FileAssetLoader {
    pub fn new(root: impl Into<PathBuf>, quality: QualityTier) -> Self {
        Self {
            root: root.into(),
            quality,
            cache: GeometryCache::default(),
        }
    }

    /// Path an asset name resolves to under the current tier.
    pub fn resolve(&self, name: &str) -> PathBuf {
        self.root.join(self.quality.as_str()).join(name)
    }

    fn existing(&self, name: &str) -> Result<PathBuf, AssetError> {
        let path = self.resolve(name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(AssetError::NotFound {
                name: name.to_string(),
                path,
            })
        }
    }
}

impl AssetLoader for FileAssetLoader {
    fn quality(&self) -> QualityTier {
        self.quality
    }

    fn load_model(&mut self, name: &str) -> Result<ModelAsset, AssetError> {
        let path = self.existing(name)?;
        let geometry = self.cache.intern(&path);
        log::debug!("resolved model `{}` -> {}", name, path.display());
        Ok(ModelAsset {
            name: name.to_string(),
            path,
            geometry,
        })
    }

    fn load_actor(
        &mut self,
        name: &str,
        clips: &[(String, String)],
    ) -> Result<ActorAsset, AssetError> {
        let model = self.load_model(name)?;
        let mut table = HashMap::with_capacity(clips.len());
        for (clip, clip_asset) in clips {
            let path = self.existing(clip_asset).map_err(|_| AssetError::MissingClip {
                actor: name.to_string(),
                clip: clip.clone(),
            })?;
            table.insert(clip.clone(), path);
        }
        Ok(ActorAsset {
            model,
            clips: table,
        })
    }
}

/// Loader backed by a fixed set of known names instead of the filesystem.
///
/// Used when no asset directory is configured, and by tests.
#[derive(Debug)]
pub struct MemoryAssetLoader {
    quality: QualityTier,
    known: HashSet<String>,
    cache: GeometryCache,
}

impl MemoryAssetLoader {
    pub fn new(quality: QualityTier) -> Self {
        Self {
            quality,
            known: HashSet::new(),
            cache: GeometryCache::default(),
        }
    }

    /// Register an asset name.
    pub fn with_asset(mut self, name: impl Into<String>) -> Self {
        self.known.insert(name.into());
        self
    }

    /// Register several asset names.
    pub fn with_assets<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known.extend(names.into_iter().map(Into::into));
        self
    }

    fn path_for(&self, name: &str) -> PathBuf {
        Path::new(self.quality.as_str()).join(name)
    }
}

impl AssetLoader for MemoryAssetLoader {
    fn quality(&self) -> QualityTier {
        self.quality
    }

    fn load_model(&mut self, name: &str) -> Result<ModelAsset, AssetError> {
        if !self.known.contains(name) {
            return Err(AssetError::Unknown(name.to_string()));
        }
        let path = self.path_for(name);
        let geometry = self.cache.intern(&path);
        Ok(ModelAsset {
            name: name.to_string(),
            path,
            geometry,
        })
    }

    fn load_actor(
        &mut self,
        name: &str,
        clips: &[(String, String)],
    ) -> Result<ActorAsset, AssetError> {
        let model = self.load_model(name)?;
        let mut table = HashMap::with_capacity(clips.len());
        for (clip, clip_asset) in clips {
            if !self.known.contains(clip_asset) {
                return Err(AssetError::MissingClip {
                    actor: name.to_string(),
                    clip: clip.clone(),
                });
            }
            table.insert(clip.clone(), self.path_for(clip_asset));
        }
        Ok(ActorAsset {
            model,
            clips: table,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_shares_geometry() {
        let mut loader = MemoryAssetLoader::new(QualityTier::Low).with_assets(["corn.egg", "terrain.egg"]);

        let a = loader.load_model("corn.egg").unwrap();
        let b = loader.load_model("corn.egg").unwrap();
        let c = loader.load_model("terrain.egg").unwrap();

        assert_eq!(a.geometry, b.geometry);
        assert_ne!(a.geometry, c.geometry);
        assert_eq!(a.path, PathBuf::from("low/corn.egg"));
    }

    #[test]
    fn unknown_model_is_an_error() {
        let mut loader = MemoryAssetLoader::new(QualityTier::High);
        let err = loader.load_model("ghost.egg").unwrap_err();
        assert!(matches!(err, AssetError::Unknown(name) if name == "ghost.egg"));
    }

    #[test]
    fn actor_with_missing_clip_fails() {
        let mut loader = MemoryAssetLoader::new(QualityTier::High).with_asset("corn.egg");
        let clips = vec![("sway".to_string(), "corn-sway.egg".to_string())];

        let err = loader.load_actor("corn.egg", &clips).unwrap_err();
        assert!(matches!(err, AssetError::MissingClip { ref clip, .. } if clip == "sway"));
    }

    #[test]
    fn file_loader_resolves_through_quality_tier() {
        let loader = FileAssetLoader::new("resources", QualityTier::Low);
        assert_eq!(
            loader.resolve("corn.egg"),
            PathBuf::from("resources").join("low").join("corn.egg")
        );
    }

    #[test]
    fn file_loader_reports_missing_files() {
        let mut loader = FileAssetLoader::new("/nonexistent-asset-root", QualityTier::High);
        let err = loader.load_model("corn.egg").unwrap_err();
        assert!(matches!(err, AssetError::NotFound { .. }));
    }
}
