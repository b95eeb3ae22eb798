// Asset file lookup under the asset root

use super::AssetError;
use std::path::{Path, PathBuf};

/// Kinds of asset files, each kept in its own directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetType {
    Texture,
    Animation,
    Scene,
}

impl AssetType {
    /// Get the default directory for this asset type
    pub fn default_directory(&self) -> &'static str {
        match self {
            AssetType::Texture => "textures",
            AssetType::Animation => "animations",
            AssetType::Scene => "scenes",
        }
    }

    /// Get supported file extensions for this asset type
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            AssetType::Texture => &["png", "jpg", "jpeg"],
            AssetType::Animation | AssetType::Scene => &["json"],
        }
    }
}

/// Asset loader responsible for finding and reading asset files
#[derive(Debug, Clone)]
pub struct AssetLoader {
    base_path: PathBuf,
}

impl AssetLoader {
    /// Create a new asset loader with the given base path
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Get the full path for an asset
    pub fn resolve_path(&self, asset_type: AssetType, name: &str) -> PathBuf {
        self.base_path
            .join(asset_type.default_directory())
            .join(name)
    }

    /// Read a text asset (animation sheets, scenes)
    pub fn load_string(&self, asset_type: AssetType, name: &str) -> Result<String, AssetError> {
        let path = self.resolve_path(asset_type, name);

        if !path.exists() {
            return Err(AssetError::NotFound(path.to_string_lossy().to_string()));
        }

        std::fs::read_to_string(&path)
            .map_err(|e| AssetError::LoadError(format!("Failed to read {}: {}", name, e)))
    }

    /// Check if an asset exists
    pub fn exists(&self, asset_type: AssetType, name: &str) -> bool {
        self.resolve_path(asset_type, name).exists()
    }

    /// List all assets of a given type
    pub fn list_assets(&self, asset_type: AssetType) -> Result<Vec<String>, AssetError> {
        let dir = self.base_path.join(asset_type.default_directory());

        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut assets = Vec::new();
        let extensions = asset_type.extensions();

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let matches = path
                .extension()
                .is_some_and(|ext| extensions.contains(&ext.to_string_lossy().as_ref()));
            if matches {
                if let Some(name) = path.file_name() {
                    assets.push(name.to_string_lossy().to_string());
                }
            }
        }

        assets.sort();
        Ok(assets)
    }

    /// Get the base path
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}
