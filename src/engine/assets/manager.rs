// Resource cache shared by the engine and scene loading

use log::debug;
use std::collections::HashMap;
use std::path::Path;

use super::{AssetLoader, AssetType};
use crate::core::Result;
use crate::engine::renderer::{RenderBackend, TextureInfo};
use crate::engine::scene::{AnimationSheet, SceneDescription};

/// Caches textures and animation sheets by name.
///
/// Owned by the engine and passed where needed; textures are created
/// through whichever render backend the engine runs on.
pub struct ResourceManager {
    /// Asset loader
    loader: AssetLoader,

    /// Textures loaded from disk, by file name
    textures: HashMap<String, TextureInfo>,

    /// Generated single-color textures, by name
    color_textures: HashMap<String, TextureInfo>,

    /// Parsed animation sheets, by file name
    sheets: HashMap<String, AnimationSheet>,
}

impl ResourceManager {
    pub fn new<P: AsRef<Path>>(asset_path: P) -> Self {
        Self {
            loader: AssetLoader::new(asset_path),
            textures: HashMap::new(),
            color_textures: HashMap::new(),
            sheets: HashMap::new(),
        }
    }

    /// Texture for an image in the textures directory, loaded on first use
    pub fn texture(&mut self, renderer: &mut dyn RenderBackend, name: &str) -> Result<TextureInfo> {
        if let Some(info) = self.textures.get(name) {
            return Ok(*info);
        }

        let path = self.loader.resolve_path(AssetType::Texture, name);
        let info = renderer.create_texture(&path)?;
        debug!("Loaded texture '{}' ({}x{})", name, info.width, info.height);
        self.textures.insert(name.to_string(), info);
        Ok(info)
    }

    /// Single-color texture, created on first use
    pub fn color_texture(
        &mut self,
        renderer: &mut dyn RenderBackend,
        name: &str,
        rgba: [u8; 4],
    ) -> Result<TextureInfo> {
        if let Some(info) = self.color_textures.get(name) {
            return Ok(*info);
        }

        let info = renderer.create_color_texture(name, rgba)?;
        self.color_textures.insert(name.to_string(), info);
        Ok(info)
    }

    /// Animation sheet from the animations directory, parsed on first use
    pub fn animation_sheet(&mut self, name: &str) -> Result<AnimationSheet> {
        if let Some(sheet) = self.sheets.get(name) {
            return Ok(sheet.clone());
        }

        let json = self.loader.load_string(AssetType::Animation, name)?;
        let sheet = AnimationSheet::from_json_str(&json)?;
        debug!("Loaded animation sheet '{}'", name);
        self.sheets.insert(name.to_string(), sheet.clone());
        Ok(sheet)
    }

    /// Register a sheet built in code under `name`
    pub fn insert_animation_sheet(&mut self, name: &str, sheet: AnimationSheet) {
        self.sheets.insert(name.to_string(), sheet);
    }

    /// Scene description from the scenes directory
    pub fn scene(&self, name: &str) -> Result<SceneDescription> {
        let json = self.loader.load_string(AssetType::Scene, name)?;
        SceneDescription::from_json_str(&json)
    }

    /// Get statistics about loaded assets
    pub fn stats(&self) -> ResourceStats {
        ResourceStats {
            texture_count: self.textures.len() + self.color_textures.len(),
            sheet_count: self.sheets.len(),
        }
    }

    /// Drop every cached entry
    pub fn clear(&mut self) {
        self.textures.clear();
        self.color_textures.clear();
        self.sheets.clear();
    }

    /// Get the asset loader
    pub fn loader(&self) -> &AssetLoader {
        &self.loader
    }
}

/// Statistics about loaded assets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceStats {
    pub texture_count: usize,
    pub sheet_count: usize,
}
