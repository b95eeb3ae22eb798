use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use log::debug;

use super::{Color, Rect, RenderBackend, TextureHandle, TextureInfo};

/// One recorded `draw_texture` call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub texture: TextureHandle,
    pub src: Rect,
    pub dst: Rect,
}

/// Render backend that draws nothing and records every call.
///
/// Image files are only probed for their dimensions, so scenes can be
/// loaded and stepped without a GPU.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    textures: Vec<TextureInfo>,
    by_path: HashMap<PathBuf, TextureInfo>,
    frame: Vec<DrawCall>,
    last_presented: Vec<DrawCall>,
    clear_color: Option<Color>,
    presented_frames: u64,
    /// Fail the next `present` (used to exercise error paths)
    fail_next_present: bool,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, width: u32, height: u32) -> TextureInfo {
        let info = TextureInfo {
            handle: TextureHandle(self.textures.len()),
            width,
            height,
        };
        self.textures.push(info);
        info
    }

    /// Draw calls issued since the last clear
    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.frame
    }

    /// Draw calls of the most recently presented frame
    pub fn last_frame(&self) -> &[DrawCall] {
        &self.last_presented
    }

    pub fn clear_color(&self) -> Option<Color> {
        self.clear_color
    }

    pub fn presented_frames(&self) -> u64 {
        self.presented_frames
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn fail_next_present(&mut self) {
        self.fail_next_present = true;
    }
}

impl RenderBackend for HeadlessRenderer {
    fn create_texture(&mut self, path: &Path) -> Result<TextureInfo> {
        if let Some(info) = self.by_path.get(path) {
            return Ok(*info);
        }
        let (width, height) = image::image_dimensions(path)?;
        let info = self.register(width, height);
        self.by_path.insert(path.to_path_buf(), info);
        debug!("Headless texture {:?} ({}x{})", path, width, height);
        Ok(info)
    }

    fn create_color_texture(&mut self, name: &str, _rgba: [u8; 4]) -> Result<TextureInfo> {
        debug!("Headless color texture '{}'", name);
        Ok(self.register(1, 1))
    }

    fn clear(&mut self, color: Color) {
        self.frame.clear();
        self.clear_color = Some(color);
    }

    fn draw_texture(&mut self, texture: TextureHandle, src: Rect, dst: Rect) -> Result<()> {
        if texture.0 >= self.textures.len() {
            bail!("Unknown texture handle {}", texture.0);
        }
        self.frame.push(DrawCall { texture, src, dst });
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        if std::mem::take(&mut self.fail_next_present) {
            bail!("Surface lost");
        }
        self.last_presented = std::mem::take(&mut self.frame);
        self.presented_frames += 1;
        Ok(())
    }
}
