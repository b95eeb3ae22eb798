// Rendering: backend contract plus headless and wgpu implementations

pub mod gpu;
mod headless;

pub use gpu::WgpuRenderer;
pub use headless::{DrawCall, HeadlessRenderer};

use std::path::Path;

/// Opaque handle to a texture owned by a render backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) usize);

impl TextureHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A created texture and its pixel dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureInfo {
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
}

impl TextureInfo {
    /// Rectangle covering the whole texture
    pub fn full_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }
}

/// Axis-aligned rectangle in pixels, top-left origin, y down
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of the given size centered on (cx, cy)
    pub fn centered(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self::new(cx - w * 0.5, cy - h * 0.5, w, h)
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w * 0.5, self.y + self.h * 0.5)
    }
}

/// Linear RGBA color
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::rgb(0.1, 0.1, 0.15)
    }
}

/// Drawing surface the engine renders through.
///
/// Components only ever issue texture draws; pixels stay on the backend's
/// side.
pub trait RenderBackend {
    /// Load an image file into a texture
    fn create_texture(&mut self, path: &Path) -> anyhow::Result<TextureInfo>;

    /// Create a 1x1 texture of a single color
    fn create_color_texture(&mut self, name: &str, rgba: [u8; 4]) -> anyhow::Result<TextureInfo>;

    /// Start a frame filled with `color`
    fn clear(&mut self, color: Color);

    /// Draw the `src` region of `texture` into `dst` (both in pixels)
    fn draw_texture(&mut self, texture: TextureHandle, src: Rect, dst: Rect) -> anyhow::Result<()>;

    /// Show everything drawn since the last clear
    fn present(&mut self) -> anyhow::Result<()>;
}
