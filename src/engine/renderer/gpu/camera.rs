// Pixel-space 2D camera

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};

/// Orthographic camera over pixel coordinates, y pointing down.
///
/// `position` is the world point shown at the top-left corner of the window.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec2,
    /// 1.0 = one world pixel per screen pixel
    zoom: f32,
    viewport_width: f32,
    viewport_height: f32,
    view_proj: Mat4,
}

impl Camera {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        let mut camera = Self {
            position: Vec2::ZERO,
            zoom: 1.0,
            viewport_width,
            viewport_height,
            view_proj: Mat4::IDENTITY,
        };
        camera.update_view_proj();
        camera
    }

    fn visible_size(&self) -> Vec2 {
        Vec2::new(self.viewport_width, self.viewport_height) / self.zoom
    }

    fn update_view_proj(&mut self) {
        let size = self.visible_size();
        // Bottom is below top in y-down space
        self.view_proj = Mat4::orthographic_rh(
            self.position.x,
            self.position.x + size.x,
            self.position.y + size.y,
            self.position.y,
            -1.0,
            1.0,
        );
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.update_view_proj();
    }

    /// Move so `target` sits in the middle of the window
    pub fn center_on(&mut self, target: Vec2) {
        self.set_position(target - self.visible_size() * 0.5);
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.max(0.1);
        self.update_view_proj();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport_width = width;
        self.viewport_height = height;
        self.update_view_proj();
    }

    pub fn view_proj_matrix(&self) -> Mat4 {
        self.view_proj
    }

    pub fn screen_to_world(&self, screen_pos: Vec2) -> Vec2 {
        self.position + screen_pos / self.zoom
    }

    pub fn world_to_screen(&self, world_pos: Vec2) -> Vec2 {
        (world_pos - self.position) * self.zoom
    }

    /// Visible world rectangle
    pub fn viewport_bounds(&self) -> Viewport {
        Viewport {
            min: self.position,
            max: self.position + self.visible_size(),
        }
    }
}

/// Viewport bounds in world coordinates
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub min: Vec2,
    pub max: Vec2,
}

impl Viewport {
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Check if a rectangle intersects the viewport
    pub fn intersects_rect(&self, min: Vec2, max: Vec2) -> bool {
        max.x >= self.min.x && min.x <= self.max.x && max.y >= self.min.y && min.y <= self.max.y
    }
}

/// Camera uniform for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new(camera: &Camera) -> Self {
        Self {
            view_proj: camera.view_proj_matrix().to_cols_array_2d(),
        }
    }
}
