use crate::core::Vector2;
use crate::engine::renderer::{Rect, RenderBackend, TextureHandle, TextureInfo};

use super::animator::Animator;
use super::arena::GameObjectId;
use super::transform::Transform;

/// Draws a texture region centered on the owning object
#[derive(Debug, Clone)]
pub struct SpriteRenderer {
    pub(crate) owner: Option<GameObjectId>,
    texture: Option<TextureHandle>,
    src: Rect,
    /// On-screen size in pixels before the transform scale
    size: Vector2,
    /// Offset from the object's center
    pub offset: Vector2,
    pub visible: bool,
}

impl SpriteRenderer {
    /// Renderer without a texture; draws nothing until one is set
    pub fn new() -> Self {
        Self {
            owner: None,
            texture: None,
            src: Rect::new(0.0, 0.0, 64.0, 64.0),
            size: Vector2::new(64.0, 64.0),
            offset: Vector2::ZERO,
            visible: true,
        }
    }

    /// Renderer showing the whole texture at its native size
    pub fn with_texture(texture: TextureInfo) -> Self {
        let mut sprite = Self::new();
        sprite.set_sprite(texture);
        sprite
    }

    /// Show the whole texture at its native size
    pub fn set_sprite(&mut self, texture: TextureInfo) {
        self.texture = Some(texture.handle);
        self.src = texture.full_rect();
        self.size = Vector2::new(texture.width as f32, texture.height as f32);
    }

    /// Show only the `src` region of `texture`
    pub fn set_sprite_detail(&mut self, texture: TextureHandle, src: Rect) {
        self.texture = Some(texture);
        self.src = src;
    }

    pub fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    pub fn src(&self) -> Rect {
        self.src
    }

    pub fn sprite_size(&self) -> Vector2 {
        self.size
    }

    pub fn set_sprite_size(&mut self, size: Vector2) {
        self.size = size;
    }

    /// Screen rectangle for an object placed by `transform`
    pub fn dst_rect(&self, transform: &Transform) -> Rect {
        let center = transform.position() + self.offset;
        let size = self.size.scaled(transform.scale());
        Rect::centered(center.x, center.y, size.x, size.y)
    }

    pub(crate) fn render(
        &self,
        transform: &Transform,
        animator: Option<&Animator>,
        renderer: &mut dyn RenderBackend,
    ) -> anyhow::Result<()> {
        let Some(texture) = self.texture else {
            return Ok(());
        };
        if !self.visible {
            return Ok(());
        }
        // A playing animation picks the frame
        let src = animator
            .and_then(|animator| animator.frame_rect())
            .unwrap_or(self.src);
        renderer.draw_texture(texture, src, self.dst_rect(transform))
    }
}

impl Default for SpriteRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::renderer::HeadlessRenderer;

    #[test]
    fn test_dst_rect_is_centered_and_scaled() {
        let mut sprite = SpriteRenderer::new();
        sprite.set_sprite_size(Vector2::new(32.0, 32.0));
        sprite.offset = Vector2::new(0.0, -8.0);
        let mut transform = Transform::at(100.0, 100.0);
        transform.set_scale(Vector2::new(2.0, 1.0));

        assert_eq!(
            sprite.dst_rect(&transform),
            Rect::new(68.0, 76.0, 64.0, 32.0)
        );
    }

    #[test]
    fn test_render_without_texture_draws_nothing() {
        let mut renderer = HeadlessRenderer::new();
        SpriteRenderer::new()
            .render(&Transform::new(), None, &mut renderer)
            .unwrap();
        assert!(renderer.draw_calls().is_empty());
    }

    #[test]
    fn test_render_issues_draw() {
        let mut renderer = HeadlessRenderer::new();
        let texture = renderer.create_color_texture("blue", [0, 0, 255, 255]).unwrap();
        let sprite = SpriteRenderer::with_texture(texture);

        sprite
            .render(&Transform::at(10.0, 10.0), None, &mut renderer)
            .unwrap();
        let calls = renderer.draw_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].src, Rect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(calls[0].dst, Rect::new(9.5, 9.5, 1.0, 1.0));
    }
}
