use crate::core::{EngineError, Result, Vector2};
use crate::engine::physics::PhysicsEngine;

use super::arena::GameObjectId;

/// Default collision extent of an object, one 64px tile
pub const DEFAULT_SIZE: Vector2 = Vector2::new(64.0, 64.0);

/// Logical placement of a game object.
///
/// `position` is the object's center in pixels and the single value the
/// renderer reads. Game logic writes it with [`Transform::set_position`];
/// once a body is bound the physics pull overwrites it every update, after
/// any pending write has been pushed to the body.
#[derive(Debug, Clone)]
pub struct Transform {
    pub(crate) owner: Option<GameObjectId>,
    position: Vector2,
    scale: Vector2,
    size: Vector2,
    pending_position: Option<Vector2>,
    pending_size: bool,
}

impl Transform {
    pub fn new() -> Self {
        Self {
            owner: None,
            position: Vector2::ZERO,
            scale: Vector2::ONE,
            size: DEFAULT_SIZE,
            pending_position: None,
            pending_size: false,
        }
    }

    /// Transform centered at (x, y)
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Vector2::new(x, y),
            ..Self::new()
        }
    }

    /// Builder: full collision extent in pixels
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.size = Vector2::new(width, height);
        self
    }

    pub fn owner(&self) -> Option<GameObjectId> {
        self.owner
    }

    pub fn position(&self) -> Vector2 {
        self.position
    }

    /// Move the object. A bound body is teleported at the next update.
    pub fn set_position(&mut self, position: Vector2) {
        self.position = position;
        self.pending_position = Some(position);
    }

    pub fn scale(&self) -> Vector2 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vector2) {
        self.scale = scale;
        self.pending_size = true;
    }

    /// Full collision extent in pixels, before scale
    pub fn size(&self) -> Vector2 {
        self.size
    }

    pub fn set_size(&mut self, size: Vector2) {
        self.size = size;
        self.pending_size = true;
    }

    /// Collision extent after the transform scale
    pub fn scaled_size(&self) -> Vector2 {
        self.size.scaled(self.scale)
    }

    /// Apply a force to the bound body for the next physics step
    pub fn apply_force(&self, physics: &mut PhysicsEngine, force: Vector2) -> Result<()> {
        physics.apply_force(self.bound_owner()?, force)
    }

    /// Apply an impulse to the bound body
    pub fn apply_impulse(&self, physics: &mut PhysicsEngine, impulse: Vector2) -> Result<()> {
        physics.apply_impulse(self.bound_owner()?, impulse)
    }

    fn bound_owner(&self) -> Result<GameObjectId> {
        self.owner.ok_or_else(|| {
            EngineError::InvalidState("transform is not attached to a game object".to_string())
        })
    }

    pub(crate) fn take_pending_position(&mut self) -> Option<Vector2> {
        self.pending_position.take()
    }

    pub(crate) fn take_pending_size(&mut self) -> bool {
        std::mem::take(&mut self.pending_size)
    }

    /// Queue every body-facing value for the next push
    pub(crate) fn mark_pending(&mut self) {
        self.pending_position = Some(self.position);
        self.pending_size = true;
    }

    pub(crate) fn clear_pending(&mut self) {
        self.pending_position = None;
        self.pending_size = false;
    }

    /// Write the position reported by the physics body
    pub(crate) fn pull_position(&mut self, position: Vector2) {
        self.position = position;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
