// rusted-engine: a 2D game engine runtime
//
// Game objects own components (Transform, SpriteRenderer, Animator, Collider,
// scripts); a rapier2d-backed PhysicsEngine simulates their bodies and the
// Engine keeps both sides in sync every frame:
// Input -> PhysicsEngine::update -> GameObject::update -> render.

pub mod core;
pub mod engine;

pub use crate::core::{EngineError, Result, Vector2};
pub use crate::engine::app::Engine;
pub use crate::engine::config::EngineConfig;
