// Scene graph: game objects, their components and scene descriptions

mod animator;
mod arena;
mod collider;
mod component;
mod game_object;
mod record;
mod script;
mod sprite_renderer;
mod tile_map;
mod transform;

pub use animator::{AnimationMode, AnimationRange, AnimationSheet, Animator};
pub use arena::{GameObjectArena, GameObjectId};
pub use collider::Collider;
pub use component::{Component, ComponentKind, CoreComponent, DuplicatePolicy};
pub use game_object::{FrameContext, GameObject};
pub use record::{ColliderRecord, EntityRecord, SceneDescription};
pub use script::{Command, Commands, Script, ScriptContext};
pub use sprite_renderer::SpriteRenderer;
pub use tile_map::TileMap;
pub use transform::{Transform, DEFAULT_SIZE};
