// Already-parsed descriptions of scene content

use serde::{Deserialize, Serialize};

use crate::core::{EngineError, Result, Vector2};
use crate::engine::physics::BodyKind;

use super::animator::AnimationMode;
use super::tile_map::TileMap;

/// Collider settings of an entity record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColliderRecord {
    pub is_sensor: bool,
    pub scale: f32,
    pub sensor_scale: Option<f32>,
}

impl Default for ColliderRecord {
    fn default() -> Self {
        Self {
            is_sensor: false,
            scale: 1.0,
            sensor_scale: None,
        }
    }
}

/// One entity to create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub tag: String,
    /// Center in pixels
    pub position: Vector2,
    /// Collision extent in pixels; defaults to one 64px tile
    #[serde(default)]
    pub size: Option<Vector2>,
    /// Sprite image name in the textures directory
    #[serde(default)]
    pub sprite: Option<String>,
    /// On-screen sprite size; defaults to the image size
    #[serde(default)]
    pub sprite_size: Option<Vector2>,
    /// Animation sheet name in the animations directory
    #[serde(default)]
    pub animation: Option<String>,
    /// Animation played when the entity starts
    #[serde(default)]
    pub autoplay: Option<String>,
    #[serde(default = "default_mode")]
    pub autoplay_mode: AnimationMode,
    #[serde(default)]
    pub collider: ColliderRecord,
    /// Body to create; `None` leaves the entity out of the simulation
    #[serde(default)]
    pub body: Option<BodyKind>,
}

fn default_mode() -> AnimationMode {
    AnimationMode::Loop
}

impl EntityRecord {
    /// Dynamic entity at `position` with default settings
    pub fn new(tag: &str, position: Vector2) -> Self {
        Self {
            tag: tag.to_string(),
            position,
            size: None,
            sprite: None,
            sprite_size: None,
            animation: None,
            autoplay: None,
            autoplay_mode: default_mode(),
            collider: ColliderRecord::default(),
            body: Some(BodyKind::Dynamic),
        }
    }
}

/// Initial content of a scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub gravity: Option<Vector2>,
    #[serde(default)]
    pub scale: Option<f32>,
    #[serde(default)]
    pub tile_map: Option<TileMap>,
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
}

impl SceneDescription {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let scene: SceneDescription = serde_json::from_str(json)?;
        if let Some(map) = &scene.tile_map {
            map.validate()?;
        }
        if let Some(scale) = scene.scale {
            if scale <= 0.0 {
                return Err(EngineError::Scene(format!(
                    "scene scale must be positive, got {}",
                    scale
                )));
            }
        }
        Ok(scene)
    }
}
