// Engine configuration

use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::{EngineError, Result, Vector2};
use crate::engine::renderer::Color;
use crate::engine::scene::DuplicatePolicy;

/// Engine settings, loadable from JSON. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// World gravity in simulation units, y down
    pub gravity: Vector2,
    /// Pixels per simulation unit
    pub scale: f32,
    /// Fixed update step in milliseconds
    pub fixed_timestep_ms: u32,
    /// Cap on fixed steps run for one rendered frame
    pub max_steps_per_frame: u32,
    pub duplicate_policy: DuplicatePolicy,
    /// Frames between sweeps of destroyed objects; 0 sweeps only on shutdown
    pub sweep_interval_frames: u32,
    pub clear_color: Color,
    pub asset_root: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "Rusted Engine".to_string(),
            width: 1280,
            height: 720,
            gravity: Vector2::new(0.0, 9.8),
            scale: 64.0,
            fixed_timestep_ms: 16,
            max_steps_per_frame: 5,
            duplicate_policy: DuplicatePolicy::Reject,
            sweep_interval_frames: 60,
            clear_color: Color::default(),
            asset_root: PathBuf::from("assets"),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| EngineError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_json_str(&json)?;
        info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(EngineError::Configuration(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        if self.fixed_timestep_ms == 0 {
            return Err(EngineError::Configuration(
                "fixed timestep must be at least 1 ms".to_string(),
            ));
        }
        if self.max_steps_per_frame == 0 {
            return Err(EngineError::Configuration(
                "max steps per frame must be at least 1".to_string(),
            ));
        }
        if !self.gravity.x.is_finite() || !self.gravity.y.is_finite() {
            return Err(EngineError::Configuration(format!(
                "gravity must be finite, got {}",
                self.gravity
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scale, 64.0);
        assert_eq!(config.fixed_timestep_ms, 16);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config =
            EngineConfig::from_json_str(r#"{ "title": "Demo", "scale": 32.0 }"#).unwrap();
        assert_eq!(config.title, "Demo");
        assert_eq!(config.scale, 32.0);
        assert_eq!(config.width, 1280);
        assert_eq!(config.gravity, Vector2::new(0.0, 9.8));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            EngineConfig::from_json_str(r#"{ "scale": 0.0 }"#),
            Err(EngineError::Configuration(_))
        ));
        assert!(EngineConfig::from_json_str(r#"{ "fixed_timestep_ms": 0 }"#).is_err());
        assert!(EngineConfig::from_json_str(r#"{ "width": "wide" }"#).is_err());
    }
}
