// Asset management
//
// Finds asset files under one root and caches what the engine loads from them.

mod loader;
mod manager;

pub use loader::{AssetLoader, AssetType};
pub use manager::{ResourceManager, ResourceStats};

/// Asset loading errors
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Failed to load asset: {0}")]
    LoadError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
