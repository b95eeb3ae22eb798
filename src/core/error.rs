// Engine error taxonomy

use crate::engine::assets::AssetError;
use crate::engine::scene::ComponentKind;

/// Errors raised by engine bookkeeping and configuration.
///
/// Wiring mistakes (missing components, double registration, late world
/// configuration) surface here synchronously; they are never swallowed.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Component not found: {0}")]
    NotFound(ComponentKind),

    #[error("Component already attached: {0}")]
    DuplicateComponent(ComponentKind),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Scene error: {0}")]
    Scene(String),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl EngineError {
    /// Whether this error belongs to the invalid-state class
    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidState(_) | EngineError::DuplicateComponent(_)
        )
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Scene(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::NotFound(ComponentKind::Animator);
        assert_eq!(err.to_string(), "Component not found: Animator");

        let err = EngineError::Configuration("scale locked".to_string());
        assert_eq!(err.to_string(), "Configuration error: scale locked");
    }

    #[test]
    fn test_invalid_state_class() {
        assert!(EngineError::DuplicateComponent(ComponentKind::Transform).is_invalid_state());
        assert!(EngineError::InvalidState("x".into()).is_invalid_state());
        assert!(!EngineError::Configuration("x".into()).is_invalid_state());
    }
}
