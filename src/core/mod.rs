// Core types shared by every engine subsystem

pub mod error;
pub mod math;

pub use error::{EngineError, Result};
pub use math::Vector2;
