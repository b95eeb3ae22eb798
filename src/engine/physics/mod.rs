// Physics system using rapier2d

pub mod body;
pub mod contact;
pub mod engine;
pub mod world;

pub use body::BodyKind;
pub use contact::{Contact, ContactEvent, FrameContacts};
pub use engine::{PhysicsEngine, PhysicsState, DEFAULT_GRAVITY, DEFAULT_SCALE};
pub use world::{BodyBinding, ColliderHandle, PhysicsWorld, RigidBodyHandle};
