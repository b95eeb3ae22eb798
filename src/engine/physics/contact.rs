use rapier2d::prelude::*;
use std::sync::{Arc, Mutex};

use crate::core::Vector2;
use crate::engine::scene::GameObjectId;

/// A recorded overlap between two bodies for the current simulation step.
///
/// Only valid until the next `PhysicsEngine::update`; keep the id, not the
/// contact, if something must outlive the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    /// The other game object taking part in the contact
    pub other: GameObjectId,
    /// Contact points in pixel space (empty for sensor overlaps)
    pub points: Vec<Vector2>,
}

/// Contacts recorded against one body during a step.
/// `solid` and `sensor` never share a pair.
#[derive(Debug, Clone, Default)]
pub struct FrameContacts {
    pub solid: Vec<Contact>,
    pub sensor: Vec<Contact>,
}

/// Contact lifecycle event resolved to game objects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactEvent {
    /// Two objects started touching (or overlapping, for sensors)
    Began {
        a: GameObjectId,
        b: GameObjectId,
        sensor: bool,
    },

    /// Two objects stopped touching
    Ended {
        a: GameObjectId,
        b: GameObjectId,
        sensor: bool,
    },
}

impl ContactEvent {
    /// Whether `id` takes part in this event
    pub fn involves(&self, id: GameObjectId) -> bool {
        match *self {
            ContactEvent::Began { a, b, .. } | ContactEvent::Ended { a, b, .. } => {
                a == id || b == id
            }
        }
    }
}

/// Raw collider-level event captured during the rapier step
#[derive(Debug, Clone, Copy)]
pub enum CollisionEvent {
    Started {
        collider1: ColliderHandle,
        collider2: ColliderHandle,
        sensor: bool,
    },
    Stopped {
        collider1: ColliderHandle,
        collider2: ColliderHandle,
        sensor: bool,
    },
}

/// Queue for storing collision events during physics step
pub struct CollisionEventQueue {
    events: Arc<Mutex<Vec<CollisionEvent>>>,
}

impl CollisionEventQueue {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::with_capacity(32))),
        }
    }

    /// Clear all events (call at start of physics step)
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    /// Get all collision events from this step
    pub fn events(&self) -> Vec<CollisionEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    fn push(&self, event: CollisionEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl Default for CollisionEventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for CollisionEventQueue {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: rapier2d::prelude::CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        match event {
            rapier2d::prelude::CollisionEvent::Started(h1, h2, flags) => {
                self.push(CollisionEvent::Started {
                    collider1: h1,
                    collider2: h2,
                    sensor: flags.contains(CollisionEventFlags::SENSOR),
                });
            }
            rapier2d::prelude::CollisionEvent::Stopped(h1, h2, flags) => {
                self.push(CollisionEvent::Stopped {
                    collider1: h1,
                    collider2: h2,
                    sensor: flags.contains(CollisionEventFlags::SENSOR),
                });
            }
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_queue_clear() {
        let queue = CollisionEventQueue::new();
        queue.push(CollisionEvent::Started {
            collider1: ColliderHandle::invalid(),
            collider2: ColliderHandle::invalid(),
            sensor: false,
        });
        assert_eq!(queue.events().len(), 1);

        queue.clear();
        assert!(queue.events().is_empty());
    }

    #[test]
    fn test_contact_event_involves() {
        let a = GameObjectId::from_bits(1);
        let b = GameObjectId::from_bits(2);
        let c = GameObjectId::from_bits(3);
        let event = ContactEvent::Began { a, b, sensor: false };

        assert!(event.involves(a));
        assert!(event.involves(b));
        assert!(!event.involves(c));
    }
}
