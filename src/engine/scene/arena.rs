use std::fmt;

use super::game_object::GameObject;

/// Generational handle to a game object owned by a [`GameObjectArena`].
///
/// A handle whose slot was freed and reused no longer resolves: the slot's
/// generation moved on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameObjectId {
    index: u32,
    generation: u32,
}

impl GameObjectId {
    /// Handle carried by objects that no arena owns yet
    pub const NULL: GameObjectId = GameObjectId {
        index: u32::MAX,
        generation: u32::MAX,
    };

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    /// Pack into 64 bits: generation in the high half, index in the low half
    pub fn to_bits(self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }

    pub fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl fmt::Display for GameObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GameObject({}v{})", self.index, self.generation)
    }
}

struct Slot {
    generation: u32,
    object: Option<GameObject>,
}

/// Slot storage for every game object the engine owns.
///
/// Objects keep their slot while destroyed; only [`GameObjectArena::remove`]
/// frees the slot, after which the old handle is stale.
#[derive(Default)]
pub struct GameObjectArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    /// Live handles in creation order
    order: Vec<GameObjectId>,
}

impl GameObjectArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `object` and return its handle
    pub fn insert(&mut self, mut object: GameObject) -> GameObjectId {
        let id = match self.free.pop() {
            Some(index) => GameObjectId {
                index,
                generation: self.slots[index as usize].generation,
            },
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    object: None,
                });
                GameObjectId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };

        object.assign_id(id);
        self.slots[id.index as usize].object = Some(object);
        self.order.push(id);
        id
    }

    pub fn get(&self, id: GameObjectId) -> Option<&GameObject> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.object.as_ref()
    }

    pub fn get_mut(&mut self, id: GameObjectId) -> Option<&mut GameObject> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.object.as_mut()
    }

    pub fn contains(&self, id: GameObjectId) -> bool {
        self.get(id).is_some()
    }

    /// Free the slot and hand the object back. The handle becomes stale.
    pub fn remove(&mut self, id: GameObjectId) -> Option<GameObject> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let object = slot.object.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.order.retain(|other| *other != id);
        Some(object)
    }

    /// Snapshot of every resident handle (destroyed ones included), in
    /// creation order
    pub fn ids(&self) -> Vec<GameObjectId> {
        self.order.clone()
    }

    /// Snapshot of the handles of objects that are not destroyed
    pub fn live_ids(&self) -> Vec<GameObjectId> {
        self.iter()
            .filter(|(_, object)| !object.is_destroyed())
            .map(|(id, _)| id)
            .collect()
    }

    /// Handles of destroyed objects still holding a slot
    pub fn destroyed_ids(&self) -> Vec<GameObjectId> {
        self.iter()
            .filter(|(_, object)| object.is_destroyed())
            .map(|(id, _)| id)
            .collect()
    }

    /// Resident objects in creation order
    pub fn iter(&self) -> impl Iterator<Item = (GameObjectId, &GameObject)> + '_ {
        self.order
            .iter()
            .filter_map(move |&id| self.get(id).map(|object| (id, object)))
    }

    /// Number of resident objects, destroyed ones included
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_assigns_id() {
        let mut arena = GameObjectArena::new();
        let id = arena.insert(GameObject::new("player"));

        assert!(!id.is_null());
        let object = arena.get(id).unwrap();
        assert_eq!(object.id(), id);
        assert_eq!(object.tag(), "player");
    }

    #[test]
    fn test_stale_handle_does_not_resolve() {
        let mut arena = GameObjectArena::new();
        let old = arena.insert(GameObject::new("a"));
        arena.remove(old).unwrap();

        let new = arena.insert(GameObject::new("b"));
        assert_eq!(new.index(), old.index());
        assert_ne!(new.generation(), old.generation());
        assert!(arena.get(old).is_none());
        assert_eq!(arena.get(new).unwrap().tag(), "b");
        assert!(arena.remove(old).is_none());
    }

    #[test]
    fn test_destroyed_objects_stay_resident() {
        let mut arena = GameObjectArena::new();
        let a = arena.insert(GameObject::new("a"));
        let b = arena.insert(GameObject::new("b"));
        arena.get_mut(a).unwrap().destroy();

        assert!(arena.contains(a));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.live_ids(), vec![b]);
        assert_eq!(arena.destroyed_ids(), vec![a]);
    }

    #[test]
    fn test_ids_keep_creation_order() {
        let mut arena = GameObjectArena::new();
        let ids: Vec<_> = (0..4)
            .map(|i| arena.insert(GameObject::new(&format!("o{}", i))))
            .collect();
        arena.remove(ids[1]);

        assert_eq!(arena.ids(), vec![ids[0], ids[2], ids[3]]);
    }

    #[test]
    fn test_bits_roundtrip() {
        let mut arena = GameObjectArena::new();
        let first = arena.insert(GameObject::new("a"));
        arena.remove(first);
        let id = arena.insert(GameObject::new("b"));

        assert_eq!(GameObjectId::from_bits(id.to_bits()), id);
        assert_eq!(id.to_string(), "GameObject(0v1)");
    }
}
