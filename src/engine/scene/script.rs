// User behavior attached to game objects

use crate::core::{Result, Vector2};
use crate::engine::game_loop::Clock;
use crate::engine::input::{InputHandler, KeyCode};
use crate::engine::physics::{ContactEvent, PhysicsEngine};
use crate::engine::renderer::RenderBackend;

use super::arena::GameObjectId;
use super::game_object::GameObject;
use super::record::EntityRecord;

/// Engine-level request queued during a frame and applied at its end
#[derive(Debug)]
pub enum Command {
    Spawn(GameObject),
    SpawnRecord(EntityRecord),
    Destroy(GameObjectId),
    Halt(u32),
    Quit,
}

/// Deferred engine requests issued while objects are being iterated
#[derive(Debug, Default)]
pub struct Commands {
    queue: Vec<Command>,
}

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `object` to the engine once the frame ends
    pub fn spawn(&mut self, object: GameObject) {
        self.queue.push(Command::Spawn(object));
    }

    pub fn spawn_record(&mut self, record: EntityRecord) {
        self.queue.push(Command::SpawnRecord(record));
    }

    /// Destroy `id` once the frame ends
    pub fn destroy(&mut self, id: GameObjectId) {
        self.queue.push(Command::Destroy(id));
    }

    pub fn halt(&mut self, ms: u32) {
        self.queue.push(Command::Halt(ms));
    }

    pub fn quit(&mut self) {
        self.queue.push(Command::Quit);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub(crate) fn drain(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.queue)
    }
}

/// Everything a script may touch while it runs
pub struct ScriptContext<'a> {
    /// The object the script is attached to
    pub object: &'a mut GameObject,
    pub physics: &'a mut PhysicsEngine,
    pub input: &'a InputHandler,
    pub clock: &'a Clock,
    pub commands: &'a mut Commands,
    /// Frame delta in milliseconds
    pub dt_ms: u32,
}

impl ScriptContext<'_> {
    pub fn id(&self) -> GameObjectId {
        self.object.id()
    }

    pub fn key_down(&self, key: KeyCode) -> bool {
        self.input.get_key_down(key)
    }

    pub fn key_held(&self, key: KeyCode) -> bool {
        self.input.is_key_held(key)
    }

    /// Force on this object's body for the next step
    pub fn apply_force(&mut self, force: Vector2) -> Result<()> {
        self.physics.apply_force(self.object.id(), force)
    }

    pub fn apply_impulse(&mut self, impulse: Vector2) -> Result<()> {
        self.physics.apply_impulse(self.object.id(), impulse)
    }

    pub fn velocity(&self) -> Result<Vector2> {
        self.physics.get_object_linear_velocity(self.object.id())
    }

    pub fn set_velocity(&mut self, velocity: Vector2) -> Result<()> {
        self.physics
            .set_object_linear_velocity(self.object.id(), velocity)
    }

    /// Contact begin/end events from the last physics step involving this object
    pub fn contact_events(&self) -> impl Iterator<Item = &ContactEvent> + '_ {
        let id = self.object.id();
        self.physics
            .contact_events()
            .iter()
            .filter(move |event| event.involves(id))
    }

    /// Objects that started touching (or entered) this one during the last step
    pub fn contacts_began(&self) -> impl Iterator<Item = GameObjectId> + '_ {
        let id = self.object.id();
        self.contact_events().filter_map(move |event| match *event {
            ContactEvent::Began { a, b, .. } if a == id => Some(b),
            ContactEvent::Began { a, .. } => Some(a),
            ContactEvent::Ended { .. } => None,
        })
    }

    /// Mark this object destroyed right away; it stops updating this frame
    pub fn destroy_self(&mut self) {
        self.object.destroy();
    }
}

/// User-defined behavior. Hooks run in the object's attachment order.
pub trait Script {
    /// Called once before the first update
    fn start(&mut self, _ctx: &mut ScriptContext<'_>) -> Result<()> {
        Ok(())
    }

    fn update(&mut self, ctx: &mut ScriptContext<'_>) -> Result<()>;

    /// Extra drawing after the object's sprite
    fn render(&self, _object: &GameObject, _renderer: &mut dyn RenderBackend) -> anyhow::Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "script"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_drain_in_order() {
        let mut commands = Commands::new();
        commands.destroy(GameObjectId::from_bits(1));
        commands.halt(500);
        commands.quit();
        assert_eq!(commands.len(), 3);

        let drained = commands.drain();
        assert!(commands.is_empty());
        assert!(matches!(drained[0], Command::Destroy(_)));
        assert!(matches!(drained[1], Command::Halt(500)));
        assert!(matches!(drained[2], Command::Quit));
    }
}
