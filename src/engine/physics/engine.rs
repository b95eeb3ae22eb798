// Game-object level physics: body lifecycle, world configuration and
// per-step contact snapshots on top of the rapier-backed PhysicsWorld.

use log::{debug, info, warn};
use rapier2d::prelude::*;
use std::collections::HashMap;

use super::body::BodyKind;
use super::contact::{CollisionEvent, Contact, ContactEvent, FrameContacts};
use super::world::{BodyBinding, BodyDesc, ColliderHandle, PhysicsWorld, RigidBodyHandle};
use crate::core::{EngineError, Result, Vector2};
use crate::engine::scene::{Collider, ComponentKind, GameObject, GameObjectId};

/// Default world scale: pixels per simulation unit (one 64px tile = 1 unit)
pub const DEFAULT_SCALE: f32 = 64.0;

/// Default gravity in simulation units, pointing down the screen
pub const DEFAULT_GRAVITY: Vector2 = Vector2::new(0.0, 9.8);

/// Whether world-level configuration is still open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicsState {
    /// No body has been created yet; gravity and scale may change
    Uninitialized,
    /// At least one body exists; gravity and scale are locked
    Running,
}

/// Owns the simulated world and binds its bodies 1:1 to game objects.
///
/// Units: positions, sizes and velocities are in pixels and converted with
/// the world scale; gravity, forces and impulses are in simulation units.
pub struct PhysicsEngine {
    world: PhysicsWorld,
    scale: f32,
    gravity: Vector2,
    state: PhysicsState,
    bindings: HashMap<GameObjectId, BodyBinding>,
    contacts: HashMap<GameObjectId, FrameContacts>,
    events: Vec<ContactEvent>,
}

impl PhysicsEngine {
    pub fn new() -> Self {
        Self::with_gravity(DEFAULT_GRAVITY)
    }

    pub fn with_gravity(gravity: Vector2) -> Self {
        Self {
            world: PhysicsWorld::with_gravity(vector![gravity.x, gravity.y]),
            scale: DEFAULT_SCALE,
            gravity,
            state: PhysicsState::Uninitialized,
            bindings: HashMap::new(),
            contacts: HashMap::new(),
            events: Vec::new(),
        }
    }

    /// Set world gravity. Rejected once any body exists.
    pub fn set_gravity(&mut self, gravity: Vector2) -> Result<()> {
        self.ensure_configurable("gravity")?;
        self.gravity = gravity;
        self.world.set_gravity(vector![gravity.x, gravity.y]);
        debug!("Physics gravity set to {}", gravity);
        Ok(())
    }

    /// Set pixels per simulation unit. For tile-based games this is the tile
    /// width. Rejected once any body exists.
    pub fn set_scale_factor(&mut self, scale: f32) -> Result<()> {
        self.ensure_configurable("scale factor")?;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(EngineError::Configuration(format!(
                "scale factor must be positive, got {}",
                scale
            )));
        }
        self.scale = scale;
        debug!("Physics scale factor set to {}", scale);
        Ok(())
    }

    fn ensure_configurable(&self, what: &str) -> Result<()> {
        if self.state == PhysicsState::Running {
            warn!("Rejected {} change after bodies were created", what);
            return Err(EngineError::Configuration(format!(
                "{} cannot change after bodies exist",
                what
            )));
        }
        Ok(())
    }

    pub fn state(&self) -> PhysicsState {
        self.state
    }

    pub fn gravity(&self) -> Vector2 {
        self.gravity
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale
    }

    /// Create a dynamic body sized from the object's Transform and Collider
    pub fn add_game_object(&mut self, object: &mut GameObject) -> Result<()> {
        self.add_body(object, BodyKind::Dynamic)
    }

    /// Create a static, gravity-immune body for level geometry
    pub fn add_tile(&mut self, object: &mut GameObject) -> Result<()> {
        self.add_body(object, BodyKind::Static)
    }

    /// Create a body of the given kind and bind it to `object`
    pub fn add_body(&mut self, object: &mut GameObject, kind: BodyKind) -> Result<()> {
        let id = object.id();
        if id.is_null() {
            return Err(EngineError::InvalidState(
                "game object is not owned by an engine".to_string(),
            ));
        }
        if object.physical_body().is_some() || self.bindings.contains_key(&id) {
            return Err(EngineError::InvalidState(format!(
                "{} already has a physical body",
                id
            )));
        }

        let transform = object
            .transform()
            .ok_or(EngineError::NotFound(ComponentKind::Transform))?;
        let default_collider = Collider::new();
        let collider = object.collider().unwrap_or(&default_collider);

        let extent = transform.size().scaled(transform.scale())
            * collider.scale(collider.is_sensor());
        let half = self.half_extents(extent);
        let center = transform.position() * (1.0 / self.scale);

        let binding = self.world.create_body(BodyDesc {
            kind,
            position: vector![center.x, center.y],
            half_extents: vector![half.x, half.y],
            sensor: collider.is_sensor(),
            density: collider.density(),
            friction: collider.friction(),
            user_data: id.to_bits() as u128,
        });

        self.bindings.insert(id, binding);
        object.set_physical_body(Some(binding.body));
        if let Some(transform) = object.transform_mut() {
            transform.clear_pending();
        }
        if let Some(collider) = object.collider_mut() {
            collider.clear_pending();
        }

        if self.state == PhysicsState::Uninitialized {
            info!("Physics world running (scale {})", self.scale);
            self.state = PhysicsState::Running;
        }
        debug!("Added {:?} body for {} ('{}')", kind, id, object.tag());
        Ok(())
    }

    /// Destroy the object's body and clear its binding
    pub fn remove_game_object(&mut self, object: &mut GameObject) -> Result<()> {
        self.remove_body(object.id())?;
        object.set_physical_body(None);
        Ok(())
    }

    /// Destroy the body bound to `id`
    pub(crate) fn remove_body(&mut self, id: GameObjectId) -> Result<()> {
        let binding = self
            .bindings
            .remove(&id)
            .ok_or_else(|| unbound(id))?;
        self.world.destroy_body(binding.body);
        self.contacts.remove(&id);
        debug!("Removed body for {}", id);
        Ok(())
    }

    /// Advance the simulated world by exactly `duration` seconds and record
    /// this step's contacts
    pub fn update(&mut self, duration: f32) {
        self.world.step(duration);

        // Forces last for a single step
        for binding in self.bindings.values() {
            if let Some(body) = self.world.body_mut(binding.body) {
                body.reset_forces(false);
            }
        }

        self.collect_contacts();
        self.collect_events();
    }

    fn collect_contacts(&mut self) {
        self.contacts.clear();
        for (&id, binding) in &self.bindings {
            let mut frame = FrameContacts::default();
            let self_sensor = self.world.is_sensor(binding.collider);

            if !self_sensor {
                for (other_collider, points) in self.world.active_contacts(binding.collider) {
                    if self.world.is_sensor(other_collider) {
                        continue;
                    }
                    let Some(other) = self.owner_of(other_collider) else {
                        continue;
                    };
                    let points = points
                        .iter()
                        .map(|p| Vector2::new(p.x * self.scale, p.y * self.scale))
                        .collect();
                    frame.solid.push(Contact { other, points });
                }
            }

            for other_collider in self.world.intersections(binding.collider) {
                if let Some(other) = self.owner_of(other_collider) {
                    frame.sensor.push(Contact {
                        other,
                        points: Vec::new(),
                    });
                }
            }

            frame.solid.sort_by_key(|c| c.other.to_bits());
            frame.sensor.sort_by_key(|c| c.other.to_bits());
            self.contacts.insert(id, frame);
        }
    }

    fn collect_events(&mut self) {
        self.events.clear();
        for event in self.world.collision_events() {
            let (c1, c2, sensor, began) = match event {
                CollisionEvent::Started {
                    collider1,
                    collider2,
                    sensor,
                } => (collider1, collider2, sensor, true),
                CollisionEvent::Stopped {
                    collider1,
                    collider2,
                    sensor,
                } => (collider1, collider2, sensor, false),
            };
            // Removed colliders can no longer be resolved
            let (Some(a), Some(b)) = (self.owner_of(c1), self.owner_of(c2)) else {
                continue;
            };
            self.events.push(if began {
                ContactEvent::Began { a, b, sensor }
            } else {
                ContactEvent::Ended { a, b, sensor }
            });
        }
    }

    /// Resolve a collider back to its game object via the body's user data
    fn owner_of(&self, collider: ColliderHandle) -> Option<GameObjectId> {
        self.world
            .collider_owner_data(collider)
            .map(|data| GameObjectId::from_bits(data as u64))
    }

    fn binding(&self, id: GameObjectId) -> Result<BodyBinding> {
        self.bindings.get(&id).copied().ok_or_else(|| unbound(id))
    }

    fn body(&self, id: GameObjectId) -> Result<&RigidBody> {
        let binding = self.binding(id)?;
        self.world.body(binding.body).ok_or_else(|| unbound(id))
    }

    fn body_mut(&mut self, id: GameObjectId) -> Result<&mut RigidBody> {
        let binding = self.binding(id)?;
        self.world.body_mut(binding.body).ok_or_else(|| unbound(id))
    }

    fn collider_mut(&mut self, id: GameObjectId) -> Result<&mut rapier2d::prelude::Collider> {
        let binding = self.binding(id)?;
        self.world
            .collider_mut(binding.collider)
            .ok_or_else(|| unbound(id))
    }

    /// Teleport the body's center to `center` (pixels)
    pub fn set_position(&mut self, id: GameObjectId, center: Vector2) -> Result<()> {
        let scale = self.scale;
        let body = self.body_mut(id)?;
        body.set_translation(vector![center.x / scale, center.y / scale], true);
        Ok(())
    }

    /// Center of the body in pixels
    pub fn get_position(&self, id: GameObjectId) -> Result<Vector2> {
        let translation = *self.body(id)?.translation();
        Ok(Vector2::new(
            translation.x * self.scale,
            translation.y * self.scale,
        ))
    }

    /// Resize the body's collision box to `size` (full extent, pixels)
    pub fn set_size(&mut self, id: GameObjectId, size: Vector2) -> Result<()> {
        let half = self.half_extents(size);
        let collider = self.collider_mut(id)?;
        collider.set_shape(SharedShape::cuboid(half.x, half.y));
        Ok(())
    }

    /// Simulation-space half extents of a box with full extent `size` in
    /// pixels. A negative scale mirrors the sprite, never the box.
    fn half_extents(&self, size: Vector2) -> Vector2 {
        let half = size * (0.5 / self.scale);
        Vector2::new(
            half.x.abs().max(f32::EPSILON),
            half.y.abs().max(f32::EPSILON),
        )
    }

    pub fn set_sensor(&mut self, id: GameObjectId, is_sensor: bool) -> Result<()> {
        self.collider_mut(id)?.set_sensor(is_sensor);
        Ok(())
    }

    pub fn set_density(&mut self, id: GameObjectId, density: f32) -> Result<()> {
        self.collider_mut(id)?.set_density(density);
        Ok(())
    }

    pub fn set_friction(&mut self, id: GameObjectId, friction: f32) -> Result<()> {
        self.collider_mut(id)?.set_friction(friction);
        Ok(())
    }

    /// Apply a force (simulation units) for the next step
    pub fn apply_force(&mut self, id: GameObjectId, force: Vector2) -> Result<()> {
        self.body_mut(id)?.add_force(vector![force.x, force.y], true);
        Ok(())
    }

    /// Apply an instantaneous impulse (simulation units)
    pub fn apply_impulse(&mut self, id: GameObjectId, impulse: Vector2) -> Result<()> {
        self.body_mut(id)?
            .apply_impulse(vector![impulse.x, impulse.y], true);
        Ok(())
    }

    pub fn set_object_gravity_scale(&mut self, id: GameObjectId, scale: f32) -> Result<()> {
        self.body_mut(id)?.set_gravity_scale(scale, true);
        Ok(())
    }

    /// Set linear velocity in pixels per second
    pub fn set_object_linear_velocity(&mut self, id: GameObjectId, v: Vector2) -> Result<()> {
        let scale = self.scale;
        self.body_mut(id)?
            .set_linvel(vector![v.x / scale, v.y / scale], true);
        Ok(())
    }

    /// Linear velocity in pixels per second
    pub fn get_object_linear_velocity(&self, id: GameObjectId) -> Result<Vector2> {
        let v = *self.body(id)?.linvel();
        Ok(Vector2::new(v.x * self.scale, v.y * self.scale))
    }

    /// Solid contacts recorded against the object's body during the last update
    pub fn get_contact_list(&self, id: GameObjectId) -> Result<&[Contact]> {
        self.binding(id)?;
        Ok(self
            .contacts
            .get(&id)
            .map(|c| c.solid.as_slice())
            .unwrap_or(&[]))
    }

    /// Sensor overlaps recorded against the object's body during the last update
    pub fn get_sensor_contact_list(&self, id: GameObjectId) -> Result<&[Contact]> {
        self.binding(id)?;
        Ok(self
            .contacts
            .get(&id)
            .map(|c| c.sensor.as_slice())
            .unwrap_or(&[]))
    }

    /// Contact begin/end events from the last update
    pub fn contact_events(&self) -> &[ContactEvent] {
        &self.events
    }

    pub fn is_bound(&self, id: GameObjectId) -> bool {
        self.bindings.contains_key(&id)
    }

    pub fn body_handle(&self, id: GameObjectId) -> Option<RigidBodyHandle> {
        self.bindings.get(&id).map(|b| b.body)
    }

    /// Number of bodies in the simulated world
    pub fn body_count(&self) -> usize {
        self.world.body_count()
    }

    /// Read access to the backend world
    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }
}

impl Default for PhysicsEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn unbound(id: GameObjectId) -> EngineError {
    EngineError::InvalidState(format!("{} has no physical body", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scene::{GameObjectArena, Transform};
    use approx::assert_relative_eq;

    fn spawn(arena: &mut GameObjectArena, position: Vector2) -> GameObjectId {
        let mut object = GameObject::new("box");
        object
            .add_component(Transform::at(position.x, position.y))
            .unwrap();
        object.add_component(Collider::new()).unwrap();
        arena.insert(object)
    }

    fn bind(physics: &mut PhysicsEngine, arena: &mut GameObjectArena, id: GameObjectId) {
        physics.add_game_object(arena.get_mut(id).unwrap()).unwrap();
    }

    #[test]
    fn test_body_created_at_scaled_position() {
        let mut arena = GameObjectArena::new();
        let mut physics = PhysicsEngine::new();
        physics.set_scale_factor(32.0).unwrap();

        let id = spawn(&mut arena, Vector2::ZERO);
        arena
            .get_mut(id)
            .unwrap()
            .transform_mut()
            .unwrap()
            .set_position(Vector2::new(10.0, 20.0));
        bind(&mut physics, &mut arena, id);

        let handle = physics.body_handle(id).unwrap();
        let body = physics.world().body(handle).unwrap();
        assert_relative_eq!(body.translation().x, 10.0 / 32.0);
        assert_relative_eq!(body.translation().y, 20.0 / 32.0);
        assert_eq!(physics.get_position(id).unwrap(), Vector2::new(10.0, 20.0));
        assert_eq!(body.user_data, id.to_bits() as u128);
    }

    #[test]
    fn test_add_then_remove_restores_body_count() {
        let mut arena = GameObjectArena::new();
        let mut physics = PhysicsEngine::new();
        let before = physics.body_count();

        let id = spawn(&mut arena, Vector2::ZERO);
        bind(&mut physics, &mut arena, id);
        assert_eq!(physics.body_count(), before + 1);

        physics
            .remove_game_object(arena.get_mut(id).unwrap())
            .unwrap();
        assert_eq!(physics.body_count(), before);
        assert!(arena.get(id).unwrap().physical_body().is_none());
    }

    #[test]
    fn test_double_registration_is_invalid_state() {
        let mut arena = GameObjectArena::new();
        let mut physics = PhysicsEngine::new();
        let id = spawn(&mut arena, Vector2::ZERO);
        bind(&mut physics, &mut arena, id);

        let err = physics
            .add_game_object(arena.get_mut(id).unwrap())
            .unwrap_err();
        assert!(err.is_invalid_state());
        assert_eq!(physics.body_count(), 1);
    }

    #[test]
    fn test_remove_unbound_is_invalid_state() {
        let mut arena = GameObjectArena::new();
        let mut physics = PhysicsEngine::new();
        let id = spawn(&mut arena, Vector2::ZERO);

        let err = physics
            .remove_game_object(arena.get_mut(id).unwrap())
            .unwrap_err();
        assert!(err.is_invalid_state());
    }

    #[test]
    fn test_unbound_operations_fail() {
        let mut physics = PhysicsEngine::new();
        let id = GameObjectId::from_bits(5);

        assert!(physics.apply_force(id, Vector2::UP).is_err());
        assert!(physics.apply_impulse(id, Vector2::UP).is_err());
        assert!(physics.get_position(id).is_err());
        assert!(physics.set_density(id, 2.0).is_err());
        assert!(physics.get_contact_list(id).is_err());
        assert!(physics.get_object_linear_velocity(id).is_err());
    }

    #[test]
    fn test_configuration_locked_after_first_body() {
        let mut arena = GameObjectArena::new();
        let mut physics = PhysicsEngine::new();
        assert_eq!(physics.state(), PhysicsState::Uninitialized);
        physics.set_gravity(Vector2::new(0.0, 10.0)).unwrap();
        assert!(physics.set_scale_factor(0.0).is_err());

        let id = spawn(&mut arena, Vector2::ZERO);
        bind(&mut physics, &mut arena, id);
        assert_eq!(physics.state(), PhysicsState::Running);

        assert!(matches!(
            physics.set_gravity(Vector2::ZERO),
            Err(EngineError::Configuration(_))
        ));
        assert!(matches!(
            physics.set_scale_factor(16.0),
            Err(EngineError::Configuration(_))
        ));
        assert_eq!(physics.scale_factor(), DEFAULT_SCALE);
    }

    #[test]
    fn test_gravity_moves_body_down_monotonically() {
        let mut arena = GameObjectArena::new();
        let mut physics = PhysicsEngine::new();
        physics.set_gravity(Vector2::new(0.0, 10.0)).unwrap();
        let id = spawn(&mut arena, Vector2::ZERO);
        bind(&mut physics, &mut arena, id);

        let mut last = physics.get_position(id).unwrap().y;
        for _ in 0..30 {
            physics.update(1.0 / 60.0);
            let y = physics.get_position(id).unwrap().y;
            assert!(y > last, "expected {} > {}", y, last);
            last = y;
        }
    }

    #[test]
    fn test_overlapping_bodies_contact_each_other() {
        let mut arena = GameObjectArena::new();
        let mut physics = PhysicsEngine::new();
        physics.set_gravity(Vector2::ZERO).unwrap();
        let a = spawn(&mut arena, Vector2::new(0.0, 0.0));
        let b = spawn(&mut arena, Vector2::new(32.0, 0.0));
        bind(&mut physics, &mut arena, a);
        bind(&mut physics, &mut arena, b);

        physics.update(1.0 / 60.0);

        let contacts_a = physics.get_contact_list(a).unwrap();
        let contacts_b = physics.get_contact_list(b).unwrap();
        assert_eq!(contacts_a.len(), 1);
        assert_eq!(contacts_b.len(), 1);
        assert_eq!(contacts_a[0].other, b);
        assert_eq!(contacts_b[0].other, a);
        assert!(physics.get_sensor_contact_list(a).unwrap().is_empty());
    }

    #[test]
    fn test_sensor_and_solid_contacts_are_disjoint() {
        let mut arena = GameObjectArena::new();
        let mut physics = PhysicsEngine::new();
        physics.set_gravity(Vector2::ZERO).unwrap();
        let solid = spawn(&mut arena, Vector2::ZERO);
        let other = spawn(&mut arena, Vector2::new(16.0, 0.0));
        let sensor = spawn(&mut arena, Vector2::new(-16.0, 0.0));
        arena
            .get_mut(sensor)
            .unwrap()
            .collider_mut()
            .unwrap()
            .set_sensor(true);
        for id in [solid, other, sensor] {
            bind(&mut physics, &mut arena, id);
        }

        physics.update(1.0 / 60.0);

        let solid_list = physics.get_contact_list(solid).unwrap();
        let sensor_list = physics.get_sensor_contact_list(solid).unwrap();
        assert_eq!(solid_list.len(), 1);
        assert_eq!(solid_list[0].other, other);
        assert_eq!(sensor_list.len(), 1);
        assert_eq!(sensor_list[0].other, sensor);
        for contact in solid_list {
            assert!(sensor_list.iter().all(|s| s.other != contact.other));
        }
        assert!(physics.get_contact_list(sensor).unwrap().is_empty());
    }

    #[test]
    fn test_velocity_roundtrip_in_pixels() {
        let mut arena = GameObjectArena::new();
        let mut physics = PhysicsEngine::new();
        let id = spawn(&mut arena, Vector2::ZERO);
        bind(&mut physics, &mut arena, id);

        physics
            .set_object_linear_velocity(id, Vector2::new(128.0, 0.0))
            .unwrap();
        let v = physics.get_object_linear_velocity(id).unwrap();
        assert_relative_eq!(v.x, 128.0, epsilon = 1e-3);
    }

    #[test]
    fn test_static_tile_ignores_gravity() {
        let mut arena = GameObjectArena::new();
        let mut physics = PhysicsEngine::new();
        let id = spawn(&mut arena, Vector2::new(64.0, 64.0));
        physics.add_tile(arena.get_mut(id).unwrap()).unwrap();

        for _ in 0..10 {
            physics.update(1.0 / 60.0);
        }
        assert_eq!(physics.get_position(id).unwrap(), Vector2::new(64.0, 64.0));
    }

    fn rapier_collider(
        physics: &PhysicsEngine,
        id: GameObjectId,
    ) -> &rapier2d::prelude::Collider {
        let binding = physics.binding(id).unwrap();
        physics.world().collider(binding.collider).unwrap()
    }

    #[test]
    fn test_set_size_reshapes_collider() {
        let mut arena = GameObjectArena::new();
        let mut physics = PhysicsEngine::new();
        let id = spawn(&mut arena, Vector2::ZERO);
        bind(&mut physics, &mut arena, id);

        physics.set_size(id, Vector2::new(128.0, 32.0)).unwrap();
        let cuboid = rapier_collider(&physics, id).shape().as_cuboid().unwrap();
        assert_relative_eq!(cuboid.half_extents.x, 1.0);
        assert_relative_eq!(cuboid.half_extents.y, 0.25);

        // Mirrored sizes keep their extent
        physics.set_size(id, Vector2::new(-64.0, 32.0)).unwrap();
        let cuboid = rapier_collider(&physics, id).shape().as_cuboid().unwrap();
        assert_relative_eq!(cuboid.half_extents.x, 0.5);
        assert_relative_eq!(cuboid.half_extents.y, 0.25);
    }

    #[test]
    fn test_negative_scale_body_keeps_extent() {
        let mut arena = GameObjectArena::new();
        let mut physics = PhysicsEngine::new();
        let id = spawn(&mut arena, Vector2::ZERO);
        arena
            .get_mut(id)
            .unwrap()
            .transform_mut()
            .unwrap()
            .set_scale(Vector2::new(-1.0, 1.0));
        bind(&mut physics, &mut arena, id);

        let cuboid = rapier_collider(&physics, id).shape().as_cuboid().unwrap();
        assert_relative_eq!(cuboid.half_extents.x, 0.5);
        assert_relative_eq!(cuboid.half_extents.y, 0.5);
    }

    #[test]
    fn test_sensor_and_material_setters() {
        let mut arena = GameObjectArena::new();
        let mut physics = PhysicsEngine::new();
        physics.set_gravity(Vector2::ZERO).unwrap();
        let a = spawn(&mut arena, Vector2::ZERO);
        let b = spawn(&mut arena, Vector2::new(32.0, 0.0));
        bind(&mut physics, &mut arena, a);
        bind(&mut physics, &mut arena, b);

        physics.set_sensor(a, true).unwrap();
        physics.set_density(a, 2.5).unwrap();
        physics.set_friction(a, 0.7).unwrap();
        let collider = rapier_collider(&physics, a);
        assert!(collider.is_sensor());
        assert_relative_eq!(collider.density(), 2.5);
        assert_relative_eq!(collider.friction(), 0.7);

        physics.update(1.0 / 60.0);
        assert!(physics.get_contact_list(b).unwrap().is_empty());
        let overlaps = physics.get_sensor_contact_list(b).unwrap();
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].other, a);

        assert!(physics.set_sensor(GameObjectId::from_bits(99), true).is_err());
        assert!(physics.set_size(GameObjectId::from_bits(99), Vector2::ONE).is_err());
    }

    #[test]
    fn test_contact_events_resolve_to_objects() {
        let mut arena = GameObjectArena::new();
        let mut physics = PhysicsEngine::new();
        physics.set_gravity(Vector2::ZERO).unwrap();
        let a = spawn(&mut arena, Vector2::ZERO);
        let b = spawn(&mut arena, Vector2::new(8.0, 0.0));
        bind(&mut physics, &mut arena, a);
        bind(&mut physics, &mut arena, b);

        physics.update(1.0 / 60.0);
        assert!(physics
            .contact_events()
            .iter()
            .any(|e| matches!(e, ContactEvent::Began { .. }) && e.involves(a) && e.involves(b)));
    }
}
