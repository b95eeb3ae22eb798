use rapier2d::prelude::*;

use super::body::{BodyBuilder, BodyKind, ColliderBuilder2D};
use super::contact::{CollisionEvent as RawCollisionEvent, CollisionEventQueue};

/// Handle to identify rigid bodies
pub type RigidBodyHandle = rapier2d::prelude::RigidBodyHandle;

/// Handle to identify colliders
pub type ColliderHandle = rapier2d::prelude::ColliderHandle;

/// A body together with the single collider the engine attaches to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyBinding {
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
}

/// Parameters for creating a body through [`PhysicsWorld::create_body`].
/// All values are in simulation units.
#[derive(Debug, Clone, Copy)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub position: Vector<Real>,
    pub half_extents: Vector<Real>,
    pub sensor: bool,
    pub density: Real,
    pub friction: Real,
    pub user_data: u128,
}

/// Physics world that manages all physics simulation.
///
/// This is the narrow backend surface the rest of the engine talks to:
/// body creation/destruction, stepping, contact queries and per-body
/// accessors. Nothing above this type touches rapier pipelines directly.
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    collision_event_queue: CollisionEventQueue,
}

impl PhysicsWorld {
    /// Create a new physics world with the given gravity
    pub fn with_gravity(gravity: Vector<Real>) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        // Fixed timestep of 1/60 seconds until the first step overrides it
        integration_parameters.dt = 1.0 / 60.0;

        Self {
            gravity,
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            collision_event_queue: CollisionEventQueue::new(),
        }
    }

    /// Advance the simulation by exactly `dt` seconds
    pub fn step(&mut self, dt: Real) {
        self.collision_event_queue.clear();
        self.integration_parameters.dt = dt;

        let event_handler = &self.collision_event_queue;

        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            event_handler,
        );
    }

    /// Create a body with one box collider
    pub fn create_body(&mut self, desc: BodyDesc) -> BodyBinding {
        let builder = match desc.kind {
            BodyKind::Dynamic => BodyBuilder::new_dynamic().lock_rotation(),
            BodyKind::Static => BodyBuilder::new_fixed(),
        };
        let rigid_body = builder
            .position(desc.position.x, desc.position.y)
            .user_data(desc.user_data)
            .build();
        let body = self.rigid_body_set.insert(rigid_body);

        let collider = ColliderBuilder2D::box_shape(desc.half_extents.x, desc.half_extents.y)
            .sensor(desc.sensor)
            .density(desc.density)
            .friction(desc.friction)
            .build();
        let collider =
            self.collider_set
                .insert_with_parent(collider, body, &mut self.rigid_body_set);

        BodyBinding { body, collider }
    }

    /// Remove a rigid body and all its attached colliders
    pub fn destroy_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true, // remove attached colliders
        );
    }

    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }

    pub fn body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(handle)
    }

    pub fn collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.collider_set.get(handle)
    }

    pub fn collider_mut(&mut self, handle: ColliderHandle) -> Option<&mut Collider> {
        self.collider_set.get_mut(handle)
    }

    /// Number of live rigid bodies
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    /// User data of the body owning `collider`
    pub fn collider_owner_data(&self, collider: ColliderHandle) -> Option<u128> {
        let parent = self.collider_set.get(collider)?.parent()?;
        self.rigid_body_set.get(parent).map(|body| body.user_data)
    }

    pub fn is_sensor(&self, collider: ColliderHandle) -> bool {
        self.collider_set
            .get(collider)
            .map(|c| c.is_sensor())
            .unwrap_or(false)
    }

    /// Solid contacts touching `collider` with at least one active point.
    /// Yields the other collider and the world-space contact points.
    pub fn active_contacts(
        &self,
        collider: ColliderHandle,
    ) -> Vec<(ColliderHandle, Vec<Point<Real>>)> {
        self.narrow_phase
            .contact_pairs_with(collider)
            .filter(|pair| pair.has_any_active_contact)
            .map(|pair| {
                let other = if pair.collider1 == collider {
                    pair.collider2
                } else {
                    pair.collider1
                };
                (other, self.contact_points(pair))
            })
            .collect()
    }

    /// Colliders currently overlapping `collider` through a sensor pair
    pub fn intersections(&self, collider: ColliderHandle) -> Vec<ColliderHandle> {
        self.narrow_phase
            .intersection_pairs_with(collider)
            .filter(|(_, _, intersecting)| *intersecting)
            .map(|(c1, c2, _)| if c1 == collider { c2 } else { c1 })
            .collect()
    }

    fn contact_points(&self, pair: &ContactPair) -> Vec<Point<Real>> {
        let mut points = Vec::new();
        for manifold in &pair.manifolds {
            if !manifold.data.solver_contacts.is_empty() {
                points.extend(manifold.data.solver_contacts.iter().map(|c| c.point));
                continue;
            }
            // Fall back to the tracked points in collider1's local frame
            if let Some(c1) = self.collider_set.get(pair.collider1) {
                points.extend(
                    manifold
                        .points
                        .iter()
                        .filter(|p| p.dist <= 0.0)
                        .map(|p| c1.position() * p.local_p1),
                );
            }
        }
        points
    }

    /// Contact start/stop events recorded during the last step
    pub fn collision_events(&self) -> Vec<RawCollisionEvent> {
        self.collision_event_queue.events()
    }

    pub fn set_gravity(&mut self, gravity: Vector<Real>) {
        self.gravity = gravity;
    }

    pub fn gravity(&self) -> Vector<Real> {
        self.gravity
    }

    /// Timestep used by the most recent step
    pub fn timestep(&self) -> Real {
        self.integration_parameters.dt
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::with_gravity(vector![0.0, 9.8])
    }
}
