use rapier2d::prelude::*;

/// How a body takes part in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BodyKind {
    /// Affected by gravity, forces and collisions
    Dynamic,
    /// Immovable level geometry, ignores gravity
    Static,
}

/// Builder for creating rigid bodies with common configurations
pub struct BodyBuilder {
    body_type: RigidBodyType,
    position: Isometry<Real>,
    linvel: Vector<Real>,
    gravity_scale: Real,
    can_sleep: bool,
    locked_axes: LockedAxes,
    user_data: u128,
}

impl BodyBuilder {
    /// Create a new dynamic body (affected by forces and collisions)
    pub fn new_dynamic() -> Self {
        Self {
            body_type: RigidBodyType::Dynamic,
            position: Isometry::identity(),
            linvel: Vector::zeros(),
            gravity_scale: 1.0,
            can_sleep: true,
            locked_axes: LockedAxes::empty(),
            user_data: 0,
        }
    }

    /// Create a new fixed (static) body (completely immovable)
    pub fn new_fixed() -> Self {
        Self {
            body_type: RigidBodyType::Fixed,
            position: Isometry::identity(),
            linvel: Vector::zeros(),
            gravity_scale: 0.0,
            can_sleep: false,
            locked_axes: LockedAxes::empty(),
            user_data: 0,
        }
    }

    /// Set the initial position of the body
    pub fn position(mut self, x: Real, y: Real) -> Self {
        self.position = Isometry::translation(x, y);
        self
    }

    /// Set the initial linear velocity
    pub fn linvel(mut self, x: Real, y: Real) -> Self {
        self.linvel = vector![x, y];
        self
    }

    /// Set the gravity scale (1.0 = normal gravity, 0.0 = no gravity)
    pub fn gravity_scale(mut self, scale: Real) -> Self {
        self.gravity_scale = scale;
        self
    }

    /// Set whether the body can sleep when inactive
    pub fn can_sleep(mut self, can_sleep: bool) -> Self {
        self.can_sleep = can_sleep;
        self
    }

    /// Lock rotation; game objects have no orientation to follow
    pub fn lock_rotation(mut self) -> Self {
        self.locked_axes = LockedAxes::ROTATION_LOCKED;
        self
    }

    /// Opaque data stored on the body, read back when resolving contacts
    pub fn user_data(mut self, data: u128) -> Self {
        self.user_data = data;
        self
    }

    /// Build the rigid body
    pub fn build(self) -> RigidBody {
        RigidBodyBuilder::new(self.body_type)
            .position(self.position)
            .linvel(self.linvel)
            .gravity_scale(self.gravity_scale)
            .can_sleep(self.can_sleep)
            .locked_axes(self.locked_axes)
            .user_data(self.user_data)
            .build()
    }
}

/// Builder for creating colliders with common configurations
pub struct ColliderBuilder2D {
    shape: SharedShape,
    is_sensor: bool,
    friction: Real,
    restitution: Real,
    density: Real,
    active_events: ActiveEvents,
}

impl ColliderBuilder2D {
    /// Create a box-shaped collider
    pub fn box_shape(half_width: Real, half_height: Real) -> Self {
        Self {
            shape: SharedShape::cuboid(half_width, half_height),
            is_sensor: false,
            friction: 0.3,
            restitution: 0.0,
            density: 1.0,
            active_events: ActiveEvents::COLLISION_EVENTS,
        }
    }

    /// Make this a sensor (detects collisions but doesn't cause physical response)
    pub fn sensor(mut self, is_sensor: bool) -> Self {
        self.is_sensor = is_sensor;
        self
    }

    /// Set friction coefficient (0.0 = no friction, 1.0 = high friction)
    pub fn friction(mut self, friction: Real) -> Self {
        self.friction = friction;
        self
    }

    /// Set restitution/bounciness (0.0 = no bounce, 1.0 = perfect bounce)
    pub fn restitution(mut self, restitution: Real) -> Self {
        self.restitution = restitution;
        self
    }

    /// Set density (mass will be calculated from shape volume)
    pub fn density(mut self, density: Real) -> Self {
        self.density = density;
        self
    }

    /// Build the collider
    pub fn build(self) -> Collider {
        ColliderBuilder::new(self.shape)
            .sensor(self.is_sensor)
            .friction(self.friction)
            .restitution(self.restitution)
            .density(self.density)
            .active_events(self.active_events)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_builder_dynamic() {
        let body = BodyBuilder::new_dynamic()
            .position(10.0, 20.0)
            .linvel(5.0, 0.0)
            .user_data(42)
            .build();

        assert_eq!(body.body_type(), RigidBodyType::Dynamic);
        assert_eq!(body.translation().x, 10.0);
        assert_eq!(body.translation().y, 20.0);
        assert_eq!(body.user_data, 42);
    }

    #[test]
    fn test_fixed_body_ignores_gravity() {
        let body = BodyBuilder::new_fixed().position(1.0, 1.0).build();
        assert_eq!(body.body_type(), RigidBodyType::Fixed);
        assert_eq!(body.gravity_scale(), 0.0);
    }

    #[test]
    fn test_locked_rotation() {
        let body = BodyBuilder::new_dynamic().lock_rotation().build();
        assert!(body.is_rotation_locked());
    }

    #[test]
    fn test_collider_builder_box() {
        let collider = ColliderBuilder2D::box_shape(1.0, 2.0).friction(0.7).build();

        assert!(!collider.is_sensor());
        assert_eq!(collider.friction(), 0.7);
    }

    #[test]
    fn test_collider_builder_sensor() {
        let collider = ColliderBuilder2D::box_shape(1.0, 1.0).sensor(true).build();
        assert!(collider.is_sensor());
    }
}
