use crate::core::Result;
use crate::engine::physics::{Contact, PhysicsEngine};

use super::arena::GameObjectId;

/// Collision shape settings of a game object plus the contacts pulled from
/// the physics step.
///
/// The body box is the Transform's scaled size multiplied by
/// [`Collider::scale`] for the current mode. Sensors detect overlap without
/// collision response.
#[derive(Debug, Clone)]
pub struct Collider {
    pub(crate) owner: Option<GameObjectId>,
    scale: f32,
    sensor_scale: Option<f32>,
    is_sensor: bool,
    density: f32,
    friction: f32,
    contacts: Vec<Contact>,
    sensor_contacts: Vec<Contact>,
    pending_shape: bool,
    pending_sensor: bool,
    pending_material: bool,
}

impl Collider {
    pub fn new() -> Self {
        Self {
            owner: None,
            scale: 1.0,
            sensor_scale: None,
            is_sensor: false,
            density: 1.0,
            friction: 0.3,
            contacts: Vec::new(),
            sensor_contacts: Vec::new(),
            pending_shape: false,
            pending_sensor: false,
            pending_material: false,
        }
    }

    /// A sensor collider
    pub fn sensor() -> Self {
        Self {
            is_sensor: true,
            ..Self::new()
        }
    }

    /// Builder: size multiplier for solid mode
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Builder: separate size multiplier used while the collider is a sensor
    pub fn with_sensor_scale(mut self, scale: f32) -> Self {
        self.sensor_scale = Some(scale);
        self
    }

    pub fn owner(&self) -> Option<GameObjectId> {
        self.owner
    }

    /// Size multiplier for the given mode. Sensor mode falls back to the
    /// solid scale when no sensor scale is set.
    pub fn scale(&self, is_trigger: bool) -> f32 {
        if is_trigger {
            self.sensor_scale.unwrap_or(self.scale)
        } else {
            self.scale
        }
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
        self.pending_shape = true;
    }

    pub fn set_sensor_scale(&mut self, scale: Option<f32>) {
        self.sensor_scale = scale;
        self.pending_shape = true;
    }

    pub fn is_sensor(&self) -> bool {
        self.is_sensor
    }

    pub fn set_sensor(&mut self, is_sensor: bool) {
        if self.is_sensor != is_sensor {
            self.is_sensor = is_sensor;
            self.pending_sensor = true;
            self.pending_shape = true;
        }
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    pub fn set_density(&mut self, density: f32) {
        self.density = density;
        self.pending_material = true;
    }

    pub fn friction(&self) -> f32 {
        self.friction
    }

    pub fn set_friction(&mut self, friction: f32) {
        self.friction = friction;
        self.pending_material = true;
    }

    /// Solid contacts pulled during the owner's last update
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Sensor overlaps pulled during the owner's last update
    pub fn sensor_contacts(&self) -> &[Contact] {
        &self.sensor_contacts
    }

    /// Contacts recorded for the owner's body in the physics engine's last step
    pub fn contact_list<'p>(&self, physics: &'p PhysicsEngine) -> Result<&'p [Contact]> {
        physics.get_contact_list(self.bound_owner()?)
    }

    pub fn sensor_contact_list<'p>(&self, physics: &'p PhysicsEngine) -> Result<&'p [Contact]> {
        physics.get_sensor_contact_list(self.bound_owner()?)
    }

    fn bound_owner(&self) -> Result<GameObjectId> {
        self.owner.ok_or_else(|| {
            crate::core::EngineError::InvalidState(
                "collider is not attached to a game object".to_string(),
            )
        })
    }

    pub(crate) fn take_pending_shape(&mut self) -> bool {
        std::mem::take(&mut self.pending_shape)
    }

    pub(crate) fn take_pending_sensor(&mut self) -> bool {
        std::mem::take(&mut self.pending_sensor)
    }

    pub(crate) fn take_pending_material(&mut self) -> bool {
        std::mem::take(&mut self.pending_material)
    }

    pub(crate) fn mark_pending(&mut self) {
        self.pending_shape = true;
        self.pending_sensor = true;
        self.pending_material = true;
    }

    pub(crate) fn clear_pending(&mut self) {
        self.pending_shape = false;
        self.pending_sensor = false;
        self.pending_material = false;
    }

    pub(crate) fn pull_contacts(&mut self, solid: &[Contact], sensor: &[Contact]) {
        self.contacts.clear();
        self.contacts.extend_from_slice(solid);
        self.sensor_contacts.clear();
        self.sensor_contacts.extend_from_slice(sensor);
    }
}

impl Default for Collider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_by_mode() {
        let collider = Collider::new().with_scale(0.8);
        assert_eq!(collider.scale(false), 0.8);
        assert_eq!(collider.scale(true), 0.8);

        let collider = collider.with_sensor_scale(1.5);
        assert_eq!(collider.scale(false), 0.8);
        assert_eq!(collider.scale(true), 1.5);
    }

    #[test]
    fn test_sensor_toggle_marks_pending() {
        let mut collider = Collider::new();
        collider.set_sensor(false);
        assert!(!collider.take_pending_sensor());

        collider.set_sensor(true);
        assert!(collider.is_sensor());
        assert!(collider.take_pending_sensor());
        assert!(collider.take_pending_shape());
    }

    #[test]
    fn test_contact_list_without_owner_fails() {
        let collider = Collider::new();
        let physics = PhysicsEngine::new();
        assert!(collider.contact_list(&physics).unwrap_err().is_invalid_state());
        assert!(collider.contacts().is_empty());
    }
}
