use log::debug;
use std::fmt;

use crate::core::{EngineError, Result};
use crate::engine::game_loop::Clock;
use crate::engine::input::InputHandler;
use crate::engine::physics::{PhysicsEngine, RigidBodyHandle};
use crate::engine::renderer::RenderBackend;

use super::animator::Animator;
use super::arena::GameObjectId;
use super::collider::Collider;
use super::component::{Attachment, Component, ComponentKind, CoreComponent, DuplicatePolicy};
use super::script::{Commands, Script, ScriptContext};
use super::sprite_renderer::SpriteRenderer;
use super::transform::Transform;

/// Engine services handed to an object for one update
pub struct FrameContext<'a> {
    pub physics: &'a mut PhysicsEngine,
    pub input: &'a InputHandler,
    pub clock: &'a Clock,
    pub commands: &'a mut Commands,
}

/// An entity: a tag, its components and at most one physics body.
///
/// Core components live in typed slots; scripts in a list. Lifecycle hooks
/// always run in attachment order. A destroyed object is inert but stays in
/// the arena until the engine sweeps it.
pub struct GameObject {
    id: GameObjectId,
    tag: String,
    destroyed: bool,
    policy: DuplicatePolicy,
    body: Option<RigidBodyHandle>,

    transform: Option<Transform>,
    sprite_renderer: Option<SpriteRenderer>,
    animator: Option<Animator>,
    collider: Option<Collider>,
    scripts: Vec<Option<Box<dyn Script>>>,

    order: Vec<Attachment>,
    /// Attachments in `order` before this index have been started
    started: usize,
}

impl GameObject {
    pub fn new(tag: &str) -> Self {
        Self {
            id: GameObjectId::NULL,
            tag: tag.to_string(),
            destroyed: false,
            policy: DuplicatePolicy::Reject,
            body: None,
            transform: None,
            sprite_renderer: None,
            animator: None,
            collider: None,
            scripts: Vec::new(),
            order: Vec::new(),
            started: 0,
        }
    }

    /// Builder: attach `component`, failing on a rejected duplicate
    pub fn with(mut self, component: impl Into<Component>) -> Result<Self> {
        self.add_component(component)?;
        Ok(self)
    }

    /// Handle in the owning arena, `GameObjectId::NULL` before insertion
    pub fn id(&self) -> GameObjectId {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: GameObjectId) {
        self.id = id;
        let owner = Some(id);
        if let Some(c) = self.transform.as_mut() {
            c.owner = owner;
        }
        if let Some(c) = self.sprite_renderer.as_mut() {
            c.owner = owner;
        }
        if let Some(c) = self.animator.as_mut() {
            c.owner = owner;
        }
        if let Some(c) = self.collider.as_mut() {
            c.owner = owner;
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn set_tag(&mut self, tag: &str) {
        self.tag = tag.to_string();
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn set_duplicate_policy(&mut self, policy: DuplicatePolicy) {
        self.policy = policy;
    }

    /// Attach a component. Exclusive kinds follow the duplicate policy.
    pub fn add_component(&mut self, component: impl Into<Component>) -> Result<()> {
        let mut component = component.into();
        let kind = component.kind();
        component.set_owner((!self.id.is_null()).then_some(self.id));

        match component {
            Component::Script(script) => {
                self.order.push(Attachment::Script(self.scripts.len()));
                self.scripts.push(Some(script));
            }
            Component::Transform(mut c) => {
                self.claim_slot(kind)?;
                if self.body.is_some() {
                    c.mark_pending();
                }
                self.transform = Some(c);
            }
            Component::SpriteRenderer(c) => {
                self.claim_slot(kind)?;
                self.sprite_renderer = Some(c);
            }
            Component::Animator(c) => {
                let restart = self.claim_slot(kind)?;
                let animator = self.animator.insert(c);
                if restart {
                    animator.start();
                }
            }
            Component::Collider(mut c) => {
                self.claim_slot(kind)?;
                if self.body.is_some() {
                    c.mark_pending();
                }
                self.collider = Some(c);
            }
        }
        Ok(())
    }

    /// Reserve the attachment slot for a core kind, or fail/replace per
    /// policy. Returns whether an already started slot was replaced.
    fn claim_slot(&mut self, kind: ComponentKind) -> Result<bool> {
        let Some(pos) = self.order.iter().position(|a| *a == Attachment::Core(kind)) else {
            self.order.push(Attachment::Core(kind));
            return Ok(false);
        };
        match self.policy {
            DuplicatePolicy::Reject => Err(EngineError::DuplicateComponent(kind)),
            DuplicatePolicy::Replace => {
                debug!("Replacing {} on '{}'", kind, self.tag);
                Ok(pos < self.started)
            }
        }
    }

    pub fn has_component(&self, kind: ComponentKind) -> bool {
        match kind {
            ComponentKind::Transform => self.transform.is_some(),
            ComponentKind::SpriteRenderer => self.sprite_renderer.is_some(),
            ComponentKind::Animator => self.animator.is_some(),
            ComponentKind::Collider => self.collider.is_some(),
            ComponentKind::Script => !self.scripts.is_empty(),
        }
    }

    /// Kinds in attachment order
    pub fn component_kinds(&self) -> Vec<ComponentKind> {
        self.order
            .iter()
            .map(|a| match a {
                Attachment::Core(kind) => *kind,
                Attachment::Script(_) => ComponentKind::Script,
            })
            .collect()
    }

    /// Typed lookup that fails with `NotFound` when nothing is attached
    pub fn get_component<T: CoreComponent>(&self) -> Result<&T> {
        T::slot(self).ok_or(EngineError::NotFound(T::KIND))
    }

    pub fn get_component_mut<T: CoreComponent>(&mut self) -> Result<&mut T> {
        T::slot_mut(self).ok_or(EngineError::NotFound(T::KIND))
    }

    pub fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    pub fn transform_mut(&mut self) -> Option<&mut Transform> {
        self.transform.as_mut()
    }

    pub fn sprite_renderer(&self) -> Option<&SpriteRenderer> {
        self.sprite_renderer.as_ref()
    }

    pub fn sprite_renderer_mut(&mut self) -> Option<&mut SpriteRenderer> {
        self.sprite_renderer.as_mut()
    }

    pub fn animator(&self) -> Option<&Animator> {
        self.animator.as_ref()
    }

    pub fn animator_mut(&mut self) -> Option<&mut Animator> {
        self.animator.as_mut()
    }

    pub fn collider(&self) -> Option<&Collider> {
        self.collider.as_ref()
    }

    pub fn collider_mut(&mut self) -> Option<&mut Collider> {
        self.collider.as_mut()
    }

    /// Attach defaults for any missing core kind
    pub fn ensure_core_components(&mut self) -> Result<()> {
        for kind in ComponentKind::CORE {
            if self.has_component(kind) {
                continue;
            }
            let component: Component = match kind {
                ComponentKind::Transform => Transform::new().into(),
                ComponentKind::SpriteRenderer => SpriteRenderer::new().into(),
                ComponentKind::Animator => Animator::new().into(),
                ComponentKind::Collider => Collider::new().into(),
                ComponentKind::Script => continue,
            };
            self.add_component(component)?;
        }
        Ok(())
    }

    pub fn physical_body(&self) -> Option<RigidBodyHandle> {
        self.body
    }

    pub fn set_physical_body(&mut self, body: Option<RigidBodyHandle>) {
        self.body = body;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Mark the object destroyed. Memory is kept until the engine sweeps.
    pub fn destroy(&mut self) {
        if !self.destroyed {
            debug!("Destroying {} ('{}')", self.id, self.tag);
            self.destroyed = true;
        }
    }

    /// Whether every attachment has been started
    pub fn is_started(&self) -> bool {
        self.started == self.order.len()
    }

    /// Start every attachment not started yet, in attachment order.
    /// Calling it again only starts attachments added since.
    pub fn start(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        while self.started < self.order.len() && !self.destroyed {
            let attachment = self.order[self.started];
            self.started += 1;
            match attachment {
                Attachment::Core(ComponentKind::Animator) => {
                    if let Some(animator) = self.animator.as_mut() {
                        animator.start();
                    }
                }
                Attachment::Core(_) => {}
                Attachment::Script(index) => {
                    self.run_script(index, ctx, 0, |script, sc| script.start(sc))?;
                }
            }
        }
        Ok(())
    }

    /// Run one frame of logic, then synchronize with the bound body.
    ///
    /// Components update in attachment order. Pending Transform and Collider
    /// writes are pushed to the body, then the body's center and contact
    /// lists are pulled back. No-op once destroyed.
    pub fn update(&mut self, dt_ms: u32, ctx: &mut FrameContext<'_>) -> Result<()> {
        if self.destroyed {
            return Ok(());
        }

        let result = self.update_components(dt_ms, ctx);
        if self.destroyed {
            return result;
        }
        self.sync_physics(ctx.physics)?;
        result
    }

    fn update_components(&mut self, dt_ms: u32, ctx: &mut FrameContext<'_>) -> Result<()> {
        self.start(ctx)?;

        // Attachments added during this pass wait for the next frame
        let count = self.order.len();
        for i in 0..count {
            if self.destroyed {
                break;
            }
            match self.order[i] {
                Attachment::Core(ComponentKind::Animator) => {
                    if let Some(animator) = self.animator.as_mut() {
                        animator.update(ctx.clock.elapsed_ms());
                    }
                }
                Attachment::Core(_) => {}
                Attachment::Script(index) => {
                    self.run_script(index, ctx, dt_ms, |script, sc| script.update(sc))?;
                }
            }
        }
        Ok(())
    }

    /// Take the script out of its slot while it runs so it can borrow the
    /// object mutably
    fn run_script<F>(
        &mut self,
        index: usize,
        ctx: &mut FrameContext<'_>,
        dt_ms: u32,
        hook: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut dyn Script, &mut ScriptContext<'_>) -> Result<()>,
    {
        let Some(mut script) = self.scripts.get_mut(index).and_then(Option::take) else {
            return Ok(());
        };

        let result = {
            let mut sc = ScriptContext {
                object: self,
                physics: &mut *ctx.physics,
                input: ctx.input,
                clock: ctx.clock,
                commands: &mut *ctx.commands,
                dt_ms,
            };
            hook(script.as_mut(), &mut sc)
        };

        if let Some(slot) = self.scripts.get_mut(index) {
            *slot = Some(script);
        }
        result
    }

    /// Push pending writes to the bound body, then pull its state back
    fn sync_physics(&mut self, physics: &mut PhysicsEngine) -> Result<()> {
        if self.body.is_none() {
            return Ok(());
        }
        let id = self.id;

        let mut resize = false;
        if let Some(transform) = self.transform.as_mut() {
            if let Some(position) = transform.take_pending_position() {
                physics.set_position(id, position)?;
            }
            resize |= transform.take_pending_size();
        }
        if let Some(collider) = self.collider.as_mut() {
            resize |= collider.take_pending_shape();
            if collider.take_pending_sensor() {
                physics.set_sensor(id, collider.is_sensor())?;
            }
            if collider.take_pending_material() {
                physics.set_density(id, collider.density())?;
                physics.set_friction(id, collider.friction())?;
            }
        }
        if resize {
            if let Some(transform) = self.transform.as_ref() {
                let scale = self
                    .collider
                    .as_ref()
                    .map(|c| c.scale(c.is_sensor()))
                    .unwrap_or(1.0);
                physics.set_size(id, transform.scaled_size() * scale)?;
            }
        }

        let center = physics.get_position(id)?;
        if let Some(transform) = self.transform.as_mut() {
            transform.pull_position(center);
        }
        if let Some(collider) = self.collider.as_mut() {
            collider.pull_contacts(
                physics.get_contact_list(id)?,
                physics.get_sensor_contact_list(id)?,
            );
        }
        Ok(())
    }

    /// Draw the object's attachments in order. No-op once destroyed.
    pub fn render(&self, renderer: &mut dyn RenderBackend) -> anyhow::Result<()> {
        if self.destroyed {
            return Ok(());
        }
        for attachment in &self.order {
            match attachment {
                Attachment::Core(ComponentKind::SpriteRenderer) => {
                    if let (Some(sprite), Some(transform)) =
                        (self.sprite_renderer.as_ref(), self.transform.as_ref())
                    {
                        sprite.render(transform, self.animator.as_ref(), renderer)?;
                    }
                }
                Attachment::Core(_) => {}
                Attachment::Script(index) => {
                    if let Some(Some(script)) = self.scripts.get(*index) {
                        script.render(self, renderer)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for GameObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameObject")
            .field("id", &self.id)
            .field("tag", &self.tag)
            .field("destroyed", &self.destroyed)
            .field("components", &self.component_kinds())
            .field("body", &self.body)
            .finish()
    }
}
