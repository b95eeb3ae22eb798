use std::fmt;

use super::animator::Animator;
use super::arena::GameObjectId;
use super::collider::Collider;
use super::game_object::GameObject;
use super::script::Script;
use super::sprite_renderer::SpriteRenderer;
use super::transform::Transform;

/// Kind of an attachable component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Transform,
    SpriteRenderer,
    Animator,
    Collider,
    Script,
}

impl ComponentKind {
    /// Kinds the engine guarantees on every object it creates
    pub const CORE: [ComponentKind; 4] = [
        ComponentKind::Transform,
        ComponentKind::SpriteRenderer,
        ComponentKind::Animator,
        ComponentKind::Collider,
    ];

    /// At most one component of an exclusive kind may be attached
    pub fn is_exclusive(&self) -> bool {
        !matches!(self, ComponentKind::Script)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ComponentKind::Transform => "Transform",
            ComponentKind::SpriteRenderer => "SpriteRenderer",
            ComponentKind::Animator => "Animator",
            ComponentKind::Collider => "Collider",
            ComponentKind::Script => "Script",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What to do when an exclusive kind is attached a second time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum DuplicatePolicy {
    /// Fail with `EngineError::DuplicateComponent`, keep the attached one
    #[default]
    Reject,
    /// Overwrite in place; the attachment keeps its original position
    Replace,
}

/// A component before it is attached to a game object
pub enum Component {
    Transform(Transform),
    SpriteRenderer(SpriteRenderer),
    Animator(Animator),
    Collider(Collider),
    Script(Box<dyn Script>),
}

impl Component {
    /// Wrap a user script
    pub fn script(script: impl Script + 'static) -> Self {
        Component::Script(Box::new(script))
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Transform(_) => ComponentKind::Transform,
            Component::SpriteRenderer(_) => ComponentKind::SpriteRenderer,
            Component::Animator(_) => ComponentKind::Animator,
            Component::Collider(_) => ComponentKind::Collider,
            Component::Script(_) => ComponentKind::Script,
        }
    }

    pub(crate) fn set_owner(&mut self, owner: Option<GameObjectId>) {
        match self {
            Component::Transform(c) => c.owner = owner,
            Component::SpriteRenderer(c) => c.owner = owner,
            Component::Animator(c) => c.owner = owner,
            Component::Collider(c) => c.owner = owner,
            Component::Script(_) => {}
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Script(script) => write!(f, "Script({})", script.name()),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// Position of a component in its object's attachment order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Attachment {
    Core(ComponentKind),
    Script(usize),
}

/// Compile-time typed access to the cached core slots of a [`GameObject`]
pub trait CoreComponent: Sized + Into<Component> {
    const KIND: ComponentKind;

    fn slot(object: &GameObject) -> Option<&Self>;
    fn slot_mut(object: &mut GameObject) -> Option<&mut Self>;
}

macro_rules! core_component {
    ($ty:ident, $accessor:ident, $accessor_mut:ident) => {
        impl From<$ty> for Component {
            fn from(component: $ty) -> Self {
                Component::$ty(component)
            }
        }

        impl CoreComponent for $ty {
            const KIND: ComponentKind = ComponentKind::$ty;

            fn slot(object: &GameObject) -> Option<&Self> {
                object.$accessor()
            }

            fn slot_mut(object: &mut GameObject) -> Option<&mut Self> {
                object.$accessor_mut()
            }
        }
    };
}

core_component!(Transform, transform, transform_mut);
core_component!(SpriteRenderer, sprite_renderer, sprite_renderer_mut);
core_component!(Animator, animator, animator_mut);
core_component!(Collider, collider, collider_mut);
