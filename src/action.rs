//! Action slots attached to morphs.
//!
//! Each morph has one slot per [`ActionKind`]. A slot is either
//! [`Handler::Unbound`], in which case the dispatcher runs the built-in
//! behavior for that kind, or [`Handler::Bound`], which replaces the built-in
//! behavior entirely.

use std::fmt;

use crate::event::InputEvent;
use crate::morph::Morph;
use crate::tree::NodeId;
use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    LeftClick,
    LeftClickReleased,
    RightClick,
    RightClickReleased,
    MouseIn,
    MouseOut,
}

impl ActionKind {
    pub const ALL: [ActionKind; 6] = [
        ActionKind::LeftClick,
        ActionKind::LeftClickReleased,
        ActionKind::RightClick,
        ActionKind::RightClickReleased,
        ActionKind::MouseIn,
        ActionKind::MouseOut,
    ];

    fn slot(self) -> usize {
        match self {
            ActionKind::LeftClick => 0,
            ActionKind::LeftClickReleased => 1,
            ActionKind::RightClick => 2,
            ActionKind::RightClickReleased => 3,
            ActionKind::MouseIn => 4,
            ActionKind::MouseOut => 5,
        }
    }
}

/// What an action did with the event.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Not handled; the current event is handed back to the host.
    PassThrough(InputEvent),
    Handled,
}

impl Reply {
    pub fn is_handled(&self) -> bool {
        matches!(self, Reply::Handled)
    }
}

/// Behavior bound to an action slot.
pub trait Action {
    fn invoke(&mut self, ctx: &mut ActionContext<'_>) -> Reply;
}

impl<F> Action for F
where
    F: FnMut(&mut ActionContext<'_>) -> Reply,
{
    fn invoke(&mut self, ctx: &mut ActionContext<'_>) -> Reply {
        self(ctx)
    }
}

#[derive(Default)]
pub enum Handler {
    #[default]
    Unbound,
    Bound(Box<dyn Action>),
}

impl Handler {
    pub fn is_bound(&self) -> bool {
        matches!(self, Handler::Bound(_))
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Unbound => f.write_str("Unbound"),
            Handler::Bound(_) => f.write_str("Bound(..)"),
        }
    }
}

#[derive(Debug, Default)]
pub struct ActionSlots {
    slots: [Handler; 6],
}

impl ActionSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, kind: ActionKind, action: impl Action + 'static) {
        self.slots[kind.slot()] = Handler::Bound(Box::new(action));
    }

    pub fn unbind(&mut self, kind: ActionKind) {
        self.slots[kind.slot()] = Handler::Unbound;
    }

    pub fn is_bound(&self, kind: ActionKind) -> bool {
        self.slots[kind.slot()].is_bound()
    }

    /// Move the handler out so it can run with mutable access to the world.
    pub(crate) fn take(&mut self, kind: ActionKind) -> Handler {
        std::mem::take(&mut self.slots[kind.slot()])
    }

    /// Put a handler back unless the slot was rebound while it ran.
    pub(crate) fn restore(&mut self, kind: ActionKind, handler: Handler) {
        let slot = &mut self.slots[kind.slot()];
        if !slot.is_bound() {
            *slot = handler;
        }
    }
}

/// Access handed to an action while it runs.
pub struct ActionContext<'a> {
    world: &'a mut World,
    node: NodeId,
    event: InputEvent,
}

impl<'a> ActionContext<'a> {
    pub(crate) fn new(world: &'a mut World, node: NodeId, event: InputEvent) -> Self {
        Self { world, node, event }
    }

    /// The morph owning the action.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn event(&self) -> &InputEvent {
        &self.event
    }

    pub fn world(&self) -> &World {
        &*self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut *self.world
    }

    pub fn morph(&self) -> Option<&Morph> {
        self.world.morph(self.node)
    }

    pub fn morph_mut(&mut self) -> Option<&mut Morph> {
        self.world.morph_mut(self.node)
    }

    /// Hand the current event back unhandled.
    pub fn pass_through(&self) -> Reply {
        Reply::PassThrough(self.event.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_default_unbound() {
        let slots = ActionSlots::new();
        for kind in ActionKind::ALL {
            assert!(!slots.is_bound(kind));
        }
    }

    #[test]
    fn test_slots_bind_unbind() {
        let mut slots = ActionSlots::new();
        slots.bind(ActionKind::RightClick, |_: &mut ActionContext<'_>| Reply::Handled);
        assert!(slots.is_bound(ActionKind::RightClick));
        assert!(!slots.is_bound(ActionKind::LeftClick));

        slots.unbind(ActionKind::RightClick);
        assert!(!slots.is_bound(ActionKind::RightClick));
    }

    #[test]
    fn test_slots_take_and_restore() {
        let mut slots = ActionSlots::new();
        slots.bind(ActionKind::MouseIn, |_: &mut ActionContext<'_>| Reply::Handled);

        let handler = slots.take(ActionKind::MouseIn);
        assert!(handler.is_bound());
        assert!(!slots.is_bound(ActionKind::MouseIn));

        slots.restore(ActionKind::MouseIn, handler);
        assert!(slots.is_bound(ActionKind::MouseIn));
    }

    #[test]
    fn test_restore_keeps_rebound_handler() {
        let mut slots = ActionSlots::new();
        slots.bind(ActionKind::MouseOut, |_: &mut ActionContext<'_>| Reply::Handled);
        let old = slots.take(ActionKind::MouseOut);

        // Rebound while the old handler was running
        slots.bind(ActionKind::MouseOut, |ctx: &mut ActionContext<'_>| {
            ctx.pass_through()
        });
        slots.restore(ActionKind::MouseOut, old);

        assert!(slots.is_bound(ActionKind::MouseOut));
        assert_eq!(format!("{:?}", slots.take(ActionKind::MouseOut)), "Bound(..)");
    }
}
