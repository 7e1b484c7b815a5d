//! Event routing through the morph tree.
//!
//! A pass starts at [`World::on_event`] and visits every morph, in the order
//! configured by [`DispatchOrder`]. Each visited morph that handles events,
//! is visible, and finds the event not yet consumed reacts to it:
//!
//! - button presses and releases go through the click state machine, which
//!   consumes the event when the pointer is over a morph accepting presses;
//! - pointer moves drive drag tracking and mouse-in / mouse-out.
//!
//! Consumption never stops the pass; later morphs see the flag and stand down.

use crate::action::{ActionContext, ActionKind, Handler, Reply};
use crate::config::DispatchOrder;
use crate::error::Result;
use crate::event::{InputEvent, MouseButton};
use crate::geometry::{Point, Rect};
use crate::morph::{EventFlags, Morph, BUTTON_IDLE_ALPHA};
use crate::tree::NodeId;
use crate::world::World;

impl World {
    /// Route one host event through the tree.
    ///
    /// `region` is the host region that received the event; pointer
    /// coordinates in `event` are relative to its origin. Returns whether a
    /// morph consumed the event.
    pub fn on_event(&mut self, event: InputEvent, region: Rect) -> bool {
        self.window_region = region;
        if let Some((x, y)) = event.coords() {
            self.pointer_absolute = Point::new(region.x + x, region.y + y);
            self.pointer_local = self.pointer_absolute - self.active_region.origin();
        }
        self.consumed = false;
        self.input_event = Some(event.clone());

        log::trace!("event {:?} at {:?}", event, self.pointer_local);

        let children = self.children(self.root()).to_vec();
        for child in children.into_iter().rev() {
            self.dispatch(child, &event);
        }
        self.consumed
    }

    /// Run the action bound to `kind` on `id`, or its built-in behavior, with
    /// the current input event.
    pub fn trigger(&mut self, id: NodeId, kind: ActionKind) -> Result<Reply> {
        self.get(id)?;
        let event = self
            .input_event
            .clone()
            .unwrap_or(InputEvent::MouseMove {
                x: self.pointer_local.x,
                y: self.pointer_local.y,
            });
        Ok(self.run_action(id, kind, &event))
    }

    fn dispatch(&mut self, id: NodeId, event: &InputEvent) {
        match self.config().dispatch_order {
            DispatchOrder::ChildrenFirst => {
                self.dispatch_children(id, event);
                self.handle(id, event);
            }
            DispatchOrder::SelfFirst => {
                let handles_events = self
                    .morph(id)
                    .is_some_and(|m| m.handles(EventFlags::EVENTS));
                self.handle(id, event);
                if !handles_events {
                    self.dispatch_children(id, event);
                }
            }
        }
    }

    fn dispatch_children(&mut self, id: NodeId, event: &InputEvent) {
        // Topmost (last added) first
        let children = self.children(id).to_vec();
        for child in children.into_iter().rev() {
            self.dispatch(child, event);
        }
    }

    fn handle(&mut self, id: NodeId, event: &InputEvent) {
        let Some(morph) = self.morph(id) else {
            return;
        };
        if !morph.handles(EventFlags::EVENTS) || morph.is_hidden() || self.consumed {
            return;
        }

        if event.is_click() {
            self.on_mouse_click(id, event);
        } else if event.is_move() {
            self.on_mouse_over(id, event);
        }
    }

    fn on_mouse_click(&mut self, id: NodeId, event: &InputEvent) {
        let accepts = self
            .morph(id)
            .is_some_and(|m| m.handles(EventFlags::MOUSE_DOWN));
        if !accepts || !self.is_mouse_over(id) {
            return;
        }
        self.consumed = true;

        let kind = match event {
            InputEvent::MouseDown {
                button: MouseButton::Left,
                ..
            } => ActionKind::LeftClick,
            InputEvent::MouseUp {
                button: MouseButton::Left,
                ..
            } => ActionKind::LeftClickReleased,
            InputEvent::MouseDown {
                button: MouseButton::Right,
                ..
            } => ActionKind::RightClick,
            InputEvent::MouseUp {
                button: MouseButton::Right,
                ..
            } => ActionKind::RightClickReleased,
            _ => return,
        };
        log::trace!("{:?} on {:?}", kind, id);
        self.run_action(id, kind, event);
    }

    fn on_mouse_over(&mut self, id: NodeId, event: &InputEvent) {
        let pointer = self.pointer_local;
        let Some(morph) = self.morph_mut(id) else {
            return;
        };

        if let Some(anchor) = morph.drag_anchor() {
            let delta = pointer - anchor;
            let position = morph.get_position() + delta;
            morph.set_position(position);
            morph.begin_drag(pointer);
        }

        if self.is_mouse_over(id) {
            self.run_action(id, ActionKind::MouseIn, event);
        } else {
            if let Some(morph) = self.morph_mut(id) {
                if morph.is_dragging() {
                    log::debug!("drag of {:?} ended, pointer left", id);
                    morph.end_drag();
                }
            }
            self.run_action(id, ActionKind::MouseOut, event);
        }
    }

    fn run_action(&mut self, id: NodeId, kind: ActionKind, event: &InputEvent) -> Reply {
        let handler = match self.morph_mut(id) {
            Some(morph) => morph.actions_mut().take(kind),
            None => return Reply::PassThrough(event.clone()),
        };

        match handler {
            Handler::Bound(mut action) => {
                let reply = {
                    let mut ctx = ActionContext::new(self, id, event.clone());
                    action.invoke(&mut ctx)
                };
                // The action may have removed its own morph
                if let Some(morph) = self.morph_mut(id) {
                    morph.actions_mut().restore(kind, Handler::Bound(action));
                }
                reply
            }
            Handler::Unbound => self.default_action(id, kind, event),
        }
    }

    fn default_action(&mut self, id: NodeId, kind: ActionKind, event: &InputEvent) -> Reply {
        let pointer = self.pointer_local;
        let Some(morph) = self.morph_mut(id) else {
            return Reply::PassThrough(event.clone());
        };

        match kind {
            ActionKind::LeftClick => {
                log::debug!("drag of {:?} started at {:?}", id, pointer);
                morph.begin_drag(pointer);
                Reply::Handled
            }
            ActionKind::LeftClickReleased if morph.is_dragging() => {
                log::debug!("drag of {:?} released", id);
                morph.end_drag();
                Reply::Handled
            }
            ActionKind::MouseIn if fades(morph) => {
                morph.set_alpha(1.0);
                Reply::Handled
            }
            ActionKind::MouseOut if fades(morph) => {
                morph.set_alpha(BUTTON_IDLE_ALPHA);
                Reply::Handled
            }
            _ => Reply::PassThrough(event.clone()),
        }
    }
}

fn fades(morph: &Morph) -> bool {
    morph.is_button() && morph.handles(EventFlags::MOUSE_OVER)
}
