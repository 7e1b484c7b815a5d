//! Low-level input events as delivered by the host.
//!
//! Pointer coordinates are local to the host region that owns the event;
//! the world converts them into window and world space during dispatch.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Named keys for special keyboard keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    Left,
    Right,
    Up,
    Down,
    /// Character input
    Char(char),
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer moved
    MouseMove { x: f32, y: f32 },
    /// Mouse button pressed
    MouseDown { x: f32, y: f32, button: MouseButton },
    /// Mouse button released
    MouseUp { x: f32, y: f32, button: MouseButton },
    /// Second press of a double click. Consumed like any button event but
    /// never mapped to an action.
    DoubleClick { x: f32, y: f32, button: MouseButton },
    KeyDown { key: Key },
    KeyUp { key: Key },
}

impl InputEvent {
    /// Get the pointer coordinates carried by this event, if any
    pub fn coords(&self) -> Option<(f32, f32)> {
        match self {
            InputEvent::MouseMove { x, y }
            | InputEvent::MouseDown { x, y, .. }
            | InputEvent::MouseUp { x, y, .. }
            | InputEvent::DoubleClick { x, y, .. } => Some((*x, *y)),
            InputEvent::KeyDown { .. } | InputEvent::KeyUp { .. } => None,
        }
    }

    pub fn button(&self) -> Option<MouseButton> {
        match self {
            InputEvent::MouseDown { button, .. }
            | InputEvent::MouseUp { button, .. }
            | InputEvent::DoubleClick { button, .. } => Some(*button),
            _ => None,
        }
    }

    /// True for left/right button events, the only buttons the click
    /// state machine reacts to.
    pub fn is_click(&self) -> bool {
        matches!(
            self.button(),
            Some(MouseButton::Left) | Some(MouseButton::Right)
        )
    }

    pub fn is_move(&self) -> bool {
        matches!(self, InputEvent::MouseMove { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_coords() {
        assert_eq!(
            InputEvent::MouseMove { x: 1.0, y: 2.0 }.coords(),
            Some((1.0, 2.0))
        );
        assert_eq!(
            InputEvent::MouseUp {
                x: 3.0,
                y: 4.0,
                button: MouseButton::Right
            }
            .coords(),
            Some((3.0, 4.0))
        );
        assert_eq!(InputEvent::KeyDown { key: Key::Enter }.coords(), None);
    }

    #[test]
    fn test_event_click_classification() {
        let left = InputEvent::MouseDown {
            x: 0.0,
            y: 0.0,
            button: MouseButton::Left,
        };
        let middle = InputEvent::MouseDown {
            x: 0.0,
            y: 0.0,
            button: MouseButton::Middle,
        };
        assert!(left.is_click());
        assert!(!middle.is_click());
        assert!(!InputEvent::MouseMove { x: 0.0, y: 0.0 }.is_click());
        assert!(InputEvent::MouseMove { x: 0.0, y: 0.0 }.is_move());
        assert!(!InputEvent::KeyUp { key: Key::Char('a') }.is_click());
    }
}
