#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Input delivered by the host editor. Coordinates are in canvas space; the
/// host converts them to node-local positions before dispatch.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    MouseDown {
        button: MouseButton,
        x: f32,
        y: f32,
        modifiers: Modifiers,
    },
    MouseUp {
        button: MouseButton,
        x: f32,
        y: f32,
    },
    MouseMove {
        x: f32,
        y: f32,
    },
    DoubleClick {
        x: f32,
        y: f32,
    },
}

impl InputEvent {
    pub fn button(&self) -> Option<MouseButton> {
        match self {
            Self::MouseDown { button, .. } | Self::MouseUp { button, .. } => Some(*button),
            Self::DoubleClick { .. } => Some(MouseButton::Left),
            Self::MouseMove { .. } => None,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::MouseDown { modifiers, .. } => *modifiers,
            _ => Modifiers::default(),
        }
    }
}
