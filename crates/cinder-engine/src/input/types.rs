/// Keyboard key identifier.
///
/// Only the keys the demo binds are named; everything else maps to
/// `Key::Unknown` with the platform key code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Space,
    Shift,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    A, D, S, W, X,

    F1,

    /// Platform-dependent key not represented here.
    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Platform-agnostic input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key {
        key: Key,
        state: KeyState,
        /// OS auto-repeat.
        repeat: bool,
    },
    Focused(bool),
}
