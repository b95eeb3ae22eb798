// Engine key and button codes and their winit mapping

use winit::event::MouseButton as WinitMouseButton;
use winit::keyboard::KeyCode as WinitKeyCode;

/// Keyboard keys the engine tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Alpha0,
    Alpha1,
    Alpha2,
    Alpha3,
    Alpha4,
    Alpha5,
    Alpha6,
    Alpha7,
    Alpha8,
    Alpha9,
    Space,
    UpArrow,
    DownArrow,
    LeftArrow,
    RightArrow,
}

impl KeyCode {
    /// Number of tracked keys
    pub const COUNT: usize = 41;

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Map a physical winit key, `None` for keys the engine ignores
    pub fn from_winit(code: WinitKeyCode) -> Option<Self> {
        use KeyCode::*;
        let key = match code {
            WinitKeyCode::KeyA => A,
            WinitKeyCode::KeyB => B,
            WinitKeyCode::KeyC => C,
            WinitKeyCode::KeyD => D,
            WinitKeyCode::KeyE => E,
            WinitKeyCode::KeyF => F,
            WinitKeyCode::KeyG => G,
            WinitKeyCode::KeyH => H,
            WinitKeyCode::KeyI => I,
            WinitKeyCode::KeyJ => J,
            WinitKeyCode::KeyK => K,
            WinitKeyCode::KeyL => L,
            WinitKeyCode::KeyM => M,
            WinitKeyCode::KeyN => N,
            WinitKeyCode::KeyO => O,
            WinitKeyCode::KeyP => P,
            WinitKeyCode::KeyQ => Q,
            WinitKeyCode::KeyR => R,
            WinitKeyCode::KeyS => S,
            WinitKeyCode::KeyT => T,
            WinitKeyCode::KeyU => U,
            WinitKeyCode::KeyV => V,
            WinitKeyCode::KeyW => W,
            WinitKeyCode::KeyX => X,
            WinitKeyCode::KeyY => Y,
            WinitKeyCode::KeyZ => Z,
            WinitKeyCode::Digit0 => Alpha0,
            WinitKeyCode::Digit1 => Alpha1,
            WinitKeyCode::Digit2 => Alpha2,
            WinitKeyCode::Digit3 => Alpha3,
            WinitKeyCode::Digit4 => Alpha4,
            WinitKeyCode::Digit5 => Alpha5,
            WinitKeyCode::Digit6 => Alpha6,
            WinitKeyCode::Digit7 => Alpha7,
            WinitKeyCode::Digit8 => Alpha8,
            WinitKeyCode::Digit9 => Alpha9,
            WinitKeyCode::Space => Space,
            WinitKeyCode::ArrowUp => UpArrow,
            WinitKeyCode::ArrowDown => DownArrow,
            WinitKeyCode::ArrowLeft => LeftArrow,
            WinitKeyCode::ArrowRight => RightArrow,
            _ => return None,
        };
        Some(key)
    }
}

/// Mouse buttons the engine tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
}

impl MouseButton {
    pub const COUNT: usize = 2;

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn from_winit(button: WinitMouseButton) -> Option<Self> {
        match button {
            WinitMouseButton::Left => Some(MouseButton::Left),
            WinitMouseButton::Right => Some(MouseButton::Right),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_indices_are_dense() {
        assert_eq!(KeyCode::A.index(), 0);
        assert_eq!(KeyCode::Alpha0.index(), 26);
        assert_eq!(KeyCode::RightArrow.index(), KeyCode::COUNT - 1);
    }

    #[test]
    fn test_winit_mapping() {
        assert_eq!(KeyCode::from_winit(WinitKeyCode::KeyW), Some(KeyCode::W));
        assert_eq!(
            KeyCode::from_winit(WinitKeyCode::Digit7),
            Some(KeyCode::Alpha7)
        );
        assert_eq!(KeyCode::from_winit(WinitKeyCode::F11), None);
        assert_eq!(
            MouseButton::from_winit(WinitMouseButton::Right),
            Some(MouseButton::Right)
        );
        assert_eq!(MouseButton::from_winit(WinitMouseButton::Middle), None);
    }
}
