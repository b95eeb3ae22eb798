// Keyboard and mouse state for the current frame

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::PhysicalKey;

use super::keys::{KeyCode, MouseButton};

/// Input state owned by the engine.
///
/// Down/up signals are edges raised by events during a frame and cleared by
/// [`InputHandler::reset_input_signal`] at the frame's end; held state
/// persists until the release.
#[derive(Debug, Clone)]
pub struct InputHandler {
    key_down: [bool; KeyCode::COUNT],
    key_up: [bool; KeyCode::COUNT],
    key_held: [bool; KeyCode::COUNT],
    mouse_down: [bool; MouseButton::COUNT],
    mouse_up: [bool; MouseButton::COUNT],
    mouse_held: [bool; MouseButton::COUNT],
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            key_down: [false; KeyCode::COUNT],
            key_up: [false; KeyCode::COUNT],
            key_held: [false; KeyCode::COUNT],
            mouse_down: [false; MouseButton::COUNT],
            mouse_up: [false; MouseButton::COUNT],
            mouse_held: [false; MouseButton::COUNT],
        }
    }

    /// Process a keyboard event from winit
    pub fn process_keyboard_event(&mut self, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let Some(key) = KeyCode::from_winit(code) else {
            return;
        };
        match event.state {
            // Ignore key repeat
            ElementState::Pressed if !event.repeat => self.key_down(key),
            ElementState::Pressed => {}
            ElementState::Released => self.key_up(key),
        }
    }

    /// Process a mouse button event from winit
    pub fn process_mouse_event(&mut self, button: winit::event::MouseButton, state: ElementState) {
        let Some(button) = MouseButton::from_winit(button) else {
            return;
        };
        match state {
            ElementState::Pressed => self.mouse_down(button),
            ElementState::Released => self.mouse_up(button),
        }
    }

    pub fn key_down(&mut self, key: KeyCode) {
        let i = key.index();
        if !self.key_held[i] {
            self.key_down[i] = true;
        }
        self.key_held[i] = true;
    }

    pub fn key_up(&mut self, key: KeyCode) {
        let i = key.index();
        if self.key_held[i] {
            self.key_up[i] = true;
        }
        self.key_held[i] = false;
    }

    pub fn mouse_down(&mut self, button: MouseButton) {
        let i = button.index();
        if !self.mouse_held[i] {
            self.mouse_down[i] = true;
        }
        self.mouse_held[i] = true;
    }

    pub fn mouse_up(&mut self, button: MouseButton) {
        let i = button.index();
        if self.mouse_held[i] {
            self.mouse_up[i] = true;
        }
        self.mouse_held[i] = false;
    }

    /// Key went down this frame
    pub fn get_key_down(&self, key: KeyCode) -> bool {
        self.key_down[key.index()]
    }

    /// Key was released this frame
    pub fn get_key_up(&self, key: KeyCode) -> bool {
        self.key_up[key.index()]
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.key_held[key.index()]
    }

    pub fn get_mouse_down(&self, button: MouseButton) -> bool {
        self.mouse_down[button.index()]
    }

    pub fn get_mouse_up(&self, button: MouseButton) -> bool {
        self.mouse_up[button.index()]
    }

    pub fn is_mouse_held(&self, button: MouseButton) -> bool {
        self.mouse_held[button.index()]
    }

    /// Horizontal axis from the arrow keys and A/D: -1, 0 or 1
    pub fn horizontal_axis(&self) -> f32 {
        let left = self.is_key_held(KeyCode::LeftArrow) || self.is_key_held(KeyCode::A);
        let right = self.is_key_held(KeyCode::RightArrow) || self.is_key_held(KeyCode::D);
        (right as i32 - left as i32) as f32
    }

    /// Clear this frame's down/up edges
    pub fn reset_input_signal(&mut self) {
        self.key_down = [false; KeyCode::COUNT];
        self.key_up = [false; KeyCode::COUNT];
        self.mouse_down = [false; MouseButton::COUNT];
        self.mouse_up = [false; MouseButton::COUNT];
    }

    /// Forget everything, held state included (e.g. on focus loss)
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_edges_last_one_frame() {
        let mut input = InputHandler::new();
        input.key_down(KeyCode::Space);
        assert!(input.get_key_down(KeyCode::Space));
        assert!(input.is_key_held(KeyCode::Space));

        input.reset_input_signal();
        assert!(!input.get_key_down(KeyCode::Space));
        assert!(input.is_key_held(KeyCode::Space));

        input.key_up(KeyCode::Space);
        assert!(input.get_key_up(KeyCode::Space));
        assert!(!input.is_key_held(KeyCode::Space));
    }

    #[test]
    fn test_repeated_down_is_one_edge() {
        let mut input = InputHandler::new();
        input.key_down(KeyCode::W);
        input.reset_input_signal();
        input.key_down(KeyCode::W);
        assert!(!input.get_key_down(KeyCode::W));
    }

    #[test]
    fn test_up_without_down_is_ignored() {
        let mut input = InputHandler::new();
        input.key_up(KeyCode::Q);
        assert!(!input.get_key_up(KeyCode::Q));
    }

    #[test]
    fn test_mouse_buttons() {
        let mut input = InputHandler::new();
        input.mouse_down(MouseButton::Left);
        assert!(input.get_mouse_down(MouseButton::Left));
        assert!(!input.get_mouse_down(MouseButton::Right));

        input.mouse_up(MouseButton::Left);
        assert!(input.get_mouse_up(MouseButton::Left));
        assert!(!input.is_mouse_held(MouseButton::Left));
    }

    #[test]
    fn test_horizontal_axis() {
        let mut input = InputHandler::new();
        assert_eq!(input.horizontal_axis(), 0.0);
        input.key_down(KeyCode::LeftArrow);
        assert_eq!(input.horizontal_axis(), -1.0);
        input.key_down(KeyCode::D);
        assert_eq!(input.horizontal_axis(), 0.0);
        input.reset();
        assert!(!input.is_key_held(KeyCode::LeftArrow));
    }
}
