//! Keyboard and pointer state

use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

/// Input state collected from window events between two frames
#[derive(Debug)]
pub struct Input {
    /// Currently pressed keys
    pressed_keys: HashSet<KeyCode>,
    /// Keys that were just pressed this frame
    just_pressed_keys: HashSet<KeyCode>,
    /// Currently pressed mouse buttons
    pressed_mouse_buttons: HashSet<MouseButton>,
    /// Mouse buttons just pressed this frame
    just_pressed_mouse_buttons: HashSet<MouseButton>,
    /// Mouse buttons just released this frame
    just_released_mouse_buttons: HashSet<MouseButton>,
    /// Cursor position in physical pixels, `None` while outside the window
    cursor: Option<Vec2>,
    /// Cursor moved this frame
    cursor_moved: bool,
    /// Cursor left the window this frame
    cursor_left: bool,
}

impl Input {
    /// Create a new input manager
    pub fn new() -> Self {
        Self {
            pressed_keys: HashSet::new(),
            just_pressed_keys: HashSet::new(),
            pressed_mouse_buttons: HashSet::new(),
            just_pressed_mouse_buttons: HashSet::new(),
            just_released_mouse_buttons: HashSet::new(),
            cursor: None,
            cursor_moved: false,
            cursor_left: false,
        }
    }

    /// Call at the end of each frame to clear per-frame state
    pub fn update(&mut self) {
        self.just_pressed_keys.clear();
        self.just_pressed_mouse_buttons.clear();
        self.just_released_mouse_buttons.clear();
        self.cursor_moved = false;
        self.cursor_left = false;
    }

    /// Process a keyboard event
    pub fn process_keyboard(&mut self, key_code: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.pressed_keys.insert(key_code) {
                    self.just_pressed_keys.insert(key_code);
                }
            }
            ElementState::Released => {
                self.pressed_keys.remove(&key_code);
            }
        }
    }

    /// Process a mouse button event
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.pressed_mouse_buttons.insert(button) {
                    self.just_pressed_mouse_buttons.insert(button);
                }
            }
            ElementState::Released => {
                if self.pressed_mouse_buttons.remove(&button) {
                    self.just_released_mouse_buttons.insert(button);
                }
            }
        }
    }

    /// Process cursor movement inside the window
    pub fn process_cursor_moved(&mut self, position: Vec2) {
        self.cursor = Some(position);
        self.cursor_moved = true;
        self.cursor_left = false;
    }

    /// Process the cursor leaving the window
    pub fn process_cursor_left(&mut self) {
        self.cursor = None;
        self.cursor_left = true;
    }

    /// Check if a key is currently pressed
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.pressed_keys.contains(&key)
    }

    /// Check if a key was just pressed this frame
    pub fn is_key_just_pressed(&self, key: KeyCode) -> bool {
        self.just_pressed_keys.contains(&key)
    }

    /// Check if a mouse button is currently pressed
    pub fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.pressed_mouse_buttons.contains(&button)
    }

    /// Check if a mouse button was just pressed this frame
    pub fn is_mouse_button_just_pressed(&self, button: MouseButton) -> bool {
        self.just_pressed_mouse_buttons.contains(&button)
    }

    /// Check if a mouse button was just released this frame
    pub fn is_mouse_button_just_released(&self, button: MouseButton) -> bool {
        self.just_released_mouse_buttons.contains(&button)
    }

    /// Cursor position, if the cursor is inside the window
    pub fn cursor_position(&self) -> Option<Vec2> {
        self.cursor
    }

    /// Whether the cursor moved this frame
    pub fn cursor_moved(&self) -> bool {
        self.cursor_moved
    }

    /// Whether the cursor left the window this frame
    pub fn cursor_left(&self) -> bool {
        self.cursor_left
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_press_release_edges() {
        let mut input = Input::new();

        input.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        assert!(input.is_mouse_button_just_pressed(MouseButton::Left));
        assert!(input.is_mouse_button_pressed(MouseButton::Left));

        input.update();
        assert!(!input.is_mouse_button_just_pressed(MouseButton::Left));
        assert!(input.is_mouse_button_pressed(MouseButton::Left));

        input.process_mouse_button(MouseButton::Left, ElementState::Released);
        assert!(input.is_mouse_button_just_released(MouseButton::Left));
        assert!(!input.is_mouse_button_pressed(MouseButton::Left));
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let mut input = Input::new();
        input.process_mouse_button(MouseButton::Left, ElementState::Released);
        assert!(!input.is_mouse_button_just_released(MouseButton::Left));
    }

    #[test]
    fn test_cursor_enter_and_leave() {
        let mut input = Input::new();
        assert_eq!(input.cursor_position(), None);

        input.process_cursor_moved(Vec2::new(10.0, 20.0));
        assert_eq!(input.cursor_position(), Some(Vec2::new(10.0, 20.0)));
        assert!(input.cursor_moved());

        input.update();
        assert!(!input.cursor_moved());

        input.process_cursor_left();
        assert_eq!(input.cursor_position(), None);
        assert!(input.cursor_left());
    }

    #[test]
    fn test_key_repeat_is_not_just_pressed() {
        let mut input = Input::new();
        input.process_keyboard(KeyCode::Escape, ElementState::Pressed);
        input.update();
        input.process_keyboard(KeyCode::Escape, ElementState::Pressed);

        assert!(input.is_key_pressed(KeyCode::Escape));
        assert!(!input.is_key_just_pressed(KeyCode::Escape));
    }
}
