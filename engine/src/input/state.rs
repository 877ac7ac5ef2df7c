//! Input state tracking

use crate::core::camera::MovementDirection;
use std::collections::HashSet;
use tracing::trace;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Key bindings for camera movement, checked in this order
const MOVEMENT_BINDINGS: [(MovementDirection, [KeyCode; 2]); 4] = [
    (MovementDirection::Forward, [KeyCode::KeyW, KeyCode::ArrowUp]),
    (MovementDirection::Back, [KeyCode::KeyS, KeyCode::ArrowDown]),
    (MovementDirection::Left, [KeyCode::KeyA, KeyCode::ArrowLeft]),
    (MovementDirection::Right, [KeyCode::KeyD, KeyCode::ArrowRight]),
];

/// Tracks held keys and the mouse motion of the current frame
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Currently pressed keys
    pub keys_pressed: HashSet<KeyCode>,
    /// Mouse movement delta since last frame, in window pixels (y down)
    pub mouse_delta: (f32, f32),
}

impl InputState {
    /// Create a new empty input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame data (like mouse delta)
    pub fn clear_frame_data(&mut self) {
        self.mouse_delta = (0.0, 0.0);
    }

    /// Handle a keyboard event
    pub fn handle_keyboard_event(&mut self, event: &KeyEvent) {
        if let PhysicalKey::Code(key_code) = event.physical_key {
            match event.state {
                ElementState::Pressed => self.press_key(key_code),
                ElementState::Released => self.release_key(key_code),
            }
        }
    }

    pub fn press_key(&mut self, key_code: KeyCode) {
        self.keys_pressed.insert(key_code);
        trace!("Key pressed: {:?}", key_code);
    }

    pub fn release_key(&mut self, key_code: KeyCode) {
        self.keys_pressed.remove(&key_code);
        trace!("Key released: {:?}", key_code);
    }

    /// Add mouse movement delta
    pub fn add_mouse_delta(&mut self, dx: f32, dy: f32) {
        self.mouse_delta.0 += dx;
        self.mouse_delta.1 += dy;
        trace!("Mouse delta: ({}, {})", dx, dy);
    }

    /// Return the accumulated mouse delta and reset it
    pub fn take_mouse_delta(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.mouse_delta)
    }

    /// Check if a key is currently pressed
    pub fn is_key_pressed(&self, key_code: KeyCode) -> bool {
        self.keys_pressed.contains(&key_code)
    }

    /// Movement directions whose keys are held, in binding order
    ///
    /// A direction is reported once even when several of its keys are held.
    pub fn movement_directions(&self) -> impl Iterator<Item = MovementDirection> + '_ {
        MOVEMENT_BINDINGS
            .iter()
            .filter(|(_, keys)| keys.iter().any(|key| self.is_key_pressed(*key)))
            .map(|(direction, _)| *direction)
    }
}
