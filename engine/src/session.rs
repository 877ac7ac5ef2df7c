//! Per-session interactive state
//!
//! The application owns one [`Session`] and hands it by reference to the
//! event handlers (which feed [`InputState`]) and to the frame update
//! (which drives the [`Camera`]).

use crate::config::CameraSettings;
use crate::core::camera::Camera;
use crate::input::InputState;
use std::time::Instant;
use tracing::trace;

/// Camera, input and frame timing for one interactive session
#[derive(Debug, Clone)]
pub struct Session {
    pub camera: Camera,
    pub input: InputState,
    last_frame: Instant,
}

impl Session {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            input: InputState::new(),
            last_frame: Instant::now(),
        }
    }

    pub fn from_settings(settings: &CameraSettings) -> Self {
        Self::new(Camera::from_settings(settings))
    }

    /// Apply this frame's input to the camera
    ///
    /// One movement step per held direction, then the accumulated mouse
    /// delta. Window y grows downwards, so it is negated for pitch.
    pub fn update(&mut self, delta_time: f32) {
        let directions: Vec<_> = self.input.movement_directions().collect();
        for direction in directions {
            self.camera.process_movement(direction, delta_time);
        }

        let (dx, dy) = self.input.take_mouse_delta();
        if dx != 0.0 || dy != 0.0 {
            self.camera.process_mouse(dx, -dy);
        }

        self.input.clear_frame_data();
        trace!(position = ?self.camera.position(), front = ?self.camera.front(), "Camera updated");
    }

    /// Measure the time since the previous tick and update with it
    ///
    /// Returns the elapsed seconds.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta_time = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.update(delta_time);
        delta_time
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Camera::default())
    }
}
