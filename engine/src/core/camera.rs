//! First-person camera
//!
//! Keeps a position plus a yaw/pitch look direction and derives the view
//! matrix from them on demand. Movement and look updates are driven by
//! per-frame input deltas supplied by the caller.

use crate::config::CameraSettings;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Pitch is clamped to this many degrees either side of the horizon
pub const PITCH_LIMIT: f32 = 89.0;

/// Default yaw in degrees; points the look direction down -Z
pub const DEFAULT_YAW: f32 = -90.0;

/// Default movement speed in units per second
pub const DEFAULT_SPEED: f32 = 15.0;

/// Default mouse sensitivity in degrees per input unit
pub const DEFAULT_SENSITIVITY: f32 = 0.1;

/// Direction of a discrete movement step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementDirection {
    /// Along the look direction
    Forward,
    /// Against the look direction
    Back,
    /// Strafe left
    Left,
    /// Strafe right
    Right,
}

/// First-person camera state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    /// Degrees, kept in [0, 360) after the first look update
    yaw: f32,
    /// Degrees, clamped to [-PITCH_LIMIT, PITCH_LIMIT]
    pitch: f32,
    speed: f32,
    sensitivity: f32,
}

impl Camera {
    /// Create a camera at `position` looking along `front`
    ///
    /// `front` and `up` are normalized. Yaw and pitch are derived from
    /// `front`, so a `front` of -Z starts at yaw -90 and pitch 0. A `front`
    /// steeper than the pitch limit is pulled back onto it.
    pub fn new(position: Vec3, front: Vec3, up: Vec3) -> Self {
        let front = front.try_normalize().unwrap_or(Vec3::NEG_Z);
        let (yaw, raw_pitch) = look_angles(front);
        let pitch = raw_pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        let front = if pitch == raw_pitch {
            front
        } else {
            look_direction(yaw, pitch)
        };

        Self {
            position,
            front,
            up: up.try_normalize().unwrap_or(Vec3::Y),
            yaw,
            pitch,
            speed: DEFAULT_SPEED,
            sensitivity: DEFAULT_SENSITIVITY,
        }
    }

    /// Create a camera from configuration
    pub fn from_settings(settings: &CameraSettings) -> Self {
        let mut camera = Self::new(settings.position, settings.front, settings.up);
        camera.speed = settings.speed;
        camera.sensitivity = settings.sensitivity;
        camera
    }

    /// World-to-camera transform for the current state
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Move one step of `speed * delta_time` in `direction`
    ///
    /// Strafing follows `normalize(cross(front, up))`. Several directions in
    /// one frame are applied by calling this once per direction.
    pub fn process_movement(&mut self, direction: MovementDirection, delta_time: f32) {
        let distance = self.speed * delta_time;
        match direction {
            MovementDirection::Forward => self.position += self.front * distance,
            MovementDirection::Back => self.position -= self.front * distance,
            MovementDirection::Left => self.position -= self.right() * distance,
            MovementDirection::Right => self.position += self.right() * distance,
        }
    }

    /// Apply a mouse delta to yaw and pitch and rebuild the look direction
    pub fn process_mouse(&mut self, x_offset: f32, y_offset: f32) {
        let x_offset = x_offset * self.sensitivity;
        let y_offset = y_offset * self.sensitivity;

        self.yaw = wrap_degrees(self.yaw + x_offset);
        self.pitch = (self.pitch + y_offset).clamp(-PITCH_LIMIT, PITCH_LIMIT);

        self.front = look_direction(self.yaw, self.pitch);
    }

    /// Unit strafe vector, or zero when `front` is parallel to `up`
    pub fn right(&self) -> Vec3 {
        self.front.cross(self.up).normalize_or_zero()
    }

    /// Eye position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit look direction
    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Unit up direction
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Yaw in degrees
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch in degrees
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Movement speed in units per second
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Mouse sensitivity in degrees per input unit
    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.sensitivity = sensitivity;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_settings(&CameraSettings::default())
    }
}

/// Wrap an angle in degrees into [0, 360)
fn wrap_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Yaw and pitch in degrees of a unit direction, inverse of [`look_direction`]
fn look_angles(direction: Vec3) -> (f32, f32) {
    let yaw = direction.z.atan2(direction.x).to_degrees();
    let pitch = direction.y.clamp(-1.0, 1.0).asin().to_degrees();
    (yaw, pitch)
}

/// Spherical to Cartesian, yaw measured from +X towards +Z
fn look_direction(yaw_degrees: f32, pitch_degrees: f32) -> Vec3 {
    let (sin_yaw, cos_yaw) = yaw_degrees.to_radians().sin_cos();
    let (sin_pitch, cos_pitch) = pitch_degrees.to_radians().sin_cos();
    Vec3::new(cos_yaw * cos_pitch, sin_pitch, sin_yaw * cos_pitch).normalize()
}

/// Perspective projection paired with the camera by the rendering side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Vertical field of view in radians
    pub fov_y_radians: f32,
    /// Aspect ratio (width / height)
    pub aspect_ratio: f32,
    /// Near clipping plane distance
    pub z_near: f32,
    /// Far clipping plane distance
    pub z_far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self::perspective(45.0, 800.0 / 600.0, 0.1, 100.0)
    }
}

impl Projection {
    /// Create a perspective projection
    ///
    /// # Arguments
    /// * `fov_y_degrees` - Vertical field of view in degrees
    /// * `aspect_ratio` - Width divided by height
    /// * `z_near` - Near clipping plane distance
    /// * `z_far` - Far clipping plane distance
    pub fn perspective(fov_y_degrees: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Self {
        Self {
            fov_y_radians: fov_y_degrees.to_radians(),
            aspect_ratio,
            z_near,
            z_far,
        }
    }

    /// Calculate the projection matrix
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_radians, self.aspect_ratio, self.z_near, self.z_far)
    }

    /// Update the aspect ratio (useful when window resizes)
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }
}
