//! Core math and camera types

pub mod bounds;
pub mod camera;

pub use bounds::{bounding_box_center, Aabb};
pub use camera::{Camera, MovementDirection, Projection};
