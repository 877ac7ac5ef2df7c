//! Axis-aligned bounding boxes
//!
//! Used to re-centre imported geometry around the origin so that meshes
//! authored with arbitrary pivots frame predictably.

use glam::Vec3;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Per-axis minimum
    pub min: Vec3,
    /// Per-axis maximum
    pub max: Vec3,
}

impl Aabb {
    /// Create a bounding box from explicit corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Compute the bounding box of a point set in a single pass
    ///
    /// Returns `None` for an empty set. Minimum and maximum are tracked
    /// independently on every axis, so a point that extends one bound can
    /// still extend the opposite bound of another axis.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut min = *first;
        let mut max = *first;
        for point in rest {
            min = min.min(*point);
            max = max.max(*point);
        }
        Some(Self { min, max })
    }

    /// Midpoint of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Full size of the box along each axis
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// The same box moved by `offset`
    pub fn translated(&self, offset: Vec3) -> Aabb {
        Aabb {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Check whether a point lies inside or on the box
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// Centre of the bounding box of `positions`, or `None` when empty
pub fn bounding_box_center(positions: &[Vec3]) -> Option<Vec3> {
    Aabb::from_points(positions).map(|aabb| aabb.center())
}
