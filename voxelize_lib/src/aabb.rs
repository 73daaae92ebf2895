//! Axis-aligned bounding box type used for mesh and triangle bounds

use nalgebra::Vector3;

use crate::Real;

/// An axis-aligned bounding box in 3D, stored as a min/max corner pair.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisAlignedBoundingBox3d<R: Real> {
    min: Vector3<R>,
    max: Vector3<R>,
}

impl<R: Real> AxisAlignedBoundingBox3d<R> {
    /// Constructs a box directly from a min and max corner. Does not validate `min <= max`.
    pub fn new(min: Vector3<R>, max: Vector3<R>) -> Self {
        Self { min, max }
    }

    /// Constructs the bounding box of a non-empty point cloud.
    ///
    /// # Panics
    /// Panics if `points` is empty.
    pub fn from_points(points: &[Vector3<R>]) -> Self {
        let first = points.first().expect("point set must not be empty");
        let mut aabb = Self::new(*first, *first);
        for p in &points[1..] {
            aabb.extend(p);
        }
        aabb
    }

    /// Extends the box to include the given point.
    pub fn extend(&mut self, point: &Vector3<R>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Returns a copy of this box padded outwards by `epsilon` on every side.
    pub fn padded(&self, epsilon: R) -> Self {
        let pad = Vector3::new(epsilon, epsilon, epsilon);
        Self::new(self.min - pad, self.max + pad)
    }

    pub fn min(&self) -> &Vector3<R> {
        &self.min
    }

    pub fn max(&self) -> &Vector3<R> {
        &self.max
    }

    /// The smallest component of `min` and the largest of `max`, used to build an isotropic
    /// cubic bound enclosing this (generally non-cubic) box.
    pub fn cubic_extent(&self) -> (R, R) {
        let m = self.min.x.min(self.min.y).min(self.min.z);
        let mx = self.max.x.max(self.max.y).max(self.max.z);
        (m, mx)
    }

    pub fn is_degenerate(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y || self.max.z <= self.min.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_expands_componentwise() {
        let pts = vec![
            Vector3::new(0.0f64, 1.0, -1.0),
            Vector3::new(2.0, -1.0, 3.0),
            Vector3::new(-2.0, 0.5, 0.0),
        ];
        let aabb = AxisAlignedBoundingBox3d::from_points(&pts);
        assert_eq!(*aabb.min(), Vector3::new(-2.0, -1.0, -1.0));
        assert_eq!(*aabb.max(), Vector3::new(2.0, 1.0, 3.0));
    }

    #[test]
    fn cubic_extent_picks_global_min_max() {
        let aabb = AxisAlignedBoundingBox3d::new(
            Vector3::new(-1.0f64, -5.0, 0.0),
            Vector3::new(1.0, 2.0, 10.0),
        );
        let (m, mx) = aabb.cubic_extent();
        assert_eq!(m, -5.0);
        assert_eq!(mx, 10.0);
    }

    #[test]
    fn padded_grows_both_sides() {
        let aabb = AxisAlignedBoundingBox3d::new(Vector3::new(0.0f64, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
        let padded = aabb.padded(0.1);
        assert_eq!(*padded.min(), Vector3::new(-0.1, -0.1, -0.1));
        assert_eq!(*padded.max(), Vector3::new(1.1, 1.1, 1.1));
    }
}
