//! Axis-aligned bounding boxes.

use glam::Vec3;

/// An axis-aligned bounding box stored as center and half-size.
///
/// Renderers use it for culling, so it must enclose every vertex position
/// of the mesh it is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    /// Center of the box.
    pub center: Vec3,
    /// Half of the box size along each axis.
    pub extents: Vec3,
}

impl Bounds {
    /// Create bounds from a center and a full size.
    pub fn new(center: Vec3, size: Vec3) -> Self {
        Self {
            center,
            extents: size * 0.5,
        }
    }

    /// Create bounds spanning `min` to `max`.
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            extents: (max - min) * 0.5,
        }
    }

    /// Compute the smallest bounds enclosing all points.
    ///
    /// Returns `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut min = first;
        let mut max = first;
        for p in points {
            min = min.min(p);
            max = max.max(p);
        }
        Some(Self::from_min_max(min, max))
    }

    /// Full size of the box.
    pub fn size(&self) -> Vec3 {
        self.extents * 2.0
    }

    /// Minimal corner.
    pub fn min(&self) -> Vec3 {
        self.center - self.extents
    }

    /// Maximal corner.
    pub fn max(&self) -> Vec3 {
        self.center + self.extents
    }

    /// Grow the box to include `point`.
    pub fn encapsulate(&mut self, point: Vec3) {
        *self = Self::from_min_max(self.min().min(point), self.max().max(point));
    }

    /// Grow the box to include another box.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Self::from_min_max(self.min().min(other.min()), self.max().max(other.max()))
    }

    /// Check whether `point` lies inside or on the box.
    pub fn contains(&self, point: Vec3) -> bool {
        let min = self.min();
        let max = self.max();
        point.cmpge(min).all() && point.cmple(max).all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_size() {
        let bounds = Bounds::new(Vec3::new(0.5, 0.5, 0.0), Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(bounds.min(), Vec3::ZERO);
        assert_eq!(bounds.max(), Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(bounds.size(), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_from_points() {
        assert!(Bounds::from_points(std::iter::empty()).is_none());

        let corners = [Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::new(1.0, 1.0, 0.0)];
        let bounds = Bounds::from_points(corners).unwrap();
        assert_eq!(bounds.center, Vec3::new(0.5, 0.5, 0.0));
        assert_eq!(bounds.size(), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_encapsulate_and_contains() {
        let mut bounds = Bounds::from_min_max(Vec3::ZERO, Vec3::ONE);
        assert!(bounds.contains(Vec3::splat(0.5)));
        assert!(!bounds.contains(Vec3::splat(2.0)));

        bounds.encapsulate(Vec3::splat(2.0));
        assert!(bounds.contains(Vec3::splat(2.0)));
        assert_eq!(bounds.min(), Vec3::ZERO);

        let other = Bounds::from_min_max(Vec3::splat(-1.0), Vec3::ZERO);
        let union = bounds.union(&other);
        assert_eq!(union.min(), Vec3::splat(-1.0));
        assert_eq!(union.max(), Vec3::splat(2.0));
    }
}
