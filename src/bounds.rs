/// Axis index for the X dimension.
pub const AXIS_X: usize = 0;
/// Axis index for the Y dimension.
pub const AXIS_Y: usize = 1;
/// Axis index for the Z dimension.
pub const AXIS_Z: usize = 2;

/// Axis-aligned bounding box in 3D space.
#[derive(Clone, Copy, Debug)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundingBox {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    /// An inverted box that expands to fit the first point added to it.
    pub fn empty() -> Self {
        Self {
            min: [f64::INFINITY; 3],
            max: [f64::NEG_INFINITY; 3],
        }
    }

    /// Grows the box to contain `point`.
    pub fn expand(&mut self, point: &[f64; 3]) {
        for axis in 0..3 {
            if point[axis] < self.min[axis] {
                self.min[axis] = point[axis];
            }
            if point[axis] > self.max[axis] {
                self.max[axis] = point[axis];
            }
        }
    }

    /// Tight box around a set of points.
    pub fn from_points(points: &[[f64; 3]]) -> Self {
        let mut bounds = Self::empty();
        for point in points {
            bounds.expand(point);
        }
        bounds
    }

    /// Extent of the box along each axis.
    pub fn diagonal(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    /// The axis with the largest extent.
    ///
    /// Ties use strict comparisons, so equal extents fall through to the
    /// later axis (z over y, y over x). The precedence only affects tree
    /// shape, not query results, but is kept fixed for reproducible builds.
    pub fn split_axis(&self) -> usize {
        let d = self.diagonal();
        if d[AXIS_X] > d[AXIS_Y] {
            if d[AXIS_X] > d[AXIS_Z] { AXIS_X } else { AXIS_Z }
        } else if d[AXIS_Y] > d[AXIS_Z] {
            AXIS_Y
        } else {
            AXIS_Z
        }
    }

    /// Center of the box along one axis.
    pub fn midpoint(&self, axis: usize) -> f64 {
        0.5 * (self.min[axis] + self.max[axis])
    }

    pub fn contains(&self, point: &[f64; 3]) -> bool {
        (0..3).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }
}
