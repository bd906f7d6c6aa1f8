//! Geometric primitives for canvas layout and positioning.
//!
//! - [`Point`] - A 2D coordinate in canvas space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - An axis-aligned rectangle
//!
//! # Coordinate System
//!
//! Blockdraft uses the SVG coordinate system:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! Block positions are top-left corners. After free-form dragging they may
//! become negative; sizes are always positive.

/// A 2D point in canvas coordinate space.
///
/// # Examples
///
/// ```
/// # use blockdraft_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let mid = p1.midpoint(p2);
/// assert_eq!(mid.x(), 7.5);
/// assert_eq!(mid.y(), 12.5);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns `true` when both dimensions are strictly positive and finite.
    pub fn is_positive(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// An axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates bounds from a top-left corner and a size.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdraft_core::geometry::{Bounds, Point, Size};
    /// let bounds = Bounds::new_from_top_left(Point::new(10.0, 20.0), Size::new(100.0, 50.0));
    /// assert_eq!(bounds.center(), Point::new(60.0, 45.0));
    /// ```
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x(),
            min_y: top_left.y(),
            max_x: top_left.x() + size.width(),
            max_y: top_left.y() + size.height(),
        }
    }

    pub fn min_x(self) -> f32 {
        self.min_x
    }

    pub fn min_y(self) -> f32 {
        self.min_y
    }

    pub fn max_x(self) -> f32 {
        self.max_x
    }

    pub fn max_y(self) -> f32 {
        self.max_y
    }

    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the top-left corner
    pub fn min_point(self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn to_size(self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Returns a copy moved to a new top-left corner, keeping the size.
    pub fn with_top_left(self, top_left: Point) -> Self {
        Self::new_from_top_left(top_left, self.to_size())
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_bounds_from_top_left() {
        let bounds = Bounds::new_from_top_left(Point::new(-15.0, 5.0), Size::new(30.0, 10.0));
        assert_approx_eq!(f32, bounds.min_x(), -15.0);
        assert_approx_eq!(f32, bounds.max_x(), 15.0);
        assert_approx_eq!(f32, bounds.width(), 30.0);
        assert_approx_eq!(f32, bounds.height(), 10.0);
        assert_eq!(bounds.center(), Point::new(0.0, 10.0));
    }

    #[test]
    fn test_bounds_move_keeps_size() {
        let bounds = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
        let moved = bounds.with_top_left(Point::new(5.0, 5.0));
        assert_eq!(moved.to_size(), Size::new(10.0, 10.0));
        assert_eq!(moved.min_point(), Point::new(5.0, 5.0));
        assert_approx_eq!(f32, moved.max_y(), 15.0);
    }

    #[test]
    fn test_size_is_positive() {
        assert!(Size::new(1.0, 1.0).is_positive());
        assert!(!Size::new(0.0, 1.0).is_positive());
        assert!(!Size::new(1.0, -1.0).is_positive());
        assert!(!Size::new(f32::NAN, 1.0).is_positive());
    }

    proptest! {
        #[test]
        fn center_is_inside_bounds(
            x in -1000.0f32..1000.0,
            y in -1000.0f32..1000.0,
            w in 1.0f32..500.0,
            h in 1.0f32..500.0,
        ) {
            let bounds = Bounds::new_from_top_left(Point::new(x, y), Size::new(w, h));
            let center = bounds.center();
            prop_assert!(center.x() >= bounds.min_x() && center.x() <= bounds.max_x());
            prop_assert!(center.y() >= bounds.min_y() && center.y() <= bounds.max_y());
        }
    }
}
