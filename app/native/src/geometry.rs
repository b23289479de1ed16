//! Geometric primitives shared by the jump and window-fill subsystems.
//!
//! All coordinates are global screen coordinates with a top-left origin,
//! matching what `CGDisplayBounds` and the cursor APIs report.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Point / Vector
// ============================================================================

/// A point in global screen space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }

    /// Returns the displacement from `other` to `self`.
    #[must_use]
    pub fn delta_from(self, other: Self) -> Vector {
        Vector::new(self.x - other.x, self.y - other.y)
    }

    /// Returns the coordinate on the given axis.
    #[must_use]
    pub const fn along(self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Builds a point from a coordinate on `axis` and one on the other axis.
    #[must_use]
    pub const fn from_axes(axis: Axis, on_axis: f64, across: f64) -> Self {
        match axis {
            Axis::X => Self::new(on_axis, across),
            Axis::Y => Self::new(across, on_axis),
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Per-tick cursor displacement, in pixels per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    /// Horizontal component.
    pub dx: f64,
    /// Vertical component.
    pub dy: f64,
}

impl Vector {
    /// The zero vector.
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };

    /// Creates a new vector.
    #[must_use]
    pub const fn new(dx: f64, dy: f64) -> Self { Self { dx, dy } }

    /// Returns the component on the given axis.
    #[must_use]
    pub const fn along(self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.dx,
            Axis::Y => self.dy,
        }
    }
}

// ============================================================================
// Axis / Span
// ============================================================================

/// One of the two screen axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Horizontal axis.
    X,
    /// Vertical axis.
    Y,
}

/// A closed interval `[start, end]` on a single axis.
///
/// A span whose `start` is greater than its `end` is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Lower bound (inclusive).
    pub start: f64,
    /// Upper bound (inclusive).
    pub end: f64,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub const fn new(start: f64, end: f64) -> Self { Self { start, end } }

    /// Returns whether the span contains no values.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.start > self.end }

    /// Returns whether `value` lies inside the span, bounds included.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool { value >= self.start && value <= self.end }

    /// Returns the midpoint of the span.
    #[must_use]
    pub fn center(&self) -> f64 { f64::midpoint(self.start, self.end) }

    /// Returns the distance from `value` to the nearest bound, or zero if inside.
    #[must_use]
    pub fn distance_to(&self, value: f64) -> f64 {
        if value < self.start {
            self.start - value
        } else if value > self.end {
            value - self.end
        } else {
            0.0
        }
    }

    /// Widens the span by `amount` on both ends.
    #[must_use]
    pub fn widened(&self, amount: f64) -> Self { Self::new(self.start - amount, self.end + amount) }

    /// Intersects the span with `other`. The result may be empty.
    #[must_use]
    pub fn clipped_to(&self, other: &Self) -> Self {
        Self::new(self.start.max(other.start), self.end.min(other.end))
    }

    /// Clamps `value` into `[start + inset, end - inset]`.
    ///
    /// When the span is narrower than twice the inset, its center is returned.
    #[must_use]
    pub fn clamp_inset(&self, value: f64, inset: f64) -> f64 {
        let low = self.start + inset;
        let high = self.end - inset;
        if low > high { self.center() } else { value.clamp(low, high) }
    }
}

// ============================================================================
// Rect
// ============================================================================

/// A rectangle defined by its top-left origin and size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Rect {
    /// X coordinate of the origin.
    pub x: f64,
    /// Y coordinate of the origin.
    pub y: f64,
    /// Width of the rectangle.
    #[serde(alias = "w")]
    pub width: f64,
    /// Height of the rectangle.
    #[serde(alias = "h")]
    pub height: f64,
}

impl Rect {
    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge (`x + width`).
    #[must_use]
    pub fn right(&self) -> f64 { self.x + self.width }

    /// Bottom edge (`y + height`).
    #[must_use]
    pub fn bottom(&self) -> f64 { self.y + self.height }

    /// Check if this rectangle has valid dimensions.
    #[must_use]
    pub fn is_valid(&self) -> bool { self.width > 0.0 && self.height > 0.0 }

    /// Get the center point of this rectangle.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Half-open containment test: the right and bottom edges belong to the
    /// neighbouring rectangle.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Returns the extent of the rectangle on `axis`.
    #[must_use]
    pub fn span(&self, axis: Axis) -> Span {
        match axis {
            Axis::X => Span::new(self.x, self.right()),
            Axis::Y => Span::new(self.y, self.bottom()),
        }
    }

    /// Squared distance from `point` to the nearest point of the rectangle.
    ///
    /// Zero when the point lies inside or on the boundary.
    #[must_use]
    pub fn distance_squared_to(&self, point: Point) -> f64 {
        let nearest_x = point.x.clamp(self.x, self.right());
        let nearest_y = point.y.clamp(self.y, self.bottom());
        let dx = point.x - nearest_x;
        let dy = point.y - nearest_y;
        dx.mul_add(dx, dy * dy)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} at ({}, {})", self.width, self.height, self.x, self.y)
    }
}

// ============================================================================
// Edge
// ============================================================================

/// One of the four sides of a display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    /// All edges in detection priority order.
    pub const ALL: [Self; 4] = [Self::Left, Self::Right, Self::Top, Self::Bottom];

    /// The axis running along this edge, on which zones are matched.
    #[must_use]
    pub const fn shared_axis(self) -> Axis {
        match self {
            Self::Left | Self::Right => Axis::Y,
            Self::Top | Self::Bottom => Axis::X,
        }
    }

    /// The axis the cursor crosses when leaving through this edge.
    #[must_use]
    pub const fn perpendicular_axis(self) -> Axis {
        match self {
            Self::Left | Self::Right => Axis::X,
            Self::Top | Self::Bottom => Axis::Y,
        }
    }

    /// Returns the edge of `rect` that `point` is within `threshold` pixels of.
    ///
    /// Edges are checked in [`Edge::ALL`] order and the first match wins, so a
    /// point in a corner reports left or right before top or bottom.
    #[must_use]
    pub fn detect(rect: &Rect, point: Point, threshold: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|edge| match edge {
            Self::Left => point.x <= rect.x + threshold,
            Self::Right => point.x >= rect.right() - threshold,
            Self::Top => point.y <= rect.y + threshold,
            Self::Bottom => point.y >= rect.bottom() - threshold,
        })
    }

    /// Lowercase name, as used in logs and tables.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

// ============================================================================
// Tests
// ============================================================================
