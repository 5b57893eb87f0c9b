//! Points in grid space and flow velocities.

/// A position in grid coordinates.
///
/// The domain of a `W x H` grid is `[0, W] x [0, H]`; integer coordinates
/// are cell corners.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// The point displaced by `h * v`.
    pub fn advanced(&self, v: Velocity, h: f64) -> Point {
        Point::new(self.x + h * v.vx, self.y + h * v.vy)
    }
}

/// Instantaneous velocity of the density-equalizing flow.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Velocity {
    /// Horizontal component.
    pub vx: f64,
    /// Vertical component.
    pub vy: f64,
}

impl Velocity {
    /// The zero vector.
    pub const ZERO: Velocity = Velocity { vx: 0.0, vy: 0.0 };

    /// Create a velocity.
    pub const fn new(vx: f64, vy: f64) -> Self {
        Self { vx, vy }
    }

    /// Euclidean magnitude.
    pub fn magnitude(&self) -> f64 {
        self.vx.hypot(self.vy)
    }
}
