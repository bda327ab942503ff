//! Geometry Primitives
//!
//! Point and line math used by the resolver and validators. Everything here
//! is a pure function over `glam::DVec2`.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A resolved point in model space
pub type Point = DVec2;

/// Lines whose direction cross product falls below this are parallel
const PARALLEL_EPSILON: f64 = 1e-9;

/// A resolved straight segment between two points
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Line {
    /// First endpoint
    pub point1: Point,
    /// Second endpoint
    pub point2: Point,
}

impl Line {
    /// Create a new line from two endpoints
    pub fn new(point1: Point, point2: Point) -> Self {
        Self { point1, point2 }
    }

    /// Direction vector from `point1` to `point2` (not normalized)
    pub fn direction(&self) -> DVec2 {
        self.point2 - self.point1
    }

    /// Euclidean length of the segment
    pub fn length(&self) -> f64 {
        distance(self.point1, self.point2)
    }

    /// Angle of the line from the positive x-axis, in degrees
    pub fn angle(&self) -> f64 {
        line_angle(self.point1, self.point2)
    }

    /// Point at parametric offset `t` (0 = point1, 1 = point2)
    pub fn point_at(&self, t: f64) -> Point {
        self.point1 + self.direction() * t
    }

    /// Parametric offset of the orthogonal projection of `point` onto the line
    ///
    /// Returns `None` for a degenerate (zero-length) line.
    pub fn parameter_of(&self, point: Point) -> Option<f64> {
        let dir = self.direction();
        let len_sq = dir.length_squared();
        if len_sq == 0.0 {
            return None;
        }
        Some((point - self.point1).dot(dir) / len_sq)
    }

    /// Same line with the y coordinate of both endpoints negated
    pub fn flipped_y(&self) -> Self {
        Self::new(flip_y(self.point1), flip_y(self.point2))
    }
}

/// Euclidean distance between two points
pub fn distance(a: Point, b: Point) -> f64 {
    (b - a).length()
}

/// Orthogonal projection of `point` onto the infinite line through `line`
///
/// A degenerate line projects everything onto its first endpoint.
pub fn project_onto_line(point: Point, line: &Line) -> Point {
    match line.parameter_of(point) {
        Some(t) => line.point_at(t),
        None => line.point1,
    }
}

/// Vector rotated a quarter turn counter-clockwise
pub fn orthogonal(v: DVec2) -> DVec2 {
    v.perp()
}

/// Unit vector orthogonal to the line direction, or zero for a degenerate line
pub fn line_normal(line: &Line) -> DVec2 {
    orthogonal(line.direction()).normalize_or_zero()
}

/// Angle of the segment `a -> b` from the positive x-axis, in degrees
pub fn line_angle(a: Point, b: Point) -> f64 {
    let d = b - a;
    d.y.atan2(d.x).to_degrees()
}

/// Unit direction for an angle in degrees from the positive x-axis
pub fn direction_from_angle(degrees: f64) -> DVec2 {
    let theta = degrees.to_radians();
    DVec2::new(theta.cos(), theta.sin())
}

/// Point at `distance` from `origin` in direction `degrees`
pub fn offset_point(origin: Point, degrees: f64, distance: f64) -> Point {
    origin + direction_from_angle(degrees) * distance
}

/// Intersection of two infinite lines, each given by a point and a direction
///
/// Returns `None` when the lines are parallel or either direction is zero.
pub fn intersect_lines(p: Point, d: DVec2, q: Point, e: DVec2) -> Option<Point> {
    let denom = d.perp_dot(e);
    let scale = d.length() * e.length();
    if scale == 0.0 || denom.abs() <= PARALLEL_EPSILON * scale {
        return None;
    }
    let t = (q - p).perp_dot(e) / denom;
    Some(p + d * t)
}

/// Negate the y coordinate of a point
pub fn flip_y(p: Point) -> Point {
    DVec2::new(p.x, -p.y)
}
