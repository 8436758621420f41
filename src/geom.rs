//! Shared geometry utilities.

use kurbo::{Point, Vec2};
use nalgebra::Matrix2;

/// Relative eigenvalue ratio below which a point cloud counts as a line.
const COLLINEAR_RATIO: f64 = 1e-12;

/// Arithmetic mean of the points. `Point::ZERO` for an empty slice.
pub fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::ZERO;
    }
    let sum = points.iter().fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
    (sum / points.len() as f64).to_point()
}

/// Population standard deviation along x and y.
pub fn axis_std(points: &[Point], center: Point) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let n = points.len() as f64;
    let (sx, sy) = points.iter().fold((0.0, 0.0), |(sx, sy), p| {
        (sx + (p.x - center.x).powi(2), sy + (p.y - center.y).powi(2))
    });
    ((sx / n).sqrt(), (sy / n).sqrt())
}

/// Polar angle of `p` around `center`, in (-π, π].
pub fn polar_angle(p: Point, center: Point) -> f64 {
    (p.y - center.y).atan2(p.x - center.x)
}

/// Cross product of (b - a) × (c - a). Positive = counter-clockwise turn.
pub fn cross(a: Point, b: Point, c: Point) -> f64 {
    (b - a).cross(c - a)
}

/// True when the points span no area: all coincident or all on one line.
///
/// Uses the eigenvalues of the 2×2 scatter matrix so the test is
/// independent of the line's orientation.
pub fn is_collinear(points: &[Point]) -> bool {
    if points.len() < 3 {
        return true;
    }
    let c = centroid(points);
    let mut scatter = Matrix2::<f64>::zeros();
    for p in points {
        let d = *p - c;
        scatter[(0, 0)] += d.x * d.x;
        scatter[(0, 1)] += d.x * d.y;
        scatter[(1, 1)] += d.y * d.y;
    }
    scatter[(1, 0)] = scatter[(0, 1)];
    let eig = scatter.symmetric_eigenvalues();
    let max = eig.amax();
    let min = eig[0].abs().min(eig[1].abs());
    max == 0.0 || min <= max * COLLINEAR_RATIO
}
