//! Convex-hull based shape tests: rectangle, convex polygon, star.
//!
//! These are deliberately loose heuristics. The rectangle test compares
//! only the first two hull edges; the star test only checks that points
//! advance around the centroid in roughly even angular steps.

use std::f64::consts::TAU;

use geo::{ConvexHull, MultiPoint};
use kurbo::Point;

use crate::error::ShapeError;
use crate::geom;

/// Sine of the turn angle below which a hull vertex is considered to lie
/// on the edge between its neighbours.
const COLLINEAR_EPS: f64 = 1e-9;

/// Minimum number of points for the star test.
pub const MIN_STAR_POINTS: usize = 5;

/// Vertices of a convex hull in counter-clockwise order, without the
/// closing repeat and without collinear boundary points.
#[derive(Debug, Clone, PartialEq)]
pub struct HullResult {
    pub vertices: Vec<Point>,
}

impl HullResult {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Length of the edge leaving vertex `i`.
    pub fn edge_length(&self, i: usize) -> f64 {
        let n = self.vertices.len();
        self.vertices[i % n].distance(self.vertices[(i + 1) % n])
    }
}

/// Planar convex hull of `points`.
pub fn convex_hull(points: &[Point]) -> Result<HullResult, ShapeError> {
    if points.len() < 3 || geom::is_collinear(points) {
        return Err(ShapeError::DegenerateHull);
    }

    let cloud: MultiPoint<f64> = points.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>().into();
    let polygon = cloud.convex_hull();

    let mut ring: Vec<Point> = polygon
        .exterior()
        .coords()
        .map(|c| Point::new(c.x, c.y))
        .collect();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }

    let vertices = drop_collinear(&ring);
    if vertices.len() < 3 {
        return Err(ShapeError::DegenerateHull);
    }
    Ok(HullResult { vertices })
}

/// Remove ring vertices that sit on the segment joining their neighbours.
fn drop_collinear(ring: &[Point]) -> Vec<Point> {
    let n = ring.len();
    if n < 3 {
        return ring.to_vec();
    }
    ring.iter()
        .enumerate()
        .filter(|&(i, &p)| {
            let prev = ring[(i + n - 1) % n];
            let next = ring[(i + 1) % n];
            let span = prev.distance(p) * p.distance(next);
            geom::cross(prev, p, next).abs() > COLLINEAR_EPS * span
        })
        .map(|(_, &p)| p)
        .collect()
}

/// Hull has four vertices and its first two edges agree in length.
pub fn is_rectangle(points: &[Point], tolerance: f64) -> Result<bool, ShapeError> {
    let hull = convex_hull(points)?;
    Ok(hull_is_rectangle(&hull, tolerance))
}

pub(crate) fn hull_is_rectangle(hull: &HullResult, tolerance: f64) -> bool {
    hull.len() == 4 && (hull.edge_length(0) - hull.edge_length(1)).abs() < tolerance
}

/// Every input point is a hull vertex.
pub fn is_polygon(points: &[Point]) -> Result<bool, ShapeError> {
    let hull = convex_hull(points)?;
    Ok(hull_is_polygon(&hull, points))
}

pub(crate) fn hull_is_polygon(hull: &HullResult, points: &[Point]) -> bool {
    hull.len() == points.len()
}

/// At least five points, and every angular step around the centroid
/// (closing step included) exceeds 2π/N − tolerance.
pub fn is_star(points: &[Point], tolerance: f64) -> bool {
    let n = points.len();
    if n < MIN_STAR_POINTS {
        return false;
    }
    let center = geom::centroid(points);
    let angles: Vec<f64> = points.iter().map(|&p| geom::polar_angle(p, center)).collect();
    let min_gap = TAU / n as f64 - tolerance;
    angles
        .iter()
        .zip(angles.iter().cycle().skip(1))
        .all(|(a, b)| (b - a).rem_euclid(TAU) > min_gap)
}
