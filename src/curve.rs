//! Curve conversion: point sequences → cubic segments.
//!
//! Two strategies:
//! 1. `to_bezier` reads the points as ready-made control points, four at a
//!    time. Fed a raw polyline this is a lossy approximation.
//! 2. `fit_polyline` treats the points as a polyline: RDP-simplify, then
//!    two-pass cubic fitting via kurbo.

use geo::{LineString, Simplify};
use kurbo::{fit_to_bezpath_opt, simplify::SimplifyBezPath, BezPath, CubicBez, PathSeg, Point};

use crate::config::{CurveMode, ShapeConfig};

/// One cubic piece: start, two off-curve controls, end.
pub type CubicSegment = CubicBez;

/// Points consumed per grouped segment.
const GROUP: usize = 4;

/// Ordered cubic segments. Consecutive segments need not share endpoints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurvePath {
    pub segments: Vec<CubicSegment>,
}

impl CurvePath {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CubicSegment> {
        self.segments.iter()
    }

    /// Render as path commands: MoveTo(p0) + CurveTo(p1, p2, p3) per segment.
    pub fn to_bezpath(&self) -> BezPath {
        let mut path = BezPath::new();
        for seg in &self.segments {
            path.move_to(seg.p0);
            path.curve_to(seg.p1, seg.p2, seg.p3);
        }
        path
    }
}

/// Convert using the strategy selected in `config`.
pub fn convert(points: &[Point], config: &ShapeConfig) -> CurvePath {
    match config.curve_mode {
        CurveMode::Grouped => to_bezier(points),
        CurveMode::Fitted => fit_polyline(points, config.fit_accuracy, config.rdp_epsilon),
    }
}

/// Consecutive, non-overlapping groups of four points become one segment
/// each. A trailing group shorter than four is dropped.
pub fn to_bezier(points: &[Point]) -> CurvePath {
    let segments = points
        .chunks_exact(GROUP)
        .map(|g| CubicBez::new(g[0], g[1], g[2], g[3]))
        .collect();
    CurvePath { segments }
}

// ── Polyline fitting ─────────────────────────────────────

/// Fit smooth cubics through an open polyline.
///
/// Lines and quadratics produced by the fitter are raised to cubics so the
/// result is uniform. Returns an empty path for fewer than two points.
pub fn fit_polyline(points: &[Point], accuracy: f64, rdp_epsilon: f64) -> CurvePath {
    if points.len() < 2 {
        return CurvePath::default();
    }
    let simplified = rdp_simplify(points, rdp_epsilon);
    let path = points_to_path(&simplified);
    let fitted = if accuracy > 0.0 {
        two_pass_fit(&path, accuracy)
    } else {
        path
    };
    CurvePath {
        segments: fitted.segments().map(raise).collect(),
    }
}

/// Two-pass fitting: polyline → curves → minimal curves.
///
/// Smooth curves simplify far better than noisy polylines, so the second
/// pass removes most of the first pass's segments.
fn two_pass_fit(path: &BezPath, accuracy: f64) -> BezPath {
    let pass1 = fit_to_bezpath_opt(
        &SimplifyBezPath::new(path.elements().iter().copied()),
        accuracy,
    );
    fit_to_bezpath_opt(
        &SimplifyBezPath::new(pass1.elements().iter().copied()),
        accuracy,
    )
}

fn raise(seg: PathSeg) -> CubicSegment {
    match seg {
        PathSeg::Line(l) => CubicBez::new(l.p0, l.p0.lerp(l.p1, 1.0 / 3.0), l.p0.lerp(l.p1, 2.0 / 3.0), l.p1),
        PathSeg::Quad(q) => q.raise(),
        PathSeg::Cubic(c) => c,
    }
}

/// Open line-segment BezPath through the points.
fn points_to_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if let Some(&first) = points.first() {
        path.move_to(first);
        for &p in &points[1..] {
            path.line_to(p);
        }
    }
    path
}

/// RDP polyline simplification.
fn rdp_simplify(points: &[Point], epsilon: f64) -> Vec<Point> {
    if points.len() <= 2 || epsilon <= 0.0 {
        return points.to_vec();
    }
    LineString::from(points.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>())
        .simplify(&epsilon)
        .into_inner()
        .into_iter()
        .map(|c| Point::new(c.x, c.y))
        .collect()
}
