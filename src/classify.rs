//! Shape classification: an ordered table of tests, first match wins.
//!
//! Fit and hull failures are folded into `TestOutcome::NoMatch`, so
//! classification always produces a label.

use std::fmt;
use std::str::FromStr;

use kurbo::Point;
use log::debug;

use crate::config::ShapeConfig;
use crate::error::ShapeError;
use crate::fit::{self, CircleModel, EllipseModel};
use crate::hull::{self, HullResult};

/// The label assigned to one point sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeLabel {
    Circle,
    Ellipse,
    Rectangle,
    Polygon,
    Star,
    Unclassified,
}

/// Default evaluation order. A near-circular square reports as Circle.
pub const DEFAULT_ORDER: [ShapeLabel; 5] = [
    ShapeLabel::Circle,
    ShapeLabel::Ellipse,
    ShapeLabel::Rectangle,
    ShapeLabel::Polygon,
    ShapeLabel::Star,
];

impl ShapeLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeLabel::Circle => "circle",
            ShapeLabel::Ellipse => "ellipse",
            ShapeLabel::Rectangle => "rectangle",
            ShapeLabel::Polygon => "polygon",
            ShapeLabel::Star => "star",
            ShapeLabel::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for ShapeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "circle" => Ok(ShapeLabel::Circle),
            "ellipse" => Ok(ShapeLabel::Ellipse),
            "rectangle" => Ok(ShapeLabel::Rectangle),
            "polygon" => Ok(ShapeLabel::Polygon),
            "star" => Ok(ShapeLabel::Star),
            "unclassified" => Ok(ShapeLabel::Unclassified),
            other => Err(format!("unknown shape label: {other}")),
        }
    }
}

/// What a matching test found.
#[derive(Debug, Clone, PartialEq)]
pub enum Evidence {
    Circle(CircleModel),
    Ellipse(EllipseModel),
    Hull(HullResult),
    /// The star test is purely angular and carries no model.
    Angular,
}

/// Result of one shape test.
#[derive(Debug, Clone, PartialEq)]
pub enum TestOutcome {
    Match(Evidence),
    /// The test rejected the data, with the underlying failure if any.
    NoMatch(Option<ShapeError>),
}

/// Final label plus whatever the winning test produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: ShapeLabel,
    pub evidence: Option<Evidence>,
}

/// Classifier with a configurable test order.
#[derive(Debug, Clone)]
pub struct Classifier {
    order: Vec<ShapeLabel>,
    tolerance: f64,
    max_iterations: usize,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER.to_vec(),
            tolerance: 0.1,
            max_iterations: 200,
        }
    }
}

impl Classifier {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Default::default()
        }
    }

    pub fn from_config(config: &ShapeConfig) -> Self {
        Self {
            order: config.order.clone(),
            tolerance: config.tolerance,
            max_iterations: config.max_iterations,
        }
    }

    /// Replace the evaluation order. `Unclassified` entries never match.
    pub fn with_order(mut self, order: impl Into<Vec<ShapeLabel>>) -> Self {
        self.order = order.into();
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn classify(&self, points: &[Point]) -> ShapeLabel {
        self.classify_detailed(points).label
    }

    /// Run the tests in order and stop at the first match.
    pub fn classify_detailed(&self, points: &[Point]) -> Classification {
        // The hull is shared by the rectangle and polygon tests.
        let mut hull_cache: Option<Result<HullResult, ShapeError>> = None;

        for &label in &self.order {
            let outcome = self.run_test(label, points, &mut hull_cache);
            match outcome {
                TestOutcome::Match(evidence) => {
                    debug!("{}: match ({} points)", label, points.len());
                    return Classification {
                        label,
                        evidence: Some(evidence),
                    };
                }
                TestOutcome::NoMatch(reason) => match reason {
                    Some(e) => debug!("{}: no match ({})", label, e),
                    None => debug!("{}: no match", label),
                },
            }
        }

        Classification {
            label: ShapeLabel::Unclassified,
            evidence: None,
        }
    }

    /// Evaluate a single test.
    pub fn test(&self, label: ShapeLabel, points: &[Point]) -> TestOutcome {
        self.run_test(label, points, &mut None)
    }

    fn run_test(
        &self,
        label: ShapeLabel,
        points: &[Point],
        hull_cache: &mut Option<Result<HullResult, ShapeError>>,
    ) -> TestOutcome {
        let tol = self.tolerance;
        match label {
            ShapeLabel::Circle => match fit::fit_circle(points, self.max_iterations) {
                Ok(c) if c.max_deviation(points) < tol => TestOutcome::Match(Evidence::Circle(c)),
                Ok(_) => TestOutcome::NoMatch(None),
                Err(e) => TestOutcome::NoMatch(Some(e)),
            },
            ShapeLabel::Ellipse => match fit::fit_ellipse(points, self.max_iterations) {
                Ok(e) if e.max_deviation(points) < tol => TestOutcome::Match(Evidence::Ellipse(e)),
                Ok(_) => TestOutcome::NoMatch(None),
                Err(e) => TestOutcome::NoMatch(Some(e)),
            },
            ShapeLabel::Rectangle => {
                match hull_cache.get_or_insert_with(|| hull::convex_hull(points)).as_ref() {
                    Ok(h) if hull::hull_is_rectangle(h, tol) => {
                        TestOutcome::Match(Evidence::Hull(h.clone()))
                    }
                    Ok(_) => TestOutcome::NoMatch(None),
                    Err(e) => TestOutcome::NoMatch(Some(e.clone())),
                }
            }
            ShapeLabel::Polygon => {
                match hull_cache.get_or_insert_with(|| hull::convex_hull(points)).as_ref() {
                    Ok(h) if hull::hull_is_polygon(h, points) => {
                        TestOutcome::Match(Evidence::Hull(h.clone()))
                    }
                    Ok(_) => TestOutcome::NoMatch(None),
                    Err(e) => TestOutcome::NoMatch(Some(e.clone())),
                }
            }
            ShapeLabel::Star => {
                if hull::is_star(points, tol) {
                    TestOutcome::Match(Evidence::Angular)
                } else {
                    TestOutcome::NoMatch(None)
                }
            }
            ShapeLabel::Unclassified => TestOutcome::NoMatch(None),
        }
    }
}

/// Classify with the default test order.
pub fn classify(points: &[Point], tolerance: f64) -> ShapeLabel {
    Classifier::new(tolerance).classify(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, TAU};

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    fn circle(center: Point, r: f64, n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| {
                let t = TAU * i as f64 / n as f64;
                Point::new(center.x + r * t.cos(), center.y + r * t.sin())
            })
            .collect()
    }

    fn ellipse(center: Point, rx: f64, ry: f64, n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| {
                let t = TAU * i as f64 / n as f64;
                Point::new(center.x + rx * t.cos(), center.y + ry * t.sin())
            })
            .collect()
    }

    fn square_outline(side: f64, per_edge: usize) -> Vec<Point> {
        let step = side / per_edge as f64;
        let mut out = Vec::new();
        for i in 0..per_edge {
            out.push(Point::new(i as f64 * step, 0.0));
        }
        for i in 0..per_edge {
            out.push(Point::new(side, i as f64 * step));
        }
        for i in 0..per_edge {
            out.push(Point::new(side - i as f64 * step, side));
        }
        for i in 0..per_edge {
            out.push(Point::new(0.0, side - i as f64 * step));
        }
        out
    }

    fn star(n_tips: usize, outer: f64, inner: f64) -> Vec<Point> {
        (0..2 * n_tips)
            .map(|i| {
                let r = if i % 2 == 0 { outer } else { inner };
                let t = FRAC_PI_2 + TAU * i as f64 / (2 * n_tips) as f64;
                Point::new(r * t.cos(), r * t.sin())
            })
            .collect()
    }

    /// Triangle with each edge midpoint pushed slightly outward.
    fn bulged_triangle() -> Vec<Point> {
        pts(&[
            (0.0, 0.0),
            (5.0, -0.3),
            (10.0, 0.0),
            (7.76, 4.48),
            (5.0, 8.66),
            (2.24, 4.48),
        ])
    }

    #[test]
    fn unit_circle_sample_is_circle() {
        let points = pts(&[(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)]);
        let result = Classifier::new(0.1).classify_detailed(&points);
        assert_eq!(result.label, ShapeLabel::Circle);
        match result.evidence {
            Some(Evidence::Circle(c)) => {
                assert_relative_eq!(c.center.x, 0.0, epsilon = 1e-9);
                assert_relative_eq!(c.center.y, 0.0, epsilon = 1e-9);
                assert_relative_eq!(c.radius, 1.0, epsilon = 1e-9);
            }
            other => panic!("expected circle evidence, got {:?}", other),
        }
    }

    #[test]
    fn sampled_circles_are_circles() {
        for &(cx, cy, r, n) in &[(0.0, 0.0, 1.0, 8), (50.0, -20.0, 13.0, 40), (-3.0, 7.0, 0.5, 5)] {
            let points = circle(Point::new(cx, cy), r, n);
            assert_eq!(classify(&points, 0.1), ShapeLabel::Circle, "circle at ({cx}, {cy}) r={r}");
        }
    }

    #[test]
    fn axis_aligned_ellipse_is_ellipse() {
        let points = ellipse(Point::new(1.0, 2.0), 4.0, 2.0, 24);
        assert_eq!(classify(&points, 0.1), ShapeLabel::Ellipse);
    }

    #[test]
    fn square_outline_is_rectangle() {
        assert_eq!(classify(&square_outline(10.0, 10), 0.1), ShapeLabel::Rectangle);
    }

    #[test]
    fn square_corners_resolve_by_priority() {
        // The four corners of a square all lie on its circumscribed circle,
        // so the circle fit matches exactly and Circle, tested first, wins.
        // Rectangle is only reached when it precedes Circle in the order.
        let corners = pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        assert_eq!(classify(&corners, 0.1), ShapeLabel::Circle);

        let rect_first = Classifier::new(0.1).with_order(vec![
            ShapeLabel::Rectangle,
            ShapeLabel::Circle,
        ]);
        assert_eq!(rect_first.classify(&corners), ShapeLabel::Rectangle);
    }

    #[test]
    fn convex_vertex_list_is_polygon() {
        assert_eq!(classify(&bulged_triangle(), 0.1), ShapeLabel::Polygon);
    }

    #[test]
    fn star_vertices_are_star() {
        assert_eq!(classify(&star(5, 10.0, 4.0), 0.1), ShapeLabel::Star);
    }

    #[test]
    fn short_and_collinear_inputs_are_unclassified() {
        assert_eq!(classify(&pts(&[(0.0, 0.0)]), 0.1), ShapeLabel::Unclassified);
        assert_eq!(
            classify(&pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]), 0.1),
            ShapeLabel::Unclassified
        );
    }

    #[test]
    fn failures_become_no_match() {
        let classifier = Classifier::new(0.1);
        let line = pts(&[(0.0, 0.0), (1.0, 1.0)]);
        assert_eq!(
            classifier.test(ShapeLabel::Circle, &line),
            TestOutcome::NoMatch(Some(ShapeError::InsufficientPoints { needed: 3, got: 2 }))
        );
        assert_eq!(
            classifier.test(ShapeLabel::Rectangle, &line),
            TestOutcome::NoMatch(Some(ShapeError::DegenerateHull))
        );
    }

    #[test]
    fn classification_is_repeatable() {
        let points = star(6, 8.0, 3.0);
        let classifier = Classifier::new(0.1);
        assert_eq!(classifier.classify(&points), classifier.classify(&points));
    }

    #[test]
    fn zero_tolerance_rejects_rounding_error() {
        let points = circle(Point::new(0.3, 0.7), 2.9, 17);
        let classifier = Classifier::new(0.0);
        assert!(matches!(
            classifier.test(ShapeLabel::Circle, &points),
            TestOutcome::NoMatch(_)
        ));
    }

    #[test]
    fn huge_tolerance_makes_circle_win() {
        assert_eq!(classify(&square_outline(10.0, 10), 1e9), ShapeLabel::Circle);
        assert_eq!(classify(&star(5, 10.0, 4.0), 1e9), ShapeLabel::Circle);
    }

    #[test]
    fn unclassified_in_order_never_matches() {
        let points = circle(Point::ZERO, 1.0, 12);
        let classifier = Classifier::new(0.1).with_order(vec![ShapeLabel::Unclassified]);
        assert_eq!(classifier.classify(&points), ShapeLabel::Unclassified);
    }

    #[test]
    fn labels_parse_and_display() {
        for label in DEFAULT_ORDER {
            assert_eq!(label.to_string().parse::<ShapeLabel>(), Ok(label));
        }
        assert!("hexagon".parse::<ShapeLabel>().is_err());
    }
}
