use std::f64::consts::{FRAC_PI_2, PI};

use kurbo::Point;
use nalgebra::Vector5;

use super::solver::{self, Model};
use crate::error::ShapeError;
use crate::geom;

/// Fitted ellipse. `rx` lies along the direction `rotation` (radians from +x).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipseModel {
    pub center: Point,
    pub rx: f64,
    pub ry: f64,
    pub rotation: f64,
}

impl EllipseModel {
    /// Point expressed in the ellipse's center-relative, rotated frame.
    fn local(&self, p: Point) -> (f64, f64) {
        let (sin, cos) = self.rotation.sin_cos();
        let dx = p.x - self.center.x;
        let dy = p.y - self.center.y;
        (dx * cos + dy * sin, -dx * sin + dy * cos)
    }

    /// |(x'/rx)² + (y'/ry)² − 1| for one point.
    pub fn deviation(&self, p: Point) -> f64 {
        let (u, v) = self.local(p);
        ((u / self.rx).powi(2) + (v / self.ry).powi(2) - 1.0).abs()
    }

    /// Largest deviation over all points.
    pub fn max_deviation(&self, points: &[Point]) -> f64 {
        points.iter().map(|&p| self.deviation(p)).fold(0.0, f64::max)
    }
}

/// Residual (x'/rx)² + (y'/ry)² − 1 over params (a, b, rx, ry, θ).
struct EllipseResidual;

impl Model<5> for EllipseResidual {
    fn residual(&self, p: Point, params: &Vector5<f64>) -> (f64, Vector5<f64>) {
        let (a, b, rx, ry, theta) = (params[0], params[1], params[2], params[3], params[4]);
        let (sin, cos) = theta.sin_cos();
        let dx = p.x - a;
        let dy = p.y - b;
        let u = dx * cos + dy * sin;
        let v = -dx * sin + dy * cos;
        let rx2 = rx * rx;
        let ry2 = ry * ry;
        let residual = u * u / rx2 + v * v / ry2 - 1.0;

        let du = 2.0 * u / rx2;
        let dv = 2.0 * v / ry2;
        let grad = Vector5::new(
            -du * cos + dv * sin,
            -du * sin - dv * cos,
            -2.0 * u * u / (rx2 * rx),
            -2.0 * v * v / (ry2 * ry),
            2.0 * u * v * (1.0 / rx2 - 1.0 / ry2),
        );
        (residual, grad)
    }
}

/// Least-squares ellipse through `points`.
///
/// Seeded at the centroid with the per-axis standard deviations as
/// semi-axes and zero rotation.
pub fn fit_ellipse(points: &[Point], max_iterations: usize) -> Result<EllipseModel, ShapeError> {
    super::require_points(points)?;

    let center = geom::centroid(points);
    let (sx, sy) = geom::axis_std(points, center);
    let initial = Vector5::new(center.x, center.y, sx, sy, 0.0);

    let params = solver::minimize(&EllipseResidual, points, initial, max_iterations)?;
    let rx = params[2].abs();
    let ry = params[3].abs();
    if !(rx.is_finite() && ry.is_finite() && rx > 0.0 && ry > 0.0) || !params[4].is_finite() {
        return Err(ShapeError::FitDidNotConverge {
            iterations: max_iterations,
        });
    }
    Ok(EllipseModel {
        center: Point::new(params[0], params[1]),
        rx,
        ry,
        rotation: normalize_rotation(params[4]),
    })
}

/// Wrap into (−π/2, π/2]; an ellipse is symmetric under a half turn.
fn normalize_rotation(theta: f64) -> f64 {
    let t = theta.rem_euclid(PI);
    if t > FRAC_PI_2 {
        t - PI
    } else {
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;

    fn ellipse_points(center: Point, rx: f64, ry: f64, rotation: f64, n: usize) -> Vec<Point> {
        let (sin, cos) = rotation.sin_cos();
        (0..n)
            .map(|i| {
                let t = TAU * i as f64 / n as f64;
                let (u, v) = (rx * t.cos(), ry * t.sin());
                Point::new(center.x + u * cos - v * sin, center.y + u * sin + v * cos)
            })
            .collect()
    }

    #[test]
    fn recovers_axis_aligned_ellipse() {
        let pts = ellipse_points(Point::new(1.0, 2.0), 4.0, 2.0, 0.0, 24);
        let e = fit_ellipse(&pts, 200).unwrap();
        assert_relative_eq!(e.center.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(e.center.y, 2.0, epsilon = 1e-6);
        assert_relative_eq!(e.rx, 4.0, epsilon = 1e-6);
        assert_relative_eq!(e.ry, 2.0, epsilon = 1e-6);
        assert!(e.max_deviation(&pts) < 1e-6);
    }

    #[test]
    fn fits_rotated_ellipse() {
        let pts = ellipse_points(Point::new(-3.0, 0.5), 5.0, 2.0, 0.4, 36);
        let e = fit_ellipse(&pts, 200).unwrap();
        assert!(e.max_deviation(&pts) < 1e-4, "deviation {}", e.max_deviation(&pts));
        assert_relative_eq!(e.center.x, -3.0, epsilon = 1e-4);
        assert_relative_eq!(e.center.y, 0.5, epsilon = 1e-4);
    }

    #[test]
    fn too_few_points() {
        assert_eq!(
            fit_ellipse(&[Point::new(0.0, 0.0)], 200),
            Err(ShapeError::InsufficientPoints { needed: 3, got: 1 })
        );
    }

    #[test]
    fn rotation_is_wrapped() {
        assert_relative_eq!(normalize_rotation(PI + 0.25), 0.25, epsilon = 1e-12);
        assert_relative_eq!(normalize_rotation(-0.25), -0.25, epsilon = 1e-12);
        assert_relative_eq!(normalize_rotation(FRAC_PI_2 + 0.1), 0.1 - FRAC_PI_2, epsilon = 1e-12);
    }
}
