use kurbo::Point;
use nalgebra::Vector3;

use super::solver::{self, Model};
use crate::error::ShapeError;
use crate::geom;

/// Fitted circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleModel {
    pub center: Point,
    pub radius: f64,
}

impl CircleModel {
    /// |distance to center − radius| for one point.
    pub fn deviation(&self, p: Point) -> f64 {
        (p.distance(self.center) - self.radius).abs()
    }

    /// Largest deviation over all points.
    pub fn max_deviation(&self, points: &[Point]) -> f64 {
        points.iter().map(|&p| self.deviation(p)).fold(0.0, f64::max)
    }
}

/// Residual (x−a)² + (y−b)² − r² over params (a, b, r).
struct CircleResidual;

impl Model<3> for CircleResidual {
    fn residual(&self, p: Point, params: &Vector3<f64>) -> (f64, Vector3<f64>) {
        let (a, b, r) = (params[0], params[1], params[2]);
        let dx = p.x - a;
        let dy = p.y - b;
        let residual = dx * dx + dy * dy - r * r;
        (residual, Vector3::new(-2.0 * dx, -2.0 * dy, -2.0 * r))
    }
}

/// Least-squares circle through `points`.
///
/// Seeded at the centroid with the mean centroid distance as radius.
pub fn fit_circle(points: &[Point], max_iterations: usize) -> Result<CircleModel, ShapeError> {
    super::require_points(points)?;

    let center = geom::centroid(points);
    let radius = points.iter().map(|p| p.distance(center)).sum::<f64>() / points.len() as f64;
    let initial = Vector3::new(center.x, center.y, radius);

    let params = solver::minimize(&CircleResidual, points, initial, max_iterations)?;
    let model = CircleModel {
        center: Point::new(params[0], params[1]),
        radius: params[2].abs(),
    };
    if !model.center.is_finite() || !model.radius.is_finite() {
        return Err(ShapeError::FitDidNotConverge {
            iterations: max_iterations,
        });
    }
    Ok(model)
}
