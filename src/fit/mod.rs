//! Geometric fitting: nonlinear least-squares circle and ellipse models.
//!
//! Both fits need at least three non-collinear points. Collinear input has
//! no finite minimum and is rejected up front as non-converging.

mod circle;
mod ellipse;
mod solver;

pub use circle::{fit_circle, CircleModel};
pub use ellipse::{fit_ellipse, EllipseModel};

use kurbo::Point;

use crate::error::ShapeError;
use crate::geom;

/// Minimum number of points a fit accepts.
pub const MIN_FIT_POINTS: usize = 3;

fn require_points(points: &[Point]) -> Result<(), ShapeError> {
    if points.len() < MIN_FIT_POINTS {
        return Err(ShapeError::InsufficientPoints {
            needed: MIN_FIT_POINTS,
            got: points.len(),
        });
    }
    if geom::is_collinear(points) {
        return Err(ShapeError::FitDidNotConverge { iterations: 0 });
    }
    Ok(())
}
