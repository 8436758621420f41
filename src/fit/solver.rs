//! Bounded Levenberg–Marquardt over fixed-size normal equations.
//!
//! Each model contributes one scalar residual per point together with its
//! gradient; the solver accumulates JᵀJ and Jᵀr and never materializes J.

use kurbo::Point;
use log::{debug, warn};
use nalgebra::{SMatrix, SVector};

use crate::error::ShapeError;

const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_MIN: f64 = 1e-12;
const LAMBDA_MAX: f64 = 1e16;
const DIAG_FLOOR: f64 = 1e-12;
/// Relative cost reduction below which the fit is considered settled.
const COST_TOL: f64 = 1e-14;
/// Relative step size below which the fit is considered settled.
const STEP_TOL: f64 = 1e-12;
/// Absolute cost treated as an exact fit.
const COST_FLOOR: f64 = 1e-28;

/// A parametric model with one residual per observed point.
pub(crate) trait Model<const N: usize> {
    /// Residual of `p` under `params`, and its gradient w.r.t. `params`.
    fn residual(&self, p: Point, params: &SVector<f64, N>) -> (f64, SVector<f64, N>);
}

struct NormalEquations<const N: usize> {
    jtj: SMatrix<f64, N, N>,
    jtr: SVector<f64, N>,
    cost: f64,
}

fn accumulate<M: Model<N>, const N: usize>(
    model: &M,
    points: &[Point],
    params: &SVector<f64, N>,
) -> NormalEquations<N> {
    let mut eq = NormalEquations {
        jtj: SMatrix::zeros(),
        jtr: SVector::zeros(),
        cost: 0.0,
    };
    for &p in points {
        let (r, grad) = model.residual(p, params);
        eq.jtj += grad * grad.transpose();
        eq.jtr += grad * r;
        eq.cost += r * r;
    }
    eq
}

fn cost<M: Model<N>, const N: usize>(model: &M, points: &[Point], params: &SVector<f64, N>) -> f64 {
    points
        .iter()
        .map(|&p| model.residual(p, params).0.powi(2))
        .sum()
}

/// Minimize the sum of squared residuals starting from `initial`.
///
/// Terminates within `max_iterations` outer iterations. Fails with
/// `FitDidNotConverge` if the parameters leave the finite range or the
/// cap is hit before the cost settles.
pub(crate) fn minimize<M: Model<N>, const N: usize>(
    model: &M,
    points: &[Point],
    initial: SVector<f64, N>,
    max_iterations: usize,
) -> Result<SVector<f64, N>, ShapeError> {
    let mut params = initial;
    let mut lambda = LAMBDA_INIT;

    for iteration in 0..max_iterations {
        let eq = accumulate(model, points, &params);
        if !eq.cost.is_finite() {
            return Err(ShapeError::FitDidNotConverge { iterations: iteration });
        }
        if eq.cost <= COST_FLOOR || eq.jtr.amax() <= COST_FLOOR {
            debug!("lm: exact fit after {} iterations", iteration);
            return Ok(params);
        }

        // Inner loop: raise damping until a step lowers the cost.
        loop {
            let mut a = eq.jtj;
            for i in 0..N {
                a[(i, i)] += lambda * eq.jtj[(i, i)].max(DIAG_FLOOR);
            }
            let step = match a.cholesky() {
                Some(chol) => -chol.solve(&eq.jtr),
                None => {
                    lambda *= 10.0;
                    if lambda > LAMBDA_MAX {
                        return Err(ShapeError::FitDidNotConverge { iterations: iteration });
                    }
                    continue;
                }
            };

            let candidate = params + step;
            let new_cost = cost(model, points, &candidate);
            if new_cost.is_finite() && new_cost < eq.cost {
                let settled = eq.cost - new_cost <= COST_TOL * eq.cost
                    || step.norm() <= STEP_TOL * (params.norm() + STEP_TOL);
                params = candidate;
                lambda = (lambda / 10.0).max(LAMBDA_MIN);
                if settled {
                    debug!("lm: settled after {} iterations, cost {:.3e}", iteration + 1, new_cost);
                    return Ok(params);
                }
                break;
            }

            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                // No descent direction left: local minimum.
                debug!("lm: stalled at cost {:.3e} after {} iterations", eq.cost, iteration);
                return Ok(params);
            }
        }
    }

    warn!("lm: no convergence within {} iterations", max_iterations);
    Err(ShapeError::FitDidNotConverge {
        iterations: max_iterations,
    })
}
