//! shape2bez: digitized curve fragments → shape labels + cubic bezier paths.
//!
//! Each point sequence is classified as one of a fixed set of primitives
//! (circle, ellipse, rectangle, polygon, star) and converted to cubic
//! segments for vector export.
//!
//! # Example
//!
//! ```
//! use shape2bez::{classify, to_bezier, ShapeLabel};
//! use shape2bez::kurbo::Point;
//!
//! let points = [
//!     Point::new(1.0, 0.0),
//!     Point::new(0.0, 1.0),
//!     Point::new(-1.0, 0.0),
//!     Point::new(0.0, -1.0),
//! ];
//! assert_eq!(classify(&points, 0.1), ShapeLabel::Circle);
//! assert_eq!(to_bezier(&points).len(), 1);
//! ```

#![forbid(unsafe_code)]

mod config;
mod geom;

pub mod classify;
pub mod curve;
pub mod error;
pub mod fit;
pub mod hull;
pub mod input;
pub mod output;

// Re-export kurbo so callers build points with the same version.
pub use kurbo;

pub use classify::{classify, Classification, Classifier, Evidence, ShapeLabel, TestOutcome};
pub use config::{CurveMode, InputFormat, ShapeConfig};
pub use curve::{fit_polyline, to_bezier, CubicSegment, CurvePath};
pub use error::{PipelineError, ShapeError};
pub use fit::{fit_circle, fit_ellipse, CircleModel, EllipseModel};
pub use hull::{convex_hull, is_polygon, is_rectangle, is_star, HullResult};

use std::path::Path;

use kurbo::Point;
use log::{debug, info};
use rayon::prelude::*;

/// An ordered, non-empty sequence of 2-D points.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSequence {
    points: Vec<Point>,
}

impl PointSequence {
    pub fn new(points: Vec<Point>) -> Result<Self, ShapeError> {
        if points.is_empty() {
            return Err(ShapeError::EmptySequence);
        }
        Ok(Self { points })
    }

    /// Build from (x, y) pairs.
    pub fn from_xy(coords: &[(f64, f64)]) -> Result<Self, ShapeError> {
        Self::new(coords.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Classification and converted curve for one sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeResult {
    pub classification: Classification,
    pub curve: CurvePath,
}

impl ShapeResult {
    pub fn label(&self) -> ShapeLabel {
        self.classification.label
    }
}

/// Classify and convert every sequence. Output order matches input order.
///
/// Sequences are independent, so they are processed in parallel.
pub fn process(sequences: &[PointSequence], config: &ShapeConfig) -> Vec<ShapeResult> {
    let classifier = Classifier::from_config(config);
    sequences
        .par_iter()
        .map(|seq| {
            let classification = classifier.classify_detailed(seq.points());
            let curve = curve::convert(seq.points(), config);
            debug!(
                "{} points -> {} ({} segments)",
                seq.len(),
                classification.label,
                curve.len()
            );
            ShapeResult {
                classification,
                curve,
            }
        })
        .collect()
}

/// Full pipeline: load a table, classify and convert, write SVG.
pub fn run(
    input: &Path,
    output: &Path,
    format: &InputFormat,
    config: &ShapeConfig,
) -> Result<Vec<ShapeResult>, PipelineError> {
    let sequences = input::load_sequences(input, format)?;
    info!("loaded {} sequences from {}", sequences.len(), input.display());
    let results = process(&sequences, config);
    output::svg::save(output, &results, config)?;
    info!("wrote {}", output.display());
    Ok(results)
}
