use crate::classify::{ShapeLabel, DEFAULT_ORDER};

/// All classification, conversion and export parameters in one struct.
/// The CLI maps its flags onto this; library callers start from `Default`.
#[derive(Debug, Clone)]
pub struct ShapeConfig {
    // -- Classification --
    /// Maximum deviation ε for a point to count as lying on a shape.
    /// Applies to the fit tests and to every hull predicate.
    pub tolerance: f64,
    /// Tests in evaluation order. The first matching label wins.
    pub order: Vec<ShapeLabel>,
    /// Iteration cap for the least-squares solver.
    pub max_iterations: usize,

    // -- Curve conversion --
    /// How point sequences become cubic segments.
    pub curve_mode: CurveMode,
    /// Fit accuracy for `CurveMode::Fitted` (same units as the input).
    pub fit_accuracy: f64,
    /// RDP simplification epsilon for `CurveMode::Fitted`.
    pub rdp_epsilon: f64,

    // -- Export --
    /// Draw fitted circles/ellipses and hull polygons instead of the
    /// converted curve when a model is available.
    pub regularize: bool,
    /// SVG stroke width.
    pub stroke_width: f64,
}

/// Curve conversion strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurveMode {
    /// Points are read as consecutive groups of four Bézier control points.
    #[default]
    Grouped,
    /// Points are a polyline; cubics are fitted through them.
    Fitted,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.1,
            order: DEFAULT_ORDER.to_vec(),
            max_iterations: 200,
            curve_mode: CurveMode::Grouped,
            fit_accuracy: 0.5,
            rdp_epsilon: 0.5,
            regularize: false,
            stroke_width: 1.0,
        }
    }
}

/// Layout of the tabular input.
#[derive(Debug, Clone)]
pub struct InputFormat {
    /// Zero-based column holding x.
    pub x_column: usize,
    /// Zero-based column holding y.
    pub y_column: usize,
    /// Columns whose values identify the curve fragment a row belongs to.
    /// Consecutive rows sharing these values form one sequence.
    /// Empty = the whole file is one sequence.
    pub group_columns: Vec<usize>,
    pub delimiter: char,
    /// Ignore the first non-blank, non-comment line.
    pub skip_header: bool,
}

impl Default for InputFormat {
    fn default() -> Self {
        Self {
            x_column: 2,
            y_column: 3,
            group_columns: vec![0, 1],
            delimiter: ',',
            skip_header: false,
        }
    }
}
