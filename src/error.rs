use thiserror::Error;

/// Errors raised by the fitting and hull stages.
///
/// The classifier never surfaces these: a failed test is simply
/// "not this shape".
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ShapeError {
    #[error("insufficient points: need {needed}, got {got}")]
    InsufficientPoints { needed: usize, got: usize },

    #[error("fit did not converge after {iterations} iterations")]
    FitDidNotConverge { iterations: usize },

    #[error("degenerate convex hull")]
    DegenerateHull,

    #[error("empty point sequence")]
    EmptySequence,
}

/// Errors at the load/export boundary.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PipelineError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: cannot parse field {field:?} as a number")]
    Parse { line: usize, field: String },

    #[error("line {line}: missing column {column}")]
    MissingColumn { line: usize, column: usize },

    #[error("no point sequences found in input")]
    NoSequences,

    #[error(transparent)]
    Shape(#[from] ShapeError),
}
