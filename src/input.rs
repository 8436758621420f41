//! Tabular point loader.
//!
//! Rows of delimited numeric fields; two designated columns carry x and y,
//! and optional key columns split the rows into curve fragments.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use kurbo::Point;
use log::debug;

use crate::config::InputFormat;
use crate::error::PipelineError;
use crate::PointSequence;

/// Load every point sequence from a file.
pub fn load_sequences(path: &Path, format: &InputFormat) -> Result<Vec<PointSequence>, PipelineError> {
    let file = File::open(path)?;
    parse_sequences(BufReader::new(file), format)
}

/// Parse point sequences from any buffered reader.
///
/// Consecutive rows with equal key columns form one sequence, in row order.
pub fn parse_sequences<R: BufRead>(reader: R, format: &InputFormat) -> Result<Vec<PointSequence>, PipelineError> {
    let mut sequences = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    let mut current_key: Option<Vec<f64>> = None;
    let mut header_pending = format.skip_header;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if header_pending {
            header_pending = false;
            debug!("input: skipping header on line {}", line_no);
            continue;
        }

        let fields: Vec<&str> = trimmed.split(format.delimiter).map(str::trim).collect();
        let x = field(&fields, format.x_column, line_no)?;
        let y = field(&fields, format.y_column, line_no)?;
        let key = format
            .group_columns
            .iter()
            .map(|&c| field(&fields, c, line_no))
            .collect::<Result<Vec<f64>, _>>()?;

        if current_key.as_ref().is_some_and(|k| *k != key) {
            sequences.push(PointSequence::new(std::mem::take(&mut current))?);
        }
        current_key = Some(key);
        current.push(Point::new(x, y));
    }

    if !current.is_empty() {
        sequences.push(PointSequence::new(current)?);
    }
    if sequences.is_empty() {
        return Err(PipelineError::NoSequences);
    }
    debug!("input: {} sequences", sequences.len());
    Ok(sequences)
}

fn field(fields: &[&str], column: usize, line: usize) -> Result<f64, PipelineError> {
    let raw = fields
        .get(column)
        .ok_or(PipelineError::MissingColumn { line, column })?;
    raw.parse::<f64>().map_err(|_| PipelineError::Parse {
        line,
        field: raw.to_string(),
    })
}
