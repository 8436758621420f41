//! SVG export: one stroked `<path>` per sequence.

use std::path::Path;

use kurbo::{BezPath, Circle, Ellipse, Rect, Shape};
use svg::node::element::Path as SvgPath;
use svg::Document;

use crate::classify::{Evidence, ShapeLabel};
use crate::config::ShapeConfig;
use crate::error::PipelineError;
use crate::ShapeResult;

/// Flattening tolerance used when turning ideal shapes into paths.
const SHAPE_TOLERANCE: f64 = 0.01;
/// Fraction of the drawing size added around the content.
const MARGIN: f64 = 0.05;

/// Stroke colour per label.
pub fn stroke_color(label: ShapeLabel) -> &'static str {
    match label {
        ShapeLabel::Circle => "#d62728",
        ShapeLabel::Ellipse => "#ff7f0e",
        ShapeLabel::Rectangle => "#2ca02c",
        ShapeLabel::Polygon => "#1f77b4",
        ShapeLabel::Star => "#9467bd",
        ShapeLabel::Unclassified => "#000000",
    }
}

/// The path drawn for one result, or `None` if there is nothing to draw.
///
/// With `regularize`, fitted circles and ellipses are replaced by the ideal
/// shape and hull-based labels by their closed hull polygon.
pub fn result_path(result: &ShapeResult, regularize: bool) -> Option<BezPath> {
    if regularize {
        if let Some(path) = regularized(result) {
            return Some(path);
        }
    }
    if result.curve.is_empty() {
        None
    } else {
        Some(result.curve.to_bezpath())
    }
}

fn regularized(result: &ShapeResult) -> Option<BezPath> {
    match result.classification.evidence.as_ref()? {
        Evidence::Circle(c) => Some(Circle::new(c.center, c.radius).to_path(SHAPE_TOLERANCE)),
        Evidence::Ellipse(e) => Some(
            Ellipse::new(e.center, (e.rx, e.ry), e.rotation).to_path(SHAPE_TOLERANCE),
        ),
        Evidence::Hull(h) => {
            let mut path = BezPath::new();
            let (first, rest) = h.vertices.split_first()?;
            path.move_to(*first);
            for &p in rest {
                path.line_to(p);
            }
            path.close_path();
            Some(path)
        }
        Evidence::Angular => None,
    }
}

/// Build the SVG document for a batch of results.
pub fn to_document(results: &[ShapeResult], config: &ShapeConfig) -> Result<Document, PipelineError> {
    let mut bounds: Option<Rect> = None;
    let mut nodes = Vec::new();

    for (index, result) in results.iter().enumerate() {
        let Some(path) = result_path(result, config.regularize) else {
            continue;
        };
        let bbox = path.bounding_box();
        bounds = Some(bounds.map_or(bbox, |b| b.union(bbox)));

        let label = result.classification.label;
        nodes.push(
            SvgPath::new()
                .set("d", path.to_svg())
                .set("fill", "none")
                .set("stroke", stroke_color(label))
                .set("stroke-width", config.stroke_width.to_string())
                .set("data-shape", label.as_str())
                .set("data-index", index.to_string()),
        );
    }

    let bounds = bounds.ok_or(PipelineError::NoSequences)?;
    let pad = (bounds.width().max(bounds.height()) * MARGIN).max(config.stroke_width);
    let view = bounds.inflate(pad, pad);

    let document = nodes.into_iter().fold(
        Document::new().set(
            "viewBox",
            format!("{} {} {} {}", view.x0, view.y0, view.width(), view.height()),
        ),
        |doc, node| doc.add(node),
    );
    Ok(document)
}

/// Write the SVG document for `results` to `path`.
pub fn save(path: &Path, results: &[ShapeResult], config: &ShapeConfig) -> Result<(), PipelineError> {
    let document = to_document(results, config)?;
    svg::save(path, &document)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classification;
    use crate::curve::CurvePath;
    use crate::fit::CircleModel;
    use kurbo::{CubicBez, Point};

    fn result(label: ShapeLabel, evidence: Option<Evidence>, curve: CurvePath) -> ShapeResult {
        ShapeResult {
            classification: Classification { label, evidence },
            curve,
        }
    }

    fn one_segment() -> CurvePath {
        CurvePath {
            segments: vec![CubicBez::new(
                Point::new(0.0, 0.0),
                Point::new(1.0, 2.0),
                Point::new(3.0, 2.0),
                Point::new(4.0, 0.0),
            )],
        }
    }

    #[test]
    fn writes_one_path_per_drawable_result() {
        let results = vec![
            result(ShapeLabel::Unclassified, None, one_segment()),
            result(ShapeLabel::Unclassified, None, CurvePath::default()),
        ];
        let svg = to_document(&results, &ShapeConfig::default()).unwrap().to_string();
        assert_eq!(svg.matches("<path").count(), 1);
        assert!(svg.contains("data-shape=\"unclassified\""));
        assert!(svg.contains("viewBox"));
    }

    #[test]
    fn regularize_draws_fitted_circle() {
        let circle = CircleModel {
            center: Point::new(5.0, 5.0),
            radius: 2.0,
        };
        let r = result(ShapeLabel::Circle, Some(Evidence::Circle(circle)), CurvePath::default());
        assert!(result_path(&r, false).is_none());
        let path = result_path(&r, true).unwrap();
        let bbox = path.bounding_box();
        assert!((bbox.width() - 4.0).abs() < 1e-6);
        assert!((bbox.center().x - 5.0).abs() < 1e-6);
    }

    #[test]
    fn nothing_to_draw_is_an_error() {
        let results = vec![result(ShapeLabel::Star, Some(Evidence::Angular), CurvePath::default())];
        let config = ShapeConfig {
            regularize: true,
            ..ShapeConfig::default()
        };
        assert!(matches!(to_document(&results, &config), Err(PipelineError::NoSequences)));
    }
}
