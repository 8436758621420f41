use clap::Parser;
use shape2bez::classify::DEFAULT_ORDER;
use shape2bez::{CurveMode, InputFormat, ShapeConfig, ShapeLabel};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "shape2bez", about = "Classify curve fragments and export them as bezier paths")]
struct Cli {
    /// Input table (one point per row)
    #[arg(short, long)]
    input: PathBuf,

    /// Output SVG path
    #[arg(short, long)]
    output: PathBuf,

    /// Maximum point deviation for a shape to match
    #[arg(short, long, default_value = "0.1")]
    tolerance: f64,

    /// Zero-based column holding x
    #[arg(long, default_value = "2")]
    x_column: usize,

    /// Zero-based column holding y
    #[arg(long, default_value = "3")]
    y_column: usize,

    /// Columns identifying a curve fragment (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "0,1")]
    group_columns: Vec<usize>,

    /// Treat the whole file as a single sequence
    #[arg(long, conflicts_with = "group_columns")]
    single: bool,

    /// Field delimiter
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Skip the first data line
    #[arg(long)]
    skip_header: bool,

    /// Test order (comma-separated labels)
    #[arg(long, value_delimiter = ',')]
    order: Option<Vec<ShapeLabel>>,

    /// Fit smooth cubics through the points instead of grouping them by four
    #[arg(long)]
    fitted: bool,

    /// Curve fitting accuracy (fitted mode)
    #[arg(long, default_value = "0.5")]
    accuracy: f64,

    /// RDP simplification epsilon (fitted mode)
    #[arg(long, default_value = "0.5")]
    rdp_epsilon: f64,

    /// Draw fitted circles, ellipses and hull polygons instead of the curve
    #[arg(long)]
    regularize: bool,

    /// Least-squares iteration cap
    #[arg(long, default_value = "200")]
    max_iterations: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let format = InputFormat {
        x_column: cli.x_column,
        y_column: cli.y_column,
        group_columns: if cli.single { vec![] } else { cli.group_columns },
        delimiter: cli.delimiter,
        skip_header: cli.skip_header,
    };

    let defaults = ShapeConfig::default();
    let config = ShapeConfig {
        tolerance: cli.tolerance,
        order: cli.order.unwrap_or_else(|| defaults.order.clone()),
        max_iterations: cli.max_iterations,
        curve_mode: if cli.fitted { CurveMode::Fitted } else { CurveMode::Grouped },
        fit_accuracy: cli.accuracy,
        rdp_epsilon: cli.rdp_epsilon,
        regularize: cli.regularize,
        ..defaults
    };

    let t_start = Instant::now();

    // ── Load ──────────────────────────────────────────────
    let sequences = shape2bez::input::load_sequences(&cli.input, &format)?;
    let n_points: usize = sequences.iter().map(|s| s.len()).sum();
    eprintln!();
    eprintln!("  Load        {} sequences \u{00b7} {} points", sequences.len(), n_points);

    // ── Classify + convert ────────────────────────────────
    let results = shape2bez::process(&sequences, &config);
    for (i, r) in results.iter().enumerate() {
        println!("{}\t{}\t{}", i, r.label(), r.curve.len());
    }
    let mut counts: Vec<String> = Vec::new();
    for label in DEFAULT_ORDER.into_iter().chain([ShapeLabel::Unclassified]) {
        let n = results.iter().filter(|r| r.label() == label).count();
        if n > 0 {
            counts.push(format!("{} {}", n, label));
        }
    }
    let segments: usize = results.iter().map(|r| r.curve.len()).sum();
    eprintln!("  Classify    {}  (\u{03b5} {})", counts.join(" \u{00b7} "), config.tolerance);
    eprintln!("  Convert     {} cubic segments", segments);

    // ── Export ────────────────────────────────────────────
    shape2bez::output::svg::save(&cli.output, &results, &config)?;
    eprintln!(
        "  Export      {}  ({}ms)",
        cli.output.display(),
        t_start.elapsed().as_millis()
    );
    eprintln!();

    Ok(())
}
