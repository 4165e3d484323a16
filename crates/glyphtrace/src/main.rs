//! Command-line front end for the glyph tracing toolkit.
//!
//! Wires the pipeline crates together over real files: convert a
//! raster glyph to SVG, colorize from emotion text or meanings,
//! normalize to the canonical canvas, or sweep a whole directory.
//! All outputs are written to a temporary file in the destination
//! directory and atomically renamed into place.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;

use glyphtrace_emotion::{
    EmotionTaxonomy, Palette, dominant_with_blend, map_meanings_to_emotion,
};
use glyphtrace_pipeline::{PipelineConfig, ThresholdMethod};
use glyphtrace_svg::{ColorStrategy, NormalizeOptions, normalize, postprocess};
use glyphtrace_trace::{Potrace, TraceError, TraceOptions, TurnPolicy, VectorTracer};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Trace raster glyph artwork into clean, colorized, canonically-sized
/// SVG symbols.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a raster glyph into a post-processed black SVG.
    Convert(ConvertArgs),
    /// Colorize a black-and-white glyph SVG from emotion text or
    /// symbol meanings.
    Colorize(ColorizeArgs),
    /// Rescale and re-center a glyph SVG into the canonical canvas.
    Normalize(NormalizeArgs),
    /// Convert every raster glyph in a directory, with a running tally.
    Batch(BatchArgs),
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Input raster image (PNG, JPEG, BMP, WebP).
    input: PathBuf,

    /// Output SVG path.
    #[arg(short, long)]
    output: PathBuf,

    #[command(flatten)]
    tuning: TraceTuning,

    /// Also normalize the result into the canonical canvas.
    #[arg(long)]
    normalize: bool,

    #[command(flatten)]
    canvas: CanvasArgs,
}

#[derive(clap::Args)]
struct ColorizeArgs {
    /// Input black-and-white glyph SVG.
    input: PathBuf,

    /// Output SVG path.
    #[arg(short, long)]
    output: PathBuf,

    /// Colorization strategy.
    #[arg(long, value_enum, default_value_t = StrategyArg::Gradient)]
    strategy: StrategyArg,

    /// Free text to analyze for emotional content.
    #[arg(long, conflicts_with = "meanings")]
    text: Option<String>,

    /// Comma-separated symbol meanings (e.g. "protection,loyalty").
    #[arg(long, value_delimiter = ',')]
    meanings: Vec<String>,
}

#[derive(clap::Args)]
struct NormalizeArgs {
    /// Input glyph SVG.
    input: PathBuf,

    /// Output SVG path.
    #[arg(short, long)]
    output: PathBuf,

    #[command(flatten)]
    canvas: CanvasArgs,
}

#[derive(clap::Args)]
struct BatchArgs {
    /// Directory of raster glyphs.
    input_dir: PathBuf,

    /// Directory for the produced SVGs (created if missing).
    #[arg(short, long)]
    out_dir: PathBuf,

    #[command(flatten)]
    tuning: TraceTuning,

    /// Also normalize each result into the canonical canvas.
    #[arg(long)]
    normalize: bool,

    #[command(flatten)]
    canvas: CanvasArgs,
}

/// Threshold and tracer tuning shared by convert and batch.
#[derive(clap::Args)]
struct TraceTuning {
    /// Threshold method.
    #[arg(long, value_enum, default_value_t = ThresholdArg::Otsu)]
    threshold: ThresholdArg,

    /// Cut value for the fixed method.
    #[arg(long, default_value_t = 128)]
    fixed_value: u8,

    /// Mean multiplier for the aggressive method.
    #[arg(long, default_value_t = 0.75)]
    aggressive_factor: f32,

    /// Skip morphological cleanup (fill holes, open, close).
    #[arg(long)]
    no_cleanup: bool,

    /// Swap ink and background (for bright-on-dark sources).
    #[arg(long)]
    invert: bool,

    /// Corner smoothing (0.0 = sharp silhouettes).
    #[arg(long, default_value_t = 0.0)]
    alphamax: f32,

    /// Curve optimization tolerance.
    #[arg(long, default_value_t = 0.1)]
    opttolerance: f32,

    /// Tracer turn policy.
    #[arg(long, value_enum, default_value_t = TurnPolicyArg::Minority)]
    turn_policy: TurnPolicyArg,

    /// Tracer time budget in seconds (killed on expiry).
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

/// Canonical canvas geometry shared by normalize-capable commands.
#[derive(clap::Args)]
struct CanvasArgs {
    /// Canvas edge in pixels.
    #[arg(long, default_value_t = 100)]
    size: u32,

    /// Inner padding in pixels.
    #[arg(long, default_value_t = 10)]
    padding: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ThresholdArg {
    Otsu,
    Fixed,
    Aggressive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TurnPolicyArg {
    Minority,
    Majority,
    Black,
    White,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Solid,
    Gradient,
    Radial,
    Accent,
}

impl TraceTuning {
    fn pipeline_config(&self) -> PipelineConfig {
        let threshold = match self.threshold {
            ThresholdArg::Otsu => ThresholdMethod::Otsu,
            ThresholdArg::Fixed => ThresholdMethod::Fixed(self.fixed_value),
            ThresholdArg::Aggressive => ThresholdMethod::Aggressive {
                factor: self.aggressive_factor,
            },
        };
        PipelineConfig {
            threshold,
            cleanup: !self.no_cleanup,
            invert: self.invert,
        }
    }

    fn trace_options(&self) -> TraceOptions {
        TraceOptions {
            turn_policy: match self.turn_policy {
                TurnPolicyArg::Minority => TurnPolicy::Minority,
                TurnPolicyArg::Majority => TurnPolicy::Majority,
                TurnPolicyArg::Black => TurnPolicy::Black,
                TurnPolicyArg::White => TurnPolicy::White,
            },
            alphamax: self.alphamax,
            opttolerance: self.opttolerance,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

impl CanvasArgs {
    const fn options(&self) -> NormalizeOptions {
        NormalizeOptions {
            target_size: self.size,
            padding: self.padding,
        }
    }
}

impl From<StrategyArg> for ColorStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Solid => Self::Solid,
            StrategyArg::Gradient => Self::Gradient,
            StrategyArg::Radial => Self::Radial,
            StrategyArg::Accent => Self::Accent,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
enum GlyphError {
    #[error(transparent)]
    Pipeline(#[from] glyphtrace_pipeline::PipelineError),

    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error(transparent)]
    Svg(#[from] glyphtrace_svg::SvgError),

    #[error(transparent)]
    Taxonomy(#[from] glyphtrace_emotion::TaxonomyError),

    #[error(transparent)]
    Color(#[from] glyphtrace_emotion::ColorError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Usage(String),
}

impl GlyphError {
    /// Environment-level errors recur for every item; a batch run must
    /// abort on them instead of retrying per item.
    fn aborts_batch(&self) -> bool {
        matches!(
            self,
            Self::Trace(TraceError::Unavailable(_)) | Self::Taxonomy(_),
        )
    }
}

// ---------------------------------------------------------------------------
// Output persistence
// ---------------------------------------------------------------------------

/// Write via a temp file in the destination directory and atomically
/// rename into place, so concurrent readers (e.g. a graph renderer
/// polling the results directory) never observe a partial file.
fn write_atomic(path: &Path, contents: &str) -> Result<(), GlyphError> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = tempfile::NamedTempFile::new_in(dir.unwrap_or_else(|| Path::new(".")))?;
    tmp.write_all(contents.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| GlyphError::Io(e.error))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Raster file → post-processed (optionally normalized) SVG text.
fn convert_one(
    input: &Path,
    tracer: &Potrace,
    config: &PipelineConfig,
    canvas: Option<NormalizeOptions>,
) -> Result<String, GlyphError> {
    let bytes = std::fs::read(input)?;
    let mask_result = glyphtrace_pipeline::process(&bytes, config)?;
    tracing::info!(
        input = %input.display(),
        cut = mask_result.cut,
        ink_pct = mask_result.mask.ink_ratio() * 100.0,
        "mask ready",
    );

    let raw = tracer.trace(&mask_result.mask)?;
    let processed = postprocess(&raw)?;
    for id in &processed.warnings {
        eprintln!("warning: dangling gradient reference #{id} in {}", input.display());
    }

    match canvas {
        Some(options) => Ok(normalize(&processed.svg, options)?),
        None => Ok(processed.svg),
    }
}

fn run_convert(args: &ConvertArgs) -> Result<(), GlyphError> {
    let tracer = Potrace::new(args.tuning.trace_options());
    let canvas = args.normalize.then(|| args.canvas.options());
    let svg = convert_one(&args.input, &tracer, &args.tuning.pipeline_config(), canvas)?;
    write_atomic(&args.output, &svg)?;
    println!("wrote {}", args.output.display());
    Ok(())
}

/// Hex used when free text contains no taxonomy word at all.
const NEUTRAL_HEX: &str = "#808080";

fn run_colorize(args: &ColorizeArgs) -> Result<(), GlyphError> {
    let taxonomy = EmotionTaxonomy::builtin()?;

    let (primary_hex, blend_hex, label) = if let Some(text) = &args.text {
        match dominant_with_blend(&taxonomy, text) {
            Some((dominant, blend)) => (
                dominant.hex.clone(),
                blend.map(|n| n.hex.clone()),
                dominant.path.join(" > "),
            ),
            None => (NEUTRAL_HEX.to_string(), None, "Neutral".to_string()),
        }
    } else if args.meanings.is_empty() {
        return Err(GlyphError::Usage(
            "colorize needs --text or --meanings".to_string(),
        ));
    } else {
        // Meanings never fall back to neutral: the mapper guarantees a
        // saturated family (Joy at worst).
        let mut rng = rand::rngs::StdRng::from_os_rng();
        let node = map_meanings_to_emotion(&taxonomy, &args.meanings, &mut rng);
        (node.hex.clone(), None, node.path.join(" > "))
    };

    let palette = Palette::build(&primary_hex, blend_hex.as_deref())?;
    println!("emotion: {label} ({primary_hex})");

    let svg = std::fs::read_to_string(&args.input)?;
    let processed = postprocess(&svg)?;
    let colored = glyphtrace_svg::colorize(&processed.svg, &palette, args.strategy.into())?;
    write_atomic(&args.output, &colored)?;
    println!("wrote {}", args.output.display());
    Ok(())
}

fn run_normalize(args: &NormalizeArgs) -> Result<(), GlyphError> {
    let svg = std::fs::read_to_string(&args.input)?;
    let normalized = normalize(&svg, args.canvas.options())?;
    write_atomic(&args.output, &normalized)?;
    println!("wrote {}", args.output.display());
    Ok(())
}

/// Raster extensions picked up by a batch sweep.
const RASTER_EXTENSIONS: &[&str] = &["png", "webp", "jpg", "jpeg", "bmp"];

fn run_batch(args: &BatchArgs) -> Result<(), GlyphError> {
    let tracer = Potrace::new(args.tuning.trace_options());
    if !tracer.is_available() {
        return Err(TraceError::Unavailable(
            "potrace not found on PATH; install potrace before running a batch".to_string(),
        )
        .into());
    }

    let mut inputs: Vec<PathBuf> = std::fs::read_dir(&args.input_dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| RASTER_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        })
        .collect();
    inputs.sort();

    if inputs.is_empty() {
        return Err(GlyphError::Usage(format!(
            "no raster images found in {}",
            args.input_dir.display(),
        )));
    }

    std::fs::create_dir_all(&args.out_dir)?;

    let config = args.tuning.pipeline_config();
    let canvas = args.normalize.then(|| args.canvas.options());
    let total = inputs.len();
    let mut succeeded = 0usize;
    let mut failed: Vec<(PathBuf, GlyphError)> = Vec::new();

    for (i, input) in inputs.iter().enumerate() {
        let name = input
            .file_stem()
            .map_or_else(|| "glyph".to_string(), |s| s.to_string_lossy().into_owned());
        let output = args.out_dir.join(format!("{name}.svg"));

        match convert_one(input, &tracer, &config, canvas)
            .and_then(|svg| write_atomic(&output, &svg))
        {
            Ok(()) => {
                succeeded += 1;
                println!("[{}/{total}] ok   {name}", i + 1);
            }
            Err(err) if err.aborts_batch() => {
                eprintln!("[{}/{total}] ABORT {name}: {err}", i + 1);
                return Err(err);
            }
            Err(err) => {
                eprintln!("[{}/{total}] fail {name}: {err}", i + 1);
                failed.push((input.clone(), err));
            }
        }
    }

    println!("\n{succeeded} succeeded, {} failed of {total}", failed.len());
    if !failed.is_empty() {
        println!("failed items:");
        for (path, err) in &failed {
            println!("  {}: {err}", path.display());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> std::process::ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Command::Convert(args) => run_convert(args),
        Command::Colorize(args) => run_colorize(args),
        Command::Normalize(args) => run_normalize(args),
        Command::Batch(args) => run_batch(args),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::ExitCode::FAILURE
        }
    }
}
