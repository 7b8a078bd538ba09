#![forbid(unsafe_code)]

//! vecsub CLI - convert SVG paths into ASS subtitle drawings.
//!
//! # Commands
//!
//! - `convert`: Convert an SVG document into an ASS script or event lines
//! - `path`: Normalize raw path data into an ASS drawing
//! - `transform`: Show how a transform list is collapsed and tagged
//! - `validate`: Run the pipeline without writing and report errors

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};
use vs_core::{
    AffineMatrix, ConvertError, ExportKind, PathSegment, RenderConfig, StrokePreservation,
    TransformKind, TransformOp,
};
use vs_parser::{parse_path_data, parse_svg_document, parse_transform_list};
use vs_render_ass::{
    TransformPlan, convert_elements, normalize_path, plan_transform, play_resolution,
    render_drawing, render_script,
};

/// vecsub - convert SVG paths into ASS subtitle drawings.
#[derive(Debug, Parser)]
#[command(
    name = "vecsub",
    version,
    about = "vecsub - convert SVG paths into ASS subtitle drawings",
    long_about = "Converts SVG path elements into ASS vector drawings.\n\n\
        Transforms are kept as override tags where ASS can express them and\n\
        baked into the drawing coordinates otherwise."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging (can be repeated for more detail: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert an SVG document to ASS.
    Convert {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Output file path. Defaults to the input with an `.ass` extension,
        /// or stdout when reading stdin.
        #[arg(short, long)]
        output: Option<String>,

        #[command(flatten)]
        render: RenderArgs,

        /// TOML file with render options; flags override it.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print a JSON report (timing, path count, resolution) to stderr
        #[arg(long)]
        json: bool,
    },

    /// Normalize raw path data into an ASS drawing.
    Path {
        /// Value of a `d` attribute.
        #[arg(allow_hyphen_values = true)]
        d: String,

        /// Drawing precision level
        #[arg(short, long, default_value_t = 3)]
        magnification: u32,

        /// Keep every segment under its own command letter
        #[arg(long)]
        no_collapse: bool,

        /// Output as JSON including the parsed segments
        #[arg(long)]
        json: bool,
    },

    /// Show how a transform list is collapsed, baked and tagged (JSON).
    Transform {
        /// Value of a `transform` attribute.
        value: String,

        /// Transform kinds to bake into the drawing
        #[arg(short = 't', long = "unnecessary", value_enum)]
        unnecessary: Vec<BakeableKind>,

        /// Drawing precision level
        #[arg(short, long, default_value_t = 3)]
        magnification: u32,
    },

    /// Validate an SVG document and report the first error.
    Validate {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Output as JSON (structured error)
        #[arg(long)]
        json: bool,
    },
}

/// Render options shared by conversion commands.
#[derive(Debug, Default, clap::Args)]
struct RenderArgs {
    /// Transform kinds to bake into the drawing (repeatable)
    #[arg(short = 't', long = "unnecessary", value_enum)]
    unnecessary: Vec<BakeableKind>,

    /// Drawing precision level; coordinates scale by 2^(level-1)
    #[arg(short, long)]
    magnification: Option<u32>,

    /// How stroke-width maps to the border size
    #[arg(short, long, value_enum)]
    stroke_preservation: Option<StrokeMode>,

    /// Do not merge consecutive segments of the same kind
    #[arg(long)]
    no_collapse: bool,

    /// PlayResX used when the document has no usable width
    #[arg(short = 'x', long)]
    play_res_x: Option<u32>,

    /// PlayResY used when the document has no usable height
    #[arg(short = 'y', long)]
    play_res_y: Option<u32>,

    /// What to write
    #[arg(short, long, value_enum)]
    export: Option<ExportMode>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum BakeableKind {
    Scale,
    Translate,
    Rotate,
}

impl From<BakeableKind> for TransformKind {
    fn from(kind: BakeableKind) -> Self {
        match kind {
            BakeableKind::Scale => Self::Scale,
            BakeableKind::Translate => Self::Translate,
            BakeableKind::Rotate => Self::Rotate,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum StrokeMode {
    /// Border equals stroke width
    Width,
    /// Border is half the stroke width
    Area,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum ExportMode {
    /// Dialogue lines only, for pasting into an open script
    Events,
    /// Complete script with header
    Script,
}

/// Result of converting a document.
#[derive(Debug, Serialize)]
struct ConvertReport {
    input: String,
    output: Option<String>,
    path_count: usize,
    play_res_x: u32,
    play_res_y: u32,
    output_bytes: usize,
    parse_time_ms: f64,
    convert_time_ms: f64,
    render_time_ms: f64,
    total_time_ms: f64,
}

#[derive(Debug, Serialize)]
struct PathReport {
    segments: Vec<PathSegment>,
    drawing: String,
}

#[derive(Debug, Serialize)]
struct TransformReport {
    ops: Vec<TransformOp>,
    matrix: AffineMatrix,
    plan: TransformPlan,
    tags: String,
}

/// Result of validating a document.
#[derive(Debug, Serialize)]
struct ValidateResult {
    valid: bool,
    path_count: usize,
    error: Option<ValidationError>,
}

#[derive(Debug, Serialize)]
struct ValidationError {
    code: String,
    message: String,
}

impl From<&ConvertError> for ValidationError {
    fn from(err: &ConvertError) -> Self {
        Self {
            code: err.code().as_str().to_string(),
            message: err.to_string(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Convert {
            input,
            output,
            render,
            config,
            json,
        } => cmd_convert(&input, output.as_deref(), &render, config.as_deref(), json),

        Command::Path {
            d,
            magnification,
            no_collapse,
            json,
        } => cmd_path(&d, magnification, no_collapse, json),

        Command::Transform {
            value,
            unnecessary,
            magnification,
        } => cmd_transform(&value, &unnecessary, magnification),

        Command::Validate { input, json } => cmd_validate(&input, json),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn load_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(input).context(format!("Failed to read file: {input}"))
    }
}

fn write_output(output: Option<&str>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content).context(format!("Failed to write to: {path}"))?;
            info!("Wrote output to: {path}");
        }
        None => {
            io::stdout()
                .write_all(content.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

/// Defaults, then the TOML file, then command-line flags.
fn build_config(file: Option<&Path>, args: &RenderArgs) -> Result<RenderConfig> {
    let mut config = match file {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .context(format!("Failed to read config: {}", path.display()))?;
            toml::from_str::<RenderConfig>(&text)
                .context(format!("Invalid config: {}", path.display()))?
        }
        None => RenderConfig::default(),
    };

    if !args.unnecessary.is_empty() {
        config.unnecessary_transformations =
            args.unnecessary.iter().copied().map(TransformKind::from).collect();
    }
    if let Some(level) = args.magnification {
        config.magnification_level = level;
    }
    if let Some(mode) = args.stroke_preservation {
        config.stroke_preservation = match mode {
            StrokeMode::Width => StrokePreservation::Width,
            StrokeMode::Area => StrokePreservation::Area,
        };
    }
    if args.no_collapse {
        config.collapse_consecutive_path_segments = false;
    }
    if let Some(x) = args.play_res_x {
        config.default_play_res_x = x;
    }
    if let Some(y) = args.play_res_y {
        config.default_play_res_y = y;
    }
    if let Some(mode) = args.export {
        config.export = match mode {
            ExportMode::Events => ExportKind::Events,
            ExportMode::Script => ExportKind::Script,
        };
    }

    config.validate()?;
    debug!(?config, "render config");
    Ok(config)
}

fn default_output(input: &str) -> Option<String> {
    (input != "-").then(|| {
        Path::new(input)
            .with_extension("ass")
            .to_string_lossy()
            .into_owned()
    })
}

fn ms(elapsed: std::time::Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}

// =============================================================================
// Command: convert
// =============================================================================

fn cmd_convert(
    input: &str,
    output: Option<&str>,
    args: &RenderArgs,
    config_file: Option<&Path>,
    json_output: bool,
) -> Result<()> {
    let total_start = Instant::now();
    let config = build_config(config_file, args)?;

    let parse_start = Instant::now();
    let source = load_input(input)?;
    let document = parse_svg_document(&source)?;
    let parse_time = parse_start.elapsed();
    debug!(paths = document.path_count(), "parsed document");

    let convert_start = Instant::now();
    let elements = convert_elements(&document, &config)?;
    let convert_time = convert_start.elapsed();

    let render_start = Instant::now();
    let rendered = render_script(&document, &elements, &config);
    let render_time = render_start.elapsed();

    let output = output.map(str::to_string).or_else(|| default_output(input));
    write_output(output.as_deref(), &rendered)?;
    let total_time = total_start.elapsed();

    if json_output {
        let (play_res_x, play_res_y) = play_resolution(&document, &config);
        let report = ConvertReport {
            input: input.to_string(),
            output: output.clone(),
            path_count: elements.len(),
            play_res_x,
            play_res_y,
            output_bytes: rendered.len(),
            parse_time_ms: ms(parse_time),
            convert_time_ms: ms(convert_time),
            render_time_ms: ms(render_time),
            total_time_ms: ms(total_time),
        };
        eprintln!("{}", serde_json::to_string_pretty(&report)?);
    }

    info!(
        "Converted {} paths in {:.2}ms",
        elements.len(),
        ms(total_time)
    );
    Ok(())
}

// =============================================================================
// Command: path
// =============================================================================

fn cmd_path(d: &str, magnification: u32, no_collapse: bool, json_output: bool) -> Result<()> {
    let config = RenderConfig {
        magnification_level: magnification,
        collapse_consecutive_path_segments: !no_collapse,
        ..RenderConfig::default()
    };
    config.validate()?;

    let segments = parse_path_data(d)?;
    let scale = config.magnification();
    let terminals = normalize_path(
        &segments,
        &AffineMatrix::scale(scale, scale),
        config.collapse_consecutive_path_segments,
    )?;
    let drawing = render_drawing(&terminals);

    if json_output {
        let report = PathReport { segments, drawing };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{drawing}");
    }
    Ok(())
}

// =============================================================================
// Command: transform
// =============================================================================

fn cmd_transform(value: &str, unnecessary: &[BakeableKind], magnification: u32) -> Result<()> {
    let config = RenderConfig {
        unnecessary_transformations: unnecessary.iter().copied().map(TransformKind::from).collect(),
        magnification_level: magnification,
        ..RenderConfig::default()
    };
    config.validate()?;

    let list = parse_transform_list(value)?;
    let plan = plan_transform(Some(&list), &config)?;
    let report = TransformReport {
        matrix: list.matrix(),
        tags: plan.tags(),
        ops: list.into_ops(),
        plan,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

// =============================================================================
// Command: validate
// =============================================================================

fn cmd_validate(input: &str, json_output: bool) -> Result<()> {
    let source = load_input(input)?;
    let config = RenderConfig::default();

    let outcome = parse_svg_document(&source)
        .and_then(|document| convert_elements(&document, &config));

    let result = match &outcome {
        Ok(elements) => ValidateResult {
            valid: true,
            path_count: elements.len(),
            error: None,
        },
        Err(err) => ValidateResult {
            valid: false,
            path_count: 0,
            error: Some(ValidationError::from(err)),
        },
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if let Some(error) = &result.error {
        println!("✗ Invalid document");
        println!("  [{}] {}", error.code, error.message);
    } else {
        println!("✓ Valid document");
        println!("  Paths: {}", result.path_count);
    }

    if !result.valid {
        std::process::exit(1);
    }

    Ok(())
}
