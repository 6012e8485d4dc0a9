//! lithophane: turn a photo into a printable lithophane STL.
//!
//! Set `RUST_LOG` to control log output, or use `-v` / `-vv`:
//!
//! ```bash
//! lithophane photo.jpg --shape sphere --diameter 90 -o bauble.stl
//! RUST_LOG=litho_mesh=debug lithophane photo.png --preview backlit.png
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use lithophane::config::load_dotenv;
use lithophane::{
    Conversion, ConvertError, Interpolation, LithoConfig, PreprocessProfile, Shape, convert,
    render_preview,
};

#[derive(Parser)]
#[command(name = "lithophane")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input image (PNG or JPEG)
    input: PathBuf,

    /// Output STL path (defaults to lithophane_{shape}_{w}x{h}.stl)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Topology: panel (frame), sphere (bauble), cylinder or cone
    #[arg(long)]
    shape: Option<String>,

    /// Panel width (mm)
    #[arg(long)]
    width: Option<f64>,

    /// Panel or cylinder height (mm)
    #[arg(long)]
    height: Option<f64>,

    /// Sphere or cylinder diameter (mm)
    #[arg(long)]
    diameter: Option<f64>,

    /// Preprocess profile: none, basic, portrait or technical
    #[arg(long)]
    profile: Option<String>,

    /// Minimum thickness (mm)
    #[arg(long)]
    min: Option<f64>,

    /// Maximum thickness (mm)
    #[arg(long)]
    max: Option<f64>,

    /// Thickness-curve gamma
    #[arg(long)]
    gamma: Option<f64>,

    /// Sampling for curved shapes
    #[arg(long, value_enum)]
    interpolation: Option<InterpolationArg>,

    /// Also write a backlit preview PNG
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Output format for the summary
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum InterpolationArg {
    Bicubic,
    Bilinear,
}

impl From<InterpolationArg> for Interpolation {
    fn from(arg: InterpolationArg) -> Self {
        match arg {
            InterpolationArg::Bicubic => Interpolation::Bicubic,
            InterpolationArg::Bilinear => Interpolation::Bilinear,
        }
    }
}

/// `RUST_LOG` if set (including from .env), otherwise the `-v` level.
fn log_filter(verbose: u8) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn init_tracing(verbose: u8) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(log_filter(verbose))
        .init();
}

/// Load .env, then install the subscriber so a `RUST_LOG` from the file applies.
fn init_logging(verbose: u8) {
    let dotenv = load_dotenv();
    init_tracing(verbose);
    match dotenv {
        Some(path) => info!("Loaded .env from: {}", path.display()),
        None => debug!("No .env file found, using system environment variables"),
    }
}

/// Layer CLI flags over the loaded config.
fn apply_flags(config: &mut LithoConfig, cli: &Cli) -> Result<()> {
    if let Some(name) = &cli.shape {
        let shape: Shape = name.parse()?;
        if shape.kind() != config.shape.kind() {
            config.shape = shape;
        }
    }
    config.shape = config
        .shape
        .with_dimensions(cli.width, cli.height, cli.diameter);

    if let Some(name) = &cli.profile {
        config.preprocess_profile = name.parse::<PreprocessProfile>()?;
    }
    if let Some(min) = cli.min {
        config.min_thickness_mm = min;
    }
    if let Some(max) = cli.max {
        config.max_thickness_mm = max;
    }
    if let Some(gamma) = cli.gamma {
        config.gamma = gamma;
    }
    if let Some(interpolation) = cli.interpolation {
        config.interpolation = interpolation.into();
    }
    Ok(())
}

fn decode(path: &Path) -> Result<image::RgbaImage> {
    let img = image::open(path)
        .map_err(ConvertError::from)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(img.to_rgba8())
}

fn print_summary(conversion: &Conversion, output: &Path, format: OutputFormat) -> Result<()> {
    let report = &conversion.report;
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "output": output.display().to_string(),
                "report": report,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("Wrote {}", output.display());
            println!(
                "  source:    {}x{}",
                report.source_width, report.source_height
            );
            println!(
                "  working:   {}x{}",
                report.working_width, report.working_height
            );
            println!("  shape:     {}", report.shape.kind());
            println!("  profile:   {}", report.profile);
            println!("  triangles: {}", report.triangles);
            println!("  size:      {} bytes", report.stl_bytes);
            if let Some(warning) = &report.resolution_warning {
                println!("  warning:   {warning:?}");
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = LithoConfig::load(cli.config.as_deref())?;
    apply_flags(&mut config, &cli)?;
    config.validate().context("Invalid settings")?;

    let image = decode(&cli.input)?;
    let conversion = convert(&image, &config).context("Conversion failed")?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(conversion.file_name()));
    std::fs::write(&output, &conversion.stl)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if let Some(path) = &cli.preview {
        render_preview(
            &conversion.heightmap,
            config.min_thickness_mm,
            config.max_thickness_mm,
        )
        .save(path)
        .with_context(|| format!("Failed to write preview {}", path.display()))?;
        info!(path = %path.display(), "Wrote preview");
    }

    print_summary(&conversion, &output, cli.format)
}
