//! Thumbwave CLI: render waveform thumbnails of WAV files.

use std::f32::consts::TAU;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use thumbwave_core::audio::io::{content_identity, read_wav, write_wav};
use thumbwave_core::config::ThumbnailConfig;
use thumbwave_core::thumbnail::pyramid;
use thumbwave_core::thumbnail::RasterCanvas;
use thumbwave_core::{Rect, Sample, SampleFrame, SampleThumbnail, ThumbnailRegistry, VisualizeParameters};

// ─── Top-level CLI ───────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "thumbwave",
    about = "Multi-resolution waveform thumbnails for audio samples",
    version,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Show verbose output
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Render a waveform thumbnail to PNG
    Render(RenderArgs),
    /// Print the thumbnail pyramid of a sample
    Levels(LevelsArgs),
    /// Write a sine test tone
    Tone(ToneArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input WAV file
    input: PathBuf,

    /// Output PNG file
    #[arg(short, long)]
    output: PathBuf,

    /// Image width in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 128)]
    height: u32,

    /// Window start as a fraction of the sample
    #[arg(long, default_value_t = 0.0)]
    start: f32,

    /// Window end as a fraction of the sample
    #[arg(long, default_value_t = 1.0)]
    end: f32,

    /// Vertical amplification
    #[arg(long, default_value_t = 1.0)]
    amplification: f32,

    /// Draw the sample reversed
    #[arg(long, default_value_t = false)]
    reversed: bool,

    /// Skip the prerendered rasters and always render from the pyramid
    #[arg(long, default_value_t = false)]
    direct: bool,

    /// Allow the finest pyramid level
    #[arg(long, default_value_t = false)]
    high_res: bool,

    /// JSON config file (default: $THUMBWAVE_CONFIG, then built-in defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Key the cache by file contents instead of path
    #[arg(long, default_value_t = false)]
    content_key: bool,
}

#[derive(Parser, Debug)]
struct LevelsArgs {
    /// Input WAV file
    input: PathBuf,

    /// Print as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Parser, Debug)]
struct ToneArgs {
    /// Output WAV file
    output: PathBuf,

    /// Duration in seconds
    #[arg(long, default_value_t = 2.0)]
    seconds: f32,

    /// Tone frequency in Hz
    #[arg(long, default_value_t = 440.0)]
    frequency: f32,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 44100)]
    sample_rate: u32,
}

// ─── Main ────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Command::Render(args) => run_render(args),
        Command::Levels(args) => run_levels(args),
        Command::Tone(args) => run_tone(args),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

// ─── Helpers ─────────────────────────────────────────────────────

fn validate_input(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("File not found: {}", path.display());
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ThumbnailConfig> {
    match path {
        Some(path) => ThumbnailConfig::load(path),
        None => ThumbnailConfig::load_or_default(),
    }
}

/// Sine on both channels at 0.8 amplitude.
fn sine_frames(seconds: f32, frequency: f32, sample_rate: u32) -> Vec<SampleFrame> {
    let len = (seconds * sample_rate as f32).round() as usize;
    (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            SampleFrame::mono((TAU * frequency * t).sin() * 0.8)
        })
        .collect()
}

// ─── Runners ─────────────────────────────────────────────────────

fn run_render(args: RenderArgs) -> Result<()> {
    validate_input(&args.input)?;
    if args.width == 0 || args.height == 0 {
        bail!("Image size must be positive, got {}x{}", args.width, args.height);
    }

    let config = load_config(args.config.as_deref())?;
    let mut sample = read_wav(&args.input)?;
    if args.content_key {
        sample = sample.with_identity(content_identity(&args.input)?);
    }

    let mut registry = ThumbnailRegistry::new(config);
    let color = registry.config().raster_color;
    let thumbnail = SampleThumbnail::new(&sample, &mut registry);

    let params = VisualizeParameters::new(Rect::new(0, 0, args.width as i64, args.height as i64))
        .with_window(args.start, args.end)
        .with_amplification(args.amplification)
        .with_reversed(args.reversed)
        .with_high_resolution(args.high_res)
        .with_color(color);

    let mut canvas = RasterCanvas::new(args.width, args.height);
    let rendered = if args.direct {
        thumbnail.visualize_direct(&params, &mut canvas)
    } else {
        thumbnail.visualize(&params, &mut canvas)
    };
    rendered.with_context(|| format!("Failed to render thumbnail: {}", args.input.display()))?;

    canvas.raster().save_png(&args.output)?;
    log::info!(
        "Wrote {}x{} thumbnail of {} ({} frames) to {}",
        args.width,
        args.height,
        sample.identity(),
        sample.len(),
        args.output.display()
    );
    Ok(())
}

fn run_levels(args: LevelsArgs) -> Result<()> {
    validate_input(&args.input)?;
    let sample = read_wav(&args.input)?;
    let levels = pyramid::build(sample.frames());
    let sizes: Vec<usize> = levels.iter().map(Vec::len).collect();
    let divisor = pyramid::size_divisor(sample.len());

    if args.json {
        let report = serde_json::json!({
            "identity": sample.identity(),
            "frames": sample.len(),
            "size_divisor": divisor,
            "levels": sizes,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}: {} frames, divisor {}", sample.identity(), sample.len(), divisor);
    for (index, size) in sizes.iter().enumerate() {
        println!("  level {:>2}: {} units", index, size);
    }
    Ok(())
}

fn run_tone(args: ToneArgs) -> Result<()> {
    if args.seconds <= 0.0 || args.sample_rate == 0 {
        bail!("Duration and sample rate must be positive");
    }
    let frames = sine_frames(args.seconds, args.frequency, args.sample_rate);
    let sample = Sample::new(args.output.display().to_string(), frames);
    write_wav(&args.output, &sample, args.sample_rate)?;
    log::info!(
        "Wrote {:.2}s {} Hz tone to {}",
        args.seconds,
        args.frequency,
        args.output.display()
    );
    Ok(())
}
