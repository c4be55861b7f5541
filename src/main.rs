//! Artificial Retina CLI
//!
//! Runs the motion and looming detector over a synthetic scene, a directory
//! of recorded frames, or (with the `camera` feature) a live webcam.

use artificial_retina::{
    capture::{FrameSource, ImageSequenceSource, SyntheticScene, SyntheticSource},
    display::{DirectorySink, DisplaySink, Hud, LayerImage, DisplayError},
    metrics::MetricsRegistry,
    pipeline::{FrameLoop, StopFlag, StopSignal, Termination},
    RetinaConfig,
};
use clap::Parser;
use std::cell::Cell;
use std::path::PathBuf;
use tracing::{info, warn};

/// Real-time motion and looming detector.
#[derive(Debug, Parser)]
#[command(name = "retina", version, about)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Frame source: `synthetic`, `camera`, or a directory of images.
    #[arg(short, long, default_value = "synthetic")]
    source: String,

    /// Stop after this many frames (0 = until the source ends).
    #[arg(short, long, default_value_t = 0)]
    frames: u64,

    /// Write output layers as PNG files into this directory.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Print Prometheus metrics on exit.
    #[arg(long)]
    metrics: bool,
}

/// Sink used without an output directory: layers are dropped, the HUD is
/// logged.
struct LogSink;

impl DisplaySink for LogSink {
    fn show(&mut self, _layer: &str, _image: LayerImage<'_>) -> Result<(), DisplayError> {
        Ok(())
    }

    fn hud(&mut self, hud: &Hud) {
        info!(danger = hud.danger, "{} | {}", hud.speed_label, hud.looming_label);
    }
}

fn open_source(name: &str) -> Result<Box<dyn FrameSource>, String> {
    match name {
        "synthetic" => Ok(Box::new(SyntheticSource::new(SyntheticScene {
            growth: 2,
            length: Some(60),
            ..Default::default()
        }))),
        #[cfg(feature = "camera")]
        "camera" => Ok(Box::new(artificial_retina::capture::NokhwaCamera::new())),
        #[cfg(not(feature = "camera"))]
        "camera" => Err("camera support requires building with --features camera".to_string()),
        directory => Ok(Box::new(ImageSequenceSource::new(directory))),
    }
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("Artificial Retina v{}", artificial_retina::VERSION);

    let config = match &args.config {
        Some(path) => match RetinaConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => RetinaConfig::default(),
    };

    let mut source = match open_source(&args.source) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = source.open(&config.capture) {
        eprintln!("Failed to open frame source: {}", e);
        std::process::exit(1);
    }

    let mut sink: Box<dyn DisplaySink> = match &args.output_dir {
        Some(dir) => match DirectorySink::new(dir) {
            Ok(sink) => Box::new(sink),
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        None => Box::new(LogSink),
    };

    let mut frame_loop = match FrameLoop::new(config) {
        Ok(frame_loop) => frame_loop,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    if args.metrics {
        match MetricsRegistry::new() {
            Ok(registry) => frame_loop = frame_loop.with_metrics(registry),
            Err(e) => warn!("Metrics disabled: {}", e),
        }
    }

    let interrupted = StopFlag::new();
    let handler_flag = interrupted.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_flag.raise()) {
        warn!("Ctrl-C handler unavailable: {}", e);
    }

    let cycles = Cell::new(0u64);
    let limit = args.frames;
    let stop = || {
        cycles.set(cycles.get() + 1);
        interrupted.should_stop() || (limit > 0 && cycles.get() >= limit)
    };

    info!("Processing frames from {}...", args.source);
    let summary = frame_loop.run(source.as_mut(), sink.as_mut(), &stop);
    source.close();

    let elapsed = summary.finished_at - summary.started_at;
    info!(
        "Processed {} frames in {} ms: {} with focus, {} dangerous, {} history resets",
        summary.stats.frames,
        elapsed.num_milliseconds(),
        summary.stats.focus_cycles,
        summary.stats.danger_cycles,
        summary.stats.history_resets
    );

    if let Some(registry) = frame_loop.metrics() {
        match registry.encode() {
            Ok(text) => println!("{}", text),
            Err(e) => warn!("Failed to encode metrics: {}", e),
        }
    }

    if let Termination::SourceFailed(reason) | Termination::PipelineFailed(reason) =
        &summary.termination
    {
        warn!("Stopped early: {}", reason);
    }
}
