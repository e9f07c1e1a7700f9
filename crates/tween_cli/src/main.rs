//! Tween CLI
//!
//! Sample easing curves and preview tweens frame by frame.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::cell::Cell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tween_core::{Ease, Property, Scheduler, Shape, TweenSettings, Value};

mod config;

#[derive(Parser)]
#[command(name = "tween")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tween engine CLI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print samples of an easing curve
    Curve {
        /// Shape name (linear, quad, cubic, ..., bounce)
        shape: String,

        /// Ease name (in, out, in_out, out_in)
        #[arg(short, long, default_value = "in")]
        ease: String,

        /// Number of samples across [0, 1]
        #[arg(short, long, default_value = "11")]
        samples: usize,
    },

    /// Play a tween and print every frame
    Play {
        /// Segments as FROM:TO:SECONDS, values comma-separated (e.g. 0,0:10,5:1.5)
        #[arg(long = "segment", required = true)]
        segments: Vec<String>,

        /// Run segments one after another instead of together
        #[arg(long)]
        chain: bool,

        /// Shape for every segment (defaults to the settings file)
        #[arg(long)]
        shape: Option<String>,

        /// Ease for every segment (defaults to the settings file)
        #[arg(long)]
        ease: Option<String>,

        /// Delay before each segment starts, in seconds
        #[arg(long)]
        delay: Option<f32>,

        /// Loop count (negative for infinite)
        #[arg(long)]
        loops: Option<i32>,

        /// Frames per second
        #[arg(long, default_value = "30")]
        fps: f32,

        /// Stop after this many seconds
        #[arg(long, default_value = "10")]
        max_seconds: f32,

        /// Settings file (defaults to ./tween.toml when present)
        #[arg(long)]
        settings: Option<PathBuf>,
    },

    /// Write a default tween.toml
    Init {
        /// Directory to write into
        #[arg(default_value = ".")]
        path: String,
    },

    /// List shapes and eases
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Curve {
            shape,
            ease,
            samples,
        } => cmd_curve(&shape, &ease, samples),

        Commands::Play {
            segments,
            chain,
            shape,
            ease,
            delay,
            loops,
            fps,
            max_seconds,
            settings,
        } => cmd_play(PlayOptions {
            segments,
            chain,
            shape,
            ease,
            delay,
            loops,
            fps,
            max_seconds,
            settings,
        }),

        Commands::Init { path } => cmd_init(&path),

        Commands::Info => cmd_info(),
    }
}

fn cmd_curve(shape: &str, ease: &str, samples: usize) -> Result<()> {
    let shape = config::parse_shape(shape)?;
    let ease = config::parse_ease(ease)?;
    if samples < 2 {
        anyhow::bail!("Need at least 2 samples, got {}", samples);
    }

    info!("Sampling {:?} / {:?} at {} points", shape, ease, samples);
    for i in 0..samples {
        let t = i as f32 / (samples - 1) as f32;
        println!("{:.4}\t{:.4}", t, ease.apply(t, &shape));
    }

    Ok(())
}

struct PlayOptions {
    segments: Vec<String>,
    chain: bool,
    shape: Option<String>,
    ease: Option<String>,
    delay: Option<f32>,
    loops: Option<i32>,
    fps: f32,
    max_seconds: f32,
    settings: Option<PathBuf>,
}

/// Parse `FROM:TO:SECONDS`
fn parse_segment(segment: &str) -> Result<(Value, Value, f32)> {
    let parts: Vec<&str> = segment.split(':').collect();
    let [from, to, seconds] = parts.as_slice() else {
        anyhow::bail!("Invalid segment '{}', expected FROM:TO:SECONDS", segment);
    };

    let from = parse_value(from).with_context(|| format!("Invalid start in '{}'", segment))?;
    let to = parse_value(to).with_context(|| format!("Invalid end in '{}'", segment))?;
    if std::mem::discriminant(&from) != std::mem::discriminant(&to) {
        anyhow::bail!("Segment '{}' mixes value sizes", segment);
    }

    let seconds: f32 = seconds
        .trim()
        .parse()
        .with_context(|| format!("Invalid duration in '{}'", segment))?;
    Ok((from, to, seconds))
}

fn parse_value(text: &str) -> Result<Value> {
    let components = text
        .split(',')
        .map(|c| c.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()?;
    Value::from_components(&components)
        .with_context(|| format!("Expected 1 to 4 components, got {}", components.len()))
}

fn cmd_play(options: PlayOptions) -> Result<()> {
    if !options.fps.is_finite() || options.fps <= 0.0 {
        anyhow::bail!("Invalid fps {}", options.fps);
    }

    let settings: TweenSettings = config::load_settings(options.settings.as_deref())?;
    let shape: Option<Shape> = options.shape.as_deref().map(config::parse_shape).transpose()?;
    let ease: Option<Ease> = options.ease.as_deref().map(config::parse_ease).transpose()?;

    let scheduler = Scheduler::with_settings(settings);
    let mut tween = scheduler.create_tween();
    if options.chain {
        tween = tween.chain();
    }
    if let Some(loops) = options.loops {
        tween = tween.looped(loops);
    }

    let mut properties: Vec<Property<Value>> = Vec::new();
    for segment in &options.segments {
        let (from, to, seconds) = parse_segment(segment)?;
        let mut property = tween.new_property(from, to, seconds);
        if let Some(shape) = &shape {
            property = property.shape(shape.clone());
        }
        if let Some(ease) = &ease {
            property = property.ease(ease.clone());
        }
        if let Some(delay) = options.delay {
            property = property.delay(delay);
        }
        properties.push(property);
    }

    let loops = Rc::new(Cell::new(0u32));
    let counter = loops.clone();
    tween.on_loop_finish(move |t| {
        counter.set(counter.get() + 1);
        debug!("{} finished loop {}", t.id(), t.current_iteration());
    });
    tween.on_finish(|t| info!("{} finished after {:.3}s", t.id(), t.elapsed()));

    info!(
        "Playing {} segment(s) {} at {} fps",
        properties.len(),
        if options.chain { "in sequence" } else { "together" },
        options.fps
    );
    tween.play();

    let dt = 1.0 / options.fps;
    let mut time = 0.0f32;
    print_frame(time, &properties);
    while time < options.max_seconds {
        let running = scheduler.tick(dt);
        time += dt;
        print_frame(time, &properties);
        if !running {
            break;
        }
    }

    if tween.is_playing() {
        warn!("Stopped after {}s with the tween still running", options.max_seconds);
        tween.stop(false);
    }
    info!("{} loop(s) completed", loops.get());

    Ok(())
}

fn print_frame(time: f32, properties: &[Property<Value>]) {
    let values: Vec<String> = properties
        .iter()
        .map(|p| p.current_value().to_string())
        .collect();
    println!("{:.3}\t{}", time, values.join("\t"));
}

fn cmd_init(path: &str) -> Result<()> {
    let dir = PathBuf::from(path);
    let target = dir.join(config::SETTINGS_FILE);
    if target.exists() {
        anyhow::bail!("{} already exists", target.display());
    }

    fs::create_dir_all(&dir)?;
    let content = config::settings_to_toml(&TweenSettings::default())?;
    fs::write(&target, content).with_context(|| format!("Failed to write {}", target.display()))?;

    info!("Settings written to {}", target.display());
    Ok(())
}

fn cmd_info() -> Result<()> {
    println!("Tween Engine");
    println!("============");
    println!();
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Shapes:");
    for shape in Shape::named() {
        println!("  - {:?} (halfway: {:.4})", shape, shape.apply(0.5));
    }
    println!();
    println!("Eases:");
    println!("  - in");
    println!("  - out");
    println!("  - in_out");
    println!("  - out_in");

    Ok(())
}
