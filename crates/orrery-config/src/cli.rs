//! Command-line argument parsing for Orrery.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", about = "Animated solar system with a gravity-well grid")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Start in fullscreen.
    #[arg(long)]
    pub fullscreen: Option<bool>,

    /// Grid softening term (visual tuning only).
    #[arg(long)]
    pub falloff: Option<f32>,

    /// Grid subdivisions per side.
    #[arg(long)]
    pub subdivisions: Option<u32>,

    /// Spacecraft hull description file.
    #[arg(long)]
    pub hull: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write a 16-bit grayscale heightmap of the gravity grid and exit.
    #[arg(long, value_name = "PNG")]
    pub export_heightmap: Option<PathBuf>,

    /// Scene time in seconds at which the heightmap is sampled.
    #[arg(long, default_value_t = 0.0)]
    pub time: f64,

    /// Heightmap resolution in pixels per side (at most 8192).
    #[arg(long, default_value_t = 512)]
    pub resolution: u32,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(fs) = args.fullscreen {
            self.window.fullscreen = fs;
        }
        if let Some(falloff) = args.falloff {
            self.gravity.falloff = falloff;
        }
        if let Some(subdivisions) = args.subdivisions {
            self.grid.subdivisions = subdivisions;
        }
        if let Some(ref hull) = args.hull {
            self.spacecraft.hull_path = Some(hull.clone());
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
