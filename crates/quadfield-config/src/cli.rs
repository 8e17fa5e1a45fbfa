//! Command-line argument parsing for QuadField hosts.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// QuadField command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "quadfield", about = "Adaptive terrain tiling demo")]
pub struct CliArgs {
    /// Number of regions along local X.
    #[arg(long)]
    pub regions_x: Option<u32>,

    /// Number of regions along local Z.
    #[arg(long)]
    pub regions_z: Option<u32>,

    /// Edge length of one region.
    #[arg(long)]
    pub region_size: Option<f32>,

    /// Extra power-of-two subdivision for every tier.
    #[arg(long)]
    pub detail_power: Option<u32>,

    /// Comma-separated ring distances, e.g. `--thresholds 1,3,6`.
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub thresholds: Option<Vec<u32>>,

    /// Number of frames the demo simulates.
    #[arg(long)]
    pub frames: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(x) = args.regions_x {
            self.field.region_count_x = x;
        }
        if let Some(z) = args.regions_z {
            self.field.region_count_z = z;
        }
        if let Some(size) = args.region_size {
            self.field.region_size = size;
        }
        if let Some(power) = args.detail_power {
            self.field.detail_power = power;
        }
        if let Some(ref thresholds) = args.thresholds {
            self.field.detail_thresholds = thresholds.clone();
        }
        if let Some(frames) = args.frames {
            self.demo.frames = frames;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
