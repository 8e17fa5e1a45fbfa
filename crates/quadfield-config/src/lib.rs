//! Configuration system for the QuadField terrain tiler.
//!
//! Provides the field parameters (region counts, sizes, detail thresholds),
//! grid placement, and host settings. Everything persists to disk as RON,
//! accepts CLI overrides via clap, and validates field invariants before a
//! rebuild is allowed to run.

mod cli;
mod config;
mod error;
mod field;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, DemoConfig, PlacementConfig, default_config_dir};
pub use error::{ConfigError, ValidationError};
pub use field::{
    FieldConfig, MAX_REGION_COUNT, MAX_SUBDIVISION_EXPONENT, MaterialDef, ShaderParam,
};
