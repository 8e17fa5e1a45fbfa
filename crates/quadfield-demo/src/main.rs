//! Headless walkthrough of a quad field: a viewpoint wanders over the grid
//! and every frame's tier batches are handed to a counting renderer.

use std::path::{Path, PathBuf};

use clap::Parser;
use glam::{Vec2, Vec3};
use quadfield_config::{CliArgs, Config, MaterialDef, ShaderParam, default_config_dir};
use quadfield_field::{
    BatchConsumer, FieldConfig, FieldHooks, QuadField, RebuildResult, TickOutcome, TierBatch,
};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use tracing::{debug, error, info, warn};

/// Stand-in for a batched-instance renderer: counts what it would draw.
#[derive(Debug, Default)]
struct CountingRenderer {
    draw_calls: u64,
    instances: u64,
    uploaded_bytes: u64,
    /// Mesh generation last uploaded, per tier.
    uploaded: Vec<u64>,
}

impl BatchConsumer for CountingRenderer {
    fn submit(&mut self, batch: TierBatch<'_>) {
        let tier = batch.tier();
        if self.uploaded.len() <= tier {
            self.uploaded.resize(tier + 1, 0);
        }
        if self.uploaded[tier] != batch.mesh.generation {
            debug!(
                tier,
                generation = batch.mesh.generation,
                vertices = batch.mesh.plane.vertices.len(),
                "uploading tier mesh"
            );
            self.uploaded[tier] = batch.mesh.generation;
        }
        if batch.instances.is_empty() {
            return;
        }
        self.draw_calls += 1;
        self.instances += batch.instance_count() as u64;
        self.uploaded_bytes += std::mem::size_of_val(batch.instances) as u64;
    }
}

/// Logs every rebuild and tags tier materials with their index.
struct LoggingHooks;

impl FieldHooks for LoggingHooks {
    fn before_rebuild(&mut self, config: &FieldConfig) {
        info!(
            regions_x = config.region_count_x,
            regions_z = config.region_count_z,
            tiers = config.tier_count(),
            "rebuilding quad field"
        );
    }

    fn material_cloned(&mut self, tier: usize, material: &mut MaterialDef) {
        material.set_param("tierIndex", ShaderParam::Int(tier as i32));
    }

    fn after_rebuild(&mut self, result: &RebuildResult) {
        info!(
            generation = result.generation,
            cuts = ?result.cut_counts,
            instances = ?result.instance_counts,
            "quad field rebuilt"
        );
    }
}

/// Frames between checks of `config.ron` for edits.
const RELOAD_INTERVAL: u32 = 120;

/// The field settings for `config`, with a stand-in material if none is set.
fn field_config_for(config: &Config) -> FieldConfig {
    let mut field = config.field.clone();
    if field.material.is_none() {
        field.material = Some(MaterialDef::new("terrain", "terrain_tile"));
    }
    field
}

/// Re-read `config.ron` and apply any edits to the running field.
///
/// `file_config` is the config as last read from disk; `config` is that plus
/// CLI overrides. Returns `true` if the field was rebuilt.
fn reload_config(
    config_dir: &Path,
    args: &CliArgs,
    file_config: &mut Config,
    config: &mut Config,
    field: &mut QuadField,
) -> bool {
    let fresh = match file_config.reload(config_dir) {
        Ok(Some(fresh)) => fresh,
        Ok(None) => return false,
        Err(err) => {
            warn!("config reload failed: {err}");
            return false;
        }
    };

    let mut merged = fresh.clone();
    merged.apply_cli_overrides(args);
    *file_config = fresh;

    if let Err(err) = field.apply_configuration(field_config_for(&merged)) {
        warn!("reloaded field configuration rejected: {err}");
        return false;
    }
    field.set_transform(merged.placement.to_affine());
    *config = merged;
    true
}

/// A viewpoint drifting across the grid with a little random wander.
struct Wanderer {
    position: Vec2,
    heading: Vec2,
    height: f32,
    speed: f32,
    extent: Vec2,
    rng: Xoshiro256StarStar,
}

impl Wanderer {
    /// Pick up new travel settings and grid extent after a reload.
    fn retarget(&mut self, extent: Vec2, speed: f32, height: f32) {
        self.extent = extent;
        self.speed = speed;
        self.height = height;
        self.position = self.position.clamp(Vec2::ZERO, extent);
    }

    fn new(extent: Vec2, speed: f32, height: f32) -> Self {
        Self {
            position: extent * 0.5,
            heading: Vec2::new(1.0, 0.35).normalize(),
            height,
            speed,
            extent,
            rng: Xoshiro256StarStar::seed_from_u64(42), // Fixed seed for a reproducible walk
        }
    }

    /// Advance one frame and return the world-space viewpoint.
    fn step(&mut self) -> Vec3 {
        let turn: f32 = self.rng.gen_range(-0.1..=0.1);
        self.heading = Vec2::from_angle(turn).rotate(self.heading);
        self.position += self.heading * self.speed;

        // Bounce off the grid edges so the walk stays over the field.
        if self.position.x < 0.0 || self.position.x > self.extent.x {
            self.heading.x = -self.heading.x;
            self.position.x = self.position.x.clamp(0.0, self.extent.x);
        }
        if self.position.y < 0.0 || self.position.y > self.extent.y {
            self.heading.y = -self.heading.y;
            self.position.y = self.position.y.clamp(0.0, self.extent.y);
        }

        Vec3::new(self.position.x, self.height, self.position.y)
    }
}

fn main() {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args
        .config
        .clone()
        .or_else(default_config_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    // Load or create config, then apply CLI overrides
    let mut file_config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    let mut config = file_config.clone();
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    quadfield_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let transform = config.placement.to_affine();
    let mut field = match QuadField::with_transform(config.field.clone(), transform) {
        Ok(field) => field,
        Err(err) => {
            error!("invalid field configuration: {err}");
            std::process::exit(1);
        }
    };
    field.set_hooks(Box::new(LoggingHooks));

    if let Err(err) = field.set_material(field_config_for(&config).material) {
        warn!("material rejected: {err}");
    }

    let mut placement = field.transform();
    let mut walker = Wanderer::new(field.dimensions(), config.demo.speed, config.demo.height);
    let mut renderer = CountingRenderer::default();
    let mut crossings = 0u64;

    info!(
        frames = config.demo.frames,
        dimensions = ?field.dimensions(),
        tiers = field.tier_count(),
        "starting walk"
    );

    for frame in 0..config.demo.frames {
        if frame > 0
            && frame % RELOAD_INTERVAL == 0
            && reload_config(&config_dir, &args, &mut file_config, &mut config, &mut field)
        {
            placement = field.transform();
            walker.retarget(field.dimensions(), config.demo.speed, config.demo.height);
        }

        let local = walker.step();
        let viewpoint = placement.transform_point3(local);
        if let TickOutcome::RegionChanged {
            from,
            to,
            changed_regions,
        } = field.tick(&viewpoint)
        {
            crossings += 1;
            debug!(frame, ?from, ?to, changed_regions, "crossed region border");
        }
        field.publish(&mut renderer);
    }

    let stats = field.stats();
    info!(
        crossings,
        draw_calls = renderer.draw_calls,
        instances = renderer.instances,
        uploaded_bytes = renderer.uploaded_bytes,
        "walk finished"
    );
    if config.debug.log_stats {
        info!(
            ticks = stats.ticks,
            layout_passes = stats.layout_passes,
            flag_passes = stats.flag_passes,
            batch_rebuilds = stats.batch_rebuilds,
            mesh_rebuilds = stats.mesh_rebuilds,
            "field stats"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(args: &CliArgs) -> (tempfile::TempDir, Config, Config, QuadField) {
        let dir = tempfile::tempdir().unwrap();
        let mut file_config = Config::default();
        file_config.field.region_count_x = 4;
        file_config.field.region_count_z = 4;
        file_config.save(dir.path()).unwrap();

        let mut config = file_config.clone();
        config.apply_cli_overrides(args);
        let field = QuadField::new(field_config_for(&config)).unwrap();
        (dir, file_config, config, field)
    }

    /// An edited config file rebuilds the running field.
    #[test]
    fn test_reload_applies_file_edits() {
        let args = CliArgs::default();
        let (dir, mut file_config, mut config, mut field) = setup(&args);

        let mut edited = file_config.clone();
        edited.field.region_count_x = 6;
        edited.placement.translation = [5.0, 0.0, 0.0];
        edited.save(dir.path()).unwrap();

        assert!(reload_config(dir.path(), &args, &mut file_config, &mut config, &mut field));
        assert_eq!(field.config().region_count_x, 6);
        assert_eq!(field.grid().len(), 24);
        assert_eq!(field.transform().translation.x, 5.0);
        assert_eq!(config.field.region_count_x, 6);
        assert!(field.meshes().iter().all(|m| m.material.is_some()));
    }

    /// CLI overrides still win over values read back from disk.
    #[test]
    fn test_reload_keeps_cli_overrides() {
        let args = CliArgs {
            regions_z: Some(9),
            ..CliArgs::default()
        };
        let (dir, mut file_config, mut config, mut field) = setup(&args);

        let mut edited = file_config.clone();
        edited.field.region_count_z = 2;
        edited.field.region_count_x = 3;
        edited.save(dir.path()).unwrap();

        assert!(reload_config(dir.path(), &args, &mut file_config, &mut config, &mut field));
        assert_eq!(field.config().region_count_x, 3);
        assert_eq!(field.config().region_count_z, 9);
        assert_eq!(file_config.field.region_count_z, 2);
    }

    /// An untouched file leaves the field alone.
    #[test]
    fn test_reload_without_changes() {
        let args = CliArgs::default();
        let (dir, mut file_config, mut config, mut field) = setup(&args);
        let generation = field.generation();

        assert!(!reload_config(dir.path(), &args, &mut file_config, &mut config, &mut field));
        assert_eq!(field.generation(), generation);
    }

    /// An invalid edit is rejected and the previous layout stays.
    #[test]
    fn test_reload_rejects_invalid_field() {
        let args = CliArgs::default();
        let (dir, mut file_config, mut config, mut field) = setup(&args);

        let mut edited = file_config.clone();
        edited.field.detail_thresholds = vec![3, 1];
        edited.save(dir.path()).unwrap();

        assert!(!reload_config(dir.path(), &args, &mut file_config, &mut config, &mut field));
        assert_eq!(field.config().region_count_x, 4);
        assert!(config.field.detail_thresholds.is_empty());
    }
}
