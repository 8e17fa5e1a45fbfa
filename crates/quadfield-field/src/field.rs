//! The region field: owns every tiling resource and drives recomputation.

use std::time::Instant;

use glam::{Affine3A, Vec2};
use quadfield_config::{FieldConfig, MaterialDef, ValidationError};
use quadfield_lod::{
    RegionChange, RegionCoord, RegionGrid, TierTable, ViewpointProvider, ViewpointTracker,
};
use quadfield_mesh::{MeshTierFactory, TierMesh};
use tracing::{debug, info};

use crate::batch::{InstanceBatch, TierBatches};
use crate::hooks::{BatchConsumer, FieldHooks, TierBatch};

/// Counters for how often each recomputation stage ran.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldStats {
    /// Calls to [`QuadField::tick`].
    pub ticks: u64,
    /// Tier assignment passes over the whole grid.
    pub layout_passes: u64,
    /// Boundary flag passes (only after a pass that changed a tier).
    pub flag_passes: u64,
    /// Full instance batch rewrites.
    pub batch_rebuilds: u64,
    /// Tier mesh set rebuilds (one per applied configuration).
    pub mesh_rebuilds: u64,
}

/// Summary of an applied configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct RebuildResult {
    /// Generation stamped on the new tier meshes.
    pub generation: u64,
    /// Number of tiers.
    pub tier_count: usize,
    /// Cut count per tier, finest first.
    pub cut_counts: Vec<u32>,
    /// Regions in the grid.
    pub region_count: usize,
    /// Instances per tier for the current viewpoint region.
    pub instance_counts: Vec<usize>,
}

/// What a tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// No viewpoint was available; nothing changed.
    NoViewpoint,
    /// Still over the same region; nothing recomputed.
    Unchanged(RegionCoord),
    /// Crossed into a new region and re-ran the layout.
    RegionChanged {
        from: RegionCoord,
        to: RegionCoord,
        /// Regions whose tier changed. Zero means flags and batches were kept.
        changed_regions: usize,
    },
}

/// Resources replaced together on every configuration change.
#[derive(Debug)]
struct FieldResources {
    table: TierTable,
    grid: RegionGrid,
    meshes: Vec<TierMesh>,
    batches: TierBatches,
}

/// An adaptive grid of terrain regions.
///
/// Each region is drawn with one of `tier_count` subdivided plane meshes,
/// chosen by its ring distance to the region under the viewpoint. Regions
/// bordering a coarser neighbor carry boundary flags so the shader can drop
/// every second edge vertex and close the seam.
///
/// All mutation goes through `&mut self` on a single frame thread.
pub struct QuadField {
    config: FieldConfig,
    transform: Affine3A,
    resources: FieldResources,
    tracker: ViewpointTracker,
    viewpoint_override: Option<Box<dyn ViewpointProvider>>,
    hooks: Option<Box<dyn FieldHooks>>,
    stats: FieldStats,
    generation: u64,
}

impl std::fmt::Debug for QuadField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuadField")
            .field("config", &self.config)
            .field("transform", &self.transform)
            .field("current_region", &self.tracker.current())
            .field("generation", &self.generation)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl QuadField {
    /// Build a field at the world origin with the viewpoint assumed over
    /// region `(0, 0)` until the first tick.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] if `config` breaks a tiling invariant.
    pub fn new(config: FieldConfig) -> Result<Self, ValidationError> {
        Self::with_transform(config, Affine3A::IDENTITY)
    }

    /// Build a field placed by `transform`.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] if `config` breaks a tiling invariant.
    pub fn with_transform(config: FieldConfig, transform: Affine3A) -> Result<Self, ValidationError> {
        let tracker = ViewpointTracker::new();
        let mut stats = FieldStats::default();
        let mut hooks = None;
        let resources = build_resources(&config, tracker.current(), 1, &mut hooks, &mut stats)?;
        info!(
            tiers = resources.meshes.len(),
            regions = resources.grid.len(),
            "quad field created"
        );
        Ok(Self {
            config,
            transform,
            resources,
            tracker,
            viewpoint_override: None,
            hooks,
            stats,
            generation: 1,
        })
    }

    /// Replace the configuration and rebuild every resource.
    ///
    /// Validation happens first; on error the current layout, meshes, and
    /// batches are untouched. On success the new set replaces the old one in
    /// a single assignment, laid out for the last-known viewpoint region.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] if `config` breaks a tiling invariant.
    pub fn apply_configuration(
        &mut self,
        config: FieldConfig,
    ) -> Result<RebuildResult, ValidationError> {
        config.validate()?;
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.before_rebuild(&config);
        }

        let generation = self.generation + 1;
        let resources = build_resources(
            &config,
            self.tracker.current(),
            generation,
            &mut self.hooks,
            &mut self.stats,
        )?;

        self.resources = resources;
        self.config = config;
        self.generation = generation;

        let result = self.rebuild_result();
        info!(
            generation,
            tiers = result.tier_count,
            regions = result.region_count,
            instances = ?result.instance_counts,
            "configuration applied"
        );
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.after_rebuild(&result);
        }
        Ok(result)
    }

    /// Swap the base material. A material edit is a configuration edit.
    ///
    /// # Errors
    ///
    /// Propagates [`apply_configuration`](Self::apply_configuration) errors.
    pub fn set_material(
        &mut self,
        material: Option<MaterialDef>,
    ) -> Result<RebuildResult, ValidationError> {
        let config = FieldConfig {
            material,
            ..self.config.clone()
        };
        self.apply_configuration(config)
    }

    /// Move the grid. The region under the viewpoint is re-derived next tick.
    pub fn set_transform(&mut self, transform: Affine3A) {
        self.transform = transform;
    }

    /// Use `provider` instead of the one passed to [`tick`](Self::tick).
    ///
    /// While set, the override is authoritative: if it reports no viewpoint the
    /// tick does nothing.
    pub fn set_viewpoint_override(&mut self, provider: Option<Box<dyn ViewpointProvider>>) {
        self.viewpoint_override = provider;
    }

    /// Install rebuild callbacks.
    pub fn set_hooks(&mut self, hooks: Box<dyn FieldHooks>) {
        self.hooks = Some(hooks);
    }

    /// Per-frame update.
    ///
    /// The region check is O(1). When the viewpoint crosses into a new region
    /// the whole grid is re-tiered and, if any tier moved, flags and batches
    /// are rebuilt in place: O(region_count_x × region_count_z) on this frame.
    /// On large grids that shows up as a frame-time spike on crossing frames.
    pub fn tick(&mut self, camera: &dyn ViewpointProvider) -> TickOutcome {
        self.stats.ticks += 1;

        let viewpoint = match &self.viewpoint_override {
            Some(provider) => provider.viewpoint(),
            None => camera.viewpoint(),
        };

        match self
            .tracker
            .update(viewpoint, &self.transform, self.config.region_size)
        {
            RegionChange::NoViewpoint => TickOutcome::NoViewpoint,
            RegionChange::Unchanged(region) => TickOutcome::Unchanged(region),
            RegionChange::Changed { from, to } => {
                let started = Instant::now();
                let changed_regions = recompute_layout(
                    &mut self.resources,
                    to,
                    self.config.region_size,
                    &mut self.stats,
                );
                debug!(
                    ?from,
                    ?to,
                    changed_regions,
                    elapsed_us = started.elapsed().as_micros() as u64,
                    "viewpoint region changed"
                );
                TickOutcome::RegionChanged {
                    from,
                    to,
                    changed_regions,
                }
            }
        }
    }

    /// Hand every tier's mesh and instances to `consumer`, finest tier first.
    pub fn publish(&self, consumer: &mut dyn BatchConsumer) {
        for batch in self.tier_batches() {
            consumer.submit(batch);
        }
    }

    /// Iterate tiers as `(mesh, instances)` pairs, finest first.
    pub fn tier_batches(&self) -> impl Iterator<Item = TierBatch<'_>> {
        self.resources
            .meshes
            .iter()
            .zip(self.resources.batches.as_slice())
            .map(|(mesh, batch)| TierBatch {
                mesh,
                instances: batch.records(),
            })
    }

    /// World-space extent of the grid: `region_size × region_count` on X and Z.
    pub fn dimensions(&self) -> Vec2 {
        Vec2::new(
            self.config.region_size * self.config.region_count_x as f32,
            self.config.region_size * self.config.region_count_z as f32,
        )
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn transform(&self) -> Affine3A {
        self.transform
    }

    /// The region the viewpoint was last seen over.
    pub fn current_region(&self) -> RegionCoord {
        self.tracker.current()
    }

    pub fn tier_count(&self) -> usize {
        self.resources.meshes.len()
    }

    pub fn tier_table(&self) -> &TierTable {
        &self.resources.table
    }

    pub fn grid(&self) -> &RegionGrid {
        &self.resources.grid
    }

    pub fn meshes(&self) -> &[TierMesh] {
        &self.resources.meshes
    }

    pub fn batches(&self) -> &[InstanceBatch] {
        self.resources.batches.as_slice()
    }

    pub fn stats(&self) -> FieldStats {
        self.stats
    }

    /// Increments on every applied configuration; stamped on tier meshes.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn rebuild_result(&self) -> RebuildResult {
        RebuildResult {
            generation: self.generation,
            tier_count: self.resources.meshes.len(),
            cut_counts: self.resources.meshes.iter().map(|m| m.cut_count).collect(),
            region_count: self.resources.grid.len(),
            instance_counts: self.resources.batches.counts(),
        }
    }
}

/// Build a complete resource set for `config`, laid out for `region`.
fn build_resources(
    config: &FieldConfig,
    region: RegionCoord,
    generation: u64,
    hooks: &mut Option<Box<dyn FieldHooks>>,
    stats: &mut FieldStats,
) -> Result<FieldResources, ValidationError> {
    let mut on_material = |tier: usize, material: &mut MaterialDef| {
        if let Some(hooks) = hooks.as_mut() {
            hooks.material_cloned(tier, material);
        }
    };
    let meshes = MeshTierFactory::build(config, generation, &mut on_material)?;
    stats.mesh_rebuilds += 1;

    let mut resources = FieldResources {
        table: TierTable::build(&config.detail_thresholds, config.max_ring_distance()),
        grid: RegionGrid::new(config.region_count_x as usize, config.region_count_z as usize),
        meshes,
        batches: TierBatches::new(config.tier_count()),
    };

    // Fresh batches are empty, so they are written even when no tier moved.
    if recompute_layout(&mut resources, region, config.region_size, stats) == 0 {
        resources.batches.rebuild(&resources.grid, config.region_size);
        stats.batch_rebuilds += 1;
    }
    Ok(resources)
}

/// Re-tier the grid for `region`; on any change refresh flags and batches.
///
/// Returns the number of regions whose tier changed.
fn recompute_layout(
    resources: &mut FieldResources,
    region: RegionCoord,
    region_size: f32,
    stats: &mut FieldStats,
) -> usize {
    stats.layout_passes += 1;
    let changed = resources.grid.assign_tiers(&resources.table, region);
    if changed > 0 {
        resources.grid.recompute_boundary_flags();
        stats.flag_passes += 1;
        resources.batches.rebuild(&resources.grid, region_size);
        stats.batch_rebuilds += 1;
    }
    changed
}
