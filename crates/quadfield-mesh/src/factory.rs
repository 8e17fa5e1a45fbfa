//! Builds the full set of tier meshes for a field configuration.

use quadfield_config::{FieldConfig, MaterialDef, ValidationError};
use tracing::debug;

use crate::bounds::{Aabb, EXTRA_CULL_MARGIN, grid_bounds};
use crate::material::clone_for_tier;
use crate::plane::{PlaneMesh, build_plane, cut_count, uv_distance};

/// One tier's renderable: a subdivided plane, its material, and bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct TierMesh {
    /// Tier index (0 = finest).
    pub tier: usize,
    /// Interior cuts per axis.
    pub cut_count: u32,
    /// `1 / (cut_count + 1)`, the shader-facing vertex spacing.
    pub uv_distance: f32,
    /// Geometry, spanning one region from its corner.
    pub plane: PlaneMesh,
    /// Tier-specific material clone, if a base material is configured.
    pub material: Option<MaterialDef>,
    /// Bounds of the whole grid in grid-local space.
    pub bounds: Aabb,
    /// Margin the renderer should add to `bounds` before culling.
    pub cull_margin: f32,
    /// Rebuild generation this mesh belongs to. Consumers re-upload when it
    /// changes.
    pub generation: u64,
}

/// Stateless builder for [`TierMesh`] sets.
pub struct MeshTierFactory;

impl MeshTierFactory {
    /// Build one mesh per tier for `config`.
    ///
    /// `on_material` is called with each tier's freshly cloned material before
    /// it is stored, so hosts can add their own per-tier constants.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] from [`FieldConfig::validate`].
    pub fn build(
        config: &FieldConfig,
        generation: u64,
        on_material: &mut dyn FnMut(usize, &mut MaterialDef),
    ) -> Result<Vec<TierMesh>, ValidationError> {
        config.validate()?;

        let tier_count = config.tier_count();
        let bounds = grid_bounds(config);
        let grid_scale = [
            1.0 / config.region_count_x as f32,
            1.0 / config.region_count_z as f32,
        ];

        let meshes = (0..tier_count)
            .map(|tier| {
                let cuts = cut_count(config.detail_power, tier_count, tier);
                let uv = uv_distance(cuts);
                let material = config.material.as_ref().map(|base| {
                    let mut material = clone_for_tier(base, grid_scale, uv);
                    on_material(tier, &mut material);
                    material
                });
                debug!(tier, cuts, uv_distance = uv, "built tier mesh");
                TierMesh {
                    tier,
                    cut_count: cuts,
                    uv_distance: uv,
                    plane: build_plane(config.region_size, cuts),
                    material,
                    bounds,
                    cull_margin: EXTRA_CULL_MARGIN,
                    generation,
                }
            })
            .collect();

        Ok(meshes)
    }
}
