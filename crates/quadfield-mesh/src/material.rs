//! Per-tier copies of the shared base material.

use quadfield_config::{MaterialDef, ShaderParam};

/// Shader uniform holding `(1 / region_count_x, 1 / region_count_z)`.
pub const SCALE_PARAM: &str = "scale";

/// Shader uniform holding the tier's UV distance between adjacent vertices.
pub const UNSCALED_VERTEX_DISTANCE_PARAM: &str = "unscaledVertexDistance";

/// Clone `base` and stamp the tier constants onto the copy.
///
/// The base material is never mutated, so all tiers start from the same
/// parameters.
pub fn clone_for_tier(base: &MaterialDef, grid_scale: [f32; 2], uv_distance: f32) -> MaterialDef {
    let mut material = base.clone();
    material.set_param(SCALE_PARAM, ShaderParam::Vec2(grid_scale));
    material.set_param(UNSCALED_VERTEX_DISTANCE_PARAM, ShaderParam::Float(uv_distance));
    material
}
