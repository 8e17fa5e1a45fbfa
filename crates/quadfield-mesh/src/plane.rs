//! Subdivided square planes, one density per tier.
//!
//! Tier `i` of `n` is cut `2^(detail_power + n - 1 - i) - 1` times per axis, so
//! every tier has exactly twice the edge vertex spacing of the next finer one.
//! That ratio is what lets a flagged edge drop every second vertex and meet a
//! coarser neighbor without T-junctions.

/// Up-facing normal shared by every plane vertex.
pub const PLANE_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];

/// Number of interior cuts per axis for `tier` out of `tier_count`.
///
/// The exponent `detail_power + tier_count - 1 - tier` must stay below 32;
/// validated configurations keep it at or below
/// [`quadfield_config::MAX_SUBDIVISION_EXPONENT`].
pub fn cut_count(detail_power: u32, tier_count: usize, tier: usize) -> u32 {
    debug_assert!(tier < tier_count, "tier {tier} out of range for {tier_count} tiers");
    let steps = tier_count.saturating_sub(1).saturating_sub(tier) as u32;
    let exponent = detail_power.saturating_add(steps);
    debug_assert!(exponent < 32, "subdivision exponent {exponent} overflows");
    (1u32 << exponent.min(31)) - 1
}

/// UV distance between adjacent vertices of a plane cut `cut_count` times.
pub fn uv_distance(cut_count: u32) -> f32 {
    1.0 / (cut_count as f32 + 1.0)
}

/// A single plane vertex, laid out for direct GPU upload.
///
/// Layout (32 bytes): position `[f32; 3]`, normal `[f32; 3]`, uv `[f32; 2]`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PlaneVertex {
    /// Region-local position; X and Z span `0..=region_size`, Y is 0.
    pub position: [f32; 3],
    /// Always [`PLANE_NORMAL`].
    pub normal: [f32; 3],
    /// `0..=1` across the region.
    pub uv: [f32; 2],
}

static_assertions::assert_eq_size!(PlaneVertex, [u8; 32]);

/// Vertex and index buffers for one subdivided plane.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaneMesh {
    /// Vertices, X-major: index `i * (segments + 1) + j` is column `i` along X,
    /// row `j` along Z.
    pub vertices: Vec<PlaneVertex>,
    /// Triangle list, counter-clockwise seen from +Y.
    pub indices: Vec<u32>,
    /// Quads per axis (`cut_count + 1`).
    pub segments: u32,
}

impl PlaneMesh {
    /// Returns the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex at grid column `i` (X) and row `j` (Z).
    pub fn vertex(&self, i: u32, j: u32) -> Option<&PlaneVertex> {
        let stride = self.segments + 1;
        if i >= stride || j >= stride {
            return None;
        }
        self.vertices.get((i * stride + j) as usize)
    }
}

/// Build a `size × size` plane cut `cut_count` times per axis.
///
/// The origin sits on the region's corner, so the plane spans `[0, size]` on
/// X and Z.
pub fn build_plane(size: f32, cut_count: u32) -> PlaneMesh {
    let segments = cut_count + 1;
    let stride = segments + 1;
    let step = size / segments as f32;
    let uv_step = 1.0 / segments as f32;

    let mut vertices = Vec::with_capacity((stride * stride) as usize);
    for i in 0..stride {
        for j in 0..stride {
            vertices.push(PlaneVertex {
                position: [i as f32 * step, 0.0, j as f32 * step],
                normal: PLANE_NORMAL,
                uv: [i as f32 * uv_step, j as f32 * uv_step],
            });
        }
    }

    let mut indices = Vec::with_capacity((segments * segments * 6) as usize);
    for i in 0..segments {
        for j in 0..segments {
            let a = i * stride + j; // (i, j)
            let b = a + 1; // (i, j + 1)
            let c = a + stride; // (i + 1, j)
            let d = c + 1; // (i + 1, j + 1)
            indices.extend_from_slice(&[a, b, c, c, b, d]);
        }
    }

    PlaneMesh {
        vertices,
        indices,
        segments,
    }
}
