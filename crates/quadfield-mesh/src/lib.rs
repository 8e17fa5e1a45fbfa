//! Tier meshes for the region grid: power-of-two subdivided planes, per-tier
//! material clones, and the grid's bounding volume.

pub mod bounds;
pub mod factory;
pub mod material;
pub mod plane;

pub use bounds::{Aabb, EXTRA_CULL_MARGIN, grid_bounds};
pub use factory::{MeshTierFactory, TierMesh};
pub use material::{SCALE_PARAM, UNSCALED_VERTEX_DISTANCE_PARAM, clone_for_tier};
pub use plane::{PLANE_NORMAL, PlaneMesh, PlaneVertex, build_plane, cut_count, uv_distance};
