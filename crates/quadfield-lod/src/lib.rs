//! Level-of-detail layout for a flat region grid: ring-distance tier tables,
//! per-region tier assignment with seam flags, and viewpoint region tracking.

mod boundary;
mod region_grid;
mod tier_table;
mod viewpoint;

pub use boundary::{BoundaryFlags, Edge};
pub use region_grid::{RegionCell, RegionCoord, RegionGrid};
pub use tier_table::TierTable;
pub use viewpoint::{
    FnViewpoint, RegionChange, ViewpointProvider, ViewpointTracker, project_to_region,
    viewpoint_fn,
};
