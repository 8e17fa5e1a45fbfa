//! The adaptive region field: ties the tier table, region grid, viewpoint
//! tracker, tier meshes, and per-tier instance batches together behind an
//! explicit `apply_configuration` / `tick` API.

pub mod batch;
pub mod field;
pub mod hooks;

pub use batch::{InstanceBatch, InstanceRecord, TierBatches};
pub use field::{FieldStats, QuadField, RebuildResult, TickOutcome};
pub use hooks::{BatchConsumer, FieldHooks, TierBatch};

pub use quadfield_config::{FieldConfig, MaterialDef, ValidationError};
pub use quadfield_lod::{BoundaryFlags, Edge, RegionCoord, ViewpointProvider, viewpoint_fn};
pub use quadfield_mesh::TierMesh;
