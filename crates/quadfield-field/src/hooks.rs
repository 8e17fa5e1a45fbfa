//! Seams to the host: rebuild callbacks and the batch consumer.

use quadfield_config::{FieldConfig, MaterialDef};
use quadfield_mesh::TierMesh;

use crate::batch::InstanceRecord;
use crate::field::RebuildResult;

/// Host callbacks around configuration rebuilds. All methods default to no-ops.
pub trait FieldHooks {
    /// A validated configuration is about to replace the current one.
    fn before_rebuild(&mut self, _config: &FieldConfig) {}

    /// A tier's material was cloned from the base and can be edited further.
    fn material_cloned(&mut self, _tier: usize, _material: &mut MaterialDef) {}

    /// The new resources are in place.
    fn after_rebuild(&mut self, _result: &RebuildResult) {}
}

/// Everything a renderer needs to draw one tier.
#[derive(Clone, Copy, Debug)]
pub struct TierBatch<'a> {
    pub mesh: &'a TierMesh,
    pub instances: &'a [InstanceRecord],
}

impl TierBatch<'_> {
    pub fn tier(&self) -> usize {
        self.mesh.tier
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }
}

/// A batched-instance renderer.
pub trait BatchConsumer {
    /// Called once per tier, finest first.
    fn submit(&mut self, batch: TierBatch<'_>);
}

impl<F> BatchConsumer for F
where
    F: FnMut(TierBatch<'_>),
{
    fn submit(&mut self, batch: TierBatch<'_>) {
        self(batch)
    }
}
