//! Per-tier instance batches: one record per region, grouped by tier.
//!
//! Batches are rebuilt wholesale rather than diffed. That costs
//! O(regions) per rebuild, which only happens when the viewpoint crosses a
//! region border or the configuration changes.

use bytemuck::Zeroable;
use glam::{Mat4, Vec3, Vec4};
use quadfield_lod::RegionGrid;

/// Per-instance data for a batched-instance renderer.
///
/// Layout (80 bytes):
///   - `transform` column-major 4×4, a pure grid-local translation
///   - `custom_data` `(u offset, v offset, boundary flag bits, 0)`
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRecord {
    pub transform: [[f32; 4]; 4],
    pub custom_data: [f32; 4],
}

static_assertions::assert_eq_size!(InstanceRecord, [u8; 80]);

impl InstanceRecord {
    /// Record for a region placed at `translation` with the given custom data.
    pub fn new(translation: Vec3, custom_data: Vec4) -> Self {
        Self {
            transform: Mat4::from_translation(translation).to_cols_array_2d(),
            custom_data: custom_data.to_array(),
        }
    }

    /// The record's transform as a matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.transform)
    }

    /// Translation part of the transform.
    pub fn translation(&self) -> Vec3 {
        self.matrix().w_axis.truncate()
    }

    /// Boundary flag bits stored in custom data.
    pub fn boundary_bits(&self) -> u8 {
        self.custom_data[2] as u8
    }
}

/// The instances drawn with one tier's mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstanceBatch {
    tier: usize,
    records: Vec<InstanceRecord>,
}

impl InstanceBatch {
    /// An empty batch for `tier`.
    pub fn new(tier: usize) -> Self {
        Self {
            tier,
            records: Vec::new(),
        }
    }

    /// Tier this batch draws.
    pub fn tier(&self) -> usize {
        self.tier
    }

    /// Number of instances.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch has no instances.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The instance records, in slot order.
    pub fn records(&self) -> &[InstanceRecord] {
        &self.records
    }

    /// The records as raw bytes for buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.records)
    }

    fn resize(&mut self, count: usize) {
        self.records.resize(count, InstanceRecord::zeroed());
    }
}

/// One [`InstanceBatch`] per tier.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TierBatches {
    batches: Vec<InstanceBatch>,
}

impl TierBatches {
    /// Empty batches for `tier_count` tiers.
    pub fn new(tier_count: usize) -> Self {
        Self {
            batches: (0..tier_count).map(InstanceBatch::new).collect(),
        }
    }

    /// All batches, indexed by tier.
    pub fn as_slice(&self) -> &[InstanceBatch] {
        &self.batches
    }

    /// Batch for one tier.
    pub fn get(&self, tier: usize) -> Option<&InstanceBatch> {
        self.batches.get(tier)
    }

    /// Instance count per tier.
    pub fn counts(&self) -> Vec<usize> {
        self.batches.iter().map(InstanceBatch::len).collect()
    }

    /// Resize every batch to the number of regions currently at its tier.
    pub fn reconfigure_counts(&mut self, grid: &RegionGrid) {
        let counts = grid.tier_histogram(self.batches.len());
        for (batch, count) in self.batches.iter_mut().zip(counts) {
            batch.resize(count);
        }
    }

    /// Overwrite every slot of every batch from the grid.
    ///
    /// Regions are visited X-major; each tier fills its slots in that order
    /// from slot 0. Call [`reconfigure_counts`](Self::reconfigure_counts) first.
    pub fn write_instances(&mut self, grid: &RegionGrid, region_size: f32) {
        let scale_u = 1.0 / grid.count_x() as f32;
        let scale_v = 1.0 / grid.count_z() as f32;
        let mut next_slot = vec![0usize; self.batches.len()];

        for (x, z, cell) in grid.iter() {
            let (Some(batch), Some(slot)) =
                (self.batches.get_mut(cell.tier), next_slot.get_mut(cell.tier))
            else {
                debug_assert!(false, "region tier {} has no batch", cell.tier);
                continue;
            };
            let Some(record) = batch.records.get_mut(*slot) else {
                debug_assert!(false, "batch {} is smaller than its region count", cell.tier);
                continue;
            };
            *record = InstanceRecord::new(
                Vec3::new(x as f32 * region_size, 0.0, z as f32 * region_size),
                Vec4::new(
                    x as f32 * scale_u,
                    z as f32 * scale_v,
                    cell.flags.bits() as f32,
                    0.0,
                ),
            );
            *slot += 1;
        }
    }

    /// Resize and rewrite all batches.
    pub fn rebuild(&mut self, grid: &RegionGrid, region_size: f32) {
        self.reconfigure_counts(grid);
        self.write_instances(grid, region_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadfield_lod::{RegionCoord, TierTable};

    fn laid_out_grid() -> RegionGrid {
        let table = TierTable::build(&[0, 2], 5);
        let mut grid = RegionGrid::new(5, 5);
        grid.assign_tiers(&table, RegionCoord::ORIGIN);
        grid.recompute_boundary_flags();
        grid
    }

    /// Each batch holds exactly the regions at its tier.
    #[test]
    fn test_counts_match_histogram() {
        let grid = laid_out_grid();
        let mut batches = TierBatches::new(3);
        batches.rebuild(&grid, 10.0);
        assert_eq!(batches.counts(), vec![1, 8, 16]);
        assert_eq!(batches.counts(), grid.tier_histogram(3));
    }

    /// Records carry the region translation and UV offset.
    #[test]
    fn test_record_contents() {
        let grid = laid_out_grid();
        let mut batches = TierBatches::new(3);
        batches.rebuild(&grid, 10.0);

        let origin = &batches.get(0).unwrap().records()[0];
        assert_eq!(origin.translation(), Vec3::ZERO);
        assert_eq!(origin.custom_data[0], 0.0);
        assert_eq!(origin.boundary_bits(), grid.flags(0, 0).unwrap().bits());

        // Tier 2 starts at (0, 3) in X-major order.
        let first_coarse = &batches.get(2).unwrap().records()[0];
        assert_eq!(first_coarse.translation(), Vec3::new(0.0, 0.0, 30.0));
        assert_eq!(first_coarse.custom_data, [0.0, 0.6, 0.0, 0.0]);
    }

    /// Slots follow X-major scan order within each tier.
    #[test]
    fn test_slot_order_is_x_major() {
        let grid = laid_out_grid();
        let mut batches = TierBatches::new(3);
        batches.rebuild(&grid, 1.0);

        let expected: Vec<Vec3> = grid
            .iter()
            .filter(|(_, _, cell)| cell.tier == 1)
            .map(|(x, z, _)| Vec3::new(x as f32, 0.0, z as f32))
            .collect();
        let actual: Vec<Vec3> = batches
            .get(1)
            .unwrap()
            .records()
            .iter()
            .map(InstanceRecord::translation)
            .collect();
        assert_eq!(actual, expected);
    }

    /// Flag bits round-trip through the custom data channel.
    #[test]
    fn test_flags_written_to_custom_data() {
        let grid = laid_out_grid();
        let mut batches = TierBatches::new(3);
        batches.rebuild(&grid, 10.0);

        for batch in batches.as_slice() {
            for record in batch.records() {
                let t = record.translation();
                let (x, z) = ((t.x / 10.0) as usize, (t.z / 10.0) as usize);
                assert_eq!(record.boundary_bits(), grid.flags(x, z).unwrap().bits());
                assert_eq!(record.custom_data[3], 0.0);
            }
        }
    }

    /// Rebuilding after a layout change fully replaces old contents.
    #[test]
    fn test_rebuild_overwrites() {
        let table = TierTable::build(&[0, 2], 5);
        let mut grid = laid_out_grid();
        let mut batches = TierBatches::new(3);
        batches.rebuild(&grid, 10.0);

        grid.assign_tiers(&table, RegionCoord::new(2, 2));
        grid.recompute_boundary_flags();
        batches.rebuild(&grid, 10.0);

        let mut fresh = TierBatches::new(3);
        fresh.rebuild(&grid, 10.0);
        assert_eq!(batches, fresh);
        assert_eq!(batches.counts(), vec![1, 24, 0]);
        assert!(batches.get(2).unwrap().is_empty());
    }

    /// Byte view covers every record.
    #[test]
    fn test_as_bytes_length() {
        let grid = laid_out_grid();
        let mut batches = TierBatches::new(3);
        batches.rebuild(&grid, 10.0);
        let batch = batches.get(2).unwrap();
        assert_eq!(batch.as_bytes().len(), batch.len() * 80);
    }
}
