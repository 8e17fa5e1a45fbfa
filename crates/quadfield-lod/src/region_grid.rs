//! Dense X×Z grid of regions holding each region's tier and seam flags.

use crate::boundary::{BoundaryFlags, Edge};
use crate::tier_table::TierTable;

/// Integer region coordinates in grid-local space.
///
/// Unlike grid indices these are signed: a viewpoint may stand outside the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RegionCoord {
    pub x: i32,
    pub z: i32,
}

impl RegionCoord {
    /// The region at the grid origin.
    pub const ORIGIN: Self = Self { x: 0, z: 0 };

    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chebyshev (ring) distance to a grid cell.
    pub fn ring_distance(self, x: usize, z: usize) -> usize {
        let dx = (x as i64 - self.x as i64).unsigned_abs();
        let dz = (z as i64 - self.z as i64).unsigned_abs();
        usize::try_from(dx.max(dz)).unwrap_or(usize::MAX)
    }
}

/// Per-region state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegionCell {
    /// Assigned resolution tier (0 = finest).
    pub tier: usize,
    /// Edges bordering a coarser neighbor.
    pub flags: BoundaryFlags,
}

/// The region grid, stored as one flat array indexed `x * count_z + z`.
///
/// Regions are never added or removed individually; a shape change means a
/// new grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionGrid {
    count_x: usize,
    count_z: usize,
    cells: Vec<RegionCell>,
}

impl RegionGrid {
    /// Allocate a grid with every region at tier 0 and no flags.
    ///
    /// A uniform grid has no seams, so the default flags are already correct.
    /// If `count_x * count_z` overflows `usize` the grid is empty.
    pub fn new(count_x: usize, count_z: usize) -> Self {
        let Some(len) = count_x.checked_mul(count_z) else {
            return Self {
                count_x: 0,
                count_z: 0,
                cells: Vec::new(),
            };
        };
        Self {
            count_x,
            count_z,
            cells: vec![RegionCell::default(); len],
        }
    }

    /// Number of regions along X.
    pub fn count_x(&self) -> usize {
        self.count_x
    }

    /// Number of regions along Z.
    pub fn count_z(&self) -> usize {
        self.count_z
    }

    /// Total number of regions.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the grid has no regions.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn index(&self, x: usize, z: usize) -> Option<usize> {
        (x < self.count_x && z < self.count_z).then_some(x * self.count_z + z)
    }

    /// The region at `(x, z)`, or `None` outside the grid.
    pub fn get(&self, x: usize, z: usize) -> Option<&RegionCell> {
        self.index(x, z).and_then(|i| self.cells.get(i))
    }

    /// Tier of the region at `(x, z)`.
    pub fn tier(&self, x: usize, z: usize) -> Option<usize> {
        self.get(x, z).map(|cell| cell.tier)
    }

    /// Seam flags of the region at `(x, z)`.
    pub fn flags(&self, x: usize, z: usize) -> Option<BoundaryFlags> {
        self.get(x, z).map(|cell| cell.flags)
    }

    /// The neighbor across `edge`, if it exists.
    pub fn neighbor(&self, x: usize, z: usize, edge: Edge) -> Option<&RegionCell> {
        let (dx, dz) = edge.offset();
        let nx = usize::try_from(x as i64 + dx).ok()?;
        let nz = usize::try_from(z as i64 + dz).ok()?;
        self.get(nx, nz)
    }

    /// Visit regions in row-major order: X outer, Z inner.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &RegionCell)> + '_ {
        let count_z = self.count_z;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (i / count_z, i % count_z, cell))
    }

    /// Assign every region the tier at its ring distance from `viewpoint`.
    ///
    /// Returns how many regions changed tier.
    pub fn assign_tiers(&mut self, table: &TierTable, viewpoint: RegionCoord) -> usize {
        let count_z = self.count_z;
        let mut changed = 0;
        for (i, cell) in self.cells.iter_mut().enumerate() {
            let distance = viewpoint.ring_distance(i / count_z, i % count_z);
            let tier = table.tier_at(distance);
            if cell.tier != tier {
                cell.tier = tier;
                changed += 1;
            }
        }
        changed
    }

    /// Recompute every region's seam flags from its neighbors' tiers.
    ///
    /// An edge is flagged when the neighbor across it is coarser. Missing
    /// neighbors at the grid border never flag.
    pub fn recompute_boundary_flags(&mut self) {
        for x in 0..self.count_x {
            for z in 0..self.count_z {
                let tier = self.cells[x * self.count_z + z].tier;
                let mut flags = BoundaryFlags::NONE;
                for edge in Edge::ALL {
                    if self
                        .neighbor(x, z, edge)
                        .is_some_and(|neighbor| neighbor.tier > tier)
                    {
                        flags.insert(edge);
                    }
                }
                self.cells[x * self.count_z + z].flags = flags;
            }
        }
    }

    /// Number of regions assigned to each tier, for `tier_count` tiers.
    ///
    /// Tiers at or past `tier_count` are ignored.
    pub fn tier_histogram(&self, tier_count: usize) -> Vec<usize> {
        let mut counts = vec![0; tier_count];
        for cell in &self.cells {
            if let Some(count) = counts.get_mut(cell.tier) {
                *count += 1;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_5x5() -> (RegionGrid, TierTable) {
        (RegionGrid::new(5, 5), TierTable::build(&[0, 2], 5))
    }

    /// Centre viewpoint on a 5×5 grid with `[0, 2]`: the boundary distance 2
    /// still belongs to tier 1, including the Chebyshev corner.
    #[test]
    fn test_center_viewpoint_scenario() {
        let (mut grid, table) = grid_5x5();
        grid.assign_tiers(&table, RegionCoord::new(2, 2));

        assert_eq!(grid.tier(2, 2), Some(0));
        assert_eq!(grid.tier(0, 2), Some(1));
        assert_eq!(grid.tier(0, 0), Some(1));
        assert_eq!(grid.tier(4, 4), Some(1));
    }

    /// A corner viewpoint pushes the far side to the coarsest tier.
    #[test]
    fn test_corner_viewpoint_reaches_coarsest_tier() {
        let (mut grid, table) = grid_5x5();
        grid.assign_tiers(&table, RegionCoord::ORIGIN);
        assert_eq!(grid.tier(0, 0), Some(0));
        assert_eq!(grid.tier(2, 1), Some(1));
        assert_eq!(grid.tier(3, 0), Some(2));
        assert_eq!(grid.tier(4, 4), Some(2));
    }

    /// Every region gets exactly the table entry at its ring distance.
    #[test]
    fn test_tier_equals_table_lookup() {
        let table = TierTable::build(&[1, 3, 4], 7);
        let mut grid = RegionGrid::new(7, 4);
        for viewpoint in [
            RegionCoord::new(3, 1),
            RegionCoord::new(-2, 9),
            RegionCoord::new(6, 0),
        ] {
            grid.assign_tiers(&table, viewpoint);
            for (x, z, cell) in grid.iter() {
                assert_eq!(cell.tier, table.tier_at(viewpoint.ring_distance(x, z)));
            }
        }
    }

    /// The changed count reflects only regions whose tier moved.
    #[test]
    fn test_changed_count() {
        let (mut grid, table) = grid_5x5();
        // Fresh grid is all tier 0; only the viewpoint region stays there.
        assert_eq!(grid.assign_tiers(&table, RegionCoord::new(2, 2)), 24);
        assert_eq!(grid.assign_tiers(&table, RegionCoord::new(2, 2)), 0);
        // Moving one column right: column 0 becomes tier 2, column 3's middle
        // becomes tier 0, the old centre becomes tier 1.
        let changed = grid.assign_tiers(&table, RegionCoord::new(3, 2));
        assert_eq!(changed, 5 + 1 + 1);
    }

    /// A viewpoint far outside the grid clamps to the last table entry.
    #[test]
    fn test_viewpoint_outside_grid_clamps() {
        let (mut grid, table) = grid_5x5();
        grid.assign_tiers(&table, RegionCoord::new(-100, 500));
        assert!(grid.iter().all(|(_, _, cell)| cell.tier == 2));
    }

    /// Flags point from the finer region toward each coarser neighbor.
    #[test]
    fn test_boundary_flags_bit_layout() {
        let (mut grid, table) = grid_5x5();
        grid.assign_tiers(&table, RegionCoord::new(2, 2));
        grid.recompute_boundary_flags();

        // The tier-0 centre is surrounded by tier 1 on all sides.
        assert_eq!(grid.flags(2, 2), Some(BoundaryFlags::ALL));
        // Ring-1 regions border other tier-1 regions or the finer centre.
        assert_eq!(grid.flags(2, 1), Some(BoundaryFlags::NONE));
        assert_eq!(grid.flags(0, 0), Some(BoundaryFlags::NONE));
    }

    /// Each individual bit maps to the documented neighbor.
    #[test]
    fn test_individual_bits() {
        let table = TierTable::build(&[0], 3);
        let mut grid = RegionGrid::new(3, 3);
        // Viewpoint on the west edge, middle row.
        grid.assign_tiers(&table, RegionCoord::new(0, 1));
        grid.recompute_boundary_flags();

        let flags = grid.flags(0, 1).unwrap();
        assert!(flags.contains(Edge::North)); // (0, 0) is tier 1
        assert!(flags.contains(Edge::South)); // (0, 2) is tier 1
        assert!(flags.contains(Edge::East)); // (1, 1) is tier 1
        assert!(!flags.contains(Edge::West)); // off the grid
        assert_eq!(flags.bits(), 0b1011);
    }

    /// Seam invariant: the finer side flags, the coarser side never does.
    #[test]
    fn test_seam_invariant_all_pairs() {
        let table = TierTable::build(&[0, 1, 3], 9);
        let mut grid = RegionGrid::new(9, 6);
        for viewpoint in [
            RegionCoord::new(4, 3),
            RegionCoord::new(0, 0),
            RegionCoord::new(8, -1),
        ] {
            grid.assign_tiers(&table, viewpoint);
            grid.recompute_boundary_flags();

            for (x, z, cell) in grid.iter() {
                for edge in Edge::ALL {
                    let Some(neighbor) = grid.neighbor(x, z, edge) else {
                        assert!(!cell.flags.contains(edge), "border edge flagged");
                        continue;
                    };
                    assert_eq!(cell.flags.contains(edge), neighbor.tier > cell.tier);
                    if cell.tier < neighbor.tier {
                        assert!(!neighbor.flags.contains(edge.opposite()));
                    }
                }
            }
        }
    }

    /// A single-tier grid never has seams.
    #[test]
    fn test_single_tier_has_no_flags() {
        let table = TierTable::build(&[], 4);
        let mut grid = RegionGrid::new(4, 4);
        assert_eq!(grid.assign_tiers(&table, RegionCoord::new(1, 1)), 0);
        grid.recompute_boundary_flags();
        assert!(grid.iter().all(|(_, _, c)| c.tier == 0 && c.flags == BoundaryFlags::NONE));
    }

    /// Iteration is row-major with X outer.
    #[test]
    fn test_iter_order() {
        let grid = RegionGrid::new(2, 3);
        let order: Vec<_> = grid.iter().map(|(x, z, _)| (x, z)).collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
    }

    /// Out-of-range lookups return `None`.
    #[test]
    fn test_out_of_range_lookup() {
        let grid = RegionGrid::new(2, 3);
        assert!(grid.get(2, 0).is_none());
        assert!(grid.get(0, 3).is_none());
        assert!(grid.neighbor(0, 0, Edge::West).is_none());
        assert!(grid.neighbor(0, 0, Edge::North).is_none());
        assert!(grid.neighbor(1, 2, Edge::South).is_none());
        assert!(grid.neighbor(0, 0, Edge::East).is_some());
    }

    /// Region counts whose product overflows give an empty grid.
    #[test]
    fn test_overflowing_dimensions_give_empty_grid() {
        let grid = RegionGrid::new(usize::MAX, 2);
        assert!(grid.is_empty());
        assert_eq!((grid.count_x(), grid.count_z()), (0, 0));
        assert!(grid.get(5, 1).is_none());
        assert_eq!(grid.iter().count(), 0);
    }

    /// Histogram counts sum to the region count.
    #[test]
    fn test_tier_histogram() {
        let (mut grid, table) = grid_5x5();
        grid.assign_tiers(&table, RegionCoord::new(2, 2));
        assert_eq!(grid.tier_histogram(3), vec![1, 24, 0]);

        grid.assign_tiers(&table, RegionCoord::ORIGIN);
        let counts = grid.tier_histogram(3);
        assert_eq!(counts, vec![1, 8, 16]);
        assert_eq!(counts.iter().sum::<usize>(), grid.len());
    }
}
