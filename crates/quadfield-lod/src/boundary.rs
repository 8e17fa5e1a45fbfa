//! Per-region seam flags: which edges border a coarser neighbor.

/// One of the four axis-aligned edges of a region.
///
/// The `repr(u8)` discriminant doubles as the bit index inside [`BoundaryFlags`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Edge {
    /// Edge shared with the neighbor at `z - 1`.
    North = 0,
    /// Edge shared with the neighbor at `z + 1`.
    South = 1,
    /// Edge shared with the neighbor at `x - 1`.
    West = 2,
    /// Edge shared with the neighbor at `x + 1`.
    East = 3,
}

impl Edge {
    /// All four edges in bit order.
    pub const ALL: [Edge; 4] = [Self::North, Self::South, Self::West, Self::East];

    /// Grid offset `(dx, dz)` to the neighbor across this edge.
    pub fn offset(self) -> (i64, i64) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::West => (-1, 0),
            Self::East => (1, 0),
        }
    }

    /// The same edge seen from the neighbor's side.
    pub fn opposite(self) -> Edge {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::West => Self::East,
            Self::East => Self::West,
        }
    }
}

/// 4-bit mask of edges whose neighbor is at a coarser tier.
///
/// Bit 0 = North (`z-1`), Bit 1 = South (`z+1`), Bit 2 = West (`x-1`),
/// Bit 3 = East (`x+1`). The renderer drops every second edge vertex on a
/// flagged edge so it lines up with the neighbor's vertices one-for-one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BoundaryFlags(pub u8);

impl BoundaryFlags {
    /// No coarser neighbors.
    pub const NONE: Self = Self(0);
    /// Coarser neighbors on all four edges.
    pub const ALL: Self = Self(0b1111);

    /// Returns `true` if the given edge is flagged.
    pub fn contains(self, edge: Edge) -> bool {
        self.0 & (1 << edge as u8) != 0
    }

    /// Flag the given edge.
    pub fn insert(&mut self, edge: Edge) {
        self.0 |= 1 << edge as u8;
    }

    /// Raw bits, as written into instance custom data.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Number of flagged edges (0–4).
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }
}
