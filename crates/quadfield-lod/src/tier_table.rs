//! Precomputed ring-distance to resolution-tier lookup.

/// Maps an integer ring distance (in regions) to a resolution tier.
///
/// Tier 0 is the finest. `thresholds[i]` is the last distance that still gets
/// tier `i`; everything past the last threshold gets the coarsest tier,
/// `thresholds.len()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TierTable {
    tiers: Vec<usize>,
    tier_count: usize,
}

impl TierTable {
    /// Build the table for distances `0..=max_distance`.
    ///
    /// `thresholds` should be strictly ascending (`FieldConfig::validate` checks
    /// this). Unsorted input never panics: a threshold at or below an earlier
    /// one claims no distances, and every entry still holds a tier below
    /// `thresholds.len() + 1`. Thresholds past `max_distance` are clipped.
    pub fn build(thresholds: &[u32], max_distance: usize) -> Self {
        let mut tiers = vec![0usize; max_distance + 1];
        let mut start = 0usize;

        for (tier, &end) in thresholds.iter().enumerate() {
            let end = end as usize;
            let stop = end.min(max_distance);
            if start <= stop {
                tiers[start..=stop].fill(tier);
            }
            start = start.max(end.saturating_add(1));
        }

        // With no thresholds this is tier 0 everywhere: a single tier.
        let coarsest = thresholds.len();
        if start <= max_distance {
            tiers[start..].fill(coarsest);
        }

        Self {
            tiers,
            tier_count: coarsest + 1,
        }
    }

    /// Tier for the given ring distance. Distances past the end of the table
    /// clamp to its last entry.
    pub fn tier_at(&self, distance: usize) -> usize {
        self.tiers
            .get(distance)
            .or(self.tiers.last())
            .copied()
            .unwrap_or(0)
    }

    /// Number of tiers, including ones no distance in the table reaches.
    pub fn tier_count(&self) -> usize {
        self.tier_count
    }

    /// Number of table entries (`max_distance + 1`).
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Always `false`: the table covers at least distance 0.
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// The raw table, indexed by distance.
    pub fn as_slice(&self) -> &[usize] {
        &self.tiers
    }
}
