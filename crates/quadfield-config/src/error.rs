//! Configuration error types.

/// Errors that can occur when loading, saving, or parsing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    /// Failed to write the config file to disk.
    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// Failed to serialize config to RON.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),
}

/// A field configuration that breaks one of the tiling invariants.
///
/// Returned at apply time; the previously applied layout stays in place.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Detail thresholds must be strictly ascending.
    #[error("detail thresholds must be strictly ascending: threshold[{index}] = {value} follows {previous}")]
    NonAscendingThresholds {
        /// Index of the first offending threshold.
        index: usize,
        /// The threshold before it.
        previous: u32,
        /// The offending value.
        value: u32,
    },

    /// Region size must be a finite, positive length.
    #[error("region size must be finite and greater than zero, got {0}")]
    InvalidRegionSize(f32),

    /// Both region counts must be at least one.
    #[error("region count along {axis} must be at least 1")]
    ZeroRegionCount {
        /// `"x"` or `"z"`.
        axis: &'static str,
    },

    /// The grid would hold more regions than a layout pass can handle.
    #[error("grid has {count} regions, maximum is {max}")]
    TooManyRegions {
        /// `region_count_x * region_count_z`.
        count: u64,
        /// [`crate::MAX_REGION_COUNT`].
        max: u64,
    },

    /// The finest tier would need more cuts than the mesh factory allows.
    #[error("finest tier needs 2^{exponent} - 1 cuts, maximum exponent is {max}")]
    SubdivisionTooFine {
        /// `detail_power + tier_count - 1`.
        exponent: u32,
        /// [`crate::MAX_SUBDIVISION_EXPONENT`].
        max: u32,
    },

    /// Bounding volume parameters must be finite.
    #[error("bounding volume {name} must be finite, got {value}")]
    NonFiniteBounds {
        /// Which parameter was bad.
        name: &'static str,
        /// Its value.
        value: f32,
    },
}
