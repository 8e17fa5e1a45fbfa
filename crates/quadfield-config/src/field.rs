//! Field parameters: region grid shape, detail tiers, bounds, and tier material.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Upper bound on `detail_power + tier_count - 1`.
///
/// The finest tier mesh is subdivided `2^exponent - 1` times per axis, so an
/// exponent of 10 already means ~1M vertices per region mesh.
pub const MAX_SUBDIVISION_EXPONENT: u32 = 10;

/// Upper bound on `region_count_x * region_count_z`.
pub const MAX_REGION_COUNT: u64 = 1 << 24;

/// Parameters of the adaptive region grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FieldConfig {
    /// Extra power-of-two subdivision applied to every tier. The coarsest tier
    /// is cut `2^detail_power - 1` times per axis.
    pub detail_power: u32,
    /// Ring distances (in regions) at which the tier steps to the next coarser
    /// one. `detail_thresholds[i]` is the last distance that still gets tier `i`.
    /// Must be strictly ascending.
    pub detail_thresholds: Vec<u32>,
    /// Edge length of one square region in grid-local units.
    pub region_size: f32,
    /// Number of regions along local X.
    pub region_count_x: u32,
    /// Number of regions along local Z.
    pub region_count_z: u32,
    /// Bottom of the bounding volume, relative to the grid plane.
    pub aabb_y_offset: f32,
    /// Height of the bounding volume.
    pub aabb_y_scale: f32,
    /// Base material cloned once per tier. `None` renders with the consumer's default.
    pub material: Option<MaterialDef>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            detail_power: 1,
            detail_thresholds: Vec::new(),
            region_size: 10.0,
            region_count_x: 1,
            region_count_z: 1,
            aabb_y_offset: 0.0,
            aabb_y_scale: 0.0,
            material: None,
        }
    }
}

impl FieldConfig {
    /// Number of resolution tiers: one more than the number of thresholds.
    pub fn tier_count(&self) -> usize {
        self.detail_thresholds.len() + 1
    }

    /// Largest ring distance the tier table has to cover.
    pub fn max_ring_distance(&self) -> usize {
        self.region_count_x.max(self.region_count_z) as usize
    }

    /// Total number of regions in the grid.
    pub fn region_count(&self) -> usize {
        self.region_count_x as usize * self.region_count_z as usize
    }

    /// Check every invariant the tiler depends on.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, in declaration order of
    /// the fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let exponent = u32::try_from(self.detail_thresholds.len())
            .ok()
            .and_then(|n| self.detail_power.checked_add(n))
            .unwrap_or(u32::MAX);
        if exponent > MAX_SUBDIVISION_EXPONENT {
            return Err(ValidationError::SubdivisionTooFine {
                exponent,
                max: MAX_SUBDIVISION_EXPONENT,
            });
        }

        for (i, pair) in self.detail_thresholds.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(ValidationError::NonAscendingThresholds {
                    index: i + 1,
                    previous: pair[0],
                    value: pair[1],
                });
            }
        }

        if !self.region_size.is_finite() || self.region_size <= 0.0 {
            return Err(ValidationError::InvalidRegionSize(self.region_size));
        }
        if self.region_count_x == 0 {
            return Err(ValidationError::ZeroRegionCount { axis: "x" });
        }
        if self.region_count_z == 0 {
            return Err(ValidationError::ZeroRegionCount { axis: "z" });
        }
        let regions = u64::from(self.region_count_x) * u64::from(self.region_count_z);
        if regions > MAX_REGION_COUNT {
            return Err(ValidationError::TooManyRegions {
                count: regions,
                max: MAX_REGION_COUNT,
            });
        }

        for (name, value) in [
            ("y offset", self.aabb_y_offset),
            ("y scale", self.aabb_y_scale),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteBounds { name, value });
            }
        }

        Ok(())
    }
}

/// A single shader uniform value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum ShaderParam {
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
}

/// The shared base material every tier clones.
///
/// Only the parameter table is interpreted here; `shader` is an opaque key the
/// renderer resolves.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MaterialDef {
    /// Human-readable name.
    pub name: String,
    /// Renderer-side shader key.
    pub shader: String,
    /// Shader parameters by uniform name.
    pub params: BTreeMap<String, ShaderParam>,
}

impl MaterialDef {
    /// Create a material with no parameters.
    pub fn new(name: impl Into<String>, shader: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shader: shader.into(),
            params: BTreeMap::new(),
        }
    }

    /// Set (or replace) a shader parameter.
    pub fn set_param(&mut self, name: impl Into<String>, value: ShaderParam) {
        self.params.insert(name.into(), value);
    }

    /// Look up a shader parameter.
    pub fn param(&self, name: &str) -> Option<ShaderParam> {
        self.params.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_by_five() -> FieldConfig {
        FieldConfig {
            detail_thresholds: vec![0, 2],
            region_count_x: 5,
            region_count_z: 5,
            ..FieldConfig::default()
        }
    }

    /// The default configuration is a valid single-region, single-tier field.
    #[test]
    fn test_default_is_valid() {
        let config = FieldConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.tier_count(), 1);
        assert_eq!(config.region_count(), 1);
    }

    /// Tier count is always one more than the threshold count.
    #[test]
    fn test_tier_count_from_thresholds() {
        assert_eq!(five_by_five().tier_count(), 3);
    }

    /// Equal adjacent thresholds are rejected with the offending index.
    #[test]
    fn test_duplicate_threshold_rejected() {
        let config = FieldConfig {
            detail_thresholds: vec![1, 3, 3],
            ..five_by_five()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::NonAscendingThresholds {
                index: 2,
                previous: 3,
                value: 3
            })
        );
    }

    /// Descending thresholds are rejected.
    #[test]
    fn test_descending_threshold_rejected() {
        let config = FieldConfig {
            detail_thresholds: vec![4, 2],
            ..five_by_five()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::NonAscendingThresholds { index: 1, .. })
        ));
    }

    /// Zero, negative, and NaN region sizes are all invalid.
    #[test]
    fn test_bad_region_size_rejected() {
        for size in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let config = FieldConfig {
                region_size: size,
                ..five_by_five()
            };
            assert!(
                matches!(config.validate(), Err(ValidationError::InvalidRegionSize(_))),
                "size {size} should be rejected"
            );
        }
    }

    /// Each axis reports its own zero count error.
    #[test]
    fn test_zero_region_counts_rejected() {
        let x = FieldConfig {
            region_count_x: 0,
            ..five_by_five()
        };
        assert_eq!(
            x.validate(),
            Err(ValidationError::ZeroRegionCount { axis: "x" })
        );

        let z = FieldConfig {
            region_count_z: 0,
            ..five_by_five()
        };
        assert_eq!(
            z.validate(),
            Err(ValidationError::ZeroRegionCount { axis: "z" })
        );
    }

    /// Exponents past the cap are rejected, the cap itself is fine.
    #[test]
    fn test_subdivision_exponent_cap() {
        let at_cap = FieldConfig {
            detail_power: MAX_SUBDIVISION_EXPONENT - 2,
            ..five_by_five()
        };
        assert_eq!(at_cap.validate(), Ok(()));

        let past_cap = FieldConfig {
            detail_power: MAX_SUBDIVISION_EXPONENT - 1,
            ..five_by_five()
        };
        assert_eq!(
            past_cap.validate(),
            Err(ValidationError::SubdivisionTooFine {
                exponent: MAX_SUBDIVISION_EXPONENT + 1,
                max: MAX_SUBDIVISION_EXPONENT
            })
        );
    }

    /// Huge detail powers do not overflow while validating.
    #[test]
    fn test_detail_power_overflow_rejected() {
        let config = FieldConfig {
            detail_power: u32::MAX,
            ..five_by_five()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::SubdivisionTooFine { .. })
        ));
    }

    /// Region counts are capped by their product, not per axis.
    #[test]
    fn test_region_count_cap() {
        let long_strip = FieldConfig {
            region_count_x: 1 << 20,
            region_count_z: 16,
            ..five_by_five()
        };
        assert_eq!(long_strip.validate(), Ok(()));

        let too_many = FieldConfig {
            region_count_x: u32::MAX,
            region_count_z: u32::MAX,
            ..five_by_five()
        };
        assert!(matches!(
            too_many.validate(),
            Err(ValidationError::TooManyRegions { max: MAX_REGION_COUNT, .. })
        ));
    }

    /// Non-finite bounds parameters are rejected.
    #[test]
    fn test_non_finite_bounds_rejected() {
        let config = FieldConfig {
            aabb_y_scale: f32::NAN,
            ..five_by_five()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::NonFiniteBounds { name: "y scale", .. })
        ));
    }

    /// Material parameters can be set, replaced, and read back.
    #[test]
    fn test_material_params() {
        let mut mat = MaterialDef::new("grass", "terrain_tile");
        mat.set_param("tint", ShaderParam::Vec3([0.2, 0.6, 0.1]));
        mat.set_param("tint", ShaderParam::Vec3([0.3, 0.5, 0.1]));
        assert_eq!(mat.param("tint"), Some(ShaderParam::Vec3([0.3, 0.5, 0.1])));
        assert_eq!(mat.param("missing"), None);
        assert_eq!(mat.params.len(), 1);
    }

    /// A field config with a material survives a RON round trip.
    #[test]
    fn test_field_config_ron() {
        let mut config = five_by_five();
        let mut mat = MaterialDef::new("grass", "terrain_tile");
        mat.set_param("roughness", ShaderParam::Float(0.8));
        config.material = Some(mat);

        let ron_str = ron::to_string(&config).unwrap();
        let back: FieldConfig = ron::from_str(&ron_str).unwrap();
        assert_eq!(back, config);
    }
}
