//! Grid-local bounding volumes handed to the renderer for culling.

use glam::Vec3;
use quadfield_config::FieldConfig;

/// Extra margin the renderer should add around the grid bounds.
///
/// The tiler never samples terrain height, so displaced geometry can poke
/// outside the configured Y range.
pub const EXTRA_CULL_MARGIN: f32 = 100.0;

/// An axis-aligned bounding box in grid-local f32 space.
///
/// Invariant: `min <= max` on every axis. [`Aabb::new`] enforces this by
/// sorting components.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Vec3,
    /// Maximum corner of the bounding box.
    pub max: Vec3,
}

impl Aabb {
    /// Create an AABB from two corners.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create an AABB from a corner and a (possibly negative) size.
    pub fn from_origin_size(origin: Vec3, size: Vec3) -> Self {
        Self::new(origin, origin + size)
    }

    /// Returns the center point of the AABB.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the full size along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns a new AABB grown by `margin` on each side.
    pub fn expanded(&self, margin: f32) -> Aabb {
        Aabb::new(self.min - Vec3::splat(margin), self.max + Vec3::splat(margin))
    }

    /// Returns true if the point lies inside or on the boundary.
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// Bounds of the whole grid: the full X/Z extent, with the configured Y
/// offset and height.
pub fn grid_bounds(config: &FieldConfig) -> Aabb {
    let extent_x = config.region_size * config.region_count_x as f32;
    let extent_z = config.region_size * config.region_count_z as f32;
    Aabb::from_origin_size(
        Vec3::new(0.0, config.aabb_y_offset, 0.0),
        Vec3::new(extent_x, config.aabb_y_scale, extent_z),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sorts_corners() {
        let aabb = Aabb::new(Vec3::new(5.0, -1.0, 3.0), Vec3::new(1.0, 2.0, -3.0));
        assert_eq!(aabb.min, Vec3::new(1.0, -1.0, -3.0));
        assert_eq!(aabb.max, Vec3::new(5.0, 2.0, 3.0));
    }

    #[test]
    fn test_grid_bounds_cover_extent() {
        let config = FieldConfig {
            region_size: 4.0,
            region_count_x: 3,
            region_count_z: 5,
            aabb_y_offset: -2.0,
            aabb_y_scale: 10.0,
            ..FieldConfig::default()
        };
        let aabb = grid_bounds(&config);
        assert_eq!(aabb.min, Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(12.0, 8.0, 20.0));
        assert!(aabb.contains_point(Vec3::new(6.0, 0.0, 10.0)));
    }

    #[test]
    fn test_negative_y_scale_is_normalized() {
        let config = FieldConfig {
            aabb_y_offset: 5.0,
            aabb_y_scale: -5.0,
            ..FieldConfig::default()
        };
        let aabb = grid_bounds(&config);
        assert_eq!(aabb.min.y, 0.0);
        assert_eq!(aabb.max.y, 5.0);
    }

    #[test]
    fn test_expanded_by_cull_margin() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE).expanded(EXTRA_CULL_MARGIN);
        assert_eq!(aabb.size(), Vec3::splat(201.0));
        assert_eq!(aabb.center(), Vec3::splat(0.5));
    }
}
