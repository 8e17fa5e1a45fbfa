//! Viewpoint tracking: which region of the grid plane the camera is over.

use glam::{Affine3A, Vec3};
use tracing::{trace, warn};

use crate::region_grid::RegionCoord;

/// Anything that can report a world-space viewpoint position.
///
/// Returning `None` ("no active camera") skips the update for that tick.
pub trait ViewpointProvider {
    fn viewpoint(&self) -> Option<Vec3>;
}

impl ViewpointProvider for Vec3 {
    fn viewpoint(&self) -> Option<Vec3> {
        Some(*self)
    }
}

impl ViewpointProvider for Option<Vec3> {
    fn viewpoint(&self) -> Option<Vec3> {
        *self
    }
}

/// A camera world transform: the viewpoint is its translation.
impl ViewpointProvider for Affine3A {
    fn viewpoint(&self) -> Option<Vec3> {
        Some(self.translation.into())
    }
}

impl<T: ViewpointProvider + ?Sized> ViewpointProvider for &T {
    fn viewpoint(&self) -> Option<Vec3> {
        (**self).viewpoint()
    }
}

impl<T: ViewpointProvider + ?Sized> ViewpointProvider for Box<T> {
    fn viewpoint(&self) -> Option<Vec3> {
        (**self).viewpoint()
    }
}

/// Provider backed by a closure. Build one with [`viewpoint_fn`].
#[derive(Clone, Copy)]
pub struct FnViewpoint<F>(F);

impl<F: Fn() -> Option<Vec3>> ViewpointProvider for FnViewpoint<F> {
    fn viewpoint(&self) -> Option<Vec3> {
        (self.0)()
    }
}

/// Wrap a closure as a [`ViewpointProvider`].
pub fn viewpoint_fn<F: Fn() -> Option<Vec3>>(f: F) -> FnViewpoint<F> {
    FnViewpoint(f)
}

/// Project `viewpoint` onto the grid plane and return the region beneath it.
///
/// The grid plane is local `y = 0` under `grid_transform`. Returns `None` if
/// the transform is singular or the result is not finite. Tiny but invertible
/// scales are fine.
pub fn project_to_region(
    viewpoint: Vec3,
    grid_transform: &Affine3A,
    region_size: f32,
) -> Option<RegionCoord> {
    let linear = grid_transform.matrix3;
    let det = linear.determinant();
    if det == 0.0 || !det.is_finite() {
        return None;
    }

    // Normals transform by the inverse transpose of the linear part.
    let normal: Vec3 = (linear.inverse().transpose() * glam::Vec3A::Y)
        .normalize_or_zero()
        .into();
    let origin: Vec3 = grid_transform.translation.into();
    let projected = viewpoint - normal * (viewpoint - origin).dot(normal);
    let local = grid_transform.inverse().transform_point3(projected);

    let rx = (local.x / region_size).floor();
    let rz = (local.z / region_size).floor();
    if !rx.is_finite() || !rz.is_finite() {
        return None;
    }
    // Float-to-int casts saturate, so a viewpoint absurdly far away lands on
    // the extreme region rather than wrapping.
    Some(RegionCoord::new(rx as i32, rz as i32))
}

/// Outcome of one tracker update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionChange {
    /// No viewpoint this tick; the last-known region persists.
    NoViewpoint,
    /// The viewpoint is still over the same region.
    Unchanged(RegionCoord),
    /// The viewpoint crossed into a different region.
    Changed {
        from: RegionCoord,
        to: RegionCoord,
    },
}

/// Remembers the region the viewpoint was last over and reports crossings.
///
/// There is no hysteresis: one step across a region border is a change.
#[derive(Clone, Debug, Default)]
pub struct ViewpointTracker {
    current: RegionCoord,
}

impl ViewpointTracker {
    /// Start tracking at [`RegionCoord::ORIGIN`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking at a known region.
    pub fn starting_at(region: RegionCoord) -> Self {
        Self { current: region }
    }

    /// The last-known region.
    pub fn current(&self) -> RegionCoord {
        self.current
    }

    /// Re-derive the region from `viewpoint` and report whether it changed.
    pub fn update(
        &mut self,
        viewpoint: Option<Vec3>,
        grid_transform: &Affine3A,
        region_size: f32,
    ) -> RegionChange {
        let Some(position) = viewpoint else {
            trace!("no viewpoint, keeping region {:?}", self.current);
            return RegionChange::NoViewpoint;
        };

        let Some(region) = project_to_region(position, grid_transform, region_size) else {
            warn!("cannot project viewpoint {position} onto a degenerate grid transform");
            return RegionChange::NoViewpoint;
        };

        if region == self.current {
            return RegionChange::Unchanged(region);
        }

        let from = self.current;
        self.current = region;
        RegionChange::Changed { from, to: region }
    }
}
