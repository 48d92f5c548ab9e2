//! Map projections from geographic coordinates to screen pixels.
//!
//! Implements the projections from scratch without external dependencies.
//! Each raw projection works on the unit sphere in radians; [`MapProjection`]
//! wraps one with a rotation, a scale, a translation and an optional clip
//! angle, and works in degrees and pixels.

pub mod azimuthal_equal_area;
pub mod conic_conformal;
pub mod error;
pub mod map;
pub mod mercator;
pub mod rotation;

pub use azimuthal_equal_area::AzimuthalEqualArea;
pub use conic_conformal::ConicConformal;
pub use error::{ProjectionError, ProjectionResult};
pub use map::{MapProjection, ProjectionKind, ProjectionSpec};
pub use mercator::Mercator;
pub use rotation::Rotation;

/// A projection of the unit sphere onto the plane.
///
/// Coordinates are in radians on the sphere and unit-sphere lengths on the
/// plane. `None` means the point has no image (or no preimage).
pub trait RawProjection: Send + Sync + std::fmt::Debug {
    fn forward(&self, lambda: f64, phi: f64) -> Option<(f64, f64)>;

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)>;
}

pub(crate) fn finite_pair(x: f64, y: f64) -> Option<(f64, f64)> {
    if x.is_finite() && y.is_finite() {
        Some((x, y))
    } else {
        None
    }
}
