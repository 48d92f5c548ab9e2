//! Lambert azimuthal equal-area projection.
//!
//! Preserves area, so a warm anomaly over the Arctic covers the same screen
//! area as one of equal size over Mexico. The whole sphere maps into a disc
//! of radius 2; the antipode of the center has no single image.

use crate::{finite_pair, RawProjection};

const EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AzimuthalEqualArea;

impl RawProjection for AzimuthalEqualArea {
    fn forward(&self, lambda: f64, phi: f64) -> Option<(f64, f64)> {
        let cos_lambda = lambda.cos();
        let cos_phi = phi.cos();
        let denom = 1.0 + cos_lambda * cos_phi;
        if denom <= EPSILON {
            return None;
        }
        let k = (2.0 / denom).sqrt();
        finite_pair(k * cos_phi * lambda.sin(), k * phi.sin())
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let z = (x * x + y * y).sqrt();
        if z > 2.0 {
            return None;
        }
        if z == 0.0 {
            return Some((0.0, 0.0));
        }
        let c = 2.0 * (z / 2.0).asin();
        let (sin_c, cos_c) = c.sin_cos();
        finite_pair((x * sin_c).atan2(z * cos_c), (y * sin_c / z).clamp(-1.0, 1.0).asin())
    }
}
