//! Lambert Conformal Conic projection.
//!
//! Commonly used for mid-latitude weather maps (HRRR and NAM grids use it).
//! A cone secant to the sphere along two standard parallels is unrolled
//! onto the plane; shapes are preserved locally and scale is true along the
//! parallels.
//!
//! When the parallels are symmetric about the equator the cone degenerates
//! into a cylinder and the projection is Mercator.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::error::{ProjectionError, ProjectionResult};
use crate::mercator::Mercator;
use crate::{finite_pair, RawProjection};

const EPSILON: f64 = 1e-6;

/// Lambert Conformal Conic projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConicConformal {
    /// Cone constant
    n: f64,
    /// Radius scale at the origin
    f: f64,
}

impl ConicConformal {
    /// Build the projection from two standard parallels in degrees.
    ///
    /// Pass the same latitude twice for a tangent cone. Returns `Ok(None)`
    /// when the cone constant is zero (use Mercator instead).
    pub fn new(parallel1: f64, parallel2: f64) -> ProjectionResult<Option<Self>> {
        let valid = |p: f64| p.is_finite() && p.abs() < 90.0;
        if !valid(parallel1) || !valid(parallel2) {
            return Err(ProjectionError::InvalidParallels(parallel1, parallel2));
        }

        let conic = Self::from_parallels(parallel1, parallel2);
        if conic.n.abs() < 1e-10 || !conic.n.is_finite() {
            return Ok(None);
        }
        Ok(Some(conic))
    }

    /// Continental US setup: parallels at 33°N and 45°N.
    pub fn conus() -> Self {
        Self::from_parallels(33.0, 45.0)
    }

    fn from_parallels(parallel1: f64, parallel2: f64) -> Self {
        let y0 = parallel1.to_radians();
        let y1 = parallel2.to_radians();
        let cos_y0 = y0.cos();

        let n = if (y0 - y1).abs() < 1e-10 {
            // Tangent cone (single standard parallel)
            y0.sin()
        } else {
            // Secant cone (two standard parallels)
            (cos_y0 / y1.cos()).ln() / (tan_half(y1) / tan_half(y0)).ln()
        };

        Self {
            n,
            f: cos_y0 * tan_half(y0).powf(n) / n,
        }
    }

    /// Cone constant.
    pub fn cone_constant(&self) -> f64 {
        self.n
    }
}

/// Raw projection for a pair of parallels, falling back to Mercator.
pub fn conic_or_mercator(parallels: [f64; 2]) -> ProjectionResult<Box<dyn RawProjection>> {
    Ok(match ConicConformal::new(parallels[0], parallels[1])? {
        Some(conic) => Box::new(conic),
        None => Box::new(Mercator),
    })
}

fn tan_half(phi: f64) -> f64 {
    ((FRAC_PI_2 + phi) / 2.0).tan()
}

fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

impl RawProjection for ConicConformal {
    fn forward(&self, lambda: f64, phi: f64) -> Option<(f64, f64)> {
        // The pole on the cone's apex side is a point; the other is at infinity.
        let phi = if self.f > 0.0 {
            phi.max(-FRAC_PI_2 + EPSILON)
        } else {
            phi.min(FRAC_PI_2 - EPSILON)
        };
        let rho = self.f / tan_half(phi).powf(self.n);
        let theta = self.n * lambda;
        finite_pair(rho * theta.sin(), self.f - rho * theta.cos())
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let fy = self.f - y;
        let rho = sign(self.n) * (x * x + fy * fy).sqrt();
        let mut theta = x.atan2(fy.abs()) * sign(fy);
        if fy * self.n < 0.0 {
            theta -= PI * sign(x) * sign(fy);
        }
        let lambda = theta / self.n;
        if lambda.abs() > PI + 1e-9 {
            return None;
        }
        let phi = 2.0 * (self.f / rho).powf(1.0 / self.n).atan() - FRAC_PI_2;
        finite_pair(lambda, phi)
    }
}
