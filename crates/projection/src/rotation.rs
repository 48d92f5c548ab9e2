//! Three-axis sphere rotation.
//!
//! Rotation angles follow the usual `[lambda, phi, gamma]` convention: spin
//! about the polar axis, then tilt, then roll. Rotating by `[100, -45, 0]`
//! brings (100°W, 45°N) to the origin.

use std::f64::consts::PI;

/// Rotation of the sphere, stored as precomputed sines and cosines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    delta_lambda: f64,
    cos_delta_phi: f64,
    sin_delta_phi: f64,
    cos_delta_gamma: f64,
    sin_delta_gamma: f64,
    tilted: bool,
}

impl Rotation {
    /// Build a rotation from angles in degrees.
    pub fn from_degrees(angles: [f64; 3]) -> Self {
        let [lambda, phi, gamma] = angles.map(f64::to_radians);
        Self {
            delta_lambda: wrap_longitude(lambda),
            cos_delta_phi: phi.cos(),
            sin_delta_phi: phi.sin(),
            cos_delta_gamma: gamma.cos(),
            sin_delta_gamma: gamma.sin(),
            tilted: phi != 0.0 || gamma != 0.0,
        }
    }

    pub fn identity() -> Self {
        Self::from_degrees([0.0, 0.0, 0.0])
    }

    /// Rotate a point given in radians.
    pub fn forward(&self, lambda: f64, phi: f64) -> (f64, f64) {
        let lambda = wrap_longitude(lambda + self.delta_lambda);
        if !self.tilted {
            return (lambda, phi);
        }

        let cos_phi = phi.cos();
        let x = lambda.cos() * cos_phi;
        let y = lambda.sin() * cos_phi;
        let z = phi.sin();
        let k = z * self.cos_delta_phi + x * self.sin_delta_phi;

        (
            (y * self.cos_delta_gamma - k * self.sin_delta_gamma)
                .atan2(x * self.cos_delta_phi - z * self.sin_delta_phi),
            asin_clamped(k * self.cos_delta_gamma + y * self.sin_delta_gamma),
        )
    }

    /// Undo [`Rotation::forward`].
    pub fn inverse(&self, lambda: f64, phi: f64) -> (f64, f64) {
        let (lambda, phi) = if self.tilted {
            let cos_phi = phi.cos();
            let x = lambda.cos() * cos_phi;
            let y = lambda.sin() * cos_phi;
            let z = phi.sin();
            let k = z * self.cos_delta_gamma - y * self.sin_delta_gamma;
            (
                (y * self.cos_delta_gamma + z * self.sin_delta_gamma)
                    .atan2(x * self.cos_delta_phi + k * self.sin_delta_phi),
                asin_clamped(k * self.cos_delta_phi - x * self.sin_delta_phi),
            )
        } else {
            (lambda, phi)
        };
        (wrap_longitude(lambda - self.delta_lambda), phi)
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}

/// Wrap an angle in radians into [-π, π].
fn wrap_longitude(lambda: f64) -> f64 {
    if lambda > PI {
        lambda - 2.0 * PI
    } else if lambda < -PI {
        lambda + 2.0 * PI
    } else {
        lambda
    }
}

// Rounding can push |k| a hair past 1.
fn asin_clamped(v: f64) -> f64 {
    v.clamp(-1.0, 1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_center_goes_to_origin() {
        let rotation = Rotation::from_degrees([100.0, -45.0, 0.0]);
        let (lambda, phi) = rotation.forward((-100f64).to_radians(), 45f64.to_radians());
        assert!(lambda.abs() < EPS);
        assert!(phi.abs() < EPS);
    }

    #[test]
    fn test_inverse_undoes_forward() {
        let rotation = Rotation::from_degrees([100.0, -45.0, 10.0]);
        for (lon, lat) in [(-120.0, 30.0), (-60.0, 70.0), (20.0, -10.0)] {
            let (l, p) = rotation.forward(f64::to_radians(lon), f64::to_radians(lat));
            let (l2, p2) = rotation.inverse(l, p);
            assert!((l2.to_degrees() - lon).abs() < 1e-9, "lon {} -> {}", lon, l2.to_degrees());
            assert!((p2.to_degrees() - lat).abs() < 1e-9);
        }
    }

    #[test]
    fn test_lambda_only_wraps() {
        let rotation = Rotation::from_degrees([100.0, 0.0, 0.0]);
        let (lambda, phi) = rotation.forward(170f64.to_radians(), 0.3);
        assert!((lambda.to_degrees() + 90.0).abs() < 1e-9);
        assert_eq!(phi, 0.3);
    }
}
