//! Spherical Mercator.

use std::f64::consts::FRAC_PI_2;

use crate::{finite_pair, RawProjection};

const POLE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Mercator;

impl RawProjection for Mercator {
    fn forward(&self, lambda: f64, phi: f64) -> Option<(f64, f64)> {
        // The poles sit at infinity
        if FRAC_PI_2 - phi.abs() < POLE_EPSILON {
            return None;
        }
        finite_pair(lambda, ((FRAC_PI_2 + phi) / 2.0).tan().ln())
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        finite_pair(x, 2.0 * y.exp().atan() - FRAC_PI_2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_coords_approx_eq;

    #[test]
    fn test_equator_is_zero() {
        let (x, y) = Mercator.forward(0.5, 0.0).unwrap();
        assert_coords_approx_eq!((x, y), (0.5, 0.0), 1e-12);
    }

    #[test]
    fn test_poles_undefined() {
        assert!(Mercator.forward(0.0, FRAC_PI_2).is_none());
        assert!(Mercator.forward(0.0, -FRAC_PI_2).is_none());
    }

    #[test]
    fn test_roundtrip() {
        let (x, y) = Mercator.forward(-1.2, 1.1).unwrap();
        let (l, p) = Mercator.inverse(x, y).unwrap();
        assert!((l + 1.2).abs() < 1e-12);
        assert!((p - 1.1).abs() < 1e-12);
    }
}
