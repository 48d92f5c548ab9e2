//! Test helpers shared across the anomaly map crates.
//!
//! - [`generators`]: synthetic grids (ramps, constants, gaps, global axes)
//! - [`fixtures`]: the three-point scenario, named regions and canned
//!   service bodies
//! - [`paths`]: workspace paths and scratch directories
//!
//! Grids are plain vectors and responses are JSON strings, so any crate can
//! depend on this one from `[dev-dependencies]` without a cycle.

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Assert two numbers agree within `epsilon` (default `1e-9`).
///
/// NaN never compares equal, so a NaN on either side fails.
///
/// ```ignore
/// assert_approx_eq!(point.normalized, 0.5);
/// assert_approx_eq!(x, 400.0, 1e-6);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr) => {
        $crate::assert_approx_eq!($left, $right, 1e-9)
    };
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "assertion failed: {} ≈ {}\n  left: {:?}\n right: {:?}\n  diff: {:?} (epsilon {:?})",
                stringify!($left),
                stringify!($right),
                left, right, diff, epsilon
            );
        }
    }};
}

/// [`assert_approx_eq!`] applied to both halves of an `(x, y)` pair.
#[macro_export]
macro_rules! assert_coords_approx_eq {
    (($x1:expr, $y1:expr), ($x2:expr, $y2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($x1, $x2, $epsilon);
        $crate::assert_approx_eq!($y1, $y2, $epsilon);
    }};
}
