//! Synthetic anomaly grids with predictable values.
//!
//! Grids are returned as `(lats, lons, values)` so callers can wrap them in
//! whatever grid type they are testing.

/// Latitude axis, longitude axis and row-major values.
pub type RawGrid = (Vec<f64>, Vec<f64>, Vec<Vec<Option<f64>>>);

/// Evenly spaced axis from `start` towards `end` inclusive, `count` points.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count).map(|k| start + step * k as f64).collect()
        }
    }
}

/// Global axes at `step` degrees: latitudes 90 → -90, longitudes -180 → 180-step.
pub fn create_global_axes(step: f64) -> (Vec<f64>, Vec<f64>) {
    let rows = (180.0 / step).round() as usize + 1;
    let cols = (360.0 / step).round() as usize;
    (
        linspace(90.0, -90.0, rows),
        linspace(-180.0, 180.0 - step, cols),
    )
}

/// Global axes in the 0–360 longitude convention used by raw GFS output.
pub fn create_global_axes_0_360(step: f64) -> (Vec<f64>, Vec<f64>) {
    let rows = (180.0 / step).round() as usize + 1;
    let cols = (360.0 / step).round() as usize;
    (linspace(90.0, -90.0, rows), linspace(0.0, 360.0 - step, cols))
}

/// A west-to-east ramp from -5 °C to +5 °C over the given axes.
///
/// Every row is identical, so the value depends only on the column.
pub fn create_ramp_grid(lats: Vec<f64>, lons: Vec<f64>) -> RawGrid {
    let cols = lons.len();
    let row: Vec<Option<f64>> = (0..cols)
        .map(|j| {
            let t = if cols > 1 {
                j as f64 / (cols - 1) as f64
            } else {
                0.5
            };
            Some(-5.0 + 10.0 * t)
        })
        .collect();
    let values = vec![row; lats.len()];
    (lats, lons, values)
}

/// A grid where each cell encodes its position: `i * 100 + j`.
pub fn create_indexed_grid(rows: usize, cols: usize) -> RawGrid {
    let lats = linspace(60.0, 20.0, rows);
    let lons = linspace(-130.0, -70.0, cols);
    let values = (0..rows)
        .map(|i| (0..cols).map(|j| Some((i * 100 + j) as f64)).collect())
        .collect();
    (lats, lons, values)
}

/// A grid with the same value in every cell.
pub fn create_constant_anomaly_grid(rows: usize, cols: usize, value: f64) -> RawGrid {
    let lats = linspace(60.0, 20.0, rows);
    let lons = linspace(-130.0, -70.0, cols);
    (lats, lons, vec![vec![Some(value); cols]; rows])
}

/// A grid with no data at all.
pub fn create_missing_grid(rows: usize, cols: usize) -> RawGrid {
    let lats = linspace(60.0, 20.0, rows);
    let lons = linspace(-130.0, -70.0, cols);
    (lats, lons, vec![vec![None; cols]; rows])
}

/// An indexed grid with `None` wherever `(i + j) % every == 0`.
pub fn create_sparse_grid(rows: usize, cols: usize, every: usize) -> RawGrid {
    let (lats, lons, mut values) = create_indexed_grid(rows, cols);
    let every = every.max(1);
    for (i, row) in values.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            if (i + j) % every == 0 {
                *cell = None;
            }
        }
    }
    (lats, lons, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_endpoints() {
        let axis = linspace(90.0, -90.0, 181);
        assert_eq!(axis.len(), 181);
        assert_eq!(axis[0], 90.0);
        assert!((axis[180] + 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_global_axes() {
        let (lats, lons) = create_global_axes(1.0);
        assert_eq!(lats.len(), 181);
        assert_eq!(lons.len(), 360);
        assert!((lons[359] - 179.0).abs() < 1e-9);
    }

    #[test]
    fn test_ramp_grid() {
        let (_, _, values) = create_ramp_grid(vec![0.0, 1.0], vec![0.0, 1.0, 2.0]);
        assert_eq!(values[0], vec![Some(-5.0), Some(0.0), Some(5.0)]);
        assert_eq!(values[1], values[0]);
    }

    #[test]
    fn test_sparse_grid() {
        let (_, _, values) = create_sparse_grid(3, 3, 2);
        assert_eq!(values[0][0], None);
        assert_eq!(values[0][1], Some(1.0));
        assert_eq!(values[1][1], None);
    }
}
