//! Temperature anomaly grids and the normalizer that guards them.
//!
//! Grids arrive as three parallel pieces: a latitude axis, a longitude axis and
//! a row-major matrix of optional values (`values[i][j]` sits at
//! `(lats[i], lons[j])`). Nothing here mutates a grid once it has been
//! received; the helpers only inspect it.

use serde::{Deserialize, Serialize};

use crate::error::{AnomalyError, AnomalyResult, ShapeError};

/// Wrap a longitude expressed in the 0–360 convention into -180–180.
///
/// Values at or below 180 are returned unchanged, so the function is
/// idempotent.
pub fn normalize_longitude(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - 360.0
    } else {
        lon
    }
}

/// Check whether `values[i][j]` holds an observation.
///
/// Out-of-range indices, `null` cells and NaN all count as "no data".
pub fn is_valid_cell(values: &[Vec<Option<f64>>], i: usize, j: usize) -> bool {
    matches!(
        values.get(i).and_then(|row| row.get(j)),
        Some(Some(v)) if !v.is_nan()
    )
}

/// Verify the grid's matrix agrees with its axes.
pub fn validate_shape(grid: &TemperatureGrid) -> Result<(), ShapeError> {
    if grid.lats.is_empty() {
        return Err(ShapeError::EmptyLatitudes);
    }
    if grid.lons.is_empty() {
        return Err(ShapeError::EmptyLongitudes);
    }
    if grid.values.len() != grid.lats.len() {
        return Err(ShapeError::RowCountMismatch {
            expected: grid.lats.len(),
            actual: grid.values.len(),
        });
    }
    for (row, values) in grid.values.iter().enumerate() {
        if values.len() != grid.lons.len() {
            return Err(ShapeError::RowLengthMismatch {
                row,
                expected: grid.lons.len(),
                actual: values.len(),
            });
        }
    }
    Ok(())
}

/// One forecast snapshot of temperature anomalies (°C).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureGrid {
    /// Latitudes in degrees, one per row (may be descending)
    pub lats: Vec<f64>,
    /// Longitudes in degrees, one per column (0–360 or -180–180)
    pub lons: Vec<f64>,
    /// Row-major anomaly values; `None` marks a cell without data
    pub values: Vec<Vec<Option<f64>>>,
}

impl TemperatureGrid {
    /// Create a grid without checking its shape.
    pub fn new(lats: Vec<f64>, lons: Vec<f64>, values: Vec<Vec<Option<f64>>>) -> Self {
        Self { lats, lons, values }
    }

    /// Create a grid, rejecting it if the matrix disagrees with the axes.
    pub fn try_new(
        lats: Vec<f64>,
        lons: Vec<f64>,
        values: Vec<Vec<Option<f64>>>,
    ) -> AnomalyResult<Self> {
        let grid = Self::new(lats, lons, values);
        validate_shape(&grid)?;
        Ok(grid)
    }

    /// Number of rows (latitudes).
    pub fn height(&self) -> usize {
        self.lats.len()
    }

    /// Number of columns (longitudes).
    pub fn width(&self) -> usize {
        self.lons.len()
    }

    /// Value at `[i][j]` if that cell holds valid data.
    pub fn value(&self, i: usize, j: usize) -> Option<f64> {
        if is_valid_cell(&self.values, i, j) {
            self.values[i][j]
        } else {
            None
        }
    }

    /// Number of cells holding valid data.
    pub fn valid_count(&self) -> usize {
        self.cells(1).count()
    }

    /// Iterate valid cells in row-major order, visiting every `stride`-th row
    /// and column.
    ///
    /// A stride of zero is treated as one. Longitudes are reported as stored;
    /// wraparound is applied by the caller.
    pub fn cells(&self, stride: usize) -> impl Iterator<Item = GridCell> + '_ {
        let stride = stride.max(1);
        (0..self.height()).step_by(stride).flat_map(move |i| {
            (0..self.width()).step_by(stride).filter_map(move |j| {
                self.value(i, j).map(|value| GridCell {
                    i,
                    j,
                    lat: self.lats[i],
                    lon: self.lons[j],
                    value,
                })
            })
        })
    }
}

/// A valid grid cell with its coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub i: usize,
    pub j: usize,
    pub lat: f64,
    pub lon: f64,
    pub value: f64,
}

/// Summary statistics accompanying a grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub min_anomaly: f64,
    pub max_anomaly: f64,
    pub mean_anomaly: f64,
}

impl Statistics {
    pub fn new(min_anomaly: f64, max_anomaly: f64, mean_anomaly: f64) -> Self {
        Self {
            min_anomaly,
            max_anomaly,
            mean_anomaly,
        }
    }

    /// Compute NaN-aware statistics over the valid cells of a grid.
    pub fn from_grid(grid: &TemperatureGrid) -> AnomalyResult<Self> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut count = 0usize;

        for cell in grid.cells(1) {
            min = min.min(cell.value);
            max = max.max(cell.value);
            sum += cell.value;
            count += 1;
        }

        if count == 0 {
            return Err(AnomalyError::NoValidCells);
        }

        // Summation error can push the mean a hair outside [min, max].
        let mean = (sum / count as f64).clamp(min, max);
        Ok(Self::new(min, max, mean))
    }

    /// Reject statistics the projector cannot use.
    pub fn validate(&self) -> AnomalyResult<()> {
        if !self.min_anomaly.is_finite()
            || !self.max_anomaly.is_finite()
            || !self.mean_anomaly.is_finite()
        {
            return Err(AnomalyError::InvalidStatistics(format!(
                "non-finite statistics: min={}, max={}, mean={}",
                self.min_anomaly, self.max_anomaly, self.mean_anomaly
            )));
        }
        if self.min_anomaly > self.max_anomaly {
            return Err(AnomalyError::InvalidStatistics(format!(
                "min_anomaly ({}) is greater than max_anomaly ({})",
                self.min_anomaly, self.max_anomaly
            )));
        }
        Ok(())
    }

    /// Width of the anomaly range.
    pub fn range(&self) -> f64 {
        self.max_anomaly - self.min_anomaly
    }

    /// True when every valid cell shares a single value.
    pub fn is_degenerate(&self) -> bool {
        self.max_anomaly == self.min_anomaly
    }

    /// Position of `value` within `[min_anomaly, max_anomaly]`.
    ///
    /// Returns `None` for a degenerate range instead of dividing by zero. The
    /// result is not clamped; values outside the range fall outside `[0, 1]`.
    pub fn normalize(&self, value: f64) -> Option<f64> {
        if self.is_degenerate() {
            None
        } else {
            Some((value - self.min_anomaly) / self.range())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grid() -> TemperatureGrid {
        TemperatureGrid::new(
            vec![50.0, 40.0],
            vec![-100.0, -90.0],
            vec![vec![Some(2.0), Some(-3.0)], vec![None, Some(5.0)]],
        )
    }

    #[test]
    fn test_normalize_longitude() {
        assert_eq!(normalize_longitude(270.0), -90.0);
        assert_eq!(normalize_longitude(180.0), 180.0);
        assert_eq!(normalize_longitude(-75.0), -75.0);
        assert_eq!(normalize_longitude(359.75), -0.25);
    }

    #[test]
    fn test_is_valid_cell_bounds() {
        let values = vec![vec![Some(1.0), None], vec![Some(f64::NAN)]];
        assert!(is_valid_cell(&values, 0, 0));
        assert!(!is_valid_cell(&values, 0, 1));
        assert!(!is_valid_cell(&values, 1, 0));
        assert!(!is_valid_cell(&values, 1, 1));
        assert!(!is_valid_cell(&values, 5, 0));
    }

    #[test]
    fn test_cells_skip_missing() {
        let grid = sample_grid();
        let cells: Vec<_> = grid.cells(1).collect();
        assert_eq!(cells.len(), 3);
        assert_eq!((cells[2].i, cells[2].j), (1, 1));
        assert_eq!(cells[2].value, 5.0);
    }

    #[test]
    fn test_cells_stride() {
        let values = vec![vec![Some(1.0); 4]; 4];
        let grid = TemperatureGrid::new(vec![0.0; 4], vec![0.0; 4], values);
        assert_eq!(grid.cells(2).count(), 4);
        assert_eq!(grid.cells(0).count(), 16);
    }

    #[test]
    fn test_statistics_from_grid() {
        let stats = Statistics::from_grid(&sample_grid()).unwrap();
        assert_eq!(stats.min_anomaly, -3.0);
        assert_eq!(stats.max_anomaly, 5.0);
        assert!((stats.mean_anomaly - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_statistics_no_valid_cells() {
        let grid = TemperatureGrid::new(vec![1.0], vec![1.0], vec![vec![None]]);
        assert!(matches!(
            Statistics::from_grid(&grid),
            Err(AnomalyError::NoValidCells)
        ));
    }

    #[test]
    fn test_statistics_validate_inverted() {
        let stats = Statistics::new(5.0, -5.0, 0.0);
        assert!(matches!(
            stats.validate(),
            Err(AnomalyError::InvalidStatistics(_))
        ));
    }

    #[test]
    fn test_degenerate_normalize() {
        let stats = Statistics::new(3.0, 3.0, 3.0);
        assert!(stats.is_degenerate());
        assert_eq!(stats.normalize(3.0), None);
        assert!(stats.validate().is_ok());
    }
}
