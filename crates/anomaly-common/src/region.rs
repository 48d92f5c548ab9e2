//! Geographic region of interest used to clip rendering.

use serde::{Deserialize, Serialize};

use crate::error::{AnomalyError, AnomalyResult};

/// A latitude/longitude clip window in degrees.
///
/// Containment is inclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionOfInterest {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl RegionOfInterest {
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// North America: 15°N–85°N, 170°W–50°W.
    pub fn north_america() -> Self {
        Self::new(15.0, 85.0, -170.0, -50.0)
    }

    /// Parse "min_lat,max_lat,min_lon,max_lon".
    pub fn from_csv(s: &str) -> AnomalyResult<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(AnomalyError::invalid_region(format!(
                "expected 'min_lat,max_lat,min_lon,max_lon', got '{}'",
                s
            )));
        }

        let mut numbers = [0.0f64; 4];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| AnomalyError::invalid_region(format!("invalid number '{}'", part)))?;
        }

        let region = Self::new(numbers[0], numbers[1], numbers[2], numbers[3]);
        region.validate()?;
        Ok(region)
    }

    /// Reject inverted, empty or non-finite windows.
    pub fn validate(&self) -> AnomalyResult<()> {
        let all_finite = [self.min_lat, self.max_lat, self.min_lon, self.max_lon]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(AnomalyError::invalid_region("bounds must be finite"));
        }
        if self.min_lat >= self.max_lat {
            return Err(AnomalyError::invalid_region(format!(
                "min_lat ({}) must be less than max_lat ({})",
                self.min_lat, self.max_lat
            )));
        }
        if self.min_lon >= self.max_lon {
            return Err(AnomalyError::invalid_region(format!(
                "min_lon ({}) must be less than max_lon ({})",
                self.min_lon, self.max_lon
            )));
        }
        Ok(())
    }

    /// Span in degrees of latitude.
    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Span in degrees of longitude.
    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Check if a point lies inside the window, edges included.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

impl Default for RegionOfInterest {
    fn default() -> Self {
        Self::north_america()
    }
}
