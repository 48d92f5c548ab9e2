//! Forecast lead times offered by the anomaly service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AnomalyError, AnomalyResult};

/// Lead times, in hours from model initialization, that the service publishes.
pub const SUPPORTED_FORECAST_HOURS: [u32; 12] = [0, 6, 12, 24, 48, 72, 96, 120, 144, 168, 240, 384];

/// A validated forecast lead time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ForecastHour(u32);

impl ForecastHour {
    /// The analysis (lead time zero).
    pub const ANALYSIS: ForecastHour = ForecastHour(0);

    pub fn new(hours: u32) -> AnomalyResult<Self> {
        if SUPPORTED_FORECAST_HOURS.contains(&hours) {
            Ok(Self(hours))
        } else {
            Err(AnomalyError::UnsupportedForecastHour(hours))
        }
    }

    pub fn hours(&self) -> u32 {
        self.0
    }

    /// Every supported lead time in ascending order.
    pub fn all() -> impl Iterator<Item = ForecastHour> {
        SUPPORTED_FORECAST_HOURS.iter().map(|&h| ForecastHour(h))
    }

    /// Short label such as "+24h" or "+10d".
    pub fn label(&self) -> String {
        match self.0 {
            0 => "analysis".to_string(),
            h if h >= 240 && h % 24 == 0 => format!("+{}d", h / 24),
            h => format!("+{}h", h),
        }
    }
}

impl Default for ForecastHour {
    fn default() -> Self {
        Self::ANALYSIS
    }
}

impl TryFrom<u32> for ForecastHour {
    type Error = AnomalyError;

    fn try_from(hours: u32) -> Result<Self, Self::Error> {
        Self::new(hours)
    }
}

impl From<ForecastHour> for u32 {
    fn from(hour: ForecastHour) -> Self {
        hour.0
    }
}

impl FromStr for ForecastHour {
    type Err = AnomalyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('+').trim_end_matches(['h', 'H']);
        let hours: u32 = trimmed
            .parse()
            .map_err(|_| AnomalyError::invalid_config(format!("invalid forecast hour '{}'", s)))?;
        Self::new(hours)
    }
}

impl fmt::Display for ForecastHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
