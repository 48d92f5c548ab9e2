//! Wire format of `GET /api/v1/temperature/anomaly`.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AnomalyResult;
use crate::grid::{validate_shape, Statistics, TemperatureGrid};

/// Body returned by the anomaly service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyResponse {
    /// Provenance of the data (e.g. "GFS 0.25°" or "mock")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// True when the service substituted synthetic data
    #[serde(default)]
    pub mock_data: bool,

    /// ISO-8601 valid time of the snapshot
    pub valid_time: String,

    /// Model initialization time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_time: Option<String>,

    /// Lead time echoed back by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_hour: Option<u32>,

    /// Human-readable grid spacing (e.g. "0.25°")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,

    pub anomaly_data: TemperatureGrid,

    pub statistics: Statistics,
}

impl AnomalyResponse {
    /// Parse a response body.
    pub fn from_json(body: &str) -> AnomalyResult<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Check the grid shape and statistics before handing them to the projector.
    pub fn validate(&self) -> AnomalyResult<()> {
        validate_shape(&self.anomaly_data)?;
        self.statistics.validate()
    }

    /// Valid time as UTC, if it parses.
    pub fn valid_time_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.valid_time)
    }

    /// Run time as UTC, if present and it parses.
    pub fn run_time_utc(&self) -> Option<DateTime<Utc>> {
        self.run_time.as_deref().and_then(parse_timestamp)
    }
}

/// Parse an RFC 3339 timestamp, or a naive ISO-8601 one taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}
