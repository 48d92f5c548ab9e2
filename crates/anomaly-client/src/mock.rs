//! Offline synthetic anomaly field.
//!
//! Produces the same demo field as the anomaly service's mock mode: a 1°
//! global grid with a smooth large-scale pattern, three Gaussian features
//! over North America, and unit Gaussian noise. The noise is seeded, so a
//! given seed always yields the same grid.

use std::time::Duration;

use anomaly_common::{AnomalyResponse, AnomalyResult, ForecastHour, Statistics, TemperatureGrid};
use async_trait::async_trait;
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use tracing::debug;

use crate::source::AnomalySource;

/// (amplitude, center lat, center lon, spread) of each regional feature.
const SPOTS: [(f64, f64, f64, f64); 3] = [
    (5.0, 45.0, -100.0, 500.0),
    (-3.0, 55.0, -110.0, 400.0),
    (4.0, 35.0, -95.0, 600.0),
];

/// Synthetic data source for demos and tests.
#[derive(Debug, Clone)]
pub struct MockAnomalySource {
    seed: u64,
    run_time: Option<DateTime<Utc>>,
    delay: Option<Duration>,
}

impl MockAnomalySource {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            run_time: None,
            delay: None,
        }
    }

    /// Pin the model run time instead of using the current hour.
    pub fn with_run_time(mut self, run_time: DateTime<Utc>) -> Self {
        self.run_time = Some(run_time);
        self
    }

    /// Sleep before answering, to imitate network latency.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Build the snapshot for `hour` without waiting.
    pub fn generate(&self, hour: ForecastHour) -> AnomalyResult<AnomalyResponse> {
        let grid = synthetic_grid(self.seed);
        let statistics = Statistics::from_grid(&grid)?;

        let run_time = match self.run_time {
            Some(t) => t,
            None => current_run_time(),
        };
        let valid_time = run_time + TimeDelta::hours(i64::from(hour.hours()));

        debug!(
            seed = self.seed,
            forecast_hour = hour.hours(),
            min = statistics.min_anomaly,
            max = statistics.max_anomaly,
            "Generated synthetic anomaly field"
        );

        Ok(AnomalyResponse {
            source: Some("mock".to_string()),
            mock_data: true,
            valid_time: format_naive(valid_time),
            run_time: Some(format_naive(run_time)),
            forecast_hour: Some(hour.hours()),
            resolution: Some("1.0°".to_string()),
            anomaly_data: grid,
            statistics,
        })
    }
}

impl Default for MockAnomalySource {
    fn default() -> Self {
        Self::new(42)
    }
}

#[async_trait]
impl AnomalySource for MockAnomalySource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch(&self, hour: ForecastHour) -> AnomalyResult<AnomalyResponse> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.generate(hour)
    }
}

/// The 181×360 synthetic grid for a seed.
pub fn synthetic_grid(seed: u64) -> TemperatureGrid {
    let lats: Vec<f64> = (0..181).map(|i| 90.0 - i as f64).collect();
    let lons: Vec<f64> = (0..360).map(|j| -180.0 + j as f64).collect();
    let mut rng = StdRng::seed_from_u64(seed);

    let values = lats
        .iter()
        .map(|&lat| {
            lons.iter()
                .map(|&lon| {
                    let noise: f64 = rng.sample(StandardNormal);
                    Some(pattern(lat, lon) + noise)
                })
                .collect()
        })
        .collect();

    TemperatureGrid::new(lats, lons, values)
}

/// Deterministic part of the field at a point.
pub fn pattern(lat: f64, lon: f64) -> f64 {
    let (phi, lambda) = (lat.to_radians(), lon.to_radians());
    let mut value = 3.0 * (2.0 * phi).sin() * (3.0 * lambda).cos()
        + 2.0 * (3.0 * phi).sin() * (2.0 * lambda).sin();

    for (amplitude, spot_lat, spot_lon, spread) in SPOTS {
        let d2 = (lat - spot_lat).powi(2) + (lon - spot_lon).powi(2);
        value += amplitude * (-d2 / spread).exp();
    }
    value
}

fn current_run_time() -> DateTime<Utc> {
    let now = Utc::now();
    now.duration_trunc(TimeDelta::hours(1)).unwrap_or(now)
}

fn format_naive(t: DateTime<Utc>) -> String {
    t.naive_utc().format("%Y-%m-%dT%H:%M:%S").to_string()
}
