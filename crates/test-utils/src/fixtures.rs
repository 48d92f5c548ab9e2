//! Canned regions, scenarios and service payloads.

use serde_json::json;

/// Regions as `(min_lat, max_lat, min_lon, max_lon)`.
pub mod regions {
    /// North America, the dashboard's default window
    pub const NORTH_AMERICA: (f64, f64, f64, f64) = (15.0, 85.0, -170.0, -50.0);

    /// Contiguous United States
    pub const CONUS: (f64, f64, f64, f64) = (20.0, 55.0, -130.0, -60.0);

    /// Whole globe
    pub const GLOBAL: (f64, f64, f64, f64) = (-90.0, 90.0, -180.0, 180.0);

    /// Inverted latitude bounds
    pub const INVERTED: (f64, f64, f64, f64) = (50.0, 10.0, -100.0, -90.0);
}

/// The two-by-two grid used across the end-to-end tests.
///
/// ```text
///            -100    -90
///   50N  [    2.0,  -3.0 ]
///   40N  [   null,   5.0 ]
/// ```
pub mod scenario {
    pub const LATS: [f64; 2] = [50.0, 40.0];
    pub const LONS: [f64; 2] = [-100.0, -90.0];
    pub const MIN_ANOMALY: f64 = -3.0;
    pub const MAX_ANOMALY: f64 = 5.0;
    pub const MEAN_ANOMALY: f64 = 1.33;

    /// Row-major values; `[1][0]` has no data.
    pub fn values() -> Vec<Vec<Option<f64>>> {
        vec![vec![Some(2.0), Some(-3.0)], vec![None, Some(5.0)]]
    }
}

/// Build a service response body around the given grid.
pub fn anomaly_response_json(
    forecast_hour: u32,
    lats: &[f64],
    lons: &[f64],
    values: &[Vec<Option<f64>>],
    statistics: (f64, f64, f64),
) -> String {
    json!({
        "source": "GFS 0.25°",
        "mock_data": false,
        "run_time": "2024-01-15T12:00:00",
        "forecast_hour": forecast_hour,
        "valid_time": "2024-01-16T12:00:00",
        "resolution": "0.25°",
        "anomaly_data": {
            "lats": lats,
            "lons": lons,
            "values": values,
        },
        "statistics": {
            "min_anomaly": statistics.0,
            "max_anomaly": statistics.1,
            "mean_anomaly": statistics.2,
        }
    })
    .to_string()
}

/// The scenario grid wrapped as a service response.
pub fn scenario_response_json(forecast_hour: u32) -> String {
    anomaly_response_json(
        forecast_hour,
        &scenario::LATS,
        &scenario::LONS,
        &scenario::values(),
        (
            scenario::MIN_ANOMALY,
            scenario::MAX_ANOMALY,
            scenario::MEAN_ANOMALY,
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_json_has_null_cell() {
        let body = scenario_response_json(24);
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(parsed["anomaly_data"]["values"][1][0].is_null());
        assert_eq!(parsed["forecast_hour"], 24);
        assert_eq!(parsed["statistics"]["min_anomaly"], -3.0);
    }
}
