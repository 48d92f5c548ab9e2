//! Tests for grid validation, statistics and region handling.

use anomaly_common::{
    is_valid_cell, normalize_longitude, validate_shape, AnomalyError, AnomalyResponse,
    ForecastHour, RegionOfInterest, ShapeError, Statistics, TemperatureGrid, ThresholdTable,
};
use test_utils::fixtures::{regions, scenario, scenario_response_json};
use test_utils::{assert_approx_eq, create_global_axes_0_360, create_ramp_grid, create_sparse_grid};

fn grid_from(raw: test_utils::RawGrid) -> TemperatureGrid {
    let (lats, lons, values) = raw;
    TemperatureGrid::new(lats, lons, values)
}

// ============================================================================
// Longitude wraparound
// ============================================================================

#[test]
fn test_wraparound_maps_into_signed_range() {
    let (_, lons) = create_global_axes_0_360(0.25);
    for lon in lons {
        let wrapped = normalize_longitude(lon);
        assert!(
            (-180.0..=180.0).contains(&wrapped),
            "{} wrapped to {}",
            lon,
            wrapped
        );
    }
}

#[test]
fn test_wraparound_is_idempotent() {
    for lon in [-179.5, -0.25, 0.0, 90.0, 180.0, 180.25, 270.0, 359.75] {
        let once = normalize_longitude(lon);
        assert_eq!(normalize_longitude(once), once);
    }
}

// ============================================================================
// Cell validity and shape
// ============================================================================

#[test]
fn test_scenario_cell_validity() {
    let values = scenario::values();
    assert!(is_valid_cell(&values, 0, 0));
    assert!(is_valid_cell(&values, 0, 1));
    assert!(!is_valid_cell(&values, 1, 0));
    assert!(is_valid_cell(&values, 1, 1));
    // Out of range is "no data", not a panic
    assert!(!is_valid_cell(&values, 2, 0));
    assert!(!is_valid_cell(&values, 0, 2));
}

#[test]
fn test_shape_row_count_mismatch() {
    let grid = TemperatureGrid::new(
        vec![50.0, 40.0, 30.0],
        vec![-100.0, -90.0],
        scenario::values(),
    );
    assert_eq!(
        validate_shape(&grid),
        Err(ShapeError::RowCountMismatch {
            expected: 3,
            actual: 2
        })
    );
}

#[test]
fn test_shape_ragged_row() {
    let grid = TemperatureGrid::new(
        vec![50.0, 40.0],
        vec![-100.0, -90.0],
        vec![vec![Some(1.0), Some(2.0)], vec![Some(3.0)]],
    );
    assert!(matches!(
        validate_shape(&grid),
        Err(ShapeError::RowLengthMismatch { row: 1, .. })
    ));
}

#[test]
fn test_try_new_rejects_empty_axes() {
    let result = TemperatureGrid::try_new(vec![], vec![1.0], vec![]);
    assert!(matches!(
        result,
        Err(AnomalyError::Shape(ShapeError::EmptyLatitudes))
    ));
}

#[test]
fn test_sparse_grid_valid_count() {
    let grid = grid_from(create_sparse_grid(4, 4, 2));
    // Half of a 4x4 checkerboard is missing
    assert_eq!(grid.valid_count(), 8);
    assert!(grid.cells(1).all(|c| (c.i + c.j) % 2 == 1));
}

// ============================================================================
// Statistics
// ============================================================================

#[test]
fn test_statistics_match_scenario() {
    let grid = TemperatureGrid::new(
        scenario::LATS.to_vec(),
        scenario::LONS.to_vec(),
        scenario::values(),
    );
    let stats = Statistics::from_grid(&grid).unwrap();
    assert_eq!(stats.min_anomaly, scenario::MIN_ANOMALY);
    assert_eq!(stats.max_anomaly, scenario::MAX_ANOMALY);
    assert_approx_eq!(stats.mean_anomaly, scenario::MEAN_ANOMALY, 0.01);
}

#[test]
fn test_statistics_ramp_mean_is_centered() {
    let grid = grid_from(create_ramp_grid(vec![10.0, 0.0], vec![0.0, 1.0, 2.0, 3.0, 4.0]));
    let stats = Statistics::from_grid(&grid).unwrap();
    assert_approx_eq!(stats.min_anomaly, -5.0);
    assert_approx_eq!(stats.max_anomaly, 5.0);
    assert_approx_eq!(stats.mean_anomaly, 0.0);
}

#[test]
fn test_normalize_endpoints() {
    let stats = Statistics::new(-3.0, 5.0, 1.33);
    assert_eq!(stats.normalize(-3.0), Some(0.0));
    assert_eq!(stats.normalize(5.0), Some(1.0));
    assert_eq!(stats.normalize(2.0), Some(0.625));
}

#[test]
fn test_non_finite_statistics_rejected() {
    let stats = Statistics::new(f64::NAN, 1.0, 0.0);
    assert!(stats.validate().is_err());
    let stats = Statistics::new(0.0, f64::INFINITY, 0.0);
    assert!(stats.validate().is_err());
}

// ============================================================================
// Regions
// ============================================================================

#[test]
fn test_region_fixtures() {
    let (a, b, c, d) = regions::NORTH_AMERICA;
    assert_eq!(RegionOfInterest::new(a, b, c, d), RegionOfInterest::default());

    let (a, b, c, d) = regions::INVERTED;
    assert!(matches!(
        RegionOfInterest::new(a, b, c, d).validate(),
        Err(AnomalyError::InvalidRegion(_))
    ));
}

#[test]
fn test_region_from_csv_rejects_garbage() {
    assert!(RegionOfInterest::from_csv("10,20,30").is_err());
    assert!(RegionOfInterest::from_csv("10,abc,30,40").is_err());
    assert!(RegionOfInterest::from_csv("10,10,30,40").is_err());
}

// ============================================================================
// Responses
// ============================================================================

#[test]
fn test_response_parses_and_validates() {
    let response = AnomalyResponse::from_json(&scenario_response_json(48)).unwrap();
    response.validate().unwrap();
    assert_eq!(response.forecast_hour, Some(48));
    assert_eq!(response.anomaly_data.values[1][0], None);
    assert!(response.valid_time_utc().is_some());
    assert!(response.run_time_utc().is_some());
}

#[test]
fn test_response_missing_field_is_decode_error() {
    let result = AnomalyResponse::from_json(r#"{"valid_time": "2024-01-15T00:00:00"}"#);
    assert!(matches!(result, Err(AnomalyError::Decode(_))));
}

#[test]
fn test_forecast_hour_labels() {
    let labels: Vec<String> = ForecastHour::all().map(|h| h.label()).collect();
    assert_eq!(labels.first().map(String::as_str), Some("analysis"));
    assert_eq!(labels.last().map(String::as_str), Some("+16d"));
    assert!("+7h".parse::<ForecastHour>().is_err());
}

#[test]
fn test_default_table_covers_unit_interval() {
    let table = ThresholdTable::default();
    assert_eq!(table.bucket_index(0.0), 0);
    assert_eq!(table.bucket_index(1.0), table.len() - 1);
    assert_eq!(table.classify(None), 2);
}
