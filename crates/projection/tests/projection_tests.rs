//! Tests for configured map projections.

use anomaly_common::AnomalyError;
use projection::{MapProjection, ProjectionError, ProjectionKind, ProjectionSpec};
use test_utils::{assert_approx_eq, assert_coords_approx_eq};

fn spec(name: ProjectionKind) -> ProjectionSpec {
    ProjectionSpec {
        name,
        ..Default::default()
    }
}

// ============================================================================
// Forward / inverse
// ============================================================================

#[test]
fn test_roundtrip_all_kinds() {
    let points = [(-100.0, 45.0), (-120.0, 35.0), (-75.0, 40.0), (-150.0, 61.0)];
    for kind in [
        ProjectionKind::AzimuthalEqualArea,
        ProjectionKind::ConicConformal,
        ProjectionKind::Mercator,
    ] {
        let projection = MapProjection::new(&spec(kind), 960, 600).unwrap();
        for (lon, lat) in points {
            let (x, y) = projection
                .project(lon, lat)
                .unwrap_or_else(|| panic!("{:?} dropped ({}, {})", kind, lon, lat));
            let (lon2, lat2) = projection.invert(x, y).unwrap();
            assert_coords_approx_eq!((lon2, lat2), (lon, lat), 1e-6);
        }
    }
}

#[test]
fn test_north_is_up() {
    let projection = MapProjection::north_america(800, 600).unwrap();
    let (_, y_south) = projection.project(-100.0, 30.0).unwrap();
    let (_, y_north) = projection.project(-100.0, 60.0).unwrap();
    assert!(y_north < y_south);
}

#[test]
fn test_east_is_right() {
    let projection = MapProjection::north_america(800, 600).unwrap();
    let (x_west, _) = projection.project(-120.0, 45.0).unwrap();
    let (x_east, _) = projection.project(-80.0, 45.0).unwrap();
    assert!(x_east > x_west);
}

#[test]
fn test_explicit_scale_and_translate() {
    let projection = MapProjection::new(
        &ProjectionSpec {
            scale: Some(100.0),
            translate: Some([10.0, 20.0]),
            ..Default::default()
        },
        800,
        600,
    )
    .unwrap();
    assert_eq!(projection.scale(), 100.0);
    let (x, y) = projection.project(-100.0, 45.0).unwrap();
    assert_coords_approx_eq!((x, y), (10.0, 20.0), 1e-9);

    // The pole is 45° north of the center: chord length 2 sin(22.5°)
    let (_, y_pole) = projection.project(-100.0, 90.0).unwrap();
    assert_approx_eq!(20.0 - y_pole, 100.0 * (2.0 * (1.0 - (45f64).to_radians().cos())).sqrt(), 1e-6);
}

// ============================================================================
// Dropped points
// ============================================================================

#[test]
fn test_antipode_dropped_without_clip() {
    let projection = MapProjection::new(
        &ProjectionSpec {
            clip_angle: None,
            ..Default::default()
        },
        800,
        600,
    )
    .unwrap();
    assert!(projection.project(80.0, -45.0).is_none());
    assert!(projection.project(0.0, 0.0).is_some());
}

#[test]
fn test_beyond_clip_angle_dropped() {
    let projection = MapProjection::new(
        &ProjectionSpec {
            clip_angle: Some(30.0),
            ..Default::default()
        },
        800,
        600,
    )
    .unwrap();
    assert!(projection.project(-100.0, 80.0).is_none());
    assert!(projection.project(-100.0, 50.0).is_some());
}

#[test]
fn test_non_finite_input_dropped() {
    let projection = MapProjection::north_america(800, 600).unwrap();
    assert!(projection.project(f64::NAN, 45.0).is_none());
    assert!(projection.project(-100.0, f64::INFINITY).is_none());
}

#[test]
fn test_mercator_pole_dropped() {
    let projection = MapProjection::new(
        &ProjectionSpec {
            name: ProjectionKind::Mercator,
            rotate: [100.0, 0.0, 0.0],
            clip_angle: None,
            ..Default::default()
        },
        800,
        600,
    )
    .unwrap();
    assert!(projection.project(-100.0, 90.0).is_none());
    assert!(projection.project(-100.0, 89.0).is_some());
}

#[test]
fn test_invert_outside_clip_is_none() {
    let projection = MapProjection::new(
        &ProjectionSpec {
            clip_angle: Some(10.0),
            scale: Some(100.0),
            ..Default::default()
        },
        800,
        600,
    )
    .unwrap();
    // 1.2 unit lengths from the center is ~74° away
    assert!(projection.invert(400.0 + 120.0, 300.0).is_none());
    assert!(projection.invert(400.0 + 5.0, 300.0).is_some());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_conic_symmetric_parallels_fall_back_to_mercator() {
    let projection = MapProjection::new(
        &ProjectionSpec {
            name: ProjectionKind::ConicConformal,
            parallels: [-30.0, 30.0],
            rotate: [100.0, 0.0, 0.0],
            clip_angle: None,
            ..Default::default()
        },
        800,
        600,
    )
    .unwrap();
    // Mercator keeps the equator on the translate row
    let (_, y) = projection.project(-120.0, 0.0).unwrap();
    assert_approx_eq!(y, 300.0, 1e-9);
}

#[test]
fn test_error_converts_to_config_error() {
    let err: AnomalyError = ProjectionError::InvalidScale(-1.0).into();
    assert!(matches!(err, AnomalyError::InvalidConfig(_)));
    assert!(err.is_configuration());
}
