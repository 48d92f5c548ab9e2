//! Grid-to-screen projection and classification.
//!
//! The projector turns a temperature grid plus its statistics into drawable
//! points (or a raster) on a `width × height` canvas. Screen coordinates
//! have their origin at the top-left corner with `y` growing downwards.

use anomaly_common::{
    normalize_longitude, validate_shape, AnomalyResult, Color, RegionOfInterest, Statistics,
    TemperatureGrid,
};
use metrics::counter;
use projection::MapProjection;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{MappingConfig, ProjectorConfig, RenderMode};
use crate::raster::{rasterize, Raster};

/// One valid grid cell placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawablePoint {
    pub x: f64,
    pub y: f64,
    pub color: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    pub source_lat: f64,
    /// Longitude after wraparound
    pub source_lon: f64,
    /// Anomaly in °C
    pub value: f64,
    /// Position within the statistics range, clamped to [0, 1]
    pub normalized: f64,
    pub bucket: usize,
}

/// Result of one projector run.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionOutput {
    /// Points in row-major grid order
    Points(Vec<DrawablePoint>),
    Raster(Raster),
}

impl ProjectionOutput {
    pub fn points(&self) -> Option<&[DrawablePoint]> {
        match self {
            ProjectionOutput::Points(points) => Some(points),
            ProjectionOutput::Raster(_) => None,
        }
    }

    pub fn raster(&self) -> Option<&Raster> {
        match self {
            ProjectionOutput::Raster(raster) => Some(raster),
            ProjectionOutput::Points(_) => None,
        }
    }
}

/// Classification of one anomaly value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classified {
    pub normalized: f64,
    pub bucket: usize,
    pub color: Color,
    pub size: Option<f64>,
}

#[derive(Debug)]
enum ScreenMapping {
    Linear,
    Projected(MapProjection),
}

/// Maps grid cells to screen positions and colors.
#[derive(Debug)]
pub struct AnomalyProjector {
    config: ProjectorConfig,
    mapping: ScreenMapping,
}

impl AnomalyProjector {
    /// Validate the configuration and build the screen mapping.
    pub fn new(config: ProjectorConfig) -> AnomalyResult<Self> {
        config.validate()?;
        let mapping = match &config.mapping {
            MappingConfig::Linear => ScreenMapping::Linear,
            MappingConfig::Projection(spec) => {
                ScreenMapping::Projected(MapProjection::new(spec, config.width, config.height)?)
            }
        };
        Ok(Self { config, mapping })
    }

    pub fn config(&self) -> &ProjectorConfig {
        &self.config
    }

    pub fn region(&self) -> &RegionOfInterest {
        &self.config.region
    }

    /// Run the configured mode.
    pub fn project(
        &self,
        grid: &TemperatureGrid,
        stats: &Statistics,
    ) -> AnomalyResult<ProjectionOutput> {
        match self.config.mode {
            RenderMode::Points => Ok(ProjectionOutput::Points(self.project_points(grid, stats)?)),
            RenderMode::Raster => Ok(ProjectionOutput::Raster(self.rasterize(grid, stats)?)),
        }
    }

    /// Place every valid cell that lands on the canvas.
    ///
    /// Cells with no data, outside the region, or without a screen position
    /// are skipped. An empty result is not an error.
    pub fn project_points(
        &self,
        grid: &TemperatureGrid,
        stats: &Statistics,
    ) -> AnomalyResult<Vec<DrawablePoint>> {
        validate_shape(grid)?;
        stats.validate()?;

        let mut points = Vec::new();
        let mut skipped = 0u64;

        for cell in grid.cells(self.config.stride) {
            let lon = self.wrap(cell.lon);
            let Some((x, y)) = self.to_screen(cell.lat, lon) else {
                skipped += 1;
                continue;
            };
            let classified = self.classify(cell.value, stats);
            points.push(DrawablePoint {
                x,
                y,
                color: classified.color,
                size: classified.size,
                source_lat: cell.lat,
                source_lon: lon,
                value: cell.value,
                normalized: classified.normalized,
                bucket: classified.bucket,
            });
        }

        counter!("anomaly_points_emitted_total").increment(points.len() as u64);
        counter!("anomaly_cells_skipped_total").increment(skipped);
        debug!(
            emitted = points.len(),
            skipped,
            stride = self.config.stride,
            degenerate = stats.is_degenerate(),
            "Projected anomaly grid"
        );

        Ok(points)
    }

    /// Nearest-neighbor raster of the grid over the canvas.
    pub fn rasterize(&self, grid: &TemperatureGrid, stats: &Statistics) -> AnomalyResult<Raster> {
        validate_shape(grid)?;
        stats.validate()?;
        let raster = rasterize(self, grid, stats);
        debug!(
            width = raster.width(),
            height = raster.height(),
            filled = raster.filled_count(),
            "Rasterized anomaly grid"
        );
        Ok(raster)
    }

    /// Classify a value against the statistics and threshold table.
    ///
    /// A degenerate range puts every value in the neutral bucket with a
    /// normalized position of 0.5.
    pub fn classify(&self, value: f64, stats: &Statistics) -> Classified {
        let table = &self.config.thresholds;
        let normalized = stats.normalize(value).map(|n| n.clamp(0.0, 1.0));
        let bucket = table.classify(normalized);
        let normalized = normalized.unwrap_or(0.5);

        let (color, size) = match table.bucket(bucket) {
            Some(b) => (b.color, self.config.size_rule.size_for(b, normalized)),
            None => (self.config.background, None),
        };

        Classified {
            normalized,
            bucket,
            color,
            size,
        }
    }

    pub(crate) fn wrap(&self, lon: f64) -> f64 {
        if self.config.normalize_longitudes {
            normalize_longitude(lon)
        } else {
            lon
        }
    }

    /// Screen position of `(lat, lon)`, or `None` if it cannot be placed.
    ///
    /// The longitude is used as given; apply wraparound first.
    pub fn to_screen(&self, lat: f64, lon: f64) -> Option<(f64, f64)> {
        let region = &self.config.region;
        let width = self.config.width as f64;
        let height = self.config.height as f64;

        let (x, y) = match &self.mapping {
            ScreenMapping::Linear => {
                if !region.contains(lat, lon) {
                    return None;
                }
                (
                    (lon - region.min_lon) / region.lon_span() * width,
                    (region.max_lat - lat) / region.lat_span() * height,
                )
            }
            ScreenMapping::Projected(projection) => {
                if self.config.clip_to_region && !region.contains(lat, lon) {
                    return None;
                }
                projection.project(lon, lat)?
            }
        };

        if x.is_finite() && y.is_finite() && (0.0..=width).contains(&x) && (0.0..=height).contains(&y)
        {
            Some((x, y))
        } else {
            None
        }
    }

    /// Geographic position `(lat, lon)` under a screen point.
    ///
    /// Points the mapping cannot invert, and points outside the region when
    /// the region applies, give `None`.
    pub fn to_geo(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let region = &self.config.region;
        let (lat, lon) = match &self.mapping {
            ScreenMapping::Linear => (
                region.max_lat - y / self.config.height as f64 * region.lat_span(),
                region.min_lon + x / self.config.width as f64 * region.lon_span(),
            ),
            ScreenMapping::Projected(projection) => {
                let (lon, lat) = projection.invert(x, y)?;
                if self.config.clip_to_region && !region.contains(lat, lon) {
                    return None;
                }
                (lat, lon)
            }
        };
        Some((lat, lon))
    }
}
