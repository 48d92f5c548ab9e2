//! Projector configuration.
//!
//! Every field has a default, so an empty YAML document yields a working
//! North American points map.

use std::path::Path;

use anomaly_common::{AnomalyError, AnomalyResult, Color, RegionOfInterest, SizeRule, ThresholdTable};
use projection::ProjectionSpec;
use serde::{Deserialize, Serialize};

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

/// How grid coordinates reach the screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MappingConfig {
    /// Equirectangular stretch of the region onto the canvas
    #[default]
    Linear,

    /// A true map projection
    Projection(ProjectionSpec),
}

/// What the projector produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// One drawable point per valid cell
    #[default]
    Points,

    /// Dense nearest-neighbor pixel grid
    Raster,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectorConfig {
    #[serde(default)]
    pub region: RegionOfInterest,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default)]
    pub mapping: MappingConfig,

    #[serde(default)]
    pub thresholds: ThresholdTable,

    #[serde(default)]
    pub size_rule: SizeRule,

    #[serde(default)]
    pub mode: RenderMode,

    /// Subsampling step, whose unit depends on the mode.
    ///
    /// Points mode visits every k-th grid row and column. Raster mode keeps
    /// every grid cell in its index and samples one pixel per k×k block of
    /// the canvas instead.
    #[serde(default = "default_stride")]
    pub stride: usize,

    /// Raster color where there is no data
    #[serde(default = "Color::transparent")]
    pub background: Color,

    /// Raster pixels farther than this from any valid cell get the background
    #[serde(default)]
    pub max_distance_deg: Option<f64>,

    /// Wrap 0–360 longitudes into -180–180 before mapping
    #[serde(default = "default_true")]
    pub normalize_longitudes: bool,

    /// Drop cells outside the region before projecting (projection mapping only)
    #[serde(default = "default_true")]
    pub clip_to_region: bool,
}

fn default_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

fn default_stride() -> usize {
    1
}

fn default_true() -> bool {
    true
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            region: RegionOfInterest::default(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            mapping: MappingConfig::default(),
            thresholds: ThresholdTable::default(),
            size_rule: SizeRule::default(),
            mode: RenderMode::default(),
            stride: 1,
            background: Color::transparent(),
            max_distance_deg: None,
            normalize_longitudes: true,
            clip_to_region: true,
        }
    }
}

impl ProjectorConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> AnomalyResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> AnomalyResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter the projector depends on.
    pub fn validate(&self) -> AnomalyResult<()> {
        self.region.validate()?;

        if self.width == 0 || self.height == 0 {
            return Err(AnomalyError::invalid_config(format!(
                "canvas must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        let longest_side = self.width.max(self.height) as usize;
        if self.stride == 0 || self.stride > longest_side {
            return Err(AnomalyError::invalid_config(format!(
                "stride must be between 1 and {}, got {}",
                longest_side, self.stride
            )));
        }

        self.thresholds.validate()?;
        self.size_rule.validate()?;

        let diagonal = (self.width as f64).hypot(self.height as f64);
        let largest_size = match &self.size_rule {
            SizeRule::Bucket => self
                .thresholds
                .buckets
                .iter()
                .filter_map(|b| b.size)
                .fold(0.0, f64::max),
            SizeRule::Linear { max, .. } => *max,
            SizeRule::None => 0.0,
        };
        if !(largest_size <= diagonal) {
            return Err(AnomalyError::invalid_config(format!(
                "point size {} exceeds the canvas diagonal {:.1}",
                largest_size, diagonal
            )));
        }

        if let Some(distance) = self.max_distance_deg {
            if !distance.is_finite() || distance <= 0.0 {
                return Err(AnomalyError::invalid_config(format!(
                    "max_distance_deg must be positive, got {}",
                    distance
                )));
            }
        }

        if let MappingConfig::Projection(spec) = &self.mapping {
            if !self.normalize_longitudes {
                return Err(AnomalyError::invalid_config(
                    "projection mapping requires normalize_longitudes",
                ));
            }
            spec.validate()?;
        }

        Ok(())
    }
}
