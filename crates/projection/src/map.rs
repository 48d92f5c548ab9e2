//! Configured projections: raw projection plus rotation, scale, translation
//! and clip angle.

use serde::{Deserialize, Serialize};

use crate::azimuthal_equal_area::AzimuthalEqualArea;
use crate::conic_conformal::conic_or_mercator;
use crate::error::{ProjectionError, ProjectionResult};
use crate::mercator::Mercator;
use crate::rotation::Rotation;
use crate::RawProjection;

/// Supported projection families.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    #[default]
    AzimuthalEqualArea,
    ConicConformal,
    Mercator,
}

impl ProjectionKind {
    /// Scale that fits the North American window on a canvas.
    fn default_scale(&self, width: u32, height: u32) -> f64 {
        let short = width.min(height) as f64;
        match self {
            ProjectionKind::AzimuthalEqualArea => short * 0.75,
            ProjectionKind::ConicConformal => short * 0.9,
            ProjectionKind::Mercator => width as f64 / std::f64::consts::TAU,
        }
    }
}

/// Serializable projection parameters.
///
/// `scale` and `translate` default to values derived from the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSpec {
    #[serde(default)]
    pub name: ProjectionKind,

    /// Rotation `[lambda, phi, gamma]` in degrees
    #[serde(default = "default_rotate")]
    pub rotate: [f64; 3],

    /// Pixels per unit-sphere length
    #[serde(default)]
    pub scale: Option<f64>,

    /// Pixel position of the rotated origin
    #[serde(default)]
    pub translate: Option<[f64; 2]>,

    /// Small-circle clip radius in degrees around the rotated origin
    #[serde(default = "default_clip_angle")]
    pub clip_angle: Option<f64>,

    /// Standard parallels for the conic projection
    #[serde(default = "default_parallels")]
    pub parallels: [f64; 2],
}

fn default_rotate() -> [f64; 3] {
    [100.0, -45.0, 0.0]
}

fn default_clip_angle() -> Option<f64> {
    Some(90.0)
}

fn default_parallels() -> [f64; 2] {
    [33.0, 45.0]
}

impl Default for ProjectionSpec {
    fn default() -> Self {
        Self {
            name: ProjectionKind::default(),
            rotate: default_rotate(),
            scale: None,
            translate: None,
            clip_angle: default_clip_angle(),
            parallels: default_parallels(),
        }
    }
}

impl ProjectionSpec {
    pub fn validate(&self) -> ProjectionResult<()> {
        if self.rotate.iter().any(|v| !v.is_finite()) {
            return Err(ProjectionError::NonFinite("rotate"));
        }
        if let Some(scale) = self.scale {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(ProjectionError::InvalidScale(scale));
            }
        }
        if let Some(translate) = self.translate {
            if translate.iter().any(|v| !v.is_finite()) {
                return Err(ProjectionError::NonFinite("translate"));
            }
        }
        if let Some(angle) = self.clip_angle {
            if !angle.is_finite() || angle <= 0.0 || angle > 180.0 {
                return Err(ProjectionError::InvalidClipAngle(angle));
            }
        }
        if self.name == ProjectionKind::ConicConformal {
            let [p1, p2] = self.parallels;
            if !p1.is_finite() || !p2.is_finite() || p1.abs() >= 90.0 || p2.abs() >= 90.0 {
                return Err(ProjectionError::InvalidParallels(p1, p2));
            }
        }
        Ok(())
    }
}

/// A projection placed on a canvas.
///
/// Maps `(lon, lat)` in degrees to `(x, y)` pixels with
/// `x = tx + k * px` and `y = ty - k * py`, where `(px, py)` is the raw
/// projection of the rotated point.
#[derive(Debug)]
pub struct MapProjection {
    kind: ProjectionKind,
    raw: Box<dyn RawProjection>,
    rotation: Rotation,
    scale: f64,
    translate: [f64; 2],
    clip_cos: Option<f64>,
}

impl MapProjection {
    /// Build a projection for a `width × height` canvas.
    pub fn new(spec: &ProjectionSpec, width: u32, height: u32) -> ProjectionResult<Self> {
        spec.validate()?;

        let scale = spec
            .scale
            .unwrap_or_else(|| spec.name.default_scale(width, height));
        if scale <= 0.0 {
            return Err(ProjectionError::InvalidScale(scale));
        }

        let raw: Box<dyn RawProjection> = match spec.name {
            ProjectionKind::AzimuthalEqualArea => Box::new(AzimuthalEqualArea),
            ProjectionKind::ConicConformal => conic_or_mercator(spec.parallels)?,
            ProjectionKind::Mercator => Box::new(Mercator),
        };

        Ok(Self {
            kind: spec.name,
            raw,
            rotation: Rotation::from_degrees(spec.rotate),
            scale,
            translate: spec
                .translate
                .unwrap_or([width as f64 / 2.0, height as f64 / 2.0]),
            clip_cos: spec.clip_angle.map(|deg| deg.to_radians().cos()),
        })
    }

    /// Azimuthal equal-area centered on (100°W, 45°N), clipped to a hemisphere.
    pub fn north_america(width: u32, height: u32) -> ProjectionResult<Self> {
        Self::new(&ProjectionSpec::default(), width, height)
    }

    pub fn kind(&self) -> ProjectionKind {
        self.kind
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translate(&self) -> [f64; 2] {
        self.translate
    }

    fn visible(&self, lambda: f64, phi: f64) -> bool {
        match self.clip_cos {
            Some(cr) => lambda.cos() * phi.cos() > cr,
            None => true,
        }
    }

    /// Project `(lon, lat)` in degrees to pixels.
    ///
    /// Returns `None` beyond the clip angle or where the raw projection is
    /// undefined. The result is not checked against any canvas.
    pub fn project(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }
        let (lambda, phi) = self.rotation.forward(lon.to_radians(), lat.to_radians());
        if !self.visible(lambda, phi) {
            return None;
        }
        let (px, py) = self.raw.forward(lambda, phi)?;
        let x = self.translate[0] + self.scale * px;
        let y = self.translate[1] - self.scale * py;
        if x.is_finite() && y.is_finite() {
            Some((x, y))
        } else {
            None
        }
    }

    /// Map a pixel back to `(lon, lat)` in degrees.
    pub fn invert(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let px = (x - self.translate[0]) / self.scale;
        let py = (self.translate[1] - y) / self.scale;
        let (lambda, phi) = self.raw.inverse(px, py)?;
        if !self.visible(lambda, phi) {
            return None;
        }
        let (lambda, phi) = self.rotation.inverse(lambda, phi);
        let (lon, lat) = (lambda.to_degrees(), phi.to_degrees());
        if lon.is_finite() && lat.is_finite() {
            Some((lon, lat))
        } else {
            None
        }
    }
}
