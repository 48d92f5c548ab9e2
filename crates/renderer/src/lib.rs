//! Anomaly map rendering.
//!
//! - [`AnomalyProjector`]: places and classifies grid cells (points mode) or
//!   fills a nearest-neighbor [`Raster`]
//! - [`RenderSurface`]: turns either output into SVG, PNG or JSON bytes
//! - [`png`]: the PNG encoder behind [`PngSurface`]

pub mod config;
pub mod png;
pub mod projector;
pub mod raster;
pub mod surface;

pub use config::{MappingConfig, ProjectorConfig, RenderMode};
pub use projector::{AnomalyProjector, Classified, DrawablePoint, ProjectionOutput};
pub use raster::Raster;
pub use surface::{JsonSurface, PngSurface, RenderSurface, SvgSurface, DEFAULT_POINT_RADIUS};
