//! Common types shared by the anomaly map crates.

pub mod error;
pub mod forecast;
pub mod grid;
pub mod region;
pub mod response;
pub mod style;

pub use error::{AnomalyError, AnomalyResult, ShapeError};
pub use forecast::{ForecastHour, SUPPORTED_FORECAST_HOURS};
pub use grid::{
    is_valid_cell, normalize_longitude, validate_shape, GridCell, Statistics, TemperatureGrid,
};
pub use region::RegionOfInterest;
pub use response::{parse_timestamp, AnomalyResponse};
pub use style::{Bucket, Color, SizeRule, ThresholdTable};
