//! Projection parameter errors.

use anomaly_common::AnomalyError;
use thiserror::Error;

pub type ProjectionResult<T> = Result<T, ProjectionError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("scale must be finite and positive, got {0}")]
    InvalidScale(f64),

    #[error("clip angle must be in (0, 180] degrees, got {0}")]
    InvalidClipAngle(f64),

    #[error("standard parallels must lie strictly between -90 and 90, got [{0}, {1}]")]
    InvalidParallels(f64, f64),

    #[error("{0} must be finite")]
    NonFinite(&'static str),
}

impl From<ProjectionError> for AnomalyError {
    fn from(err: ProjectionError) -> Self {
        AnomalyError::InvalidConfig(format!("projection: {}", err))
    }
}
