//! Error types for the anomaly map pipeline.

use thiserror::Error;

/// Result type alias using AnomalyError.
pub type AnomalyResult<T> = Result<T, AnomalyError>;

/// Structural problems with an incoming grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("latitude axis is empty")]
    EmptyLatitudes,

    #[error("longitude axis is empty")]
    EmptyLongitudes,

    #[error("expected {expected} rows (one per latitude), found {actual}")]
    RowCountMismatch { expected: usize, actual: usize },

    #[error("row {row} has {actual} values, expected {expected} (one per longitude)")]
    RowLengthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Primary error type for anomaly pipeline operations.
#[derive(Debug, Error)]
pub enum AnomalyError {
    // === Input Errors ===
    #[error("Malformed grid: {0}")]
    Shape(#[from] ShapeError),

    #[error("Invalid statistics: {0}")]
    InvalidStatistics(String),

    #[error("Grid contains no valid cells")]
    NoValidCells,

    // === Configuration Errors ===
    #[error("Invalid region of interest: {0}")]
    InvalidRegion(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported forecast hour: {0}")]
    UnsupportedForecastHour(u32),

    // === Data Source Errors ===
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    Decode(String),

    // === Output Errors ===
    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl AnomalyError {
    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an InvalidRegion error.
    pub fn invalid_region(msg: impl Into<String>) -> Self {
        Self::InvalidRegion(msg.into())
    }

    /// Create a Render error.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// True for errors that will recur on every run until the configuration changes.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AnomalyError::InvalidRegion(_)
                | AnomalyError::InvalidConfig(_)
                | AnomalyError::UnsupportedForecastHour(_)
        )
    }

    /// True when retrying the same request cannot succeed.
    ///
    /// Network failures and server errors may clear up on their own; bad
    /// input and bad configuration will not.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            AnomalyError::Http { .. } | AnomalyError::Transport(_) | AnomalyError::Io(_)
        )
    }

    /// Single human-readable line for the dashboard.
    pub fn user_message(&self) -> String {
        match self {
            AnomalyError::Shape(_)
            | AnomalyError::InvalidStatistics(_)
            | AnomalyError::NoValidCells
            | AnomalyError::Decode(_) => format!("Unable to load data: {}", self),
            AnomalyError::Http { status, message } => {
                format!("Unable to load data (server returned {}): {}", status, message)
            }
            AnomalyError::Transport(msg) => {
                format!("Unable to reach the anomaly service: {}", msg)
            }
            AnomalyError::UnsupportedForecastHour(hour) => {
                format!("Forecast hour {} is not available", hour)
            }
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for AnomalyError {
    fn from(err: std::io::Error) -> Self {
        AnomalyError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AnomalyError {
    fn from(err: serde_json::Error) -> Self {
        AnomalyError::Decode(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for AnomalyError {
    fn from(err: serde_yaml::Error) -> Self {
        AnomalyError::InvalidConfig(format!("YAML error: {}", err))
    }
}
