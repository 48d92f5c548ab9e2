//! Viewer configuration.
//!
//! Precedence, lowest first: built-in defaults, the YAML file, environment
//! variables, command-line flags (applied by the binary).

use std::env;
use std::path::{Path, PathBuf};

use anomaly_client::ClientConfig;
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use renderer::{ProjectorConfig, DEFAULT_POINT_RADIUS};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Rendered document type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
    Json,
}

/// Where anomaly grids come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// The anomaly service over HTTP
    #[default]
    Http,
    /// Synthetic field generated locally
    Mock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub source: SourceKind,

    #[serde(default)]
    pub client: ClientConfig,

    /// Seed for the local mock source
    #[serde(default = "default_mock_seed")]
    pub mock_seed: u64,

    #[serde(default)]
    pub projector: ProjectorConfig,

    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Radius of points without a size rule
    #[serde(default = "default_point_radius")]
    pub point_radius: f64,
}

fn default_mock_seed() -> u64 {
    42
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_point_radius() -> f64 {
    DEFAULT_POINT_RADIUS
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            client: ClientConfig::default(),
            mock_seed: default_mock_seed(),
            projector: ProjectorConfig::default(),
            format: OutputFormat::default(),
            output_dir: default_output_dir(),
            point_radius: DEFAULT_POINT_RADIUS,
        }
    }
}

impl ViewerConfig {
    /// Load from an optional YAML file, then apply environment overrides.
    ///
    /// A missing file is only an error when the path was given explicitly.
    pub fn load(path: Option<&Path>, required: bool) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            Some(path) if required => {
                bail!("Config file not found: {}", path.display());
            }
            Some(path) => {
                debug!(path = %path.display(), "No config file, using defaults");
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "Loaded viewer configuration");
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply `ANOMALY_*` environment variables.
    pub fn apply_env(&mut self) {
        self.client.apply_env();
        if let Ok(dir) = env::var("ANOMALY_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Ok(source) = env::var("ANOMALY_SOURCE") {
            match source.to_lowercase().as_str() {
                "mock" => self.source = SourceKind::Mock,
                "http" => self.source = SourceKind::Http,
                _ => {}
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.source == SourceKind::Http {
            self.client.validate().context("Invalid client configuration")?;
        }
        self.projector
            .validate()
            .context("Invalid projector configuration")?;
        if !self.point_radius.is_finite() || self.point_radius <= 0.0 {
            bail!("point_radius must be positive, got {}", self.point_radius);
        }
        Ok(())
    }
}
