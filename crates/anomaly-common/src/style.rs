//! Classification of normalized anomalies into colored buckets.
//!
//! A [`ThresholdTable`] is an ordered list of boundaries over the normalized
//! range `[0, 1]` together with one [`Bucket`] per interval, cold to hot.
//! Tables are plain configuration and can be loaded from JSON or YAML:
//!
//! ```yaml
//! thresholds: [0.2, 0.4, 0.6, 0.8]
//! buckets:
//!   - { color: "#2166ac", size: 3.0, label: "much colder" }
//!   - { color: "#67a9cf", size: 2.5 }
//!   - { color: "#f7f7f7", size: 2.0 }
//!   - { color: "#ef8a62", size: 2.5 }
//!   - { color: "#b2182b", size: 3.0, label: "much warmer" }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{AnomalyError, AnomalyResult};

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ColorSpec", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse "#RRGGBB" or "#RRGGBBAA" (leading '#' optional).
    pub fn from_hex(s: &str) -> AnomalyResult<Self> {
        let hex = s.trim_start_matches('#');
        let channel = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| AnomalyError::invalid_config(format!("invalid hex color '{}'", s)))
        };

        match hex.len() {
            6 => Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Ok(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => Err(AnomalyError::invalid_config(format!(
                "invalid hex color '{}'",
                s
            ))),
        }
    }

    /// Look up a small set of CSS color names.
    pub fn from_name(name: &str) -> Option<Self> {
        let color = match name.to_lowercase().as_str() {
            "transparent" => Self::transparent(),
            "black" => Self::rgb(0, 0, 0),
            "white" => Self::rgb(255, 255, 255),
            "red" => Self::rgb(255, 0, 0),
            "green" => Self::rgb(0, 128, 0),
            "blue" => Self::rgb(0, 0, 255),
            "yellow" => Self::rgb(255, 255, 0),
            "cyan" => Self::rgb(0, 255, 255),
            "orange" => Self::rgb(255, 165, 0),
            "purple" => Self::rgb(128, 0, 128),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            "lightgray" | "lightgrey" => Self::rgb(211, 211, 211),
            _ => return None,
        };
        Some(color)
    }

    /// "#rrggbb", or "#rrggbbaa" when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_rgba(&self) -> (u8, u8, u8, u8) {
        (self.r, self.g, self.b, self.a)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Accepted spellings of a color in configuration files.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ColorSpec {
    /// Hex string or color name
    Text(String),

    /// [r, g, b] or [r, g, b, a]
    Array(Vec<u8>),

    /// Explicit channels
    Rgba {
        r: u8,
        g: u8,
        b: u8,
        #[serde(default = "opaque")]
        a: u8,
    },
}

fn opaque() -> u8 {
    255
}

impl TryFrom<ColorSpec> for Color {
    type Error = AnomalyError;

    fn try_from(spec: ColorSpec) -> Result<Self, Self::Error> {
        match spec {
            ColorSpec::Text(s) if s.starts_with('#') => Color::from_hex(&s),
            ColorSpec::Text(s) => Color::from_name(&s)
                .ok_or_else(|| AnomalyError::invalid_config(format!("unknown color '{}'", s))),
            ColorSpec::Array(arr) => match arr.as_slice() {
                [r, g, b] => Ok(Color::rgb(*r, *g, *b)),
                [r, g, b, a] => Ok(Color::new(*r, *g, *b, *a)),
                _ => Err(AnomalyError::invalid_config(format!(
                    "color arrays need 3 or 4 channels, got {}",
                    arr.len()
                ))),
            },
            ColorSpec::Rgba { r, g, b, a } => Ok(Color::new(r, g, b, a)),
        }
    }
}

/// One classification interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub color: Color,

    /// Visual weight for point renderers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,

    /// Legend text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Bucket {
    pub fn new(color: Color, size: Option<f64>, label: Option<&str>) -> Self {
        Self {
            color,
            size,
            label: label.map(str::to_string),
        }
    }
}

/// Ordered thresholds over the normalized range with their buckets.
///
/// `buckets[k]` covers `[thresholds[k-1], thresholds[k])`, with the first and
/// last buckets open towards minus and plus infinity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    /// Strictly ascending interval boundaries
    pub thresholds: Vec<f64>,

    /// One more bucket than thresholds, cold to hot
    pub buckets: Vec<Bucket>,

    /// Bucket used when the statistics have a zero-width range.
    /// Defaults to the middle bucket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neutral_bucket: Option<usize>,
}

impl ThresholdTable {
    /// Build a table and validate it.
    pub fn new(thresholds: Vec<f64>, buckets: Vec<Bucket>) -> AnomalyResult<Self> {
        let table = Self {
            thresholds,
            buckets,
            neutral_bucket: None,
        };
        table.validate()?;
        Ok(table)
    }

    /// Five diverging classes, blue through red.
    pub fn five_class() -> Self {
        Self {
            thresholds: vec![0.2, 0.4, 0.6, 0.8],
            buckets: vec![
                Bucket::new(Color::rgb(0x21, 0x66, 0xac), Some(4.0), Some("much colder")),
                Bucket::new(Color::rgb(0x67, 0xa9, 0xcf), Some(3.0), Some("colder")),
                Bucket::new(Color::rgb(0xf7, 0xf7, 0xf7), Some(2.0), Some("near normal")),
                Bucket::new(Color::rgb(0xef, 0x8a, 0x62), Some(3.0), Some("warmer")),
                Bucket::new(Color::rgb(0xb2, 0x18, 0x2b), Some(4.0), Some("much warmer")),
            ],
            neutral_bucket: None,
        }
    }

    /// Three classes: cold, neutral, warm.
    pub fn three_class() -> Self {
        Self {
            thresholds: vec![1.0 / 3.0, 2.0 / 3.0],
            buckets: vec![
                Bucket::new(Color::rgb(0x00, 0x66, 0xff), Some(3.0), Some("cold")),
                Bucket::new(Color::rgb(0xff, 0xff, 0xff), Some(2.0), Some("neutral")),
                Bucket::new(Color::rgb(0xff, 0x33, 0x00), Some(3.0), Some("warm")),
            ],
            neutral_bucket: None,
        }
    }

    /// Parse a table from JSON.
    pub fn from_json(json: &str) -> AnomalyResult<Self> {
        let table: Self = serde_json::from_str(json)
            .map_err(|e| AnomalyError::invalid_config(format!("threshold table: {}", e)))?;
        table.validate()?;
        Ok(table)
    }

    /// Parse a table from YAML.
    pub fn from_yaml(yaml: &str) -> AnomalyResult<Self> {
        let table: Self = serde_yaml::from_str(yaml)
            .map_err(|e| AnomalyError::invalid_config(format!("threshold table: {}", e)))?;
        table.validate()?;
        Ok(table)
    }

    /// Load a table from a `.json`, `.yaml` or `.yml` file.
    pub fn from_file(path: impl AsRef<Path>) -> AnomalyResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    pub fn validate(&self) -> AnomalyResult<()> {
        if self.buckets.is_empty() {
            return Err(AnomalyError::invalid_config(
                "threshold table needs at least one bucket",
            ));
        }
        if self.buckets.len() != self.thresholds.len() + 1 {
            return Err(AnomalyError::invalid_config(format!(
                "{} thresholds require {} buckets, found {}",
                self.thresholds.len(),
                self.thresholds.len() + 1,
                self.buckets.len()
            )));
        }
        if self.thresholds.iter().any(|t| !t.is_finite()) {
            return Err(AnomalyError::invalid_config("thresholds must be finite"));
        }
        if self.thresholds.windows(2).any(|w| w[1] <= w[0]) {
            return Err(AnomalyError::invalid_config(
                "thresholds must be strictly ascending",
            ));
        }
        if let Some(neutral) = self.neutral_bucket {
            if neutral >= self.buckets.len() {
                return Err(AnomalyError::invalid_config(format!(
                    "neutral_bucket {} is out of range for {} buckets",
                    neutral,
                    self.buckets.len()
                )));
            }
        }
        if self.buckets.iter().any(|b| b.size.is_some_and(|s| !s.is_finite() || s < 0.0)) {
            return Err(AnomalyError::invalid_config(
                "bucket sizes must be finite and non-negative",
            ));
        }
        Ok(())
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Index of the bucket used for a degenerate range.
    pub fn neutral_index(&self) -> usize {
        self.neutral_bucket.unwrap_or(self.buckets.len() / 2)
    }

    /// Bucket for a normalized value.
    ///
    /// The value is clamped to `[0, 1]` and the first threshold it falls
    /// strictly below selects the bucket. NaN maps to the neutral bucket.
    pub fn bucket_index(&self, normalized: f64) -> usize {
        if normalized.is_nan() {
            return self.neutral_index();
        }
        let clamped = normalized.clamp(0.0, 1.0);
        self.thresholds
            .iter()
            .position(|&t| clamped < t)
            .unwrap_or(self.thresholds.len())
    }

    /// Bucket for an optional normalized value; `None` means a degenerate range.
    pub fn classify(&self, normalized: Option<f64>) -> usize {
        match normalized {
            Some(n) => self.bucket_index(n),
            None => self.neutral_index(),
        }
    }

    pub fn bucket(&self, index: usize) -> Option<&Bucket> {
        self.buckets.get(index)
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::five_class()
    }
}

/// How point size is derived.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SizeRule {
    /// Use the size carried by the bucket
    #[default]
    Bucket,

    /// Interpolate between `min` and `max` by normalized value
    Linear { min: f64, max: f64 },

    /// Points carry no size
    None,
}

impl SizeRule {
    pub fn validate(&self) -> AnomalyResult<()> {
        if let SizeRule::Linear { min, max } = self {
            if !min.is_finite() || !max.is_finite() || *min < 0.0 || *max < *min {
                return Err(AnomalyError::invalid_config(format!(
                    "linear size rule needs 0 <= min <= max, got min={}, max={}",
                    min, max
                )));
            }
        }
        Ok(())
    }

    /// Size for a point given its bucket and clamped normalized value.
    pub fn size_for(&self, bucket: &Bucket, normalized: f64) -> Option<f64> {
        match self {
            SizeRule::Bucket => bucket.size,
            SizeRule::Linear { min, max } => Some(min + (max - min) * normalized.clamp(0.0, 1.0)),
            SizeRule::None => None,
        }
    }
}
