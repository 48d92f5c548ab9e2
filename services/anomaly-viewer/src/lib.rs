//! Temperature anomaly map viewer.
//!
//! Fetches anomaly snapshots from the anomaly service (or an offline mock),
//! runs them through the projector and writes the rendered map to disk.

pub mod config;
pub mod viewer;

pub use config::{OutputFormat, SourceKind, ViewerConfig};
pub use viewer::{RenderedMap, Viewer, WatchSummary};
