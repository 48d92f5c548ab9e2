//! Paths for tests that read shipped config or write rendered maps.

use std::path::{Path, PathBuf};

/// Root of the workspace, two levels above this crate's manifest.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .nth(2)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| manifest_dir.to_path_buf())
}

/// `services/<service>/config` under the workspace root.
pub fn service_config_dir(service: &str) -> PathBuf {
    workspace_root().join("services").join(service).join("config")
}

/// Scratch directory for rendered output, deleted when dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("anomaly-map-")
        .tempdir()
        .expect("create scratch directory")
}
