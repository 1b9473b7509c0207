use anyhow::Result;
use std::fs;
use std::path::Path;

// Base data directory
pub const DATA_DIR: &str = "data";

// Artifact roots under the data directory
pub const TRACKED_SUBDIR: &str = "tracked";
pub const COMPETITORS_SUBDIR: &str = "all_competitors";

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Creates the tracked and shared-competitor roots under `data_dir`.
pub fn ensure_artifact_dirs(data_dir: &Path) -> Result<()> {
    ensure_dir(data_dir)?;
    ensure_dir(&data_dir.join(TRACKED_SUBDIR))?;
    ensure_dir(&data_dir.join(COMPETITORS_SUBDIR))?;
    Ok(())
}
