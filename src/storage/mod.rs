use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::HarvestError;

pub mod artifact;

pub use self::artifact::{ArtifactLocation, ArtifactStore, CopyOutcome, StoredTable};

/// What `copy_subtree` does when the destination directory already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    Fail,
    Skip,
    #[default]
    Replace,
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConflictPolicy::Fail => "fail",
            ConflictPolicy::Skip => "skip",
            ConflictPolicy::Replace => "replace",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ConflictPolicy {
    type Err = HarvestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fail" => Ok(ConflictPolicy::Fail),
            "skip" => Ok(ConflictPolicy::Skip),
            "replace" => Ok(ConflictPolicy::Replace),
            other => Err(HarvestError::Config(format!(
                "unknown conflict policy {:?} (expected fail, skip or replace)",
                other
            ))),
        }
    }
}
