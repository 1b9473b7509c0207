use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarvestError>;

/// Failures raised while extracting and persisting statement tables.
///
/// The first three variants are expected on a live site and only abandon the
/// current period, statement or subject. Everything else stops the run.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("element not found: {what}")]
    ElementNotFound { what: String },

    #[error("page layout mismatch: {detail}")]
    LayoutMismatch { detail: String },

    #[error("artifact already exists at {}", path.display())]
    ArtifactConflict { path: PathBuf },

    #[error("invalid ticker symbol: {0:?}")]
    InvalidTicker(String),

    #[error("page provider failure: {0}")]
    Provider(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl HarvestError {
    pub fn element_not_found(what: impl Into<String>) -> Self {
        HarvestError::ElementNotFound { what: what.into() }
    }

    pub fn layout_mismatch(detail: impl Into<String>) -> Self {
        HarvestError::LayoutMismatch {
            detail: detail.into(),
        }
    }

    /// Whether the pipeline may skip past this error and keep going.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            HarvestError::ElementNotFound { .. }
                | HarvestError::LayoutMismatch { .. }
                | HarvestError::ArtifactConflict { .. }
        )
    }
}
