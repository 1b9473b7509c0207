use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::{Path, PathBuf};

use super::ConflictPolicy;
use crate::core::error::{HarvestError, Result};
use crate::fundamentals::parsing::types::StatementTable;
use crate::fundamentals::report::{PeriodType, StatementType};
use crate::fundamentals::tickers::Ticker;

pub const COMPETITORS_DIR: &str = "competitors";

/// Where a subject's statement tables live.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArtifactLocation {
    /// `<tracked-root>/<T>`
    Tracked(Ticker),
    /// `<tracked-root>/<owner>/competitors/<C>`
    Competitor { owner: Ticker, competitor: Ticker },
    /// `<competitor-root>/<C>`, shared by every owner listing `C`.
    SharedCompetitor(Ticker),
}

impl ArtifactLocation {
    /// Symbol whose tables are stored at this location.
    pub fn subject(&self) -> &Ticker {
        match self {
            ArtifactLocation::Tracked(ticker) => ticker,
            ArtifactLocation::Competitor { competitor, .. } => competitor,
            ArtifactLocation::SharedCompetitor(competitor) => competitor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    /// Destination already present and left untouched.
    Skipped,
}

/// A CSV artifact read back from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    tracked_root: PathBuf,
    competitor_root: PathBuf,
}

impl ArtifactStore {
    pub fn new(tracked_root: impl Into<PathBuf>, competitor_root: impl Into<PathBuf>) -> Self {
        Self {
            tracked_root: tracked_root.into(),
            competitor_root: competitor_root.into(),
        }
    }

    pub fn tracked_root(&self) -> &Path {
        &self.tracked_root
    }

    pub fn competitor_root(&self) -> &Path {
        &self.competitor_root
    }

    pub fn dir(&self, location: &ArtifactLocation) -> PathBuf {
        match location {
            ArtifactLocation::Tracked(ticker) => self.tracked_root.join(ticker.as_str()),
            ArtifactLocation::Competitor { owner, competitor } => self
                .tracked_root
                .join(owner.as_str())
                .join(COMPETITORS_DIR)
                .join(competitor.as_str()),
            ArtifactLocation::SharedCompetitor(competitor) => {
                self.competitor_root.join(competitor.as_str())
            }
        }
    }

    /// `<dir>/<subject><period-slug><statement-slug>.csv`
    pub fn file_path(
        &self,
        location: &ArtifactLocation,
        period: PeriodType,
        statement: StatementType,
    ) -> PathBuf {
        self.dir(location).join(format!(
            "{}{}{}.csv",
            location.subject(),
            period.slug(),
            statement.slug()
        ))
    }

    pub fn exists(&self, location: &ArtifactLocation) -> bool {
        self.dir(location).is_dir()
    }

    /// Writes `table` as CSV, replacing any previous file for the same
    /// (subject, period, statement).
    pub fn write(&self, location: &ArtifactLocation, table: &StatementTable) -> Result<PathBuf> {
        let path = self.file_path(location, table.period_type, table.statement_type);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut writer = WriterBuilder::new().has_headers(false).from_path(&path)?;
        writer.write_record(table.csv_header())?;
        for row in table.csv_rows() {
            writer.write_record(&row)?;
        }
        writer.flush()?;

        log::info!("Wrote {} rows to {}", table.len(), path.display());
        Ok(path)
    }

    pub fn read(
        &self,
        location: &ArtifactLocation,
        period: PeriodType,
        statement: StatementType,
    ) -> Result<StoredTable> {
        let path = self.file_path(location, period, statement);
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&path)?;

        let header = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok(StoredTable { header, rows })
    }

    /// Recursively copies the artifacts at `src` to `dst`.
    pub fn copy_subtree(
        &self,
        src: &ArtifactLocation,
        dst: &ArtifactLocation,
        policy: ConflictPolicy,
    ) -> Result<CopyOutcome> {
        let from = self.dir(src);
        let to = self.dir(dst);

        if to.exists() {
            match policy {
                ConflictPolicy::Fail => return Err(HarvestError::ArtifactConflict { path: to }),
                ConflictPolicy::Skip => {
                    log::debug!("Keeping existing {}", to.display());
                    return Ok(CopyOutcome::Skipped);
                }
                ConflictPolicy::Replace => fs::remove_dir_all(&to)?,
            }
        }

        copy_dir(&from, &to)?;
        log::info!("Copied {} -> {}", from.display(), to.display());
        Ok(CopyOutcome::Copied)
    }

    /// Symbols with a directory directly under `root`, sorted. A missing
    /// root lists nothing.
    pub fn list_subjects(root: &Path) -> Result<Vec<Ticker>> {
        if !root.is_dir() {
            return Ok(Vec::new());
        }
        let mut subjects = Vec::new();
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(ticker) = entry
                .file_name()
                .to_str()
                .and_then(|name| Ticker::new(name).ok())
            {
                subjects.push(ticker);
            }
        }
        subjects.sort();
        Ok(subjects)
    }
}

fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
