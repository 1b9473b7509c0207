use itertools::Itertools;
use scraper::Html;
use serde::Serialize;

use crate::core::error::{HarvestError, Result};
use crate::fundamentals::layout::PageLayout;
use crate::fundamentals::parsing::parse_selector;
use crate::fundamentals::tickers::{Ticker, TickerUniverse};
use crate::storage::{ArtifactLocation, ArtifactStore, ConflictPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CompetitorClassification {
    /// A tracked ticker whose own artifacts already exist.
    AlreadyCrossLinkable,
    /// Present in the shared competitor cache.
    CacheHit,
    NeedsFetch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    NumericOnly,
    SelfReference,
    /// Repeats a symbol listed earlier, in any letter case.
    Duplicate,
    /// Share-class suffixes and other symbols the fundamentals page cannot
    /// look up.
    NonEquityListing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedCompetitor {
    pub text: String,
    pub reason: SkipReason,
}

/// Outcome of resolving one subject's competitor listing, in listing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompetitorResolution {
    pub subject: Ticker,
    pub entries: Vec<(Ticker, CompetitorClassification)>,
    pub skipped: Vec<SkippedCompetitor>,
    /// Competitors whose copy under the subject was refused by the conflict
    /// policy. They keep their classification.
    pub link_conflicts: Vec<Ticker>,
}

impl CompetitorResolution {
    pub fn needs_fetch(&self) -> Vec<Ticker> {
        self.with_classification(CompetitorClassification::NeedsFetch)
    }

    pub fn with_classification(&self, class: CompetitorClassification) -> Vec<Ticker> {
        self.entries
            .iter()
            .filter(|(_, c)| *c == class)
            .map(|(t, _)| t.clone())
            .collect()
    }

    pub fn count(&self, class: CompetitorClassification) -> usize {
        self.entries.iter().filter(|(_, c)| *c == class).count()
    }
}

pub struct CompetitorResolver {
    layout: PageLayout,
}

impl CompetitorResolver {
    pub fn new(layout: PageLayout) -> Self {
        Self { layout }
    }

    /// Link text of the first anchor in each row of the competitor table.
    pub fn parse_listing(&self, html: &str) -> Result<Vec<String>> {
        let table = parse_selector(&self.layout.competitor_table)?;
        let row = parse_selector("tbody > tr")?;
        let link = parse_selector("a")?;

        let document = Html::parse_document(html);
        let table = document
            .select(&table)
            .next()
            .ok_or_else(|| HarvestError::element_not_found("competitor table"))?;

        Ok(table
            .select(&row)
            .filter_map(|tr| tr.select(&link).next())
            .map(|a| a.text().collect::<String>().trim().to_string())
            .collect())
    }

    /// Classifies `entries` against the universe and what the store holds
    /// right now. Nothing is copied.
    pub fn classify(
        &self,
        subject: &Ticker,
        entries: &[String],
        universe: &TickerUniverse,
        store: &ArtifactStore,
    ) -> CompetitorResolution {
        let mut resolution = CompetitorResolution {
            subject: subject.clone(),
            entries: Vec::new(),
            skipped: Vec::new(),
            link_conflicts: Vec::new(),
        };

        for text in entries.iter().map(|e| e.trim()) {
            let skip = |reason| SkippedCompetitor {
                text: text.to_string(),
                reason,
            };

            if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
                resolution.skipped.push(skip(SkipReason::NumericOnly));
                continue;
            }
            let Ok(competitor) = Ticker::new(text) else {
                resolution.skipped.push(skip(SkipReason::NonEquityListing));
                continue;
            };
            if &competitor == subject {
                resolution.skipped.push(skip(SkipReason::SelfReference));
                continue;
            }
            if resolution.entries.iter().any(|(t, _)| *t == competitor) {
                resolution.skipped.push(skip(SkipReason::Duplicate));
                continue;
            }

            let class = if universe.contains(&competitor)
                && store.exists(&ArtifactLocation::Tracked(competitor.clone()))
            {
                CompetitorClassification::AlreadyCrossLinkable
            } else if store.exists(&ArtifactLocation::SharedCompetitor(competitor.clone())) {
                CompetitorClassification::CacheHit
            } else {
                CompetitorClassification::NeedsFetch
            };
            log::debug!("{} competitor {} -> {:?}", subject, competitor, class);
            resolution.entries.push((competitor, class));
        }

        resolution
    }

    /// Parses the listing, classifies it and links every competitor whose
    /// data already exists under `<subject>/competitors/`. A conflict on one
    /// link is recorded and the remaining competitors are still linked.
    pub fn resolve(
        &self,
        subject: &Ticker,
        html: &str,
        universe: &TickerUniverse,
        store: &ArtifactStore,
        policy: ConflictPolicy,
    ) -> Result<CompetitorResolution> {
        let entries = self.parse_listing(html)?;
        let mut resolution = self.classify(subject, &entries, universe, store);

        for (competitor, class) in &resolution.entries {
            let source = match class {
                CompetitorClassification::AlreadyCrossLinkable => {
                    ArtifactLocation::Tracked(competitor.clone())
                }
                CompetitorClassification::CacheHit => {
                    ArtifactLocation::SharedCompetitor(competitor.clone())
                }
                CompetitorClassification::NeedsFetch => continue,
            };
            let target = ArtifactLocation::Competitor {
                owner: subject.clone(),
                competitor: competitor.clone(),
            };
            match store.copy_subtree(&source, &target, policy) {
                Ok(_) => {}
                Err(e) if e.is_recoverable() => {
                    log::warn!("Not linking {} under {}: {}", competitor, subject, e);
                    resolution.link_conflicts.push(competitor.clone());
                }
                Err(e) => return Err(e),
            }
        }

        for skipped in &resolution.skipped {
            log::debug!("{} skipped competitor {:?}: {:?}", subject, skipped.text, skipped.reason);
        }
        log::info!(
            "{}: {} competitors, {} skipped, to fetch: [{}]",
            subject,
            resolution.entries.len(),
            resolution.skipped.len(),
            resolution.needs_fetch().iter().join(", ")
        );
        Ok(resolution)
    }
}
