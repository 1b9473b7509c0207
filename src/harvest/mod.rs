//! The two-pass harvest: statement tables for every tracked ticker, then
//! for every competitor their quote pages list that nobody has fetched yet.

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::core::config::HarvestConfig;
use crate::core::error::Result;
use crate::core::types::PageProvider;
use crate::fundamentals::competitors::{CompetitorClassification, CompetitorResolver};
use crate::fundamentals::parsing::TableStitcher;
use crate::fundamentals::period_view::PeriodViewController;
use crate::fundamentals::report::{PeriodType, StatementType};
use crate::fundamentals::tickers::{Ticker, TickerUniverse};
use crate::storage::{ArtifactLocation, ArtifactStore};
use crate::utils::progress::ProgressTracker;

/// A statement tab opens on the annual view, so the quarterly view is taken
/// first and the annual view last.
const PERIOD_ORDER: [PeriodType; 2] = [PeriodType::Quarter, PeriodType::Annual];

#[derive(Debug, Clone, Serialize)]
pub struct HarvestReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub subjects_harvested: usize,
    pub tables_written: usize,
    pub periods_skipped: usize,
    pub statements_skipped: usize,
    pub subjects_failed: usize,
    pub cross_links: usize,
    pub cache_hits: usize,
    pub link_conflicts: usize,
    pub competitors_fetched: usize,
    pub competitors_skipped: usize,
}

impl HarvestReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            subjects_harvested: 0,
            tables_written: 0,
            periods_skipped: 0,
            statements_skipped: 0,
            subjects_failed: 0,
            cross_links: 0,
            cache_hits: 0,
            link_conflicts: 0,
            competitors_fetched: 0,
            competitors_skipped: 0,
        }
    }

    pub fn elapsed(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|end| end - self.started_at)
    }
}

pub struct Harvester<P: PageProvider> {
    provider: P,
    store: ArtifactStore,
    config: HarvestConfig,
    view: PeriodViewController,
    stitcher: TableStitcher,
    resolver: CompetitorResolver,
    progress: Option<ProgressTracker>,
}

impl<P: PageProvider> Harvester<P> {
    pub fn new(provider: P, store: ArtifactStore, config: HarvestConfig) -> Self {
        Self {
            provider,
            store,
            view: PeriodViewController::from_config(&config),
            stitcher: TableStitcher::new(config.layout.clone()),
            resolver: CompetitorResolver::new(config.layout.clone()),
            config,
            progress: None,
        }
    }

    /// Store rooted at the config's tracked and competitor roots.
    pub fn from_config(provider: P, config: HarvestConfig) -> Self {
        let store = ArtifactStore::new(config.tracked_root(), config.competitor_root());
        Self::new(provider, store, config)
    }

    pub fn with_progress(mut self, progress: ProgressTracker) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Runs both passes and closes the provider, whatever the outcome. A
    /// failed close is only reported when the run itself succeeded.
    pub async fn run(&mut self, universe: &TickerUniverse) -> Result<HarvestReport> {
        let mut report = HarvestReport::new();
        let outcome = self.run_passes(universe, &mut report).await;
        let closed = self.provider.close().await;
        report.finished_at = Some(Utc::now());

        if let Some(progress) = &self.progress {
            progress.finish(&format!("{} tables written", report.tables_written));
        }

        match (outcome, closed) {
            (Err(e), Err(close_err)) => {
                log::warn!("Closing the page provider failed: {}", close_err);
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
            (Ok(()), Err(close_err)) => Err(close_err),
            (Ok(()), Ok(())) => Ok(report),
        }
    }

    async fn run_passes(
        &mut self,
        universe: &TickerUniverse,
        report: &mut HarvestReport,
    ) -> Result<()> {
        log::info!("Harvesting {} tracked tickers", universe.len());
        if let Some(progress) = &self.progress {
            progress.start_pass(universe.len() as u64, "tracked tickers");
        }
        for subject in universe.iter() {
            let location = ArtifactLocation::Tracked(subject.clone());
            self.harvest_subject(subject, &[location], report).await?;
            self.advance();
        }

        if !self.config.include_competitors {
            return Ok(());
        }

        log::info!("Resolving competitors of {} tracked tickers", universe.len());
        if let Some(progress) = &self.progress {
            progress.start_pass(universe.len() as u64, "competitors");
        }
        for subject in universe.iter() {
            self.harvest_competitors(subject, universe, report).await?;
            self.advance();
        }
        Ok(())
    }

    async fn harvest_competitors(
        &mut self,
        subject: &Ticker,
        universe: &TickerUniverse,
        report: &mut HarvestReport,
    ) -> Result<()> {
        self.provider
            .navigate(&self.config.quote_url_for(subject.as_str()))
            .await?;
        let html = self.provider.current_html().await?;

        let resolution = match self.resolver.resolve(
            subject,
            &html,
            universe,
            &self.store,
            self.config.conflict_policy,
        ) {
            Ok(resolution) => resolution,
            Err(e) if e.is_recoverable() => {
                log::warn!("Skipping competitors of {}: {}", subject, e);
                report.subjects_failed += 1;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        report.cross_links += resolution.count(CompetitorClassification::AlreadyCrossLinkable);
        report.cache_hits += resolution.count(CompetitorClassification::CacheHit);
        report.link_conflicts += resolution.link_conflicts.len();
        report.competitors_skipped += resolution.skipped.len();

        for competitor in resolution.needs_fetch() {
            let locations = [
                ArtifactLocation::Competitor {
                    owner: subject.clone(),
                    competitor: competitor.clone(),
                },
                ArtifactLocation::SharedCompetitor(competitor.clone()),
            ];
            self.harvest_subject(&competitor, &locations, report).await?;
            report.competitors_fetched += 1;
        }
        Ok(())
    }

    /// Extracts every statement in both period views for `subject` and
    /// writes each table to all of `locations`.
    pub async fn harvest_subject(
        &mut self,
        subject: &Ticker,
        locations: &[ArtifactLocation],
        report: &mut HarvestReport,
    ) -> Result<()> {
        log::info!("Harvesting statements for {}", subject);
        self.provider
            .navigate(&self.config.fundamentals_url_for(subject.as_str()))
            .await?;

        let written_before = report.tables_written;
        for statement in StatementType::iter() {
            if let Some(progress) = &self.progress {
                progress.update_message(subject.as_str(), statement.slug());
            }
            match self
                .harvest_statement(subject, statement, locations, report)
                .await
            {
                Ok(()) => {}
                Err(e) if e.is_recoverable() => {
                    log::warn!("Skipping {} {}: {}", subject, statement, e);
                    report.statements_skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        if report.tables_written == written_before {
            log::warn!("No statement tables extracted for {}", subject);
            report.subjects_failed += 1;
        } else {
            report.subjects_harvested += 1;
        }
        Ok(())
    }

    async fn harvest_statement(
        &mut self,
        subject: &Ticker,
        statement: StatementType,
        locations: &[ArtifactLocation],
        report: &mut HarvestReport,
    ) -> Result<()> {
        self.view.open_statement(&mut self.provider, statement).await?;

        for period in PERIOD_ORDER {
            let extracted = match self.view.activate(&mut self.provider, period).await {
                Ok(()) => {
                    let html = self.provider.current_html().await?;
                    self.stitcher.extract(&html, subject, statement, period)
                }
                Err(e) => Err(e),
            };
            let table = match extracted {
                Ok(table) => table,
                Err(e) if e.is_recoverable() => {
                    log::warn!("Skipping {} {} {}: {}", subject, statement, period, e);
                    report.periods_skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            for location in locations {
                self.store.write(location, &table)?;
                report.tables_written += 1;
            }
        }
        Ok(())
    }

    fn advance(&self) {
        if let Some(progress) = &self.progress {
            progress.increment();
        }
    }
}
