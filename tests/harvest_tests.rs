mod common;

use common::{statement_page, test_config, Snapshots, ANNUAL_LABELS, QUARTER_LABELS};
use harvester::browser::ReplayProvider;
use harvester::fundamentals::layout::PageLayout;
use async_trait::async_trait;
use harvester::{
    ArtifactLocation, ArtifactStore, ConflictPolicy, ElementHandle, HarvestConfig, HarvestError,
    HarvestReport, Harvester, Locator, PageProvider, PeriodType, StatementType, Ticker,
    TickerUniverse,
};
use std::fs;
use std::path::Path;
use std::time::Duration;
use strum::IntoEnumIterator;
use tempfile::tempdir;

fn ticker(s: &str) -> Ticker {
    Ticker::new(s).unwrap()
}

fn universe(symbols: &[&str]) -> TickerUniverse {
    TickerUniverse::from_symbols(symbols).unwrap()
}

#[tokio::test]
async fn test_two_pass_harvest_links_and_caches_competitors() {
    let data = tempdir().unwrap();
    let provider = Snapshots::new()
        .company("AAPL")
        .company("MSFT")
        .company("ZZZQ")
        .quote("AAPL", &["MSFT", "ZZZQ", "123"])
        .quote("MSFT", &["AAPL", "ZZZQ", "MSFT"])
        .into_provider();

    let mut harvester = Harvester::from_config(provider, test_config(data.path()));
    let report = harvester.run(&universe(&["MSFT", "AAPL"])).await.unwrap();

    // 2 tracked x 6 tables, plus ZZZQ written to two locations.
    assert_eq!(report.tables_written, 24);
    assert_eq!(report.subjects_harvested, 3);
    assert_eq!(report.competitors_fetched, 1);
    assert_eq!(report.cross_links, 2);
    assert_eq!(report.cache_hits, 1);
    assert_eq!(report.competitors_skipped, 2);
    assert_eq!(report.periods_skipped + report.statements_skipped, 0);
    assert!(report.finished_at.is_some());
    assert!(harvester.provider().is_closed());

    let store = harvester.store();
    let quarterly = store
        .read(
            &ArtifactLocation::Tracked(ticker("AAPL")),
            PeriodType::Quarter,
            StatementType::BalanceSheet,
        )
        .unwrap();
    let mut expected_header = vec!["items".to_string()];
    expected_header.extend(QUARTER_LABELS.iter().map(|s| s.to_string()));
    expected_header.push("ticker".to_string());
    assert_eq!(quarterly.header, expected_header);
    assert_eq!(quarterly.rows.len(), 3);
    assert_eq!(
        quarterly.rows[2],
        vec!["balance-sheet total", "AAPL-0", "AAPL-1", "AAPL-2", "AAPL-3", "AAPL"]
    );

    let annual = store
        .read(
            &ArtifactLocation::Tracked(ticker("MSFT")),
            PeriodType::Annual,
            StatementType::CashFlow,
        )
        .unwrap();
    assert_eq!(annual.header.len(), ANNUAL_LABELS.len() + 2);

    // MSFT is tracked, so AAPL's copy comes from MSFT's own directory.
    let linked = store
        .read(
            &ArtifactLocation::Competitor {
                owner: ticker("AAPL"),
                competitor: ticker("MSFT"),
            },
            PeriodType::Annual,
            StatementType::IncomeStatement,
        )
        .unwrap();
    assert_eq!(linked.rows[0].last().unwrap(), "MSFT");

    // ZZZQ was fetched once for AAPL and served from the cache for MSFT.
    for location in [
        ArtifactLocation::SharedCompetitor(ticker("ZZZQ")),
        ArtifactLocation::Competitor {
            owner: ticker("AAPL"),
            competitor: ticker("ZZZQ"),
        },
        ArtifactLocation::Competitor {
            owner: ticker("MSFT"),
            competitor: ticker("ZZZQ"),
        },
    ] {
        for statement in StatementType::iter() {
            for period in PeriodType::iter() {
                assert!(
                    store.file_path(&location, period, statement).is_file(),
                    "{:?} {} {}",
                    location,
                    statement,
                    period
                );
            }
        }
    }
    assert!(!store.exists(&ArtifactLocation::SharedCompetitor(ticker("MSFT"))));
    assert!(!store.exists(&ArtifactLocation::Competitor {
        owner: ticker("MSFT"),
        competitor: ticker("MSFT"),
    }));
}

#[tokio::test]
async fn test_bad_period_is_skipped_without_losing_the_statement() {
    let data = tempdir().unwrap();
    let ragged = statement_page(
        PeriodType::Quarter,
        &[vec![(
            "Revenue".to_string(),
            vec!["1".to_string(), "2".to_string()],
        )]],
    );
    let provider = Snapshots::new()
        .company("KO")
        .replace("KO", StatementType::IncomeStatement, PeriodType::Quarter, ragged)
        .into_provider();

    let mut config = test_config(data.path());
    config.include_competitors = false;
    let mut harvester = Harvester::from_config(provider, config);
    let report = harvester.run(&universe(&["KO"])).await.unwrap();

    assert_eq!(report.periods_skipped, 1);
    assert_eq!(report.statements_skipped, 0);
    assert_eq!(report.tables_written, 5);

    let store = harvester.store();
    let location = ArtifactLocation::Tracked(ticker("KO"));
    assert!(!store
        .file_path(&location, PeriodType::Quarter, StatementType::IncomeStatement)
        .exists());
    assert!(store
        .file_path(&location, PeriodType::Annual, StatementType::IncomeStatement)
        .is_file());
}

/// Replays pages but fails the first `n` period-control lookups.
struct SlowRadioProvider {
    inner: ReplayProvider,
    misses: usize,
}

#[async_trait]
impl PageProvider for SlowRadioProvider {
    async fn navigate(&mut self, url: &str) -> harvester::Result<()> {
        self.inner.navigate(url).await
    }

    async fn current_html(&mut self) -> harvester::Result<String> {
        self.inner.current_html().await
    }

    async fn find_clickable(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> harvester::Result<ElementHandle> {
        if matches!(locator, Locator::SpanText(_)) && self.misses > 0 {
            self.misses -= 1;
            return Err(HarvestError::element_not_found(locator.to_string()));
        }
        self.inner.find_clickable(locator, timeout).await
    }

    async fn click(&mut self, element: &ElementHandle) -> harvester::Result<()> {
        self.inner.click(element).await
    }

    async fn close(&mut self) -> harvester::Result<()> {
        self.inner.close().await
    }
}

#[tokio::test]
async fn test_missing_period_control_still_takes_the_next_period() {
    let data = tempdir().unwrap();
    let provider = SlowRadioProvider {
        inner: Snapshots::new().company("KO").into_provider(),
        misses: 1,
    };

    let mut config = test_config(data.path());
    config.include_competitors = false;
    let mut harvester = Harvester::from_config(provider, config);
    let report = harvester.run(&universe(&["KO"])).await.unwrap();

    assert_eq!(report.periods_skipped, 1);
    assert_eq!(report.statements_skipped, 0);
    assert_eq!(report.tables_written, 5);
    assert!(harvester.provider().inner.is_closed());

    let store = harvester.store();
    let location = ArtifactLocation::Tracked(ticker("KO"));
    assert!(!store
        .file_path(&location, PeriodType::Quarter, StatementType::BalanceSheet)
        .exists());
    assert!(store
        .file_path(&location, PeriodType::Annual, StatementType::BalanceSheet)
        .is_file());
}

#[tokio::test]
async fn test_missing_tab_page_skips_periods_then_the_next_statement() {
    let data = tempdir().unwrap();
    // Income statement renders empty, so neither its period control nor the
    // cash flow tab can be found.
    let provider = Snapshots::new()
        .company("KO")
        .remove("KO", StatementType::IncomeStatement, PeriodType::Annual)
        .into_provider();

    let mut config = test_config(data.path());
    config.include_competitors = false;
    let mut harvester = Harvester::from_config(provider, config);
    let report = harvester.run(&universe(&["KO"])).await.unwrap();

    assert_eq!(report.periods_skipped, 2);
    assert_eq!(report.statements_skipped, 1);
    assert_eq!(report.tables_written, 2);
    assert_eq!(report.subjects_harvested, 1);
}

#[tokio::test]
async fn test_competitor_without_pages_counts_as_failed_subject() {
    let data = tempdir().unwrap();
    let provider = Snapshots::new()
        .company("AAPL")
        .quote("AAPL", &["GHST"])
        .into_provider();

    let mut harvester = Harvester::from_config(provider, test_config(data.path()));
    let report = harvester.run(&universe(&["AAPL"])).await.unwrap();

    assert_eq!(report.competitors_fetched, 1);
    assert_eq!(report.subjects_failed, 1);
    assert_eq!(report.statements_skipped, 3);
    assert!(!harvester
        .store()
        .exists(&ArtifactLocation::SharedCompetitor(ticker("GHST"))));
}

#[tokio::test]
async fn test_missing_quote_page_only_fails_that_subject() {
    let data = tempdir().unwrap();
    let provider = Snapshots::new()
        .company("AAPL")
        .company("KO")
        .quote("KO", &["AAPL"])
        .into_provider();

    let mut harvester = Harvester::from_config(provider, test_config(data.path()));
    let report = harvester.run(&universe(&["AAPL", "KO"])).await.unwrap();

    assert_eq!(report.subjects_failed, 1);
    assert_eq!(report.cross_links, 1);
}

async fn replay_run(pages: &Path, data: &Path) -> HarvestReport {
    let provider = ReplayProvider::from_dir(pages, PageLayout::default());
    let mut harvester = Harvester::from_config(provider, test_config(data));
    harvester.run(&universe(&["AAPL"])).await.unwrap()
}

#[tokio::test]
async fn test_rerun_rewrites_identical_artifacts() {
    let data = tempdir().unwrap();
    let snapshots = Snapshots::new()
        .company("AAPL")
        .company("ZZZQ")
        .quote("AAPL", &["ZZZQ"]);
    let pages = tempdir().unwrap();
    snapshots.write_to(pages.path()).unwrap();

    let first = replay_run(pages.path(), data.path()).await;
    let path = ArtifactStore::new(data.path().join("tracked"), data.path().join("all_competitors"))
        .file_path(
            &ArtifactLocation::Competitor {
                owner: ticker("AAPL"),
                competitor: ticker("ZZZQ"),
            },
            PeriodType::Annual,
            StatementType::BalanceSheet,
        );
    let before = fs::read_to_string(&path).unwrap();

    // The second run finds ZZZQ in the shared cache and replaces the copy.
    let second = replay_run(pages.path(), data.path()).await;
    assert_eq!(first.competitors_fetched, 1);
    assert_eq!(second.competitors_fetched, 0);
    assert_eq!(second.cache_hits, 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[tokio::test]
async fn test_refused_link_does_not_block_new_competitors() {
    let data = tempdir().unwrap();
    let mut config = test_config(data.path());
    config.conflict_policy = ConflictPolicy::Fail;

    let first = Snapshots::new()
        .company("AAPL")
        .company("ZZZQ")
        .quote("AAPL", &["ZZZQ"])
        .into_provider();
    let mut harvester = Harvester::from_config(first, config.clone());
    let report = harvester.run(&universe(&["AAPL"])).await.unwrap();
    assert_eq!(report.competitors_fetched, 1);

    let second = Snapshots::new()
        .company("AAPL")
        .company("ZZZQ")
        .company("NEWC")
        .quote("AAPL", &["ZZZQ", "NEWC"])
        .into_provider();
    let mut harvester = Harvester::from_config(second, config);
    let report = harvester.run(&universe(&["AAPL"])).await.unwrap();

    assert_eq!(report.cache_hits, 1);
    assert_eq!(report.link_conflicts, 1);
    assert_eq!(report.competitors_fetched, 1);
    assert_eq!(report.subjects_failed, 0);
    assert!(harvester
        .store()
        .exists(&ArtifactLocation::SharedCompetitor(ticker("NEWC"))));
    assert!(harvester.store().exists(&ArtifactLocation::Competitor {
        owner: ticker("AAPL"),
        competitor: ticker("NEWC"),
    }));
}

#[tokio::test]
async fn test_fatal_provider_error_still_closes_the_session() {
    let data = tempdir().unwrap();
    let provider = Snapshots::new().company("AAPL").into_provider();
    let config = HarvestConfig {
        fundamentals_url: "https://example.com/statements/{symbol}".to_string(),
        ..test_config(data.path())
    };

    let mut harvester = Harvester::from_config(provider, config);
    let err = harvester.run(&universe(&["AAPL"])).await.unwrap_err();

    assert!(matches!(err, HarvestError::Provider(_)));
    assert!(harvester.provider().is_closed());
}
