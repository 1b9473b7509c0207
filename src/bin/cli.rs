use anyhow::{anyhow, Context, Result};
use colored::*;
use harvester::{
    browser::ReplayProvider,
    fundamentals::competitors::{CompetitorClassification, CompetitorResolver},
    utils::{dirs, progress::ProgressTracker},
    ArtifactStore, ConflictPolicy, HarvestConfig, HarvestReport, Harvester, Ticker,
    TickerUniverse,
};
use std::fs;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(
    name = "harvest-cli",
    about = "Harvest financial statement tables for a ticker universe and its competitors"
)]
enum Opt {
    /// Harvest statements for every ticker, then for their competitors
    Run {
        /// Directory of captured pages, one subdirectory per symbol
        #[structopt(long, parse(from_os_str))]
        snapshots: PathBuf,
        #[structopt(flatten)]
        universe: UniverseArgs,
        /// Overrides HARVEST_DATA_DIR
        #[structopt(long, parse(from_os_str))]
        data_dir: Option<PathBuf>,
        /// Only harvest the tracked tickers
        #[structopt(long)]
        no_competitors: bool,
        /// fail, skip or replace
        #[structopt(long)]
        conflict_policy: Option<ConflictPolicy>,
        /// Skip the page settle waits
        #[structopt(long)]
        no_delays: bool,
        /// Print the run report as JSON
        #[structopt(long)]
        json: bool,
    },
    /// Classify the competitors listed on a saved quote page without fetching
    Resolve {
        #[structopt(long, parse(from_os_str))]
        quote_html: PathBuf,
        #[structopt(long)]
        subject: String,
        #[structopt(flatten)]
        universe: UniverseArgs,
        #[structopt(long, parse(from_os_str))]
        data_dir: Option<PathBuf>,
        #[structopt(long)]
        json: bool,
    },
}

#[derive(StructOpt, Debug)]
struct UniverseArgs {
    /// Comma-separated ticker symbols
    #[structopt(long, use_delimiter = true)]
    tickers: Vec<String>,
    /// CSV file with a Symbol column
    #[structopt(long, parse(from_os_str))]
    tickers_file: Option<PathBuf>,
    /// Saved index-constituents page; the first table's Symbol column is used
    #[structopt(long, parse(from_os_str))]
    constituents_html: Option<PathBuf>,
}

impl UniverseArgs {
    fn load(&self) -> Result<TickerUniverse> {
        if !self.tickers.is_empty() {
            return Ok(TickerUniverse::from_symbols(&self.tickers)?);
        }
        if let Some(path) = &self.tickers_file {
            return Ok(TickerUniverse::from_csv(path)?);
        }
        if let Some(path) = &self.constituents_html {
            let html = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            return Ok(TickerUniverse::from_constituents_html(&html)?);
        }
        Err(anyhow!(
            "no ticker universe: pass --tickers, --tickers-file or --constituents-html"
        ))
    }
}

fn print_report(report: &HarvestReport, store: &ArtifactStore) -> Result<()> {
    let tracked = ArtifactStore::list_subjects(store.tracked_root())?;
    let shared = ArtifactStore::list_subjects(store.competitor_root())?;

    println!("{}", "Harvest complete".green().bold());
    println!("  subjects harvested:   {}", report.subjects_harvested);
    println!("  tables written:       {}", report.tables_written);
    println!("  competitors fetched:  {}", report.competitors_fetched);
    println!("  cross-links:          {}", report.cross_links);
    println!("  cache hits:           {}", report.cache_hits);
    if report.link_conflicts > 0 {
        println!(
            "  {}",
            format!("{} competitor links refused by the conflict policy", report.link_conflicts).yellow()
        );
    }

    let skipped = report.periods_skipped + report.statements_skipped;
    if skipped > 0 || report.subjects_failed > 0 {
        println!(
            "  {}",
            format!(
                "{} periods and {} statements skipped, {} subjects failed",
                report.periods_skipped, report.statements_skipped, report.subjects_failed
            )
            .yellow()
        );
    }
    if let Some(elapsed) = report.elapsed() {
        println!("  {}", format!("took {}s", elapsed.num_seconds()).dimmed());
    }
    println!(
        "{} tracked tickers in {}, {} competitors in {}",
        tracked.len().to_string().blue().bold(),
        store.tracked_root().display(),
        shared.len().to_string().blue().bold(),
        store.competitor_root().display()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();
    log::debug!("Logger initialized");

    let opt = Opt::from_args();
    let mut config = HarvestConfig::from_env()?;

    match opt {
        Opt::Run {
            snapshots,
            universe,
            data_dir,
            no_competitors,
            conflict_policy,
            no_delays,
            json,
        } => {
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            if let Some(policy) = conflict_policy {
                config.conflict_policy = policy;
            }
            if no_competitors {
                config.include_competitors = false;
            }
            if no_delays {
                config = config.without_delays();
            }

            let universe = universe.load()?;
            log::debug!("Creating artifact directories under {}", config.data_dir.display());
            dirs::ensure_artifact_dirs(&config.data_dir)?;

            let progress = if json {
                ProgressTracker::hidden()
            } else {
                ProgressTracker::new()
            };
            let provider = ReplayProvider::from_dir(snapshots, config.layout.clone());
            let mut harvester = Harvester::from_config(provider, config).with_progress(progress);
            let report = harvester.run(&universe).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report, harvester.store())?;
            }
        }
        Opt::Resolve {
            quote_html,
            subject,
            universe,
            data_dir,
            json,
        } => {
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            let subject = Ticker::new(subject)?;
            let universe = universe.load()?;
            let store = ArtifactStore::new(config.tracked_root(), config.competitor_root());
            let html = fs::read_to_string(&quote_html)
                .with_context(|| format!("reading {}", quote_html.display()))?;

            let resolver = CompetitorResolver::new(config.layout.clone());
            let entries = resolver.parse_listing(&html)?;
            let resolution = resolver.classify(&subject, &entries, &universe, &store);

            if json {
                println!("{}", serde_json::to_string_pretty(&resolution)?);
                return Ok(());
            }

            println!("Competitors of {}:", subject.to_string().bold());
            for (competitor, class) in &resolution.entries {
                let label = match class {
                    CompetitorClassification::AlreadyCrossLinkable => "tracked".green(),
                    CompetitorClassification::CacheHit => "cached".blue(),
                    CompetitorClassification::NeedsFetch => "fetch".yellow(),
                };
                println!("  {:<8} {}", competitor.as_str(), label);
            }
            for skipped in &resolution.skipped {
                println!(
                    "  {}",
                    format!("{:<8} skipped ({:?})", skipped.text, skipped.reason).dimmed()
                );
            }
        }
    }

    Ok(())
}
