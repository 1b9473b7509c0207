use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::fundamentals::layout::PageLayout;
use crate::storage::ConflictPolicy;

pub const DEFAULT_FUNDAMENTALS_URL: &str =
    "https://research.tdameritrade.com/grid/public/research/stocks/fundamentals?symbol={symbol}";
pub const DEFAULT_QUOTE_URL: &str = "https://www.wsj.com/market-data/quotes/{symbol}";

#[derive(Clone, Debug)]
pub struct HarvestConfig {
    pub data_dir: PathBuf,
    /// URL template for a subject's statement pages; `{symbol}` is substituted.
    pub fundamentals_url: String,
    /// URL template for the quote page that lists competitors.
    pub quote_url: String,
    pub statement_delay: Duration,
    pub settle_delay: Duration,
    pub click_timeout: Duration,
    pub conflict_policy: ConflictPolicy,
    pub include_competitors: bool,
    pub layout: PageLayout,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(crate::utils::dirs::DATA_DIR),
            fundamentals_url: DEFAULT_FUNDAMENTALS_URL.to_string(),
            quote_url: DEFAULT_QUOTE_URL.to_string(),
            statement_delay: Duration::from_millis(7000),
            settle_delay: Duration::from_millis(5000),
            click_timeout: Duration::from_secs(10),
            conflict_policy: ConflictPolicy::Replace,
            include_competitors: true,
            layout: PageLayout::default(),
        }
    }
}

impl HarvestConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let data_dir = std::env::var("HARVEST_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let fundamentals_url = std::env::var("HARVEST_FUNDAMENTALS_URL")
            .unwrap_or(defaults.fundamentals_url);
        let quote_url = std::env::var("HARVEST_QUOTE_URL").unwrap_or(defaults.quote_url);

        let statement_delay = env_millis("HARVEST_STATEMENT_DELAY_MS")?
            .unwrap_or(defaults.statement_delay);
        let settle_delay =
            env_millis("HARVEST_SETTLE_DELAY_MS")?.unwrap_or(defaults.settle_delay);
        let click_timeout = match std::env::var("HARVEST_CLICK_TIMEOUT_SECS") {
            Ok(v) => Duration::from_secs(
                v.parse()
                    .map_err(|_| anyhow!("HARVEST_CLICK_TIMEOUT_SECS must be an integer: {}", v))?,
            ),
            Err(_) => defaults.click_timeout,
        };

        let conflict_policy = match std::env::var("HARVEST_CONFLICT_POLICY") {
            Ok(v) => ConflictPolicy::from_str(&v)?,
            Err(_) => defaults.conflict_policy,
        };

        let config = Self {
            data_dir,
            fundamentals_url,
            quote_url,
            statement_delay,
            settle_delay,
            click_timeout,
            conflict_policy,
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, template) in [
            ("fundamentals_url", &self.fundamentals_url),
            ("quote_url", &self.quote_url),
        ] {
            if !template.contains("{symbol}") {
                return Err(anyhow!("{} template lacks a {{symbol}} placeholder", name));
            }
        }
        Ok(())
    }

    /// Root holding one directory per tracked ticker.
    pub fn tracked_root(&self) -> PathBuf {
        self.data_dir.join(crate::utils::dirs::TRACKED_SUBDIR)
    }

    /// Shared cache of competitor artifacts, reused across tracked tickers.
    pub fn competitor_root(&self) -> PathBuf {
        self.data_dir.join(crate::utils::dirs::COMPETITORS_SUBDIR)
    }

    pub fn fundamentals_url_for(&self, symbol: &str) -> String {
        self.fundamentals_url.replace("{symbol}", symbol)
    }

    pub fn quote_url_for(&self, symbol: &str) -> String {
        self.quote_url.replace("{symbol}", symbol)
    }

    /// Zero every wait; replayed snapshots never need to settle.
    pub fn without_delays(mut self) -> Self {
        self.statement_delay = Duration::ZERO;
        self.settle_delay = Duration::ZERO;
        self.click_timeout = Duration::ZERO;
        self
    }
}

fn env_millis(key: &str) -> Result<Option<Duration>> {
    match std::env::var(key) {
        Ok(v) => {
            let ms: u64 = v
                .parse()
                .map_err(|_| anyhow!("{} must be a number of milliseconds: {}", key, v))?;
            Ok(Some(Duration::from_millis(ms)))
        }
        Err(_) => Ok(None),
    }
}
