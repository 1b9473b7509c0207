use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{HarvestError, Result};

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("th, td").unwrap());

const SYMBOL_COLUMN: &str = "Symbol";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn new(ticker: impl Into<String>) -> Result<Self> {
        let ticker = ticker.into();
        let uppercase_ticker = ticker.trim().to_uppercase();
        if uppercase_ticker.is_empty() {
            return Err(HarvestError::InvalidTicker(ticker));
        }
        if !uppercase_ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(HarvestError::InvalidTicker(ticker));
        }
        Ok(Ticker(uppercase_ticker))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Ticker {
    type Error = HarvestError;

    fn try_from(s: String) -> Result<Self> {
        Ticker::new(s)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The fixed set of tickers a harvest run tracks, kept sorted by symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickerUniverse {
    tickers: Vec<Ticker>,
}

impl TickerUniverse {
    pub fn new(tickers: impl IntoIterator<Item = Ticker>) -> Self {
        let mut tickers: Vec<Ticker> = tickers.into_iter().collect();
        tickers.sort();
        tickers.dedup();
        Self { tickers }
    }

    pub fn from_symbols<S: AsRef<str>>(symbols: &[S]) -> Result<Self> {
        let tickers = symbols
            .iter()
            .map(|s| s.as_ref())
            .filter(|s| !s.trim().is_empty())
            .map(Ticker::new)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(tickers))
    }

    /// Reads the `Symbol` column of a CSV file, falling back to the first
    /// column when no such header exists.
    pub fn from_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;
        let column = reader
            .headers()?
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(SYMBOL_COLUMN))
            .unwrap_or(0);

        let mut symbols = Vec::new();
        for record in reader.records() {
            let record = record?;
            if let Some(symbol) = record.get(column) {
                symbols.push(symbol.to_string());
            }
        }
        log::debug!("Loaded {} symbols from {:?}", symbols.len(), path);
        Self::from_symbols(&symbols)
    }

    /// Reads the `Symbol` column of the first table on an index-constituents
    /// page.
    pub fn from_constituents_html(html: &str) -> Result<Self> {
        let document = Html::parse_document(html);
        let table = document
            .select(&TABLE)
            .next()
            .ok_or_else(|| HarvestError::element_not_found("constituents table"))?;

        let mut rows = table.select(&ROW);
        let header = rows
            .next()
            .ok_or_else(|| HarvestError::element_not_found("constituents header row"))?;
        let column = cell_texts(header)
            .iter()
            .position(|h| h == SYMBOL_COLUMN)
            .ok_or_else(|| {
                HarvestError::layout_mismatch("constituents table has no Symbol column")
            })?;

        let symbols: Vec<String> = rows
            .filter_map(|row| cell_texts(row).into_iter().nth(column))
            .collect();
        log::debug!("Found {} constituents", symbols.len());
        Self::from_symbols(&symbols)
    }

    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.tickers.binary_search(ticker).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ticker> {
        self.tickers.iter()
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

fn cell_texts(row: ElementRef<'_>) -> Vec<String> {
    row.select(&CELL)
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .collect()
}
