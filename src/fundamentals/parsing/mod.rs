pub mod header;
pub mod table;
pub mod types;

#[cfg(test)]
mod tests;

pub use header::{FixedOffsetHeaderResolver, HeaderResolver, HeaderVariant};
pub use table::TableStitcher;
pub use types::{PeriodLabelSet, StatementRecord, StatementTable};

use scraper::Selector;

use crate::core::error::{HarvestError, Result};

pub(crate) fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| HarvestError::Config(format!("invalid selector `{}`: {}", css, e)))
}
