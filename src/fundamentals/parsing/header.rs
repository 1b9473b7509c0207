use scraper::Html;

use super::parse_selector;
use super::types::PeriodLabelSet;
use crate::core::error::{HarvestError, Result};
use crate::fundamentals::layout::PageLayout;
use crate::fundamentals::report::PeriodType;

/// Header text length (in characters) of an annual table showing four years.
pub const ANNUAL_FOUR_COLUMN_LEN: usize = 48;

const QUARTER_OFFSETS: [(usize, usize); 4] = [(0, 7), (15, 22), (30, 37), (45, 52)];
const ANNUAL_FOUR_OFFSETS: [(usize, usize); 4] = [(0, 4), (12, 16), (24, 28), (36, 40)];
const ANNUAL_FIVE_OFFSETS: [(usize, usize); 5] =
    [(0, 4), (12, 16), (24, 28), (36, 40), (48, 52)];

/// Fixed-width header layouts, keyed by period view and raw text length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderVariant {
    QuarterFourColumn,
    AnnualFourColumn,
    AnnualFiveColumn,
}

impl HeaderVariant {
    pub fn detect(period: PeriodType, header_text: &str) -> HeaderVariant {
        match period {
            PeriodType::Quarter => HeaderVariant::QuarterFourColumn,
            PeriodType::Annual if header_text.chars().count() == ANNUAL_FOUR_COLUMN_LEN => {
                HeaderVariant::AnnualFourColumn
            }
            PeriodType::Annual => HeaderVariant::AnnualFiveColumn,
        }
    }

    pub fn offsets(&self) -> &'static [(usize, usize)] {
        match self {
            HeaderVariant::QuarterFourColumn => &QUARTER_OFFSETS,
            HeaderVariant::AnnualFourColumn => &ANNUAL_FOUR_OFFSETS,
            HeaderVariant::AnnualFiveColumn => &ANNUAL_FIVE_OFFSETS,
        }
    }

    pub fn extract(&self, header_text: &str) -> PeriodLabelSet {
        let labels = self
            .offsets()
            .iter()
            .map(|&(start, end)| slice_chars(header_text, start, end))
            .collect();
        PeriodLabelSet::new(labels)
    }
}

/// Derives the period labels of the statement table in view.
pub trait HeaderResolver {
    fn resolve(&self, period: PeriodType, header_texts: &[String]) -> Result<PeriodLabelSet>;
}

/// Slices each header row at the fixed offsets of its [`HeaderVariant`].
///
/// Every sub-table repeats the same date header, so all rows must agree; the
/// last row is the one returned. Disagreeing rows mean the page no longer
/// looks the way the offsets assume.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedOffsetHeaderResolver;

impl HeaderResolver for FixedOffsetHeaderResolver {
    fn resolve(&self, period: PeriodType, header_texts: &[String]) -> Result<PeriodLabelSet> {
        let mut resolved: Option<(usize, PeriodLabelSet)> = None;

        for (row, text) in header_texts.iter().enumerate() {
            let variant = HeaderVariant::detect(period, text);
            let labels = variant.extract(text);
            log::debug!(
                "Header row {} ({} chars) -> {:?}: {:?}",
                row,
                text.chars().count(),
                variant,
                labels.as_slice()
            );

            if let Some((first_row, first)) = &resolved {
                if *first != labels {
                    return Err(HarvestError::layout_mismatch(format!(
                        "header row {} reads {:?} but row {} reads {:?}",
                        row,
                        labels.as_slice(),
                        first_row,
                        first.as_slice()
                    )));
                }
            }
            resolved = Some((row, labels));
        }

        resolved
            .map(|(_, labels)| labels)
            .ok_or_else(|| HarvestError::element_not_found("statement table header"))
    }
}

/// Raw text of the first row of every header section on the page, text
/// nodes concatenated with whitespace kept.
pub fn header_texts(document: &Html, layout: &PageLayout) -> Result<Vec<String>> {
    let section = parse_selector(&layout.header_section)?;
    let row = parse_selector("tr")?;

    Ok(document
        .select(&section)
        .filter_map(|head| head.select(&row).next())
        .map(|tr| tr.text().collect::<String>())
        .collect())
}

/// Character-indexed slice that clamps out-of-range bounds to the text.
fn slice_chars(text: &str, start: usize, end: usize) -> String {
    text.chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}
