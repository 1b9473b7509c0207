use scraper::{ElementRef, Html, Selector};

use super::header::{header_texts, FixedOffsetHeaderResolver, HeaderResolver};
use super::parse_selector;
use super::types::{PeriodLabelSet, StatementRecord, StatementTable};
use crate::core::error::{HarvestError, Result};
use crate::fundamentals::layout::PageLayout;
use crate::fundamentals::report::{PeriodType, StatementType};
use crate::fundamentals::tickers::Ticker;

/// Merges the statement sub-tables of a rendered page into one table.
pub struct TableStitcher<R = FixedOffsetHeaderResolver> {
    layout: PageLayout,
    resolver: R,
}

impl TableStitcher {
    pub fn new(layout: PageLayout) -> Self {
        Self::with_resolver(layout, FixedOffsetHeaderResolver)
    }
}

impl<R: HeaderResolver> TableStitcher<R> {
    pub fn with_resolver(layout: PageLayout, resolver: R) -> Self {
        Self { layout, resolver }
    }

    /// Resolves the period labels and stitches the body rows of `html` into
    /// records tagged with `subject`.
    pub fn extract(
        &self,
        html: &str,
        subject: &Ticker,
        statement_type: StatementType,
        period_type: PeriodType,
    ) -> Result<StatementTable> {
        let document = Html::parse_document(html);
        let headers = header_texts(&document, &self.layout)?;
        let labels = self.resolver.resolve(period_type, &headers)?;
        self.stitch(&document, labels, subject, statement_type, period_type)
    }

    pub fn stitch(
        &self,
        document: &Html,
        period_labels: PeriodLabelSet,
        subject: &Ticker,
        statement_type: StatementType,
        period_type: PeriodType,
    ) -> Result<StatementTable> {
        let (line_items, data_rows) = self.collect_columns(document)?;

        if line_items.len() != data_rows.len() {
            return Err(HarvestError::layout_mismatch(format!(
                "{} {} {}: {} line items but {} data rows",
                subject,
                statement_type,
                period_type,
                line_items.len(),
                data_rows.len()
            )));
        }

        let mut records = Vec::with_capacity(line_items.len());
        for (line_item, values) in line_items.into_iter().zip(data_rows) {
            if values.len() != period_labels.len() {
                return Err(HarvestError::layout_mismatch(format!(
                    "{} {} {}: row {:?} has {} values for {} period labels",
                    subject,
                    statement_type,
                    period_type,
                    line_item,
                    values.len(),
                    period_labels.len()
                )));
            }
            records.push(StatementRecord {
                subject: subject.clone(),
                statement_type,
                period_type,
                line_item,
                values,
                period_labels: period_labels.clone(),
            });
        }

        log::debug!(
            "Stitched {} rows for {} {} {}",
            records.len(),
            subject,
            statement_type,
            period_type
        );

        Ok(StatementTable {
            subject: subject.clone(),
            statement_type,
            period_type,
            period_labels,
            records,
        })
    }

    /// Line-item labels and data rows of every sub-table, in page order.
    fn collect_columns(&self, document: &Html) -> Result<(Vec<String>, Vec<Vec<String>>)> {
        let table = parse_selector(&self.layout.section_table)?;
        let row = parse_selector("tbody > tr")?;
        let label_cell = parse_selector("th")?;
        let data_cell = parse_selector("td")?;

        let mut line_items = Vec::new();
        let mut data_rows = Vec::new();
        let mut tables = 0usize;

        for section in document.select(&table) {
            tables += 1;
            for tr in section.select(&row) {
                line_items.extend(cell_texts(tr, &label_cell));
                data_rows.push(cell_texts(tr, &data_cell));
            }
        }

        if tables == 0 {
            return Err(HarvestError::element_not_found(format!(
                "statement sub-tables ({})",
                self.layout.section_table
            )));
        }
        Ok((line_items, data_rows))
    }
}

fn cell_texts(row: ElementRef<'_>, cell: &Selector) -> Vec<String> {
    row.select(cell)
        .map(|c| c.text().collect::<String>().trim().to_string())
        .collect()
}
