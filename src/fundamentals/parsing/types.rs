use serde::{Deserialize, Serialize};

use crate::fundamentals::report::{PeriodType, StatementType};
use crate::fundamentals::tickers::Ticker;

/// Ordered period labels shown above a statement table (4 or 5 of them).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodLabelSet(Vec<String>);

impl PeriodLabelSet {
    pub fn new(labels: Vec<String>) -> Self {
        Self(labels)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRecord {
    pub subject: Ticker,
    pub statement_type: StatementType,
    pub period_type: PeriodType,
    pub line_item: String,
    /// One value per period label, in label order.
    pub values: Vec<String>,
    pub period_labels: PeriodLabelSet,
}

/// All rows extracted for one (subject, statement, period) visit, in page
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementTable {
    pub subject: Ticker,
    pub statement_type: StatementType,
    pub period_type: PeriodType,
    pub period_labels: PeriodLabelSet,
    pub records: Vec<StatementRecord>,
}

impl StatementTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// CSV header: `items`, one column per period label, `ticker`.
    pub fn csv_header(&self) -> Vec<String> {
        let mut header = Vec::with_capacity(self.period_labels.len() + 2);
        header.push("items".to_string());
        header.extend(self.period_labels.as_slice().iter().cloned());
        header.push("ticker".to_string());
        header
    }

    pub fn csv_rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.records.iter().map(|record| {
            let mut row = Vec::with_capacity(record.values.len() + 2);
            row.push(record.line_item.clone());
            row.extend(record.values.iter().cloned());
            row.push(record.subject.to_string());
            row
        })
    }
}
