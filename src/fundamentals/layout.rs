//! Selectors and markers of the fundamentals and quote pages.
//!
//! Extraction is coupled to one specific rendering of these pages. When the
//! site changes its markup, this is the first place to look; the header
//! offsets live with the header variants in `parsing::header`.

use crate::fundamentals::report::StatementType;

const STATEMENT_TAB_BASE: &str =
    "https://research.tdameritrade.com/grid/public/research/stocks/fundamentals/statement/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLayout {
    /// Statement sub-tables; each contributes its body rows.
    pub section_table: String,
    /// Header sections whose first row carries the period dates.
    pub header_section: String,
    /// Span inside the radio label of the active period view.
    pub checked_period_label: String,
    pub statement_tab_base: String,
    pub competitor_table: String,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            section_table: "table.section-content".to_string(),
            header_section: "thead".to_string(),
            checked_period_label: "label.ui-radio-button.checked span".to_string(),
            statement_tab_base: STATEMENT_TAB_BASE.to_string(),
            competitor_table: "table#cr_competitors_table".to_string(),
        }
    }
}

impl PageLayout {
    pub fn statement_tab_href(&self, statement: StatementType) -> String {
        format!("{}{}", self.statement_tab_base, statement.tab_segment())
    }

    /// Inverse of [`statement_tab_href`](Self::statement_tab_href).
    pub fn statement_for_href(&self, href: &str) -> Option<StatementType> {
        href.strip_prefix(&self.statement_tab_base)
            .and_then(|segment| segment.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_tab_hrefs_round_trip() {
        let layout = PageLayout::default();
        assert_eq!(
            layout.statement_tab_href(StatementType::CashFlow),
            "https://research.tdameritrade.com/grid/public/research/stocks/fundamentals/statement/cashflow"
        );
        for statement in StatementType::iter() {
            let href = layout.statement_tab_href(statement);
            assert_eq!(layout.statement_for_href(&href), Some(statement));
        }
        assert_eq!(layout.statement_for_href("https://example.com/cashflow"), None);
    }
}
