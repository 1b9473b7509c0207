use super::*;
use crate::core::error::HarvestError;
use crate::fundamentals::layout::PageLayout;
use crate::fundamentals::report::{PeriodType, StatementType};
use crate::fundamentals::tickers::Ticker;

/// Renders a statement page whose header cells (all but the last) are padded
/// to `width`, so the concatenated header text has the fixed widths the
/// resolver slices.
fn statement_page(labels: &[&str], width: usize, sections: &[&[(&str, &[&str])]]) -> String {
    let last = labels.len().saturating_sub(1);
    let header: String = labels
        .iter()
        .enumerate()
        .map(|(i, l)| {
            if i == last {
                format!("<th>{}</th>", l)
            } else {
                format!("<th>{:<width$}</th>", l, width = width)
            }
        })
        .collect();
    let mut html = String::from("<html><body>");
    for rows in sections {
        html.push_str("<table class=\"section-content\"><thead><tr>");
        html.push_str(&header);
        html.push_str("</tr></thead><tbody>");
        for (item, values) in rows.iter() {
            html.push_str(&format!("<tr><th>{}</th>", item));
            for v in values.iter() {
                html.push_str(&format!("<td>{}</td>", v));
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");
    }
    html.push_str("</body></html>");
    html
}

#[test]
fn test_extract_quarterly_income_statement() {
    let html = statement_page(
        &["03/2024", "12/2023", "09/2023", "06/2023"],
        15,
        &[
            &[("Revenue", &["10", "9", "8", "7"])],
            &[
                ("Net Income", &["3", "2", "2", "1"]),
                ("EPS", &["0.3", "0.2", "0.2", "0.1"]),
            ],
        ],
    );
    let stitcher = TableStitcher::new(PageLayout::default());
    let subject = Ticker::new("MSFT").unwrap();

    let table = stitcher
        .extract(&html, &subject, StatementType::IncomeStatement, PeriodType::Quarter)
        .unwrap();

    assert_eq!(
        table.period_labels.as_slice(),
        &["03/2024", "12/2023", "09/2023", "06/2023"]
    );
    assert_eq!(table.len(), 3);
    assert_eq!(
        table.csv_header(),
        vec!["items", "03/2024", "12/2023", "09/2023", "06/2023", "ticker"]
    );
    let rows: Vec<Vec<String>> = table.csv_rows().collect();
    assert_eq!(rows[1], vec!["Net Income", "3", "2", "2", "1", "MSFT"]);
}

#[test]
fn test_extract_annual_five_year_cash_flow() {
    let html = statement_page(
        &["2023", "2022", "2021", "2020", "2019"],
        12,
        &[&[("Operating Cash Flow", &["5", "4", "3", "2", "1"])]],
    );
    let table = TableStitcher::new(PageLayout::default())
        .extract(
            &html,
            &Ticker::new("KO").unwrap(),
            StatementType::CashFlow,
            PeriodType::Annual,
        )
        .unwrap();

    assert_eq!(table.period_labels.len(), 5);
    assert_eq!(table.records[0].values.len(), 5);
}

#[test]
fn test_extract_rejects_view_that_disagrees_with_requested_period() {
    // Annual page parsed as if the quarter view were active.
    let html = statement_page(
        &["2023", "2022", "2021", "2020", "2019"],
        12,
        &[&[("Revenue", &["5", "4", "3", "2", "1"])]],
    );
    let err = TableStitcher::new(PageLayout::default())
        .extract(
            &html,
            &Ticker::new("KO").unwrap(),
            StatementType::IncomeStatement,
            PeriodType::Quarter,
        )
        .unwrap_err();
    assert!(matches!(err, HarvestError::LayoutMismatch { .. }));
}
