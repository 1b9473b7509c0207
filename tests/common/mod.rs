#![allow(dead_code)]

use harvester::browser::{quote_snapshot_key, statement_snapshot_key, ReplayProvider};
use harvester::fundamentals::layout::PageLayout;
use harvester::{HarvestConfig, PeriodType, StatementType};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use strum::IntoEnumIterator;

pub const QUARTER_LABELS: [&str; 4] = ["03/2024", "12/2023", "09/2023", "06/2023"];
pub const ANNUAL_LABELS: [&str; 5] = ["2023", "2022", "2021", "2020", "2019"];

/// Header cells padded the way the live page pads them: quarter labels to 15
/// characters, years to 12, the last cell unpadded.
fn header_cells(period: PeriodType) -> String {
    let (labels, width): (&[&str], usize) = match period {
        PeriodType::Quarter => (&QUARTER_LABELS[..], 15),
        PeriodType::Annual => (&ANNUAL_LABELS[..], 12),
    };
    let last = labels.len() - 1;
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            if i == last {
                format!("<th>{}</th>", label)
            } else {
                format!("<th>{:<width$}</th>", label, width = width)
            }
        })
        .collect()
}

fn chrome(active: PeriodType) -> String {
    let layout = PageLayout::default();
    let mut html = String::new();
    for statement in StatementType::iter() {
        html.push_str(&format!(
            "<a href=\"{}\">{}</a>",
            layout.statement_tab_href(statement),
            statement
        ));
    }
    for period in PeriodType::iter() {
        let class = if period == active {
            "ui-radio-button checked"
        } else {
            "ui-radio-button"
        };
        html.push_str(&format!(
            "<label class=\"{}\"><input type=\"radio\"><span>{}</span></label>",
            class,
            period.label()
        ));
    }
    html
}

pub fn period_width(period: PeriodType) -> usize {
    match period {
        PeriodType::Quarter => QUARTER_LABELS.len(),
        PeriodType::Annual => ANNUAL_LABELS.len(),
    }
}

/// A statement page with one sub-table per entry of `sections`.
pub fn statement_page(period: PeriodType, sections: &[Vec<(String, Vec<String>)>]) -> String {
    let mut html = format!("<html><body>{}", chrome(period));
    for rows in sections {
        html.push_str("<table class=\"section-content\"><thead><tr>");
        html.push_str(&header_cells(period));
        html.push_str("</tr></thead><tbody>");
        for (item, values) in rows {
            html.push_str(&format!("<tr><th>{}</th>", item));
            for value in values {
                html.push_str(&format!("<td>{}</td>", value));
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");
    }
    html.push_str("</body></html>");
    html
}

/// Two sub-tables of well-formed rows, values tagged with the symbol so
/// tests can tell copies apart.
pub fn standard_page(symbol: &str, statement: StatementType, period: PeriodType) -> String {
    let row = |item: &str| {
        let values = (0..period_width(period))
            .map(|i| format!("{}-{}", symbol, i))
            .collect::<Vec<String>>();
        (format!("{} {}", statement, item), values)
    };
    statement_page(
        period,
        &[vec![row("first"), row("second")], vec![row("total")]],
    )
}

pub fn quote_page(competitors: &[&str]) -> String {
    let rows: String = competitors
        .iter()
        .map(|c| {
            format!(
                "<tr><td><a href=\"/market-data/quotes/{0}\">{0}</a></td><td>{0} Corp</td><td>1.5%</td></tr>",
                c
            )
        })
        .collect();
    format!(
        "<html><body><table id=\"cr_competitors_table\"><thead><tr><th>Name</th><th>Chg</th></tr></thead><tbody>{}</tbody></table></body></html>",
        rows
    )
}

/// Captured pages for a replay session.
#[derive(Default)]
pub struct Snapshots {
    pages: HashMap<String, String>,
}

impl Snapshots {
    pub fn new() -> Self {
        Self::default()
    }

    /// All six statement pages for `symbol`.
    pub fn company(mut self, symbol: &str) -> Self {
        for statement in StatementType::iter() {
            for period in PeriodType::iter() {
                self.pages.insert(
                    statement_snapshot_key(symbol, statement, period),
                    standard_page(symbol, statement, period),
                );
            }
        }
        self
    }

    pub fn quote(mut self, symbol: &str, competitors: &[&str]) -> Self {
        self.pages
            .insert(quote_snapshot_key(symbol), quote_page(competitors));
        self
    }

    pub fn replace(
        mut self,
        symbol: &str,
        statement: StatementType,
        period: PeriodType,
        html: String,
    ) -> Self {
        self.pages
            .insert(statement_snapshot_key(symbol, statement, period), html);
        self
    }

    pub fn remove(mut self, symbol: &str, statement: StatementType, period: PeriodType) -> Self {
        self.pages
            .remove(&statement_snapshot_key(symbol, statement, period));
        self
    }

    pub fn into_provider(self) -> ReplayProvider {
        ReplayProvider::from_pages(self.pages, PageLayout::default())
    }

    pub fn write_to(&self, dir: &Path) -> std::io::Result<()> {
        for (key, html) in &self.pages {
            let path = dir.join(key);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, html)?;
        }
        Ok(())
    }
}

pub fn test_config(data_dir: &Path) -> HarvestConfig {
    HarvestConfig {
        data_dir: data_dir.to_path_buf(),
        ..HarvestConfig::default()
    }
    .without_delays()
}
