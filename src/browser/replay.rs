use async_trait::async_trait;
use scraper::Html;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::core::error::{HarvestError, Result};
use crate::core::types::{ElementHandle, Locator, PageProvider};
use crate::fundamentals::layout::PageLayout;
use crate::fundamentals::parsing::parse_selector;
use crate::fundamentals::report::{PeriodType, StatementType};

const EMPTY_PAGE: &str = "<html><head></head><body></body></html>";
const QUOTE_PAGE: &str = "quote.html";

/// Where snapshots come from.
#[derive(Debug, Clone)]
enum SnapshotSource {
    Dir(PathBuf),
    Pages(HashMap<String, String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum View {
    Fundamentals {
        symbol: String,
        statement: StatementType,
        period: PeriodType,
    },
    Quote {
        symbol: String,
    },
}

impl View {
    fn snapshot_key(&self) -> String {
        match self {
            View::Fundamentals {
                symbol,
                statement,
                period,
            } => statement_snapshot_key(symbol, *statement, *period),
            View::Quote { symbol } => quote_snapshot_key(symbol),
        }
    }
}

/// `<SYMBOL>/<statement-slug>-<period-slug>.html`
pub fn statement_snapshot_key(symbol: &str, statement: StatementType, period: PeriodType) -> String {
    format!("{}/{}-{}.html", symbol, statement.slug(), period.slug())
}

/// `<SYMBOL>/quote.html`
pub fn quote_snapshot_key(symbol: &str) -> String {
    format!("{}/{}", symbol, QUOTE_PAGE)
}

/// Serves captured pages in place of a live browser session.
///
/// Clicking a statement tab switches to that statement's annual view, and
/// clicking a period span switches the period, which is how the live
/// fundamentals page behaves. Pages that were never captured render empty.
#[derive(Debug, Clone)]
pub struct ReplayProvider {
    source: SnapshotSource,
    layout: PageLayout,
    view: Option<View>,
    closed: bool,
}

impl ReplayProvider {
    pub fn from_dir(dir: impl Into<PathBuf>, layout: PageLayout) -> Self {
        Self::with_source(SnapshotSource::Dir(dir.into()), layout)
    }

    /// Pages keyed as they would be laid out under a snapshot directory.
    pub fn from_pages(pages: HashMap<String, String>, layout: PageLayout) -> Self {
        Self::with_source(SnapshotSource::Pages(pages), layout)
    }

    fn with_source(source: SnapshotSource, layout: PageLayout) -> Self {
        Self {
            source,
            layout,
            view: None,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(HarvestError::Provider("replay session is closed".to_string()));
        }
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>> {
        match &self.source {
            SnapshotSource::Pages(pages) => Ok(pages.get(key).cloned()),
            SnapshotSource::Dir(dir) => {
                let path = dir.join(key);
                if path.is_file() {
                    Ok(Some(std::fs::read_to_string(path)?))
                } else {
                    Ok(None)
                }
            }
        }
    }

    fn view_for_url(url: &str) -> Result<View> {
        let parsed = Url::parse(url)
            .map_err(|e| HarvestError::Provider(format!("invalid URL {}: {}", url, e)))?;

        if let Some((_, symbol)) = parsed.query_pairs().find(|(key, _)| key == "symbol") {
            return Ok(View::Fundamentals {
                symbol: symbol.to_uppercase(),
                statement: StatementType::BalanceSheet,
                period: PeriodType::Annual,
            });
        }

        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();
        match segments.as_slice() {
            [.., "quotes", symbol] => Ok(View::Quote {
                symbol: symbol.to_uppercase(),
            }),
            _ => Err(HarvestError::Provider(format!(
                "no snapshot mapping for URL {}",
                url
            ))),
        }
    }

    fn render(&self) -> Result<String> {
        let Some(view) = &self.view else {
            return Ok(EMPTY_PAGE.to_string());
        };
        let key = view.snapshot_key();
        match self.load(&key)? {
            Some(html) => Ok(html),
            None => {
                log::debug!("No snapshot for {}, rendering an empty page", key);
                Ok(EMPTY_PAGE.to_string())
            }
        }
    }

    fn has_element(&self, html: &str, locator: &Locator) -> Result<bool> {
        let document = Html::parse_document(html);
        let found = match locator {
            Locator::Css(css) => document.select(&parse_selector(css)?).next().is_some(),
            Locator::SpanText(text) => document
                .select(&parse_selector("span")?)
                .any(|span| span.text().collect::<String>().trim() == text),
            Locator::LinkHref(href) => document
                .select(&parse_selector("a[href]")?)
                .any(|a| a.value().attr("href") == Some(href.as_str())),
        };
        Ok(found)
    }
}

#[async_trait]
impl PageProvider for ReplayProvider {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.ensure_open()?;
        let view = Self::view_for_url(url)?;
        log::debug!("Replaying {} as {}", url, view.snapshot_key());
        self.view = Some(view);
        Ok(())
    }

    async fn current_html(&mut self) -> Result<String> {
        self.ensure_open()?;
        self.render()
    }

    async fn find_clickable(
        &mut self,
        locator: &Locator,
        _timeout: Duration,
    ) -> Result<ElementHandle> {
        self.ensure_open()?;
        let html = self.render()?;
        if self.has_element(&html, locator)? {
            Ok(ElementHandle {
                locator: locator.clone(),
            })
        } else {
            Err(HarvestError::element_not_found(locator.to_string()))
        }
    }

    async fn click(&mut self, element: &ElementHandle) -> Result<()> {
        self.ensure_open()?;
        let Some(View::Fundamentals {
            statement, period, ..
        }) = self.view.as_mut()
        else {
            return Ok(());
        };

        match &element.locator {
            Locator::LinkHref(href) => {
                if let Some(next) = self.layout.statement_for_href(href) {
                    *statement = next;
                    *period = PeriodType::Annual;
                }
            }
            Locator::SpanText(text) => {
                if let Some(next) = PeriodType::from_label(text) {
                    *period = next;
                }
            }
            Locator::Css(_) => {}
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.view = None;
        Ok(())
    }
}
