use scraper::Html;
use std::time::Duration;

use crate::core::config::HarvestConfig;
use crate::core::error::{HarvestError, Result};
use crate::core::types::{Locator, PageProvider};
use crate::fundamentals::layout::PageLayout;
use crate::fundamentals::parsing::parse_selector;
use crate::fundamentals::report::{PeriodType, StatementType};

/// Drives the Annual/Quarter radio control and the statement tabs of the
/// fundamentals page.
#[derive(Debug, Clone)]
pub struct PeriodViewController {
    layout: PageLayout,
    click_timeout: Duration,
    settle_delay: Duration,
    statement_delay: Duration,
}

impl PeriodViewController {
    pub fn new(
        layout: PageLayout,
        click_timeout: Duration,
        settle_delay: Duration,
        statement_delay: Duration,
    ) -> Self {
        Self {
            layout,
            click_timeout,
            settle_delay,
            statement_delay,
        }
    }

    pub fn from_config(config: &HarvestConfig) -> Self {
        Self::new(
            config.layout.clone(),
            config.click_timeout,
            config.settle_delay,
            config.statement_delay,
        )
    }

    /// Period named by the checked radio label, if the page has one.
    pub fn active_period(&self, html: &str) -> Option<PeriodType> {
        let selector = parse_selector(&self.layout.checked_period_label).ok()?;
        let document = Html::parse_document(html);
        let text = document
            .select(&selector)
            .next()?
            .text()
            .collect::<String>();
        PeriodType::from_label(&text)
    }

    async fn read_active<P: PageProvider + ?Sized>(&self, provider: &mut P) -> Result<PeriodType> {
        let html = provider.current_html().await?;
        self.active_period(&html)
            .ok_or_else(|| HarvestError::element_not_found("checked period control"))
    }

    /// Switches to the period that is not active and returns it.
    pub async fn toggle<P: PageProvider + ?Sized>(&self, provider: &mut P) -> Result<PeriodType> {
        let active = self.read_active(provider).await?;
        self.switch(provider, active.other()).await
    }

    /// Makes `period` the active view; a no-op when it already is.
    pub async fn activate<P: PageProvider + ?Sized>(
        &self,
        provider: &mut P,
        period: PeriodType,
    ) -> Result<()> {
        if self.read_active(provider).await? == period {
            log::debug!("{} view already active", period);
            return Ok(());
        }
        self.switch(provider, period).await.map(|_| ())
    }

    async fn switch<P: PageProvider + ?Sized>(
        &self,
        provider: &mut P,
        target: PeriodType,
    ) -> Result<PeriodType> {
        let locator = Locator::SpanText(target.label().to_string());
        let control = provider.find_clickable(&locator, self.click_timeout).await?;
        provider.click(&control).await?;
        tokio::time::sleep(self.settle_delay).await;

        let now = self.read_active(provider).await?;
        if now != target {
            return Err(HarvestError::layout_mismatch(format!(
                "clicked {} but the {} view is still active",
                target, now
            )));
        }
        log::debug!("Switched to {} view", now);
        Ok(now)
    }

    /// Opens the tab of `statement`. The page shows the annual view after a
    /// tab switch.
    pub async fn open_statement<P: PageProvider + ?Sized>(
        &self,
        provider: &mut P,
        statement: StatementType,
    ) -> Result<()> {
        tokio::time::sleep(self.statement_delay).await;
        let locator = Locator::LinkHref(self.layout.statement_tab_href(statement));
        let tab = provider.find_clickable(&locator, self.click_timeout).await?;
        provider.click(&tab).await?;
        log::debug!("Opened {} tab", statement);
        Ok(())
    }
}
