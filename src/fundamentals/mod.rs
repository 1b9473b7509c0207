pub mod competitors;
pub mod layout;
pub mod parsing;
pub mod period_view;
pub mod report;
pub mod tickers;

pub use competitors::{CompetitorClassification, CompetitorResolution, CompetitorResolver};
pub use layout::PageLayout;
pub use period_view::PeriodViewController;
pub use report::{PeriodType, StatementType};
pub use tickers::{Ticker, TickerUniverse};
