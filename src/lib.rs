pub mod browser;
pub mod core;
pub mod fundamentals;
pub mod harvest;
pub mod storage;
pub mod utils;

// Re-exports
pub use crate::core::config::HarvestConfig;
pub use crate::core::error::{HarvestError, Result};
pub use crate::core::types::{ElementHandle, Locator, PageProvider};
pub use fundamentals::report::{PeriodType, StatementType};
pub use fundamentals::tickers::{Ticker, TickerUniverse};
pub use harvest::{HarvestReport, Harvester};
pub use storage::{ArtifactLocation, ArtifactStore, ConflictPolicy};
