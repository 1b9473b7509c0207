//! Page providers. A live WebDriver session plugs in behind
//! [`PageProvider`](crate::core::types::PageProvider); the replay provider
//! serves captured snapshots.

pub mod replay;

pub use self::replay::{quote_snapshot_key, statement_snapshot_key, ReplayProvider};
