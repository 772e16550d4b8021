//! Wallet balances: fetching raw indexer rows and valuing them.

mod normalize;
mod source;

pub use normalize::normalize_balances;
pub use source::{BalanceSource, IndexerBalanceSource, StaticBalanceSource};
