mod cache;
mod prices;
pub mod providers;
mod registry;
mod resolver;
mod source;

pub use cache::{PriceCache, DEFAULT_PRICE_TTL};
pub use prices::{PriceInfo, PriceMap};
pub use registry::{fallback_label, ResolvedToken, TokenMeta, TokenRegistry};
pub use resolver::PriceResolver;
pub use source::{NoopPriceSource, PriceSource, TokenPrice};
