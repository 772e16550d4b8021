mod asset_id;
mod portfolio;
mod position;
mod token;

pub use asset_id::{
    canonicalize, equals, long_form, validate_account_address, AddressError, AssetId,
};
pub use portfolio::{Portfolio, PortfolioTotals, ProtocolPortfolio};
pub use position::{Position, PositionKind};
pub use token::{RawBalance, TokenLineItem};
