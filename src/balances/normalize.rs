use crate::market_data::{fallback_label, PriceMap};
use crate::models::{AssetId, RawBalance, TokenLineItem};
use crate::numeric::{scale_amount, usd_value, DEFAULT_DECIMALS};

/// Value raw wallet balances against pre-fetched prices.
///
/// Priced assets use the price source's decimals, symbol and name. Unpriced
/// assets keep their raw amount, assume [`DEFAULT_DECIMALS`], take their
/// label from the address suffix and carry no price or value.
///
/// The result is sorted by USD value, highest first, with unknown values
/// ranked as zero. Ties keep input order.
pub fn normalize_balances(balances: &[RawBalance], prices: &PriceMap) -> Vec<TokenLineItem> {
    let mut items: Vec<TokenLineItem> = balances
        .iter()
        .map(|balance| line_item(balance, prices))
        .collect();

    // `sort_by` is stable.
    items.sort_by(|a, b| b.value_or_zero().cmp(&a.value_or_zero()));
    items
}

fn line_item(balance: &RawBalance, prices: &PriceMap) -> TokenLineItem {
    let asset_id = AssetId::parse(&balance.asset_address);

    match prices.get_id(&asset_id) {
        Some(info) => {
            let amount = scale_amount(&balance.raw_amount, info.decimals);
            let label = fallback_label(&balance.asset_address);
            TokenLineItem {
                asset_id,
                asset_address: balance.asset_address.clone(),
                display_symbol: if info.symbol.is_empty() { label.clone() } else { info.symbol.clone() },
                display_name: if info.name.is_empty() { label } else { info.name.clone() },
                decimals: info.decimals,
                raw_amount: balance.raw_amount.clone(),
                amount,
                unit_price_usd: Some(info.usd_price),
                value_usd: Some(usd_value(amount, info.usd_price)),
            }
        }
        None => {
            let label = fallback_label(&balance.asset_address);
            TokenLineItem {
                asset_id,
                asset_address: balance.asset_address.clone(),
                display_symbol: label.clone(),
                display_name: label,
                decimals: DEFAULT_DECIMALS,
                raw_amount: balance.raw_amount.clone(),
                amount: scale_amount(&balance.raw_amount, DEFAULT_DECIMALS),
                unit_price_usd: None,
                value_usd: None,
            }
        }
    }
}
