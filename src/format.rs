use std::fmt::Write;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::Portfolio;

/// Display precision for token amounts in text output.
pub const AMOUNT_DECIMALS: u32 = 6;

/// Format a USD value for humans: `$1,234.50`, `-$30.00`.
///
/// Rounds half away from zero to cents. JSON output never goes through here.
pub fn format_usd(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();

    let mut digits = rounded.abs();
    digits.rescale(2);
    let body = group_thousands(&digits.to_string());

    if negative {
        format!("-${body}")
    } else {
        format!("${body}")
    }
}

/// Like [`format_usd`], with `n/a` for an unknown value.
pub fn format_optional_usd(value: Option<Decimal>) -> String {
    value.map(format_usd).unwrap_or_else(|| "n/a".to_string())
}

/// Token amount rounded to [`AMOUNT_DECIMALS`] without trailing zeros.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(AMOUNT_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.abs().to_string();
    let grouped = group_thousands(&text);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Plain-text portfolio report for terminals.
pub fn render_portfolio(portfolio: &Portfolio) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Portfolio for {}", portfolio.address);
    let _ = writeln!(out, "As of {}", portfolio.date_time.to_rfc3339());
    let _ = writeln!(out);

    let _ = writeln!(out, "Wallet ({})", format_usd(portfolio.wallet_value_usd()));
    for token in &portfolio.tokens {
        let _ = writeln!(
            out,
            "  {:<12} {:>24}  {:>16}",
            token.display_symbol,
            format_amount(token.amount),
            format_optional_usd(token.value_usd)
        );
    }

    for protocol in &portfolio.protocols {
        if protocol.positions.is_empty() {
            continue;
        }
        let _ = writeln!(
            out,
            "{} ({})",
            protocol.protocol_key,
            format_usd(protocol.total_value_usd)
        );
        for position in &protocol.positions {
            let _ = writeln!(
                out,
                "  {:<14} {:<24} {:>16}",
                position.kind.as_str(),
                position.symbol_label,
                format_usd(position.signed_value())
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Protocols: {}", format_usd(portfolio.protocols_value_usd()));
    let _ = writeln!(out, "Total:     {}", format_usd(portfolio.total_value_usd()));
    out
}

/// Comma-separate the integer part of an unsigned decimal string.
fn group_thousands(s: &str) -> String {
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) if !f.is_empty() => format!("{grouped}.{f}"),
        _ => grouped,
    }
}
