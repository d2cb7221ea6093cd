//! pt-BR currency rendering for FIPE prices.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Render a decimal price string as BRL, e.g. `"1234.5"` → `"R$ 1.234,50"`
/// (non-breaking space after the symbol). Strings that do not parse as a
/// number are returned unchanged.
pub fn format_price_brl(raw: &str) -> String {
    match parse_price(raw) {
        Some(value) => format_brl(value),
        None => raw.to_string(),
    }
}

fn parse_price(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    // rust_decimal tolerates `_` separators; a price string never has them.
    if trimmed.is_empty() || trimmed.contains('_') {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

fn format_brl(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}R$\u{a0}{grouped},{frac_part}")
}
