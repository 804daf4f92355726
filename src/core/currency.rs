//! USD display formatting

use rust_decimal::{Decimal, RoundingStrategy};

const ZERO_USD: &str = "$0.00";

/// Renders an amount as US dollars with thousands grouping and exactly two
/// fraction digits, e.g. `$1,234.50` or `-$3.00`.
pub fn format_currency(amount: Decimal) -> String {
    try_format(amount).unwrap_or_else(|| ZERO_USD.to_string())
}

fn try_format(amount: Decimal) -> Option<String> {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);

    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = rounded.abs().to_string();
    let (whole, fraction) = digits.split_once('.')?;
    if fraction.len() != 2 || whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    Some(format!("{sign}${grouped}.{fraction}"))
}
