//! Currency formatting using `rust_decimal`.
//!
//! Amounts are rounded to two places with half-away-from-zero rounding
//! and rendered as pounds sterling: `£1,234.50`, `-£12.00`.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

/// Interpret an answer as an amount. Accepts numbers and numeric strings
/// (surrounding whitespace, a leading `£` and `,` separators are tolerated).
pub fn parse_amount(v: &Value) -> Option<Decimal> {
    match v {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(Decimal::from(u))
            } else {
                n.as_f64().and_then(Decimal::from_f64)
            }
        }
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .trim_start_matches('£')
                .chars()
                .filter(|c| *c != ',')
                .collect();
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse::<Decimal>().ok()
        }
        _ => None,
    }
}

/// Format an amount as GBP with two decimals and thousands grouping.
pub fn format_gbp(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!(
        "{}£{}.{}",
        if negative { "-" } else { "" },
        group_thousands(whole),
        frac
    )
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
