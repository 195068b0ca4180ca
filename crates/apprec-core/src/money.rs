//! Currency parsing and rounding primitives.
//!
//! All monetary values are [`Decimal`]; floating point never enters the
//! arithmetic path. Tax rounding is half-up to two fractional digits.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Parse a dollar amount as it appears in receipt markup.
///
/// Strips one leading `$` and thousands separators. Empty or unparsable
/// input resolves to zero; amount cells are a tolerant layer, absence of a
/// number is not a structural failure.
pub fn parse_dollar(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    let stripped = trimmed.strip_prefix('$').unwrap_or(trimmed);
    let cleaned = stripped.replace(',', "");

    if cleaned.is_empty() {
        return Decimal::ZERO;
    }

    Decimal::from_str(&cleaned).unwrap_or(Decimal::ZERO)
}

/// Round a computed tax amount half-up to two decimal places.
pub fn round_tax(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
