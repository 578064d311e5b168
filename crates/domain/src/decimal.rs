// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Fixed-precision helpers for monetary and hour values.
//!
//! Every component is held at two decimal places so that sums are
//! reproducible regardless of record order.

use crate::error::{AggregationError, DomainError};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Number of decimal places kept for monetary and hour fields.
pub const SCALE: u32 = 2;

/// Rounds `value` to [`SCALE`] places, half away from zero.
#[must_use]
pub fn fixed(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(SCALE);
    rounded
}

/// Adds `value` to `total` at fixed precision.
///
/// # Errors
///
/// Returns an error if the sum overflows.
pub fn add_fixed(
    total: Decimal,
    value: Decimal,
    field: &'static str,
) -> Result<Decimal, AggregationError> {
    total
        .checked_add(fixed(value))
        .map(fixed)
        .ok_or(AggregationError::Overflow { field })
}

/// Parses a stored decimal column.
///
/// # Errors
///
/// Returns an error if `text` is not a decimal number.
pub fn parse_fixed(text: &str) -> Result<Decimal, DomainError> {
    Decimal::from_str(text.trim())
        .map(fixed)
        .map_err(|e| DomainError::InvalidDecimal {
            value: text.to_string(),
            reason: e.to_string(),
        })
}

/// Renders a decimal in its canonical stored form (always two places).
#[must_use]
pub fn format_fixed(value: Decimal) -> String {
    fixed(value).to_string()
}
