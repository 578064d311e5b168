// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod metrics_tests;

use crate::PeriodKey;
use rust_decimal::Decimal;

/// Builds a decimal from hundredths, e.g. `cents(12_050)` is `120.50`.
pub fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

pub fn march_2025() -> PeriodKey {
    PeriodKey::new(2025, 3).unwrap()
}
