// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod initialization_tests;

use metricache_domain::{Decimal, PeriodKey};
use time::OffsetDateTime;
use time::macros::datetime;

pub fn period(year: i32, month: u8) -> PeriodKey {
    PeriodKey::new(year, month).unwrap()
}

pub fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

pub fn written_at() -> OffsetDateTime {
    datetime!(2025-06-15 09:30:00 UTC)
}

pub fn later() -> OffsetDateTime {
    datetime!(2025-06-16 10:00:00 UTC)
}
