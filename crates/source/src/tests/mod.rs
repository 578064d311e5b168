// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod fixture_tests;
mod memory_tests;
mod timeout_tests;

use metricache_domain::{CapacityEntry, CapacityKind, Decimal, InvoiceKind, InvoiceRecord, PeriodKey};
use time::Date;

pub fn period(year: i32, month: u8) -> PeriodKey {
    PeriodKey::new(year, month).unwrap()
}

pub fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

pub fn invoice(id: i64, date: Date) -> InvoiceRecord {
    InvoiceRecord {
        id,
        kind: InvoiceKind::Invoice,
        reversed: false,
        partner_id: 5,
        date,
        amount: cents(10_000),
    }
}

pub fn logged(id: i64, employee_id: i64, date: Date) -> CapacityEntry {
    CapacityEntry {
        id,
        employee_id,
        kind: CapacityKind::Logged,
        date,
        hours: cents(800),
    }
}
