// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{EngineConfig, MetricService, MetricSources, MetricStores};
use metricache::{Clock, FixedClock};
use metricache_domain::{Decimal, PeriodKey, PeriodRange};
use metricache_source::{FixtureSources, RecordFixtures};
use std::sync::Arc;
use time::Date;
use time::macros::date;

pub const TODAY: Date = date!(2025 - 06 - 15);

/// Partner 1 is the company itself.
pub const INTERNAL_PARTNER: i64 = 1;

const FIXTURES: &str = r#"{
    "invoices": [
        { "id": 1, "kind": "invoice", "partner_id": 10, "date": "2025-03-03", "amount": "200000.00" },
        { "id": 2, "kind": "credit_note", "partner_id": 10, "date": "2025-03-10", "amount": "30000.00" },
        { "id": 3, "kind": "invoice", "reversed": true, "partner_id": 11, "date": "2025-03-12", "amount": "20000.00" },
        { "id": 4, "kind": "invoice", "partner_id": 1, "date": "2025-03-15", "amount": "500.00" },
        { "id": 5, "kind": "invoice", "partner_id": 12, "date": "2025-04-02", "amount": "1000.00" },
        { "id": 6, "kind": "invoice", "partner_id": 12, "date": "2025-06-02", "amount": "50.00" }
    ],
    "hours": [
        { "id": 1, "kind": "external", "date": "2025-03-04", "hours": "10.00" },
        { "id": 2, "kind": "subscription", "date": "2025-03-05", "hours": "4.00" }
    ],
    "sales_orders": [
        { "id": 1, "state": "confirmed", "partner_id": 10, "date": "2025-03-06", "amount": "1000.00" },
        { "id": 2, "state": "draft", "partner_id": 10, "date": "2025-03-07", "amount": "99.00" }
    ],
    "capacity": [
        { "id": 1, "employee_id": 7, "kind": "available", "date": "2025-03-03", "hours": "160.00" },
        { "id": 2, "employee_id": 7, "kind": "logged", "date": "2025-03-03", "hours": "120.00" },
        { "id": 3, "employee_id": 8, "kind": "logged", "date": "2025-03-04", "hours": "5.00" }
    ]
}"#;

pub struct Harness {
    pub service: MetricService,
    pub sources: FixtureSources,
    pub clock: Arc<FixedClock>,
}

pub fn test_config() -> EngineConfig {
    EngineConfig {
        internal_partner_id: Some(INTERNAL_PARTNER),
        ..EngineConfig::default()
    }
}

pub fn harness() -> Harness {
    harness_with(test_config())
}

pub fn harness_with(config: EngineConfig) -> Harness {
    let sources = RecordFixtures::from_json_str(FIXTURES)
        .unwrap()
        .into_sources();
    let clock = Arc::new(FixedClock::on(TODAY));
    let shared_clock: Arc<dyn Clock> = clock.clone();
    let service = MetricService::new(
        config,
        MetricSources {
            invoices: sources.invoices.clone(),
            hours: sources.hours.clone(),
            sales_orders: sources.sales_orders.clone(),
            capacity: sources.capacity.clone(),
        },
        MetricStores::in_memory(&shared_clock),
        shared_clock,
    );
    Harness {
        service,
        sources,
        clock,
    }
}

pub fn period(year: i32, month: u8) -> PeriodKey {
    PeriodKey::new(year, month).unwrap()
}

pub fn range(start: (i32, u8), end: (i32, u8)) -> PeriodRange {
    PeriodRange::new(period(start.0, start.1), period(end.0, end.1)).unwrap()
}

pub fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}
