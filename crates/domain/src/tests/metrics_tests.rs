// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{cents, march_2025};
use crate::{
    ExternalHoursComponents, InvoicedTotalsComponents, MetricComponents, MetricKind,
    MetricSnapshot, SalesOrderTotalsComponents, UtilizationComponents, format_fixed, parse_fixed,
};
use rust_decimal::Decimal;
use time::OffsetDateTime;

#[test]
fn test_invoiced_amount_formula() {
    let components = InvoicedTotalsComponents {
        invoices_total: cents(20_000_000),
        credit_notes_total: cents(3_000_000),
        reversed_total: cents(2_000_000),
    };
    assert_eq!(components.amount(), cents(19_000_000));
    assert_eq!(components.headline(), Some(cents(19_000_000)));
}

#[test]
fn test_utilization_percent_formula() {
    let components = UtilizationComponents {
        available_hours: cents(16_000),
        logged_hours: cents(12_000),
        planned_hours: cents(14_000),
    };
    assert_eq!(components.utilization_percent(), Some(cents(7_500)));
}

#[test]
fn test_utilization_percent_is_undefined_without_available_hours() {
    let components = UtilizationComponents {
        available_hours: Decimal::ZERO,
        logged_hours: cents(800),
        planned_hours: Decimal::ZERO,
    };
    assert_eq!(components.utilization_percent(), None);
    assert_eq!(components.headline(), None);
}

#[test]
fn test_utilization_percent_rounds_to_two_places() {
    let components = UtilizationComponents {
        available_hours: cents(30_000),
        logged_hours: cents(10_000),
        planned_hours: Decimal::ZERO,
    };
    assert_eq!(components.utilization_percent(), Some(cents(3_333)));
}

#[test]
fn test_external_hours_has_no_headline() {
    assert_eq!(ExternalHoursComponents::default().headline(), None);
}

#[test]
fn test_sales_order_headline_is_total_amount() {
    let components = SalesOrderTotalsComponents {
        total_amount: cents(123_456),
    };
    assert_eq!(components.headline(), Some(cents(123_456)));
}

#[test]
fn test_snapshot_headline_follows_components() {
    let components = InvoicedTotalsComponents {
        invoices_total: cents(1_000),
        credit_notes_total: cents(250),
        reversed_total: Decimal::ZERO,
    };
    let snapshot = MetricSnapshot::new(march_2025(), components, OffsetDateTime::UNIX_EPOCH);
    assert_eq!(snapshot.headline(), Some(cents(750)));
    assert_eq!(snapshot.key(), &march_2025());
}

#[test]
fn test_fixed_decimal_text_round_trip_keeps_two_places() {
    assert_eq!(format_fixed(Decimal::ZERO), "0.00");
    assert_eq!(format_fixed(Decimal::new(12_345, 3)), "12.35");
    assert_eq!(parse_fixed("190000.00").unwrap(), cents(19_000_000));
    assert!(parse_fixed("not-a-number").is_err());
}

#[test]
fn test_metric_kind_string_forms() {
    for kind in MetricKind::ALL {
        assert_eq!(kind.as_str().parse::<MetricKind>().unwrap(), kind);
    }
    assert_eq!("invoiced".parse::<MetricKind>().unwrap(), MetricKind::InvoicedTotals);
    assert!("revenue".parse::<MetricKind>().is_err());
    assert!(MetricKind::Utilization.is_per_entity());
    assert!(!MetricKind::ExternalHours.is_per_entity());
}
