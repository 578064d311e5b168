// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::cents;
use crate::{FixtureError, RecordFixtures};
use metricache_domain::{CapacityKind, HoursKind, InvoiceKind, SalesOrderState};
use time::macros::date;

const DOCUMENT: &str = r#"{
    "invoices": [
        { "id": 1, "kind": "invoice", "partner_id": 7, "date": "2025-03-04", "amount": "1250.00" },
        { "id": 2, "kind": "credit_note", "reversed": true, "partner_id": 7, "date": "2025-03-05", "amount": "50.00" }
    ],
    "hours": [
        { "id": 1, "kind": "subscription_allotment", "date": "2025-03-01", "hours": "20.00" }
    ],
    "sales_orders": [
        { "id": 1, "state": "done", "partner_id": 9, "date": "2025-03-02", "amount": "300.00" }
    ],
    "capacity": [
        { "id": 1, "employee_id": 4, "kind": "available", "date": "2025-03-03", "hours": "8.00" },
        { "id": 2, "employee_id": 2, "kind": "logged", "date": "2025-03-03", "hours": "6.00" },
        { "id": 3, "employee_id": 4, "kind": "logged", "date": "2025-03-04", "hours": "7.50" }
    ]
}"#;

#[test]
fn test_document_parses_every_record_type() {
    let fixtures = RecordFixtures::from_json_str(DOCUMENT).unwrap();

    assert_eq!(fixtures.invoices.len(), 2);
    assert_eq!(fixtures.invoices[0].kind, InvoiceKind::Invoice);
    assert!(!fixtures.invoices[0].reversed);
    assert!(fixtures.invoices[1].reversed);
    assert_eq!(fixtures.invoices[0].amount, cents(125_000));
    assert_eq!(fixtures.invoices[0].date, date!(2025 - 03 - 04));

    assert_eq!(fixtures.hours[0].kind, HoursKind::SubscriptionAllotment);
    assert_eq!(fixtures.sales_orders[0].state, SalesOrderState::Done);
    assert_eq!(fixtures.capacity[0].kind, CapacityKind::Available);
}

#[test]
fn test_missing_sections_default_to_empty() {
    let fixtures = RecordFixtures::from_json_str(r#"{ "invoices": [] }"#).unwrap();
    assert_eq!(fixtures, RecordFixtures::default());
}

#[test]
fn test_employee_ids_are_distinct_and_sorted() {
    let fixtures = RecordFixtures::from_json_str(DOCUMENT).unwrap();
    assert_eq!(fixtures.employee_ids(), vec![2, 4]);
}

#[test]
fn test_into_sources_splits_by_domain() {
    let sources = RecordFixtures::from_json_str(DOCUMENT)
        .unwrap()
        .into_sources();
    assert_eq!(sources.invoices.len(), 2);
    assert_eq!(sources.hours.len(), 1);
    assert_eq!(sources.sales_orders.len(), 1);
    assert_eq!(sources.capacity.len(), 3);
}

#[test]
fn test_invalid_document_is_a_parse_error() {
    let result = RecordFixtures::from_json_str(r#"{ "invoices": [ { "id": "x" } ] }"#);
    assert!(matches!(result, Err(FixtureError::Parse(_))));
}

#[test]
fn test_missing_file_is_an_io_error() {
    let result = RecordFixtures::from_path("/nonexistent/metricache/fixtures.json");
    assert!(matches!(result, Err(FixtureError::Io { .. })));
}
