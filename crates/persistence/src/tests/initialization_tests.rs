// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{cents, period, written_at};
use crate::Persistence;
use metricache_domain::{InvoicedTotalsComponents, MetricKind};

#[test]
fn test_in_memory_databases_are_isolated() {
    let mut first = Persistence::new_in_memory().unwrap();
    let mut second = Persistence::new_in_memory().unwrap();

    first
        .upsert_invoiced_totals(
            period(2025, 3),
            &InvoicedTotalsComponents {
                invoices_total: cents(100),
                ..Default::default()
            },
            written_at(),
        )
        .unwrap();

    assert_eq!(first.count_snapshots(MetricKind::InvoicedTotals).unwrap(), 1);
    assert_eq!(second.count_snapshots(MetricKind::InvoicedTotals).unwrap(), 0);
}

#[test]
fn test_unique_key_indexes_present_after_migration() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    assert!(persistence.verify_unique_key_indexes().is_ok());
}

#[test]
fn test_file_database_survives_reopen() {
    let path = std::env::temp_dir().join(format!(
        "metricache-persistence-{}.sqlite3",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    {
        let mut persistence = Persistence::new_with_file(&path).unwrap();
        persistence
            .upsert_invoiced_totals(
                period(2025, 1),
                &InvoicedTotalsComponents {
                    invoices_total: cents(4_200),
                    ..Default::default()
                },
                written_at(),
            )
            .unwrap();
    }

    let mut reopened = Persistence::new_with_file(&path).unwrap();
    let snapshot = reopened.get_invoiced_totals(period(2025, 1)).unwrap().unwrap();
    assert_eq!(snapshot.headline(), Some(cents(4_200)));

    drop(reopened);
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}
