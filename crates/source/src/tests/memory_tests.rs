// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{invoice, logged, period};
use crate::MemorySource;
use futures::TryStreamExt;
use metricache::{InvoicedTotals, SourceAdapter, SourceError, Utilization};
use metricache_domain::{CapacityEntry, EntityPeriodKey, InvoiceRecord};
use time::macros::date;

async fn collect_invoices(
    source: &MemorySource<InvoiceRecord>,
    month: u8,
    chunk_size: usize,
) -> Result<Vec<Vec<InvoiceRecord>>, SourceError> {
    SourceAdapter::<InvoicedTotals>::fetch(source, &period(2025, month), chunk_size)
        .try_collect()
        .await
}

#[tokio::test]
async fn test_pages_are_bounded_by_chunk_size() {
    let source = MemorySource::new(
        (1..=5)
            .map(|id| invoice(id, date!(2025 - 03 - 10)))
            .collect(),
    );

    let pages = collect_invoices(&source, 3, 2).await.unwrap();
    let sizes: Vec<usize> = pages.iter().map(Vec::len).collect();

    assert_eq!(sizes, vec![2, 2, 1]);
    assert_eq!(source.fetches(), 1);
    assert_eq!(source.pages(), 3);
}

#[tokio::test]
async fn test_exact_multiple_ends_with_an_empty_probe() {
    let source = MemorySource::new(
        (1..=4)
            .map(|id| invoice(id, date!(2025 - 03 - 10)))
            .collect(),
    );

    let pages = collect_invoices(&source, 3, 2).await.unwrap();

    assert_eq!(pages.len(), 2);
    assert_eq!(source.pages(), 3);
}

#[tokio::test]
async fn test_only_records_of_the_key_month_are_served() {
    let source = MemorySource::new(vec![
        invoice(1, date!(2025 - 02 - 28)),
        invoice(2, date!(2025 - 03 - 01)),
        invoice(3, date!(2025 - 03 - 31)),
        invoice(4, date!(2025 - 04 - 01)),
    ]);

    let ids: Vec<i64> = collect_invoices(&source, 3, 10)
        .await
        .unwrap()
        .into_iter()
        .flatten()
        .map(|r| r.id)
        .collect();

    assert_eq!(ids, vec![2, 3]);
}

#[tokio::test]
async fn test_no_matching_records_yields_no_pages() {
    let source = MemorySource::new(vec![invoice(1, date!(2025 - 01 - 10))]);
    let pages = collect_invoices(&source, 6, 10).await.unwrap();
    assert!(pages.is_empty());
}

#[tokio::test]
async fn test_capacity_is_scoped_to_the_employee() {
    let source: MemorySource<CapacityEntry> = MemorySource::new(vec![
        logged(1, 7, date!(2025 - 03 - 03)),
        logged(2, 8, date!(2025 - 03 - 03)),
        logged(3, 7, date!(2025 - 04 - 01)),
    ]);
    let key = EntityPeriodKey::new(period(2025, 3), 7);

    let pages: Vec<Vec<CapacityEntry>> = SourceAdapter::<Utilization>::fetch(&source, &key, 100)
        .try_collect()
        .await
        .unwrap();

    let ids: Vec<i64> = pages.into_iter().flatten().map(|e| e.id).collect();
    assert_eq!(ids, vec![1]);
}

#[tokio::test]
async fn test_outage_fails_the_fetch_until_cleared() {
    let source = MemorySource::new(vec![invoice(1, date!(2025 - 03 - 10))]);
    source.set_outage(Some(SourceError::Unavailable("maintenance".to_string())));

    let result = collect_invoices(&source, 3, 10).await;
    assert_eq!(
        result,
        Err(SourceError::Unavailable("maintenance".to_string()))
    );

    source.set_outage(None);
    assert_eq!(collect_invoices(&source, 3, 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_records_pushed_later_are_seen_by_next_fetch() {
    let source = MemorySource::new(vec![invoice(1, date!(2025 - 03 - 10))]);
    assert_eq!(collect_invoices(&source, 3, 10).await.unwrap()[0].len(), 1);

    source.push(invoice(2, date!(2025 - 03 - 11)));

    assert_eq!(collect_invoices(&source, 3, 10).await.unwrap()[0].len(), 2);
    assert_eq!(source.len(), 2);
}
