// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    CapacitySource, FlakyStore, ScriptedSource, TODAY, cents, default_config, invoice,
    invoiced_coordinator, period,
};
use crate::{
    CacheError, CacheStore, Coordinator, CoordinatorConfig, FixedClock, InvoicedTotals,
    MemoryCacheStore, Origin, SourceAdapter, Utilization,
};
use metricache_domain::{
    AggregationError, CapacityEntry, CapacityKind, Decimal, EntityPeriodKey, MetricSnapshot,
};
use std::sync::Arc;
use time::macros::date;

fn march_source() -> Arc<ScriptedSource> {
    Arc::new(ScriptedSource::new(vec![
        invoice(1, date!(2025 - 03 - 04), cents(100_000)),
        invoice(2, date!(2025 - 03 - 18), cents(50_050)),
        invoice(3, date!(2025 - 06 - 02), cents(7_500)),
    ]))
}

#[tokio::test]
async fn test_missing_key_is_recomputed_and_stored() {
    let source = march_source();
    let store = Arc::new(MemoryCacheStore::new());
    let coordinator = invoiced_coordinator(&source, &store, default_config());

    let resolution = coordinator.resolve(&period(2025, 3), false).await.unwrap();

    assert_eq!(resolution.origin, Origin::Recomputed);
    assert_eq!(resolution.snapshot.headline(), Some(cents(150_050)));
    assert_eq!(source.calls(), 1);
    assert_eq!(store.len().await, 1);
    assert_eq!(coordinator.in_flight(), 0);
}

#[tokio::test]
async fn test_cached_closed_period_makes_no_source_calls() {
    let source = march_source();
    let store = Arc::new(MemoryCacheStore::new());
    let coordinator = invoiced_coordinator(&source, &store, default_config());
    let key = period(2025, 3);

    coordinator.resolve(&key, false).await.unwrap();
    for _ in 0..5 {
        let resolution = coordinator.resolve(&key, false).await.unwrap();
        assert_eq!(resolution.origin, Origin::Cached);
    }

    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_repeated_reads_of_closed_period_are_identical() {
    let source = march_source();
    let store = Arc::new(MemoryCacheStore::new());
    let coordinator = invoiced_coordinator(&source, &store, default_config());
    let key = period(2025, 3);

    let first = coordinator.resolve(&key, false).await.unwrap();
    let second = coordinator.resolve(&key, false).await.unwrap();

    assert_eq!(first.snapshot, second.snapshot);
}

#[tokio::test]
async fn test_open_period_is_always_recomputed() {
    let source = march_source();
    let store = Arc::new(MemoryCacheStore::new());
    let coordinator = invoiced_coordinator(&source, &store, default_config());
    let key = period(2025, 6);

    let first = coordinator.resolve(&key, false).await.unwrap();
    source.push(invoice(4, date!(2025 - 06 - 14), cents(2_500)));
    let second = coordinator.resolve(&key, false).await.unwrap();

    assert_eq!(first.origin, Origin::Recomputed);
    assert_eq!(second.origin, Origin::Recomputed);
    assert_eq!(second.snapshot.headline(), Some(cents(10_000)));
    assert_eq!(source.calls(), 2);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_force_refresh_recomputes_closed_period() {
    let source = march_source();
    let store = Arc::new(MemoryCacheStore::new());
    let coordinator = invoiced_coordinator(&source, &store, default_config());
    let key = period(2025, 3);

    coordinator.resolve(&key, false).await.unwrap();
    source.push(invoice(5, date!(2025 - 03 - 30), cents(1_000)));
    let refreshed = coordinator.resolve(&key, true).await.unwrap();

    assert_eq!(refreshed.origin, Origin::Recomputed);
    assert_eq!(refreshed.snapshot.headline(), Some(cents(151_050)));
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_period_without_records_yields_zero_snapshot() {
    let source = march_source();
    let store = Arc::new(MemoryCacheStore::new());
    let coordinator = invoiced_coordinator(&source, &store, default_config());

    let resolution = coordinator.resolve(&period(2024, 11), false).await.unwrap();

    assert_eq!(resolution.snapshot.headline(), Some(Decimal::ZERO));
}

#[tokio::test]
async fn test_small_chunk_size_gives_same_result() {
    let source = march_source();
    let store = Arc::new(MemoryCacheStore::new());
    let coordinator =
        invoiced_coordinator(&source, &store, default_config().with_chunk_size(1));

    let resolution = coordinator.resolve(&period(2025, 3), false).await.unwrap();

    assert_eq!(resolution.snapshot.headline(), Some(cents(150_050)));
}

#[tokio::test]
async fn test_source_failure_without_snapshot_is_surfaced() {
    let source = march_source();
    source.fail(period(2025, 3));
    let store = Arc::new(MemoryCacheStore::new());
    let coordinator = invoiced_coordinator(&source, &store, default_config());

    let result = coordinator.resolve(&period(2025, 3), false).await;

    assert!(matches!(result, Err(CacheError::SourceUnavailable(_))));
    assert!(store.is_empty().await);
    assert_eq!(coordinator.in_flight(), 0);
}

#[tokio::test]
async fn test_source_failure_keeps_prior_snapshot_and_hard_fails_by_default() {
    let source = march_source();
    let store = Arc::new(MemoryCacheStore::new());
    let coordinator = invoiced_coordinator(&source, &store, default_config());
    let key = period(2025, 3);

    let prior = coordinator.resolve(&key, false).await.unwrap().snapshot;
    source.fail(key);
    let result = coordinator.resolve(&key, true).await;

    assert!(matches!(result, Err(ref err) if err.is_retryable()));
    assert_eq!(store.get(&key).await.unwrap(), Some(prior));
}

#[tokio::test]
async fn test_stale_snapshot_served_when_enabled() {
    let source = march_source();
    let store = Arc::new(MemoryCacheStore::new());
    let config = default_config().with_serve_stale_on_failure(true);
    let coordinator = invoiced_coordinator(&source, &store, config);
    let key = period(2025, 3);

    let prior = coordinator.resolve(&key, false).await.unwrap().snapshot;
    source.fail(key);
    let resolution = coordinator.resolve(&key, true).await.unwrap();

    assert_eq!(resolution.origin, Origin::Stale);
    assert!(resolution.origin.is_stale());
    assert_eq!(resolution.snapshot, prior);
}

#[tokio::test]
async fn test_stale_fallback_needs_a_prior_snapshot() {
    let source = march_source();
    source.fail(period(2025, 3));
    let store = Arc::new(MemoryCacheStore::new());
    let config = default_config().with_serve_stale_on_failure(true);
    let coordinator = invoiced_coordinator(&source, &store, config);

    let result = coordinator.resolve(&period(2025, 3), false).await;

    assert!(matches!(result, Err(CacheError::SourceUnavailable(_))));
}

#[tokio::test]
async fn test_aggregation_error_leaves_cached_snapshot_untouched() {
    let source = march_source();
    let store = Arc::new(MemoryCacheStore::new());
    let config = default_config().with_serve_stale_on_failure(true);
    let coordinator = invoiced_coordinator(&source, &store, config);
    let key = period(2025, 3);

    let prior = coordinator.resolve(&key, false).await.unwrap().snapshot;
    source.push(invoice(99, date!(2025 - 03 - 21), cents(-1)));
    let result = coordinator.resolve(&key, true).await;

    assert!(matches!(
        result,
        Err(CacheError::Aggregation(AggregationError::NegativeAmount {
            record_id: 99,
            ..
        }))
    ));
    assert_eq!(store.get(&key).await.unwrap(), Some(prior));
}

#[tokio::test]
async fn test_store_write_failure_returns_unpersisted_snapshot() {
    let source = march_source();
    let store: Arc<FlakyStore<InvoicedTotals>> = Arc::new(FlakyStore::new());
    store.reject_writes(true);
    let coordinator = Coordinator::new(
        InvoicedTotals::default(),
        Arc::clone(&source) as Arc<dyn SourceAdapter<InvoicedTotals>>,
        Arc::clone(&store) as Arc<dyn CacheStore<InvoicedTotals>>,
        Arc::new(FixedClock::on(TODAY)),
        default_config(),
    );
    let key = period(2025, 3);

    let first = coordinator.resolve(&key, false).await.unwrap();
    assert_eq!(first.origin, Origin::Unpersisted);
    assert_eq!(first.snapshot.headline(), Some(cents(150_050)));
    assert_eq!(store.get(&key).await.unwrap(), None);

    store.reject_writes(false);
    let second = coordinator.resolve(&key, false).await.unwrap();
    assert_eq!(second.origin, Origin::Recomputed);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_internal_partner_is_excluded_by_domain_setting() {
    let mut internal = invoice(7, date!(2025 - 03 - 10), cents(99_900));
    internal.partner_id = 1;
    let source = march_source();
    source.push(internal);
    let coordinator = Coordinator::new(
        InvoicedTotals {
            internal_partner_id: Some(1),
        },
        Arc::clone(&source) as Arc<dyn SourceAdapter<InvoicedTotals>>,
        Arc::new(MemoryCacheStore::<InvoicedTotals>::new()),
        Arc::new(FixedClock::on(TODAY)),
        CoordinatorConfig::for_domain::<InvoicedTotals>(),
    );

    let resolution = coordinator.resolve(&period(2025, 3), false).await.unwrap();

    assert_eq!(resolution.snapshot.headline(), Some(cents(150_050)));
}

#[tokio::test]
async fn test_month_rollover_closes_previous_period() {
    let source = march_source();
    let store = Arc::new(MemoryCacheStore::new());
    let clock = Arc::new(FixedClock::on(date!(2025 - 03 - 31)));
    let coordinator = Coordinator::new(
        InvoicedTotals::default(),
        Arc::clone(&source) as Arc<dyn SourceAdapter<InvoicedTotals>>,
        Arc::clone(&store) as Arc<dyn CacheStore<InvoicedTotals>>,
        Arc::clone(&clock) as Arc<dyn crate::Clock>,
        default_config(),
    );
    let key = period(2025, 3);

    coordinator.resolve(&key, false).await.unwrap();
    coordinator.resolve(&key, false).await.unwrap();
    assert_eq!(source.calls(), 2);

    clock.set(date!(2025 - 04 - 01).midnight().assume_utc());
    let resolution = coordinator.resolve(&key, false).await.unwrap();
    assert_eq!(resolution.origin, Origin::Cached);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_entity_without_records_yields_null_utilization() {
    let source = CapacitySource(vec![CapacityEntry {
        id: 1,
        employee_id: 7,
        kind: CapacityKind::Available,
        date: date!(2025 - 03 - 03),
        hours: cents(16_000),
    }]);
    let coordinator = Coordinator::new(
        Utilization,
        Arc::new(source),
        Arc::new(MemoryCacheStore::<Utilization>::new()),
        Arc::new(FixedClock::on(TODAY)),
        CoordinatorConfig::for_domain::<Utilization>(),
    );

    let present = coordinator
        .resolve(&EntityPeriodKey::new(period(2025, 3), 7), false)
        .await
        .unwrap();
    let absent = coordinator
        .resolve(&EntityPeriodKey::new(period(2025, 3), 8), false)
        .await
        .unwrap();

    assert_eq!(present.snapshot.components().available_hours, cents(16_000));
    assert_eq!(present.snapshot.headline(), Some(Decimal::ZERO));
    assert_eq!(absent.snapshot.headline(), None);
    assert_eq!(absent.snapshot.components().available_hours, Decimal::ZERO);
}

#[tokio::test]
async fn test_preloaded_snapshot_is_served_without_store_read() {
    let source = march_source();
    let store = Arc::new(MemoryCacheStore::new());
    let coordinator = invoiced_coordinator(&source, &store, default_config());
    let key = period(2025, 2);
    let preloaded = MetricSnapshot::new(
        key,
        metricache_domain::InvoicedTotalsComponents {
            invoices_total: cents(4_200),
            ..Default::default()
        },
        TODAY.midnight().assume_utc(),
    );

    let resolution = coordinator
        .resolve_preloaded(&key, Some(preloaded.clone()), false)
        .await
        .unwrap();

    assert_eq!(resolution.origin, Origin::Cached);
    assert_eq!(resolution.snapshot, preloaded);
    assert_eq!(source.calls(), 0);
}
