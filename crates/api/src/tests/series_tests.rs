// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{cents, harness, harness_with, period, range, test_config};
use crate::{ApiError, EngineConfig, GetSeriesRequest, SeriesOrder};
use metricache_domain::{Decimal, MetricKind, PeriodRange};

fn series(kind: MetricKind, range: PeriodRange, order: SeriesOrder) -> GetSeriesRequest {
    GetSeriesRequest {
        kind,
        range,
        entity_id: None,
        order,
    }
}

#[tokio::test]
async fn test_series_is_ascending_by_default() {
    let h = harness();
    let view = h
        .service
        .get_series(&series(
            MetricKind::InvoicedTotals,
            range((2025, 1), (2025, 4)),
            SeriesOrder::default(),
        ))
        .await
        .unwrap();

    let periods: Vec<String> = view.points.iter().map(|p| p.period.to_string()).collect();
    assert_eq!(periods, vec!["2025-01", "2025-02", "2025-03", "2025-04"]);

    let headlines: Vec<Option<Decimal>> = view.points.iter().map(|p| p.headline).collect();
    assert_eq!(
        headlines,
        vec![
            Some(cents(0)),
            Some(cents(0)),
            Some(cents(19_000_000)),
            Some(cents(100_000)),
        ]
    );
    assert!(!view.truncated);
}

#[tokio::test]
async fn test_series_descending_reverses_points() {
    let h = harness();
    let view = h
        .service
        .get_series(&series(
            MetricKind::InvoicedTotals,
            range((2025, 2), (2025, 4)),
            SeriesOrder::Descending,
        ))
        .await
        .unwrap();

    let periods: Vec<String> = view.points.iter().map(|p| p.period.to_string()).collect();
    assert_eq!(periods, vec!["2025-04", "2025-03", "2025-02"]);
    assert_eq!(view.start, period(2025, 2));
    assert_eq!(view.end, period(2025, 4));
}

#[tokio::test]
async fn test_series_over_cap_keeps_trailing_periods() {
    let h = harness_with(EngineConfig {
        max_series_periods: Some(2),
        ..test_config()
    });
    let view = h
        .service
        .get_series(&series(
            MetricKind::InvoicedTotals,
            range((2025, 1), (2025, 4)),
            SeriesOrder::Ascending,
        ))
        .await
        .unwrap();

    assert!(view.truncated);
    assert_eq!(view.start, period(2025, 3));
    assert_eq!(view.points.len(), 2);
    assert_eq!(h.sources.invoices.fetches(), 2);
}

#[tokio::test]
async fn test_second_series_read_serves_closed_periods_from_cache() {
    let h = harness();
    let request = series(
        MetricKind::SalesOrderTotals,
        range((2025, 1), (2025, 5)),
        SeriesOrder::Ascending,
    );

    h.service.get_series(&request).await.unwrap();
    assert_eq!(h.sources.sales_orders.fetches(), 5);

    let again = h.service.get_series(&request).await.unwrap();
    assert!(again.points.iter().all(|p| p.origin == "cached"));
    assert_eq!(h.sources.sales_orders.fetches(), 5);
}

#[tokio::test]
async fn test_series_including_open_month_recomputes_only_that_month() {
    let h = harness();
    let request = series(
        MetricKind::InvoicedTotals,
        range((2025, 5), (2025, 6)),
        SeriesOrder::Ascending,
    );

    h.service.get_series(&request).await.unwrap();
    let again = h.service.get_series(&request).await.unwrap();

    let origins: Vec<&str> = again.points.iter().map(|p| p.origin).collect();
    assert_eq!(origins, vec!["cached", "recomputed"]);
    assert_eq!(h.sources.invoices.fetches(), 3);
}

#[tokio::test]
async fn test_utilization_series_is_scoped_to_entity() {
    let h = harness();
    let mut request = series(
        MetricKind::Utilization,
        range((2025, 2), (2025, 3)),
        SeriesOrder::Ascending,
    );
    request.entity_id = Some(7);

    let view = h.service.get_series(&request).await.unwrap();

    assert_eq!(view.entity_id, Some(7));
    assert!(view.points.iter().all(|p| p.entity_id == Some(7)));
    assert_eq!(view.points[0].headline, None);
    assert_eq!(view.points[1].headline, Some(cents(7_500)));
}

#[tokio::test]
async fn test_utilization_series_without_entity_is_rejected() {
    let h = harness();
    let result = h
        .service
        .get_series(&series(
            MetricKind::Utilization,
            range((2025, 2), (2025, 3)),
            SeriesOrder::Ascending,
        ))
        .await;

    assert!(matches!(result, Err(ApiError::InvalidInput { .. })));
}
