// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use crate::error::ApiError;
use metricache::{
    DomainRefreshReport, ExternalHours, InvoicedTotals, MetricDomain, MetricKey, Resolved,
    SalesOrderTotals, Utilization, classify,
};
use metricache_domain::{
    Decimal, EntityPeriodKey, ExternalHoursComponents, InvoicedTotalsComponents, MetricKind,
    PeriodKey, PeriodRange, SalesOrderTotalsComponents, UtilizationComponents,
};
use serde::Serialize;
use std::str::FromStr;
use time::{Date, OffsetDateTime};

/// Order of the points in a series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesOrder {
    /// Oldest period first.
    #[default]
    Ascending,
    /// Most recent period first.
    Descending,
}

impl FromStr for SeriesOrder {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            _ => Err(ApiError::InvalidInput {
                field: String::from("order"),
                message: format!("'{s}' is not one of asc, desc"),
            }),
        }
    }
}

/// API request to read one metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetMetricRequest {
    /// The domain.
    pub kind: MetricKind,
    /// The month.
    pub period: PeriodKey,
    /// The entity, required for per-entity domains and rejected otherwise.
    pub entity_id: Option<i64>,
    /// Recompute even when a closed period is cached.
    pub force_refresh: bool,
}

/// API request to read a time series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetSeriesRequest {
    /// The domain.
    pub kind: MetricKind,
    /// The months to cover.
    pub range: PeriodRange,
    /// The entity, required for per-entity domains and rejected otherwise.
    pub entity_id: Option<i64>,
    /// Point order.
    pub order: SeriesOrder,
}

/// API request behind the refresh button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshAllRequest {
    /// The domain.
    pub kind: MetricKind,
    /// The months to refresh.
    pub range: PeriodRange,
    /// Entities to refresh, for per-entity domains.
    pub entity_ids: Vec<i64>,
    /// Recompute closed periods that are already cached.
    pub force_refresh: bool,
}

/// Component values of any domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ComponentsView {
    InvoicedTotals(InvoicedTotalsComponents),
    ExternalHours(ExternalHoursComponents),
    SalesOrderTotals(SalesOrderTotalsComponents),
    Utilization(UtilizationComponents),
}

/// Presentation hooks of a metric domain.
pub trait ViewDomain: MetricDomain {
    /// The entity a key is scoped to, if any.
    fn entity_id(key: &Self::Key) -> Option<i64>;

    /// Wraps components for serialization.
    fn components_view(components: &Self::Components) -> ComponentsView;
}

impl ViewDomain for InvoicedTotals {
    fn entity_id(_key: &PeriodKey) -> Option<i64> {
        None
    }

    fn components_view(components: &InvoicedTotalsComponents) -> ComponentsView {
        ComponentsView::InvoicedTotals(*components)
    }
}

impl ViewDomain for ExternalHours {
    fn entity_id(_key: &PeriodKey) -> Option<i64> {
        None
    }

    fn components_view(components: &ExternalHoursComponents) -> ComponentsView {
        ComponentsView::ExternalHours(*components)
    }
}

impl ViewDomain for SalesOrderTotals {
    fn entity_id(_key: &PeriodKey) -> Option<i64> {
        None
    }

    fn components_view(components: &SalesOrderTotalsComponents) -> ComponentsView {
        ComponentsView::SalesOrderTotals(*components)
    }
}

impl ViewDomain for Utilization {
    fn entity_id(key: &EntityPeriodKey) -> Option<i64> {
        Some(key.entity_id())
    }

    fn components_view(components: &UtilizationComponents) -> ComponentsView {
        ComponentsView::Utilization(*components)
    }
}

/// One resolved snapshot as shown to a dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotView {
    pub kind: MetricKind,
    pub period: PeriodKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<i64>,
    /// `open` or `closed` on the day the view was built.
    pub state: &'static str,
    /// How the snapshot was obtained.
    pub origin: &'static str,
    /// Set when the source failed and an older snapshot was served.
    pub stale: bool,
    pub headline: Option<Decimal>,
    pub components: ComponentsView,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl SnapshotView {
    /// Builds the view of `resolution`, classifying its period against `today`.
    #[must_use]
    pub fn from_resolution<D: ViewDomain>(resolution: &Resolved<D>, today: Date) -> Self {
        let snapshot = &resolution.snapshot;
        let key = snapshot.key();
        Self {
            kind: D::KIND,
            period: key.period(),
            entity_id: D::entity_id(key),
            state: classify(key.period(), today).as_str(),
            origin: resolution.origin.as_str(),
            stale: resolution.origin.is_stale(),
            headline: snapshot.headline(),
            components: D::components_view(snapshot.components()),
            updated_at: snapshot.updated_at(),
        }
    }
}

/// A time series of one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesView {
    pub kind: MetricKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<i64>,
    /// First month served.
    pub start: PeriodKey,
    /// Last month served.
    pub end: PeriodKey,
    /// Set when the requested range exceeded the series cap.
    pub truncated: bool,
    pub order: SeriesOrder,
    pub points: Vec<SnapshotView>,
}

/// A key that could not be refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshFailureView {
    pub key: String,
    pub error: String,
    pub retryable: bool,
}

/// The outcome of a bulk refresh of one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshView {
    pub kind: MetricKind,
    pub requested: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub refreshed: Vec<SnapshotView>,
    pub failures: Vec<RefreshFailureView>,
}

impl RefreshView {
    /// Summarizes `report`, classifying periods against `today`.
    #[must_use]
    pub fn from_report<D: ViewDomain>(report: &DomainRefreshReport<D>, today: Date) -> Self {
        let refreshed = report
            .outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().ok())
            .map(|resolution| SnapshotView::from_resolution::<D>(resolution, today))
            .collect();
        let failures = report
            .failures()
            .map(|(key, err)| RefreshFailureView {
                key: key.to_string(),
                error: err.to_string(),
                retryable: err.is_retryable(),
            })
            .collect();
        Self {
            kind: report.kind,
            requested: report.outcomes.len(),
            succeeded: report.succeeded(),
            failed: report.failed(),
            refreshed,
            failures,
        }
    }
}
