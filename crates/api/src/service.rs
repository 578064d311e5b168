// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The metric service: one coordinator per domain behind the boundary
//! operations.

use crate::config::EngineConfig;
use crate::error::ApiError;
use crate::request_response::{
    GetMetricRequest, GetSeriesRequest, RefreshAllRequest, RefreshView, SeriesOrder,
    SeriesView, SnapshotView, ViewDomain,
};
use futures::{StreamExt, TryStreamExt, stream};
use metricache::{
    CacheStore, Clock, Coordinator, ExternalHours, InvoicedTotals, MemoryCacheStore,
    SalesOrderTotals, SourceAdapter, Utilization,
};
use metricache_domain::{EntityPeriodKey, MetricKind, PeriodKey, PeriodRange};
use metricache_persistence::SqliteCacheStore;
use std::collections::HashMap;
use std::sync::Arc;
use time::Date;
use tracing::{debug, info};

/// One source adapter per domain.
#[derive(Clone)]
pub struct MetricSources {
    pub invoices: Arc<dyn SourceAdapter<InvoicedTotals>>,
    pub hours: Arc<dyn SourceAdapter<ExternalHours>>,
    pub sales_orders: Arc<dyn SourceAdapter<SalesOrderTotals>>,
    pub capacity: Arc<dyn SourceAdapter<Utilization>>,
}

/// One cache store per domain.
#[derive(Clone)]
pub struct MetricStores {
    pub invoiced: Arc<dyn CacheStore<InvoicedTotals>>,
    pub hours: Arc<dyn CacheStore<ExternalHours>>,
    pub sales_orders: Arc<dyn CacheStore<SalesOrderTotals>>,
    pub utilization: Arc<dyn CacheStore<Utilization>>,
}

impl MetricStores {
    /// Every domain backed by the same `SQLite` database.
    #[must_use]
    pub fn sqlite(store: &SqliteCacheStore) -> Self {
        Self {
            invoiced: Arc::new(store.clone()),
            hours: Arc::new(store.clone()),
            sales_orders: Arc::new(store.clone()),
            utilization: Arc::new(store.clone()),
        }
    }

    /// Every domain in process memory, stamped by `clock`.
    #[must_use]
    pub fn in_memory(clock: &Arc<dyn Clock>) -> Self {
        Self {
            invoiced: Arc::new(MemoryCacheStore::<InvoicedTotals>::with_clock(Arc::clone(clock))),
            hours: Arc::new(MemoryCacheStore::<ExternalHours>::with_clock(Arc::clone(clock))),
            sales_orders: Arc::new(MemoryCacheStore::<SalesOrderTotals>::with_clock(
                Arc::clone(clock),
            )),
            utilization: Arc::new(MemoryCacheStore::<Utilization>::with_clock(Arc::clone(
                clock,
            ))),
        }
    }
}

fn reject_entity(kind: MetricKind, entity_id: Option<i64>) -> Result<(), ApiError> {
    match entity_id {
        Some(id) => Err(ApiError::InvalidInput {
            field: String::from("entity_id"),
            message: format!("{kind} is not kept per entity (got {id})"),
        }),
        None => Ok(()),
    }
}

fn require_entity(kind: MetricKind, entity_id: Option<i64>) -> Result<i64, ApiError> {
    entity_id.ok_or_else(|| ApiError::InvalidInput {
        field: String::from("entity_id"),
        message: format!("{kind} requires an entity"),
    })
}

async fn resolve_view<D: ViewDomain>(
    coordinator: &Coordinator<D>,
    key: &D::Key,
    force_refresh: bool,
) -> Result<SnapshotView, ApiError> {
    let today = coordinator.clock().today();
    let resolution = coordinator.resolve(key, force_refresh).await?;
    Ok(SnapshotView::from_resolution::<D>(&resolution, today))
}

/// Resolves `keys` in order against one up-front read of the table.
async fn series_points<D: ViewDomain>(
    coordinator: &Coordinator<D>,
    keys: Vec<D::Key>,
    concurrency: usize,
) -> Result<Vec<SnapshotView>, ApiError> {
    let today: Date = coordinator.clock().today();
    let mut stored: HashMap<D::Key, _> = coordinator
        .list_all()
        .await?
        .into_iter()
        .map(|snapshot| (snapshot.key().clone(), snapshot))
        .collect();
    let jobs: Vec<_> = keys
        .into_iter()
        .map(|key| {
            let cached = stored.remove(&key);
            (key, cached)
        })
        .collect();

    stream::iter(jobs)
        .map(|(key, cached)| async move {
            coordinator
                .resolve_preloaded(&key, cached, false)
                .await
                .map(|resolution| SnapshotView::from_resolution::<D>(&resolution, today))
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await
        .map_err(ApiError::from)
}

async fn refresh_view<D: ViewDomain>(
    coordinator: &Coordinator<D>,
    keys: Vec<D::Key>,
    force_refresh: bool,
    concurrency: usize,
) -> RefreshView {
    let today = coordinator.clock().today();
    let report = coordinator
        .refresh_range(keys, force_refresh, concurrency)
        .await;
    RefreshView::from_report::<D>(&report, today)
}

fn entity_keys(range: PeriodRange, entity_ids: &[i64]) -> Vec<EntityPeriodKey> {
    range
        .iter()
        .flat_map(|period| {
            entity_ids
                .iter()
                .map(move |entity| EntityPeriodKey::new(period, *entity))
        })
        .collect()
}

/// Serves the boundary operations over the four metric domains.
pub struct MetricService {
    config: EngineConfig,
    invoiced: Coordinator<InvoicedTotals>,
    hours: Coordinator<ExternalHours>,
    sales_orders: Coordinator<SalesOrderTotals>,
    utilization: Coordinator<Utilization>,
}

impl MetricService {
    /// Wires one coordinator per domain.
    #[must_use]
    pub fn new(
        config: EngineConfig,
        sources: MetricSources,
        stores: MetricStores,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let invoiced_domain = InvoicedTotals {
            internal_partner_id: config.internal_partner_id,
        };
        let sales_domain = SalesOrderTotals {
            internal_partner_id: config.internal_partner_id,
        };
        Self {
            invoiced: Coordinator::new(
                invoiced_domain,
                sources.invoices,
                stores.invoiced,
                Arc::clone(&clock),
                config.coordinator_config::<InvoicedTotals>(),
            ),
            hours: Coordinator::new(
                ExternalHours,
                sources.hours,
                stores.hours,
                Arc::clone(&clock),
                config.coordinator_config::<ExternalHours>(),
            ),
            sales_orders: Coordinator::new(
                sales_domain,
                sources.sales_orders,
                stores.sales_orders,
                Arc::clone(&clock),
                config.coordinator_config::<SalesOrderTotals>(),
            ),
            utilization: Coordinator::new(
                Utilization,
                sources.capacity,
                stores.utilization,
                clock,
                config.coordinator_config::<Utilization>(),
            ),
            config,
        }
    }

    /// Returns the configuration the service runs with.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The invoiced totals coordinator.
    #[must_use]
    pub const fn invoiced(&self) -> &Coordinator<InvoicedTotals> {
        &self.invoiced
    }

    /// The external hours coordinator.
    #[must_use]
    pub const fn hours(&self) -> &Coordinator<ExternalHours> {
        &self.hours
    }

    /// The sales order totals coordinator.
    #[must_use]
    pub const fn sales_orders(&self) -> &Coordinator<SalesOrderTotals> {
        &self.sales_orders
    }

    /// The utilization coordinator.
    #[must_use]
    pub const fn utilization(&self) -> &Coordinator<Utilization> {
        &self.utilization
    }

    /// Reads one metric.
    ///
    /// A closed period already cached is served without contacting the
    /// source unless `force_refresh` is set; anything else is recomputed.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity does not fit the domain or the metric
    /// cannot be resolved.
    pub async fn get_metric(&self, request: &GetMetricRequest) -> Result<SnapshotView, ApiError> {
        debug!(
            kind = %request.kind,
            period = %request.period,
            entity_id = ?request.entity_id,
            force_refresh = request.force_refresh,
            "GetMetric"
        );
        let period: PeriodKey = request.period;
        let force = request.force_refresh;
        match request.kind {
            MetricKind::InvoicedTotals => {
                reject_entity(request.kind, request.entity_id)?;
                resolve_view(&self.invoiced, &period, force).await
            }
            MetricKind::ExternalHours => {
                reject_entity(request.kind, request.entity_id)?;
                resolve_view(&self.hours, &period, force).await
            }
            MetricKind::SalesOrderTotals => {
                reject_entity(request.kind, request.entity_id)?;
                resolve_view(&self.sales_orders, &period, force).await
            }
            MetricKind::Utilization => {
                let entity = require_entity(request.kind, request.entity_id)?;
                let key = EntityPeriodKey::new(period, entity);
                resolve_view(&self.utilization, &key, force).await
            }
        }
    }

    /// Reads a time series.
    ///
    /// The table is read once; each month is then served from that read or
    /// recomputed. Ranges longer than the configured cap keep their most
    /// recent months.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity does not fit the domain or any month
    /// cannot be resolved.
    pub async fn get_series(&self, request: &GetSeriesRequest) -> Result<SeriesView, ApiError> {
        let (range, truncated) = self.config.cap_series(request.range);
        if truncated {
            info!(
                kind = %request.kind,
                requested = request.range.len(),
                served = range.len(),
                "Series truncated to cap"
            );
        }
        let concurrency = self.config.refresh_concurrency;
        let periods: Vec<PeriodKey> = range.iter().collect();

        let mut points = match request.kind {
            MetricKind::InvoicedTotals => {
                reject_entity(request.kind, request.entity_id)?;
                series_points(&self.invoiced, periods, concurrency).await?
            }
            MetricKind::ExternalHours => {
                reject_entity(request.kind, request.entity_id)?;
                series_points(&self.hours, periods, concurrency).await?
            }
            MetricKind::SalesOrderTotals => {
                reject_entity(request.kind, request.entity_id)?;
                series_points(&self.sales_orders, periods, concurrency).await?
            }
            MetricKind::Utilization => {
                let entity = require_entity(request.kind, request.entity_id)?;
                series_points(
                    &self.utilization,
                    entity_keys(range, &[entity]),
                    concurrency,
                )
                .await?
            }
        };
        if request.order == SeriesOrder::Descending {
            points.reverse();
        }

        Ok(SeriesView {
            kind: request.kind,
            entity_id: request.entity_id,
            start: range.start(),
            end: range.end(),
            truncated,
            order: request.order,
            points,
        })
    }

    /// Refreshes every key of a range for one domain.
    ///
    /// Keys that fail keep their stored snapshot and are reported; they do
    /// not abort the batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the entities do not fit the domain.
    pub async fn refresh_all(&self, request: &RefreshAllRequest) -> Result<RefreshView, ApiError> {
        let concurrency = self.config.refresh_concurrency;
        let force = request.force_refresh;
        let periods = || request.range.iter().collect::<Vec<_>>();
        let domain_has_entities = !request.entity_ids.is_empty();

        let view = match request.kind {
            MetricKind::InvoicedTotals if !domain_has_entities => {
                refresh_view(&self.invoiced, periods(), force, concurrency).await
            }
            MetricKind::ExternalHours if !domain_has_entities => {
                refresh_view(&self.hours, periods(), force, concurrency).await
            }
            MetricKind::SalesOrderTotals if !domain_has_entities => {
                refresh_view(&self.sales_orders, periods(), force, concurrency).await
            }
            MetricKind::Utilization if domain_has_entities => {
                let keys = entity_keys(request.range, &request.entity_ids);
                refresh_view(&self.utilization, keys, force, concurrency).await
            }
            MetricKind::Utilization => {
                return Err(ApiError::InvalidInput {
                    field: String::from("entity_ids"),
                    message: String::from("utilization refresh requires at least one entity"),
                });
            }
            kind => {
                return Err(ApiError::InvalidInput {
                    field: String::from("entity_ids"),
                    message: format!("{kind} is not kept per entity"),
                });
            }
        };
        Ok(view)
    }

    /// Refreshes every domain over `range`.
    ///
    /// Utilization is refreshed for `entity_ids` and skipped when there are
    /// none.
    pub async fn refresh_everything(
        &self,
        range: PeriodRange,
        entity_ids: &[i64],
        force_refresh: bool,
    ) -> Vec<RefreshView> {
        let concurrency = self.config.refresh_concurrency;
        let periods: Vec<PeriodKey> = range.iter().collect();

        let mut views = vec![
            refresh_view(&self.invoiced, periods.clone(), force_refresh, concurrency).await,
            refresh_view(&self.hours, periods.clone(), force_refresh, concurrency).await,
            refresh_view(&self.sales_orders, periods, force_refresh, concurrency).await,
        ];
        if !entity_ids.is_empty() {
            views.push(
                refresh_view(
                    &self.utilization,
                    entity_keys(range, entity_ids),
                    force_refresh,
                    concurrency,
                )
                .await,
            );
        }
        info!(
            start = %range.start(),
            end = %range.end(),
            domains = views.len(),
            failed = views.iter().map(|v| v.failed).sum::<usize>(),
            "Refreshed all domains"
        );
        views
    }
}
