// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Engine configuration.
//!
//! The values are persisted in the single `cache_settings` row; this type
//! is what the service runs on.

use crate::error::ApiError;
use metricache::{
    CoordinatorConfig, ExternalHours, InvoicedTotals, MetricDomain, SalesOrderTotals,
    SystemClock, Utilization,
};
use metricache_domain::{MetricKind, PeriodRange};
use metricache_persistence::CacheSettings;
use serde::Serialize;
use time::{OffsetDateTime, UtcOffset};

const DEFAULT_REFRESH_CONCURRENCY: usize = 4;

fn to_usize(value: u32) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Settings the metric service runs with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineConfig {
    pub invoiced_chunk_size: usize,
    pub external_hours_chunk_size: usize,
    pub sales_order_chunk_size: usize,
    pub utilization_chunk_size: usize,
    /// Longest series a caller may request; longer ranges keep their most
    /// recent periods.
    pub max_series_periods: Option<usize>,
    /// Keys resolved in parallel by series reads and bulk refreshes.
    pub refresh_concurrency: usize,
    pub serve_stale_on_failure: bool,
    /// Counterparty excluded from invoiced and sales order totals.
    pub internal_partner_id: Option<i64>,
    /// UTC offset of the calendar that decides which month is open.
    pub utc_offset_hours: i8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            invoiced_chunk_size: InvoicedTotals::DEFAULT_CHUNK_SIZE,
            external_hours_chunk_size: ExternalHours::DEFAULT_CHUNK_SIZE,
            sales_order_chunk_size: SalesOrderTotals::DEFAULT_CHUNK_SIZE,
            utilization_chunk_size: Utilization::DEFAULT_CHUNK_SIZE,
            max_series_periods: None,
            refresh_concurrency: DEFAULT_REFRESH_CONCURRENCY,
            serve_stale_on_failure: false,
            internal_partner_id: None,
            utc_offset_hours: 0,
        }
    }
}

impl EngineConfig {
    /// Maps the persisted settings row.
    #[must_use]
    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self {
            invoiced_chunk_size: to_usize(settings.invoiced_chunk_size),
            external_hours_chunk_size: to_usize(settings.external_hours_chunk_size),
            sales_order_chunk_size: to_usize(settings.sales_order_chunk_size),
            utilization_chunk_size: to_usize(settings.utilization_chunk_size),
            max_series_periods: settings.max_series_periods.map(to_usize),
            refresh_concurrency: to_usize(settings.refresh_concurrency),
            serve_stale_on_failure: settings.serve_stale_on_failure,
            internal_partner_id: settings.internal_partner_id,
            utc_offset_hours: settings.utc_offset_hours,
        }
    }

    /// Builds the settings row to persist.
    #[must_use]
    pub fn to_settings(&self, updated_at: OffsetDateTime) -> CacheSettings {
        CacheSettings {
            invoiced_chunk_size: to_u32(self.invoiced_chunk_size),
            external_hours_chunk_size: to_u32(self.external_hours_chunk_size),
            sales_order_chunk_size: to_u32(self.sales_order_chunk_size),
            utilization_chunk_size: to_u32(self.utilization_chunk_size),
            max_series_periods: self.max_series_periods.map(to_u32),
            refresh_concurrency: to_u32(self.refresh_concurrency),
            serve_stale_on_failure: self.serve_stale_on_failure,
            internal_partner_id: self.internal_partner_id,
            utc_offset_hours: self.utc_offset_hours,
            updated_at,
        }
    }

    /// Chunk size configured for `kind`.
    #[must_use]
    pub const fn chunk_size(&self, kind: MetricKind) -> usize {
        match kind {
            MetricKind::InvoicedTotals => self.invoiced_chunk_size,
            MetricKind::ExternalHours => self.external_hours_chunk_size,
            MetricKind::SalesOrderTotals => self.sales_order_chunk_size,
            MetricKind::Utilization => self.utilization_chunk_size,
        }
    }

    /// Coordinator settings for domain `D`.
    #[must_use]
    pub const fn coordinator_config<D: MetricDomain>(&self) -> CoordinatorConfig {
        CoordinatorConfig::for_domain::<D>()
            .with_chunk_size(self.chunk_size(D::KIND))
            .with_serve_stale_on_failure(self.serve_stale_on_failure)
    }

    /// The wall clock in the configured offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the offset is not a valid UTC offset.
    pub fn clock(&self) -> Result<SystemClock, ApiError> {
        UtcOffset::from_hms(self.utc_offset_hours, 0, 0)
            .map(SystemClock::with_offset)
            .map_err(|e| ApiError::InvalidInput {
                field: String::from("utc_offset_hours"),
                message: e.to_string(),
            })
    }

    /// Applies the series cap to `range`.
    ///
    /// Returns the range to serve and whether it was shortened.
    #[must_use]
    pub fn cap_series(&self, range: PeriodRange) -> (PeriodRange, bool) {
        match self.max_series_periods {
            Some(cap) if range.len() > cap => (range.trailing(cap), true),
            _ => (range, false),
        }
    }
}
