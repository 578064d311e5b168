// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and their mapping to domain snapshots.
//!
//! Decimals are stored as canonical two-place text and timestamps as
//! RFC 3339 text. Headline columns are written for SQL readers; on read the
//! headline is always derived from the components.

use diesel::prelude::*;
use metricache_domain::{
    Decimal, EntityPeriodKey, ExternalHoursComponents, InvoicedTotalsComponents,
    MetricComponents, MetricSnapshot, PeriodKey, SalesOrderTotalsComponents,
    UtilizationComponents, format_fixed, parse_fixed,
};
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::diesel_schema::{
    cache_settings, external_hours, invoiced_totals, sales_order_totals, utilization_records,
};
use crate::error::PersistenceError;

pub type InvoicedTotalsSnapshot = MetricSnapshot<PeriodKey, InvoicedTotalsComponents>;
pub type ExternalHoursSnapshot = MetricSnapshot<PeriodKey, ExternalHoursComponents>;
pub type SalesOrderTotalsSnapshot = MetricSnapshot<PeriodKey, SalesOrderTotalsComponents>;
pub type UtilizationSnapshot = MetricSnapshot<EntityPeriodKey, UtilizationComponents>;

// ============================================================================
// Column encoding
// ============================================================================

pub(crate) fn encode_period(period: PeriodKey) -> (i32, i32) {
    (period.year(), i32::from(period.month()))
}

fn decode_period(table: &'static str, year: i32, month: i32) -> Result<PeriodKey, PersistenceError> {
    let month = u8::try_from(month).map_err(|_| PersistenceError::DecodeFailed {
        table,
        reason: format!("month {month} out of range"),
    })?;
    PeriodKey::new(year, month).map_err(|e| PersistenceError::DecodeFailed {
        table,
        reason: e.to_string(),
    })
}

fn decode_decimal(table: &'static str, text: &str) -> Result<Decimal, PersistenceError> {
    parse_fixed(text).map_err(|e| PersistenceError::DecodeFailed {
        table,
        reason: e.to_string(),
    })
}

fn encode_timestamp(at: OffsetDateTime) -> Result<String, PersistenceError> {
    at.format(&Rfc3339)
        .map_err(|e| PersistenceError::EncodeFailed(e.to_string()))
}

fn decode_timestamp(table: &'static str, text: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(text, &Rfc3339).map_err(|e| PersistenceError::DecodeFailed {
        table,
        reason: format!("updated_at '{text}': {e}"),
    })
}

fn headline_text<C: MetricComponents>(components: &C) -> Option<String> {
    components.headline().map(format_fixed)
}

// ============================================================================
// invoiced_totals
// ============================================================================

/// Diesel Queryable struct for `invoiced_totals` rows.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = invoiced_totals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InvoicedTotalsRow {
    pub year: i32,
    pub month: i32,
    pub invoices_total: String,
    pub credit_notes_total: String,
    pub reversed_total: String,
    pub amount: String,
    pub updated_at: String,
}

impl InvoicedTotalsRow {
    pub fn into_snapshot(self) -> Result<InvoicedTotalsSnapshot, PersistenceError> {
        const TABLE: &str = "invoiced_totals";
        let key = decode_period(TABLE, self.year, self.month)?;
        let components = InvoicedTotalsComponents {
            invoices_total: decode_decimal(TABLE, &self.invoices_total)?,
            credit_notes_total: decode_decimal(TABLE, &self.credit_notes_total)?,
            reversed_total: decode_decimal(TABLE, &self.reversed_total)?,
        };
        let updated_at = decode_timestamp(TABLE, &self.updated_at)?;
        Ok(MetricSnapshot::new(key, components, updated_at))
    }
}

/// Insertable/changeset form of an `invoiced_totals` row.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = invoiced_totals)]
pub struct NewInvoicedTotals {
    pub year: i32,
    pub month: i32,
    pub invoices_total: String,
    pub credit_notes_total: String,
    pub reversed_total: String,
    pub amount: String,
    pub updated_at: String,
}

impl NewInvoicedTotals {
    pub fn new(
        period: PeriodKey,
        components: &InvoicedTotalsComponents,
        updated_at: OffsetDateTime,
    ) -> Result<Self, PersistenceError> {
        let (year, month) = encode_period(period);
        Ok(Self {
            year,
            month,
            invoices_total: format_fixed(components.invoices_total),
            credit_notes_total: format_fixed(components.credit_notes_total),
            reversed_total: format_fixed(components.reversed_total),
            amount: format_fixed(components.amount()),
            updated_at: encode_timestamp(updated_at)?,
        })
    }
}

// ============================================================================
// external_hours
// ============================================================================

/// Diesel Queryable struct for `external_hours` rows.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = external_hours)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExternalHoursRow {
    pub year: i32,
    pub month: i32,
    pub total_external_hours: String,
    pub total_subscription_used_hours: String,
    pub total_used_hours: String,
    pub total_monthly_subscription_hours: String,
    pub total_sold_hours: String,
    pub updated_at: String,
}

impl ExternalHoursRow {
    pub fn into_snapshot(self) -> Result<ExternalHoursSnapshot, PersistenceError> {
        const TABLE: &str = "external_hours";
        let key = decode_period(TABLE, self.year, self.month)?;
        let components = ExternalHoursComponents {
            total_external_hours: decode_decimal(TABLE, &self.total_external_hours)?,
            total_subscription_used_hours: decode_decimal(
                TABLE,
                &self.total_subscription_used_hours,
            )?,
            total_used_hours: decode_decimal(TABLE, &self.total_used_hours)?,
            total_monthly_subscription_hours: decode_decimal(
                TABLE,
                &self.total_monthly_subscription_hours,
            )?,
            total_sold_hours: decode_decimal(TABLE, &self.total_sold_hours)?,
        };
        let updated_at = decode_timestamp(TABLE, &self.updated_at)?;
        Ok(MetricSnapshot::new(key, components, updated_at))
    }
}

/// Insertable/changeset form of an `external_hours` row.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = external_hours)]
pub struct NewExternalHours {
    pub year: i32,
    pub month: i32,
    pub total_external_hours: String,
    pub total_subscription_used_hours: String,
    pub total_used_hours: String,
    pub total_monthly_subscription_hours: String,
    pub total_sold_hours: String,
    pub updated_at: String,
}

impl NewExternalHours {
    pub fn new(
        period: PeriodKey,
        components: &ExternalHoursComponents,
        updated_at: OffsetDateTime,
    ) -> Result<Self, PersistenceError> {
        let (year, month) = encode_period(period);
        Ok(Self {
            year,
            month,
            total_external_hours: format_fixed(components.total_external_hours),
            total_subscription_used_hours: format_fixed(components.total_subscription_used_hours),
            total_used_hours: format_fixed(components.total_used_hours),
            total_monthly_subscription_hours: format_fixed(
                components.total_monthly_subscription_hours,
            ),
            total_sold_hours: format_fixed(components.total_sold_hours),
            updated_at: encode_timestamp(updated_at)?,
        })
    }
}

// ============================================================================
// sales_order_totals
// ============================================================================

/// Diesel Queryable struct for `sales_order_totals` rows.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = sales_order_totals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SalesOrderTotalsRow {
    pub year: i32,
    pub month: i32,
    pub total_amount: String,
    pub updated_at: String,
}

impl SalesOrderTotalsRow {
    pub fn into_snapshot(self) -> Result<SalesOrderTotalsSnapshot, PersistenceError> {
        const TABLE: &str = "sales_order_totals";
        let key = decode_period(TABLE, self.year, self.month)?;
        let components = SalesOrderTotalsComponents {
            total_amount: decode_decimal(TABLE, &self.total_amount)?,
        };
        let updated_at = decode_timestamp(TABLE, &self.updated_at)?;
        Ok(MetricSnapshot::new(key, components, updated_at))
    }
}

/// Insertable/changeset form of a `sales_order_totals` row.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = sales_order_totals)]
pub struct NewSalesOrderTotals {
    pub year: i32,
    pub month: i32,
    pub total_amount: String,
    pub updated_at: String,
}

impl NewSalesOrderTotals {
    pub fn new(
        period: PeriodKey,
        components: &SalesOrderTotalsComponents,
        updated_at: OffsetDateTime,
    ) -> Result<Self, PersistenceError> {
        let (year, month) = encode_period(period);
        Ok(Self {
            year,
            month,
            total_amount: format_fixed(components.total_amount),
            updated_at: encode_timestamp(updated_at)?,
        })
    }
}

// ============================================================================
// utilization_records
// ============================================================================

/// Diesel Queryable struct for `utilization_records` rows.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = utilization_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UtilizationRow {
    pub year: i32,
    pub month: i32,
    pub entity_id: i64,
    pub available_hours: String,
    pub logged_hours: String,
    pub planned_hours: String,
    pub utilization_percent: Option<String>,
    pub updated_at: String,
}

impl UtilizationRow {
    pub fn into_snapshot(self) -> Result<UtilizationSnapshot, PersistenceError> {
        const TABLE: &str = "utilization_records";
        let period = decode_period(TABLE, self.year, self.month)?;
        let components = UtilizationComponents {
            available_hours: decode_decimal(TABLE, &self.available_hours)?,
            logged_hours: decode_decimal(TABLE, &self.logged_hours)?,
            planned_hours: decode_decimal(TABLE, &self.planned_hours)?,
        };
        let updated_at = decode_timestamp(TABLE, &self.updated_at)?;
        Ok(MetricSnapshot::new(
            EntityPeriodKey::new(period, self.entity_id),
            components,
            updated_at,
        ))
    }
}

/// Insertable/changeset form of a `utilization_records` row.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = utilization_records)]
#[diesel(treat_none_as_null = true)]
pub struct NewUtilization {
    pub year: i32,
    pub month: i32,
    pub entity_id: i64,
    pub available_hours: String,
    pub logged_hours: String,
    pub planned_hours: String,
    pub utilization_percent: Option<String>,
    pub updated_at: String,
}

impl NewUtilization {
    pub fn new(
        key: EntityPeriodKey,
        components: &UtilizationComponents,
        updated_at: OffsetDateTime,
    ) -> Result<Self, PersistenceError> {
        let (year, month) = encode_period(key.period());
        Ok(Self {
            year,
            month,
            entity_id: key.entity_id(),
            available_hours: format_fixed(components.available_hours),
            logged_hours: format_fixed(components.logged_hours),
            planned_hours: format_fixed(components.planned_hours),
            utilization_percent: headline_text(components),
            updated_at: encode_timestamp(updated_at)?,
        })
    }
}

// ============================================================================
// cache_settings
// ============================================================================

/// Diesel Queryable struct for the `cache_settings` row.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = cache_settings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CacheSettingsRow {
    pub invoiced_chunk_size: i32,
    pub external_hours_chunk_size: i32,
    pub sales_order_chunk_size: i32,
    pub utilization_chunk_size: i32,
    pub max_series_periods: Option<i32>,
    pub refresh_concurrency: i32,
    pub serve_stale_on_failure: i32,
    pub internal_partner_id: Option<i64>,
    pub utc_offset_hours: i32,
    pub updated_at: String,
}

/// Changeset applied to the `cache_settings` row.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = cache_settings)]
#[diesel(treat_none_as_null = true)]
pub struct CacheSettingsChanges {
    pub invoiced_chunk_size: i32,
    pub external_hours_chunk_size: i32,
    pub sales_order_chunk_size: i32,
    pub utilization_chunk_size: i32,
    pub max_series_periods: Option<i32>,
    pub refresh_concurrency: i32,
    pub serve_stale_on_failure: i32,
    pub internal_partner_id: Option<i64>,
    pub utc_offset_hours: i32,
    pub updated_at: String,
}

/// Engine settings persisted in the single `cache_settings` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheSettings {
    /// Records per source call for invoiced totals.
    pub invoiced_chunk_size: u32,
    /// Records per source call for external hours.
    pub external_hours_chunk_size: u32,
    /// Records per source call for sales order totals.
    pub sales_order_chunk_size: u32,
    /// Records per source call for utilization.
    pub utilization_chunk_size: u32,
    /// Longest series a caller may request.
    pub max_series_periods: Option<u32>,
    /// Keys refreshed in parallel by a bulk refresh.
    pub refresh_concurrency: u32,
    /// Serve the previous snapshot when the source fails.
    pub serve_stale_on_failure: bool,
    /// Counterparty excluded from invoiced and sales totals.
    pub internal_partner_id: Option<i64>,
    /// UTC offset deciding where a month boundary falls.
    pub utc_offset_hours: i8,
    /// When the settings were last written.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl CacheSettingsRow {
    pub fn into_settings(self) -> Result<CacheSettings, PersistenceError> {
        const TABLE: &str = "cache_settings";
        let positive = |column: &str, value: i32| {
            u32::try_from(value)
                .ok()
                .filter(|v| *v > 0)
                .ok_or_else(|| PersistenceError::DecodeFailed {
                    table: TABLE,
                    reason: format!("{column} must be positive, got {value}"),
                })
        };
        Ok(CacheSettings {
            invoiced_chunk_size: positive("invoiced_chunk_size", self.invoiced_chunk_size)?,
            external_hours_chunk_size: positive(
                "external_hours_chunk_size",
                self.external_hours_chunk_size,
            )?,
            sales_order_chunk_size: positive("sales_order_chunk_size", self.sales_order_chunk_size)?,
            utilization_chunk_size: positive("utilization_chunk_size", self.utilization_chunk_size)?,
            max_series_periods: self
                .max_series_periods
                .map(|v| positive("max_series_periods", v))
                .transpose()?,
            refresh_concurrency: positive("refresh_concurrency", self.refresh_concurrency)?,
            serve_stale_on_failure: self.serve_stale_on_failure != 0,
            internal_partner_id: self.internal_partner_id,
            utc_offset_hours: i8::try_from(self.utc_offset_hours).map_err(|_| {
                PersistenceError::DecodeFailed {
                    table: TABLE,
                    reason: format!("utc_offset_hours {} out of range", self.utc_offset_hours),
                }
            })?,
            updated_at: decode_timestamp(TABLE, &self.updated_at)?,
        })
    }
}

impl CacheSettingsChanges {
    pub fn new(settings: &CacheSettings, updated_at: OffsetDateTime) -> Result<Self, PersistenceError> {
        let positive = |column: &str, value: u32| {
            i32::try_from(value)
                .ok()
                .filter(|v| *v > 0)
                .ok_or_else(|| {
                    PersistenceError::InvalidSettings(format!("{column} must be between 1 and {}", i32::MAX))
                })
        };
        if !(-23..=23).contains(&settings.utc_offset_hours) {
            return Err(PersistenceError::InvalidSettings(format!(
                "utc_offset_hours must be between -23 and 23, got {}",
                settings.utc_offset_hours
            )));
        }
        Ok(Self {
            invoiced_chunk_size: positive("invoiced_chunk_size", settings.invoiced_chunk_size)?,
            external_hours_chunk_size: positive(
                "external_hours_chunk_size",
                settings.external_hours_chunk_size,
            )?,
            sales_order_chunk_size: positive(
                "sales_order_chunk_size",
                settings.sales_order_chunk_size,
            )?,
            utilization_chunk_size: positive(
                "utilization_chunk_size",
                settings.utilization_chunk_size,
            )?,
            max_series_periods: settings
                .max_series_periods
                .map(|v| positive("max_series_periods", v))
                .transpose()?,
            refresh_concurrency: positive("refresh_concurrency", settings.refresh_concurrency)?,
            serve_stale_on_failure: i32::from(settings.serve_stale_on_failure),
            internal_partner_id: settings.internal_partner_id,
            utc_offset_hours: i32::from(settings.utc_offset_hours),
            updated_at: encode_timestamp(updated_at)?,
        })
    }
}
