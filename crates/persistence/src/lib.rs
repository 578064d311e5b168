// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the metric cache.
//!
//! One table per metric domain, each with a unique index over its key tuple
//! (`(year, month)`, or `(year, month, entity_id)` for utilization). Every
//! write is an upsert against that index and stamps `updated_at`, so a key
//! has at most one row and a reader sees either the previous row or the new
//! one. Engine settings live in a single-row `cache_settings` table.
//!
//! Built on Diesel over `SQLite`, with embedded migrations.
//!
//! ## Testing
//!
//! `Persistence::new_in_memory()` gives every caller its own shared-cache
//! in-memory database, so tests never see each other's rows.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use diesel::prelude::*;
use metricache_domain::{
    EntityPeriodKey, ExternalHoursComponents, InvoicedTotalsComponents, MetricKind, PeriodKey,
    SalesOrderTotalsComponents, UtilizationComponents,
};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;
use tracing::info;

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod store;

#[cfg(test)]
mod tests;

pub use data_models::{
    CacheSettings, ExternalHoursSnapshot, InvoicedTotalsSnapshot, SalesOrderTotalsSnapshot,
    UtilizationSnapshot,
};
pub use error::PersistenceError;
pub use store::{SnapshotTable, SqliteCacheStore};

use data_models::{
    CacheSettingsChanges, NewExternalHours, NewInvoicedTotals, NewSalesOrderTotals,
    NewUtilization, encode_period,
};

/// Persistence adapter for metric snapshots and engine settings.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("memdb_metricache_{db_id}");
        let shared_memory_url = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_unique_key_indexes(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;

        // Enable WAL mode for better read concurrency
        backend::sqlite::enable_wal_mode(&mut conn)?;

        backend::sqlite::verify_unique_key_indexes(&mut conn)?;

        info!(path = path_str, "Opened cache database");
        Ok(Self { conn })
    }

    /// Verifies that every metric table carries its unique key index.
    ///
    /// # Errors
    ///
    /// Returns an error if an index is missing.
    pub fn verify_unique_key_indexes(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_unique_key_indexes(&mut self.conn)
    }

    // ========================================================================
    // Invoiced totals
    // ========================================================================

    /// Returns the invoiced totals snapshot for `period`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row cannot be decoded.
    pub fn get_invoiced_totals(
        &mut self,
        period: PeriodKey,
    ) -> Result<Option<InvoicedTotalsSnapshot>, PersistenceError> {
        let (year, month) = encode_period(period);
        queries::metrics::get_invoiced_totals(&mut self.conn, year, month)?
            .map(data_models::InvoicedTotalsRow::into_snapshot)
            .transpose()
    }

    /// Creates or replaces the invoiced totals snapshot for `period`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn upsert_invoiced_totals(
        &mut self,
        period: PeriodKey,
        components: &InvoicedTotalsComponents,
        updated_at: OffsetDateTime,
    ) -> Result<InvoicedTotalsSnapshot, PersistenceError> {
        let row = NewInvoicedTotals::new(period, components, updated_at)?;
        self.conn.transaction(|conn| {
            mutations::metrics::upsert_invoiced_totals(conn, &row)?;
            queries::metrics::get_invoiced_totals(conn, row.year, row.month)?
                .ok_or_else(|| PersistenceError::NotFound(format!("invoiced_totals {period}")))?
                .into_snapshot()
        })
    }

    /// Lists every invoiced totals snapshot, ordered by period.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn list_invoiced_totals(&mut self) -> Result<Vec<InvoicedTotalsSnapshot>, PersistenceError> {
        queries::metrics::list_invoiced_totals(&mut self.conn)?
            .into_iter()
            .map(data_models::InvoicedTotalsRow::into_snapshot)
            .collect()
    }

    // ========================================================================
    // External hours
    // ========================================================================

    /// Returns the external hours snapshot for `period`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row cannot be decoded.
    pub fn get_external_hours(
        &mut self,
        period: PeriodKey,
    ) -> Result<Option<ExternalHoursSnapshot>, PersistenceError> {
        let (year, month) = encode_period(period);
        queries::metrics::get_external_hours(&mut self.conn, year, month)?
            .map(data_models::ExternalHoursRow::into_snapshot)
            .transpose()
    }

    /// Creates or replaces the external hours snapshot for `period`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn upsert_external_hours(
        &mut self,
        period: PeriodKey,
        components: &ExternalHoursComponents,
        updated_at: OffsetDateTime,
    ) -> Result<ExternalHoursSnapshot, PersistenceError> {
        let row = NewExternalHours::new(period, components, updated_at)?;
        self.conn.transaction(|conn| {
            mutations::metrics::upsert_external_hours(conn, &row)?;
            queries::metrics::get_external_hours(conn, row.year, row.month)?
                .ok_or_else(|| PersistenceError::NotFound(format!("external_hours {period}")))?
                .into_snapshot()
        })
    }

    /// Lists every external hours snapshot, ordered by period.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn list_external_hours(&mut self) -> Result<Vec<ExternalHoursSnapshot>, PersistenceError> {
        queries::metrics::list_external_hours(&mut self.conn)?
            .into_iter()
            .map(data_models::ExternalHoursRow::into_snapshot)
            .collect()
    }

    // ========================================================================
    // Sales order totals
    // ========================================================================

    /// Returns the sales order totals snapshot for `period`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row cannot be decoded.
    pub fn get_sales_order_totals(
        &mut self,
        period: PeriodKey,
    ) -> Result<Option<SalesOrderTotalsSnapshot>, PersistenceError> {
        let (year, month) = encode_period(period);
        queries::metrics::get_sales_order_totals(&mut self.conn, year, month)?
            .map(data_models::SalesOrderTotalsRow::into_snapshot)
            .transpose()
    }

    /// Creates or replaces the sales order totals snapshot for `period`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn upsert_sales_order_totals(
        &mut self,
        period: PeriodKey,
        components: &SalesOrderTotalsComponents,
        updated_at: OffsetDateTime,
    ) -> Result<SalesOrderTotalsSnapshot, PersistenceError> {
        let row = NewSalesOrderTotals::new(period, components, updated_at)?;
        self.conn.transaction(|conn| {
            mutations::metrics::upsert_sales_order_totals(conn, &row)?;
            queries::metrics::get_sales_order_totals(conn, row.year, row.month)?
                .ok_or_else(|| {
                    PersistenceError::NotFound(format!("sales_order_totals {period}"))
                })?
                .into_snapshot()
        })
    }

    /// Lists every sales order totals snapshot, ordered by period.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn list_sales_order_totals(
        &mut self,
    ) -> Result<Vec<SalesOrderTotalsSnapshot>, PersistenceError> {
        queries::metrics::list_sales_order_totals(&mut self.conn)?
            .into_iter()
            .map(data_models::SalesOrderTotalsRow::into_snapshot)
            .collect()
    }

    // ========================================================================
    // Utilization
    // ========================================================================

    /// Returns the utilization snapshot for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row cannot be decoded.
    pub fn get_utilization(
        &mut self,
        key: EntityPeriodKey,
    ) -> Result<Option<UtilizationSnapshot>, PersistenceError> {
        let (year, month) = encode_period(key.period());
        queries::metrics::get_utilization(&mut self.conn, year, month, key.entity_id())?
            .map(data_models::UtilizationRow::into_snapshot)
            .transpose()
    }

    /// Creates or replaces the utilization snapshot for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn upsert_utilization(
        &mut self,
        key: EntityPeriodKey,
        components: &UtilizationComponents,
        updated_at: OffsetDateTime,
    ) -> Result<UtilizationSnapshot, PersistenceError> {
        let row = NewUtilization::new(key, components, updated_at)?;
        self.conn.transaction(|conn| {
            mutations::metrics::upsert_utilization(conn, &row)?;
            queries::metrics::get_utilization(conn, row.year, row.month, row.entity_id)?
                .ok_or_else(|| PersistenceError::NotFound(format!("utilization_records {key}")))?
                .into_snapshot()
        })
    }

    /// Lists utilization snapshots, optionally for one entity only.
    ///
    /// Ordered by period, then entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn list_utilization(
        &mut self,
        entity_id: Option<i64>,
    ) -> Result<Vec<UtilizationSnapshot>, PersistenceError> {
        queries::metrics::list_utilization(&mut self.conn, entity_id)?
            .into_iter()
            .map(data_models::UtilizationRow::into_snapshot)
            .collect()
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Counts the stored snapshots of `kind`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_snapshots(&mut self, kind: MetricKind) -> Result<i64, PersistenceError> {
        queries::metrics::count_rows(&mut self.conn, kind)
    }

    /// Deletes every snapshot of `kind` for `period`.
    ///
    /// This is cleanup tooling; normal operation never deletes snapshots.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn delete_snapshots(
        &mut self,
        kind: MetricKind,
        period: PeriodKey,
    ) -> Result<usize, PersistenceError> {
        let (year, month) = encode_period(period);
        let deleted = mutations::metrics::delete_snapshots(&mut self.conn, kind, year, month)?;
        info!(kind = %kind, period = %period, deleted, "Deleted cached snapshots");
        Ok(deleted)
    }

    // ========================================================================
    // Settings
    // ========================================================================

    /// Returns the engine settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings row is missing or invalid.
    pub fn get_settings(&mut self) -> Result<CacheSettings, PersistenceError> {
        queries::settings::get_settings(&mut self.conn)?.into_settings()
    }

    /// Overwrites the engine settings and returns them as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if `settings` fails validation or the write fails.
    pub fn update_settings(
        &mut self,
        settings: &CacheSettings,
        updated_at: OffsetDateTime,
    ) -> Result<CacheSettings, PersistenceError> {
        let changes = CacheSettingsChanges::new(settings, updated_at)?;
        self.conn.transaction(|conn| {
            mutations::settings::update_settings(conn, &changes)?;
            queries::settings::get_settings(conn)?.into_settings()
        })
    }
}
