// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Metric snapshot queries.
//!
//! One lookup and one listing per metric table. Listings are ordered by key.

use diesel::SqliteConnection;
use diesel::prelude::*;
use metricache_domain::MetricKind;

use crate::data_models::{ExternalHoursRow, InvoicedTotalsRow, SalesOrderTotalsRow, UtilizationRow};
use crate::diesel_schema::{external_hours, invoiced_totals, sales_order_totals, utilization_records};
use crate::error::PersistenceError;

/// Fetches the `invoiced_totals` row for a period.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_invoiced_totals(
    conn: &mut SqliteConnection,
    year: i32,
    month: i32,
) -> Result<Option<InvoicedTotalsRow>, PersistenceError> {
    invoiced_totals::table
        .filter(invoiced_totals::year.eq(year))
        .filter(invoiced_totals::month.eq(month))
        .select(InvoicedTotalsRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_invoiced_totals: {e}")))
}

/// Lists all `invoiced_totals` rows.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_invoiced_totals(
    conn: &mut SqliteConnection,
) -> Result<Vec<InvoicedTotalsRow>, PersistenceError> {
    invoiced_totals::table
        .order((invoiced_totals::year.asc(), invoiced_totals::month.asc()))
        .select(InvoicedTotalsRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_invoiced_totals: {e}")))
}

/// Fetches the `external_hours` row for a period.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_external_hours(
    conn: &mut SqliteConnection,
    year: i32,
    month: i32,
) -> Result<Option<ExternalHoursRow>, PersistenceError> {
    external_hours::table
        .filter(external_hours::year.eq(year))
        .filter(external_hours::month.eq(month))
        .select(ExternalHoursRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_external_hours: {e}")))
}

/// Lists all `external_hours` rows.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_external_hours(
    conn: &mut SqliteConnection,
) -> Result<Vec<ExternalHoursRow>, PersistenceError> {
    external_hours::table
        .order((external_hours::year.asc(), external_hours::month.asc()))
        .select(ExternalHoursRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_external_hours: {e}")))
}

/// Fetches the `sales_order_totals` row for a period.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_sales_order_totals(
    conn: &mut SqliteConnection,
    year: i32,
    month: i32,
) -> Result<Option<SalesOrderTotalsRow>, PersistenceError> {
    sales_order_totals::table
        .filter(sales_order_totals::year.eq(year))
        .filter(sales_order_totals::month.eq(month))
        .select(SalesOrderTotalsRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_sales_order_totals: {e}")))
}

/// Lists all `sales_order_totals` rows.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_sales_order_totals(
    conn: &mut SqliteConnection,
) -> Result<Vec<SalesOrderTotalsRow>, PersistenceError> {
    sales_order_totals::table
        .order((sales_order_totals::year.asc(), sales_order_totals::month.asc()))
        .select(SalesOrderTotalsRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_sales_order_totals: {e}")))
}

/// Fetches the `utilization_records` row for an entity and period.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_utilization(
    conn: &mut SqliteConnection,
    year: i32,
    month: i32,
    entity_id: i64,
) -> Result<Option<UtilizationRow>, PersistenceError> {
    utilization_records::table
        .filter(utilization_records::year.eq(year))
        .filter(utilization_records::month.eq(month))
        .filter(utilization_records::entity_id.eq(entity_id))
        .select(UtilizationRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_utilization: {e}")))
}

/// Lists `utilization_records` rows, optionally for one entity only.
///
/// Rows are ordered by period, then entity.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_utilization(
    conn: &mut SqliteConnection,
    entity_id: Option<i64>,
) -> Result<Vec<UtilizationRow>, PersistenceError> {
    let query = utilization_records::table
        .order((
            utilization_records::year.asc(),
            utilization_records::month.asc(),
            utilization_records::entity_id.asc(),
        ))
        .select(UtilizationRow::as_select());
    let rows: QueryResult<Vec<UtilizationRow>> = match entity_id {
        Some(entity_id) => query
            .filter(utilization_records::entity_id.eq(entity_id))
            .load(conn),
        None => query.load(conn),
    };
    rows.map_err(|e| PersistenceError::QueryFailed(format!("list_utilization: {e}")))
}

/// Counts stored rows of a metric kind.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_rows(conn: &mut SqliteConnection, kind: MetricKind) -> Result<i64, PersistenceError> {
    let count: QueryResult<i64> = match kind {
        MetricKind::InvoicedTotals => invoiced_totals::table.count().get_result(conn),
        MetricKind::ExternalHours => external_hours::table.count().get_result(conn),
        MetricKind::SalesOrderTotals => sales_order_totals::table.count().get_result(conn),
        MetricKind::Utilization => utilization_records::table.count().get_result(conn),
    };
    count.map_err(|e| PersistenceError::QueryFailed(format!("count_rows({kind}): {e}")))
}
