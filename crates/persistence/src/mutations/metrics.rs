// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Metric snapshot mutations.
//!
//! Writes are upserts that conflict on each table's unique key index, so a
//! key never has more than one row. Rows are only ever replaced whole.

use diesel::SqliteConnection;
use diesel::prelude::*;
use metricache_domain::MetricKind;
use tracing::debug;

use crate::data_models::{NewExternalHours, NewInvoicedTotals, NewSalesOrderTotals, NewUtilization};
use crate::diesel_schema::{external_hours, invoiced_totals, sales_order_totals, utilization_records};
use crate::error::PersistenceError;

/// Creates or replaces the `invoiced_totals` row for the row's period.
///
/// # Errors
///
/// Returns an error if the database write fails.
pub fn upsert_invoiced_totals(
    conn: &mut SqliteConnection,
    row: &NewInvoicedTotals,
) -> Result<(), PersistenceError> {
    diesel::insert_into(invoiced_totals::table)
        .values(row)
        .on_conflict((invoiced_totals::year, invoiced_totals::month))
        .do_update()
        .set(row)
        .execute(conn)?;
    Ok(())
}

/// Creates or replaces the `external_hours` row for the row's period.
///
/// # Errors
///
/// Returns an error if the database write fails.
pub fn upsert_external_hours(
    conn: &mut SqliteConnection,
    row: &NewExternalHours,
) -> Result<(), PersistenceError> {
    diesel::insert_into(external_hours::table)
        .values(row)
        .on_conflict((external_hours::year, external_hours::month))
        .do_update()
        .set(row)
        .execute(conn)?;
    Ok(())
}

/// Creates or replaces the `sales_order_totals` row for the row's period.
///
/// # Errors
///
/// Returns an error if the database write fails.
pub fn upsert_sales_order_totals(
    conn: &mut SqliteConnection,
    row: &NewSalesOrderTotals,
) -> Result<(), PersistenceError> {
    diesel::insert_into(sales_order_totals::table)
        .values(row)
        .on_conflict((sales_order_totals::year, sales_order_totals::month))
        .do_update()
        .set(row)
        .execute(conn)?;
    Ok(())
}

/// Creates or replaces the `utilization_records` row for the row's entity
/// and period.
///
/// # Errors
///
/// Returns an error if the database write fails.
pub fn upsert_utilization(
    conn: &mut SqliteConnection,
    row: &NewUtilization,
) -> Result<(), PersistenceError> {
    diesel::insert_into(utilization_records::table)
        .values(row)
        .on_conflict((
            utilization_records::year,
            utilization_records::month,
            utilization_records::entity_id,
        ))
        .do_update()
        .set(row)
        .execute(conn)?;
    Ok(())
}

/// Deletes every row of `kind` for one period.
///
/// Returns the number of rows removed.
///
/// # Errors
///
/// Returns an error if the database write fails.
pub fn delete_snapshots(
    conn: &mut SqliteConnection,
    kind: MetricKind,
    year: i32,
    month: i32,
) -> Result<usize, PersistenceError> {
    let deleted: usize = match kind {
        MetricKind::InvoicedTotals => diesel::delete(
            invoiced_totals::table
                .filter(invoiced_totals::year.eq(year))
                .filter(invoiced_totals::month.eq(month)),
        )
        .execute(conn)?,
        MetricKind::ExternalHours => diesel::delete(
            external_hours::table
                .filter(external_hours::year.eq(year))
                .filter(external_hours::month.eq(month)),
        )
        .execute(conn)?,
        MetricKind::SalesOrderTotals => diesel::delete(
            sales_order_totals::table
                .filter(sales_order_totals::year.eq(year))
                .filter(sales_order_totals::month.eq(month)),
        )
        .execute(conn)?,
        MetricKind::Utilization => diesel::delete(
            utilization_records::table
                .filter(utilization_records::year.eq(year))
                .filter(utilization_records::month.eq(month)),
        )
        .execute(conn)?,
    };
    debug!(kind = %kind, year, month, deleted, "Deleted snapshots");
    Ok(deleted)
}
