// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! SQLite-specific backend utilities.
//!
//! This module is limited to:
//! - Connection initialization
//! - Migration execution
//! - SQLite-specific configuration and checks (PRAGMA statements)

use diesel::prelude::*;
use diesel::sql_types::{Integer, Text};
use diesel::{Connection, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info};

use crate::error::PersistenceError;

/// Embedded `SQLite` migrations.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Metric tables and the unique index each must carry over its key tuple.
pub const METRIC_TABLE_INDEXES: [(&str, &str); 4] = [
    ("invoiced_totals", "idx_invoiced_totals_key"),
    ("external_hours", "idx_external_hours_key"),
    ("sales_order_totals", "idx_sales_order_totals_key"),
    ("utilization_records", "idx_utilization_records_key"),
];

/// Helper row struct for `PRAGMA index_list`.
#[derive(QueryableByName)]
struct IndexListRow {
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = Integer)]
    unique: i32,
}

/// Verifies that every metric table carries its unique key index.
///
/// Upserts conflict on that index; without it a second write for the same
/// key would append a row instead of replacing the first.
///
/// # Errors
///
/// Returns an error if an index is missing or not unique.
pub fn verify_unique_key_indexes(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    for (table, index) in METRIC_TABLE_INDEXES {
        // NOTE: PRAGMA is raw SQL (justified - Diesel has no PRAGMA DSL).
        // The table name comes from the constant list above.
        let rows: Vec<IndexListRow> = diesel::sql_query(format!("PRAGMA index_list({table})"))
            .load(conn)
            .map_err(|e| PersistenceError::QueryFailed(format!("index_list({table}): {e}")))?;

        let present = rows.iter().any(|row| row.name == index && row.unique == 1);
        if !present {
            return Err(PersistenceError::MissingUniqueIndex { table });
        }
        debug!(table, index, "Unique key index present");
    }
    Ok(())
}

/// Run pending migrations on the provided connection.
///
/// # Errors
///
/// Returns an error if migration execution fails.
pub fn run_migrations(
    conn: &mut SqliteConnection,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Running SQLite database migrations");
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    info!(applied = applied.len(), "Migrations complete");
    Ok(())
}

/// Initialize a `SQLite` database at the given URL and run migrations.
///
/// # Errors
///
/// Returns an error if connection or migration fails.
pub fn initialize_database(database_url: &str) -> Result<SqliteConnection, PersistenceError> {
    info!("Initializing SQLite database at: {}", database_url);

    let mut conn: SqliteConnection = SqliteConnection::establish(database_url)
        .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))?;

    // Concurrent writers wait instead of failing immediately.
    // NOTE: PRAGMA is raw SQL (justified - Diesel has no PRAGMA DSL)
    diesel::sql_query("PRAGMA busy_timeout = 5000")
        .execute(&mut conn)
        .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;

    run_migrations(&mut conn).map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;

    Ok(conn)
}

/// Enable WAL mode for file-based `SQLite` databases.
///
/// # Errors
///
/// Returns an error if the PRAGMA statement fails.
pub fn enable_wal_mode(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    // NOTE: PRAGMA is raw SQL (justified - Diesel has no PRAGMA DSL)
    diesel::sql_query("PRAGMA journal_mode = WAL")
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;
    Ok(())
}
