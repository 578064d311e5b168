// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! JSON record fixtures.
//!
//! A fixture file holds one array per record type; missing arrays are
//! empty:
//!
//! ```json
//! {
//!   "invoices": [
//!     { "id": 1, "kind": "invoice", "partner_id": 7,
//!       "date": "2025-03-04", "amount": "1250.00" }
//!   ],
//!   "capacity": [
//!     { "id": 1, "employee_id": 3, "kind": "available",
//!       "date": "2025-03-03", "hours": "8.00" }
//!   ]
//! }
//! ```

use crate::memory::MemorySource;
use metricache_domain::{CapacityEntry, HoursLine, InvoiceRecord, SalesOrderRecord};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors raised while loading fixtures.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The file could not be read.
    #[error("Failed to read fixtures from {path}: {source}")]
    Io {
        /// The file.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
    /// The document is not valid fixture JSON.
    #[error("Invalid fixture document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Raw records for every domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordFixtures {
    pub invoices: Vec<InvoiceRecord>,
    pub hours: Vec<HoursLine>,
    pub sales_orders: Vec<SalesOrderRecord>,
    pub capacity: Vec<CapacityEntry>,
}

impl RecordFixtures {
    /// Parses fixtures from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe valid records.
    pub fn from_json_str(json: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads fixtures from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let fixtures = Self::from_json_str(&json)?;
        info!(
            path = %path.display(),
            invoices = fixtures.invoices.len(),
            hours = fixtures.hours.len(),
            sales_orders = fixtures.sales_orders.len(),
            capacity = fixtures.capacity.len(),
            "Loaded record fixtures"
        );
        Ok(fixtures)
    }

    /// Distinct employee ids with capacity entries, ascending.
    #[must_use]
    pub fn employee_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.capacity.iter().map(|entry| entry.employee_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Splits the fixtures into one source per domain.
    #[must_use]
    pub fn into_sources(self) -> FixtureSources {
        FixtureSources {
            invoices: Arc::new(MemorySource::new(self.invoices)),
            hours: Arc::new(MemorySource::new(self.hours)),
            sales_orders: Arc::new(MemorySource::new(self.sales_orders)),
            capacity: Arc::new(MemorySource::new(self.capacity)),
        }
    }
}

/// One in-memory source per domain.
#[derive(Debug, Clone, Default)]
pub struct FixtureSources {
    pub invoices: Arc<MemorySource<InvoiceRecord>>,
    pub hours: Arc<MemorySource<HoursLine>>,
    pub sales_orders: Arc<MemorySource<SalesOrderRecord>>,
    pub capacity: Arc<MemorySource<CapacityEntry>>,
}
