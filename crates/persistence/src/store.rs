// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The `SQLite` implementation of the core cache store contract.

use async_trait::async_trait;
use metricache::{
    CacheStore, Clock, ExternalHours, InvoicedTotals, MetricDomain, SalesOrderTotals, Snapshot,
    StoreError, Utilization,
};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::debug;

use crate::Persistence;
use crate::error::PersistenceError;

/// Maps a metric domain onto its table.
pub trait SnapshotTable: MetricDomain {
    /// Reads the snapshot for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn get(
        persistence: &mut Persistence,
        key: &Self::Key,
    ) -> Result<Option<Snapshot<Self>>, PersistenceError>;

    /// Creates or replaces the snapshot for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn upsert(
        persistence: &mut Persistence,
        key: &Self::Key,
        components: &Self::Components,
        updated_at: OffsetDateTime,
    ) -> Result<Snapshot<Self>, PersistenceError>;

    /// Lists every snapshot, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn list(persistence: &mut Persistence) -> Result<Vec<Snapshot<Self>>, PersistenceError>;
}

impl SnapshotTable for InvoicedTotals {
    fn get(
        persistence: &mut Persistence,
        key: &Self::Key,
    ) -> Result<Option<Snapshot<Self>>, PersistenceError> {
        persistence.get_invoiced_totals(*key)
    }

    fn upsert(
        persistence: &mut Persistence,
        key: &Self::Key,
        components: &Self::Components,
        updated_at: OffsetDateTime,
    ) -> Result<Snapshot<Self>, PersistenceError> {
        persistence.upsert_invoiced_totals(*key, components, updated_at)
    }

    fn list(persistence: &mut Persistence) -> Result<Vec<Snapshot<Self>>, PersistenceError> {
        persistence.list_invoiced_totals()
    }
}

impl SnapshotTable for ExternalHours {
    fn get(
        persistence: &mut Persistence,
        key: &Self::Key,
    ) -> Result<Option<Snapshot<Self>>, PersistenceError> {
        persistence.get_external_hours(*key)
    }

    fn upsert(
        persistence: &mut Persistence,
        key: &Self::Key,
        components: &Self::Components,
        updated_at: OffsetDateTime,
    ) -> Result<Snapshot<Self>, PersistenceError> {
        persistence.upsert_external_hours(*key, components, updated_at)
    }

    fn list(persistence: &mut Persistence) -> Result<Vec<Snapshot<Self>>, PersistenceError> {
        persistence.list_external_hours()
    }
}

impl SnapshotTable for SalesOrderTotals {
    fn get(
        persistence: &mut Persistence,
        key: &Self::Key,
    ) -> Result<Option<Snapshot<Self>>, PersistenceError> {
        persistence.get_sales_order_totals(*key)
    }

    fn upsert(
        persistence: &mut Persistence,
        key: &Self::Key,
        components: &Self::Components,
        updated_at: OffsetDateTime,
    ) -> Result<Snapshot<Self>, PersistenceError> {
        persistence.upsert_sales_order_totals(*key, components, updated_at)
    }

    fn list(persistence: &mut Persistence) -> Result<Vec<Snapshot<Self>>, PersistenceError> {
        persistence.list_sales_order_totals()
    }
}

impl SnapshotTable for Utilization {
    fn get(
        persistence: &mut Persistence,
        key: &Self::Key,
    ) -> Result<Option<Snapshot<Self>>, PersistenceError> {
        persistence.get_utilization(*key)
    }

    fn upsert(
        persistence: &mut Persistence,
        key: &Self::Key,
        components: &Self::Components,
        updated_at: OffsetDateTime,
    ) -> Result<Snapshot<Self>, PersistenceError> {
        persistence.upsert_utilization(*key, components, updated_at)
    }

    fn list(persistence: &mut Persistence) -> Result<Vec<Snapshot<Self>>, PersistenceError> {
        persistence.list_utilization(None)
    }
}

/// Cache store backed by a shared [`Persistence`] connection.
///
/// One store serves every domain; the connection is shared behind an async
/// mutex and each call holds it for a single short statement or transaction.
#[derive(Clone)]
pub struct SqliteCacheStore {
    persistence: Arc<Mutex<Persistence>>,
    clock: Arc<dyn Clock>,
}

impl SqliteCacheStore {
    /// Wraps `persistence`, stamping writes with `clock`.
    #[must_use]
    pub fn new(persistence: Persistence, clock: Arc<dyn Clock>) -> Self {
        Self::shared(Arc::new(Mutex::new(persistence)), clock)
    }

    /// Wraps an already shared connection.
    #[must_use]
    pub fn shared(persistence: Arc<Mutex<Persistence>>, clock: Arc<dyn Clock>) -> Self {
        Self { persistence, clock }
    }

    /// Returns the shared connection.
    #[must_use]
    pub fn persistence(&self) -> Arc<Mutex<Persistence>> {
        Arc::clone(&self.persistence)
    }
}

#[async_trait]
impl<D: SnapshotTable> CacheStore<D> for SqliteCacheStore {
    async fn get(&self, key: &D::Key) -> Result<Option<Snapshot<D>>, StoreError> {
        let mut persistence = self.persistence.lock().await;
        D::get(&mut persistence, key).map_err(|e| StoreError::Read(e.to_string()))
    }

    async fn upsert(
        &self,
        key: &D::Key,
        components: &D::Components,
    ) -> Result<Snapshot<D>, StoreError> {
        let updated_at = self.clock.now();
        let mut persistence = self.persistence.lock().await;
        let snapshot = D::upsert(&mut persistence, key, components, updated_at)
            .map_err(|e| StoreError::Write(e.to_string()))?;
        debug!(kind = %D::KIND, key = %key, "Snapshot written");
        Ok(snapshot)
    }

    async fn list_all(&self) -> Result<Vec<Snapshot<D>>, StoreError> {
        let mut persistence = self.persistence.lock().await;
        D::list(&mut persistence).map_err(|e| StoreError::Read(e.to_string()))
    }
}
