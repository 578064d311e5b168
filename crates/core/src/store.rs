// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::clock::{Clock, SystemClock};
use crate::domains::{MetricDomain, Snapshot};
use async_trait::async_trait;
use metricache_domain::MetricSnapshot;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Failures reported by a cache store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Reading a snapshot failed.
    #[error("Cache read failed: {0}")]
    Read(String),
    /// Writing a snapshot failed.
    #[error("Cache write failed: {0}")]
    Write(String),
}

/// Durable keyed storage for the snapshots of one domain.
///
/// At most one snapshot exists per key. `upsert` creates or replaces it
/// atomically, stamps `updated_at` and derives the headline from the
/// components being written. Concurrent upserts of the same key are
/// last-write-wins.
#[async_trait]
pub trait CacheStore<D: MetricDomain>: Send + Sync {
    /// Returns the snapshot for `key`, if one has been written.
    async fn get(&self, key: &D::Key) -> Result<Option<Snapshot<D>>, StoreError>;

    /// Creates or replaces the snapshot for `key`.
    async fn upsert(
        &self,
        key: &D::Key,
        components: &D::Components,
    ) -> Result<Snapshot<D>, StoreError>;

    /// Returns every stored snapshot, ordered by key.
    async fn list_all(&self) -> Result<Vec<Snapshot<D>>, StoreError>;
}

/// A process-local cache store.
pub struct MemoryCacheStore<D: MetricDomain> {
    rows: RwLock<BTreeMap<D::Key, Snapshot<D>>>,
    clock: Arc<dyn Clock>,
}

impl<D: MetricDomain> MemoryCacheStore<D> {
    /// Creates an empty store stamping writes with the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::utc()))
    }

    /// Creates an empty store stamping writes with `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            clock,
        }
    }

    /// Number of stored snapshots.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Whether the store holds no snapshots.
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

impl<D: MetricDomain> Default for MemoryCacheStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<D: MetricDomain> CacheStore<D> for MemoryCacheStore<D> {
    async fn get(&self, key: &D::Key) -> Result<Option<Snapshot<D>>, StoreError> {
        Ok(self.rows.read().await.get(key).cloned())
    }

    async fn upsert(
        &self,
        key: &D::Key,
        components: &D::Components,
    ) -> Result<Snapshot<D>, StoreError> {
        let snapshot = MetricSnapshot::new(key.clone(), components.clone(), self.clock.now());
        self.rows
            .write()
            .await
            .insert(key.clone(), snapshot.clone());
        Ok(snapshot)
    }

    async fn list_all(&self) -> Result<Vec<Snapshot<D>>, StoreError> {
        Ok(self.rows.read().await.values().cloned().collect())
    }
}
