// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    CacheStore, Coordinator, CoordinatorConfig, FixedClock, InvoicedTotals, MemoryCacheStore,
    MetricDomain, RecordChunks, Snapshot, SourceAdapter, SourceError, StoreError, Utilization,
};
use async_trait::async_trait;
use futures::{StreamExt, stream};
use metricache_domain::{
    CapacityEntry, Decimal, EntityPeriodKey, InvoiceKind, InvoiceRecord, PeriodKey,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use time::Date;
use time::macros::date;

pub const TODAY: Date = date!(2025 - 06 - 15);

pub fn period(year: i32, month: u8) -> PeriodKey {
    PeriodKey::new(year, month).unwrap()
}

pub fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

pub fn invoice(id: i64, date: Date, amount: Decimal) -> InvoiceRecord {
    InvoiceRecord {
        id,
        kind: InvoiceKind::Invoice,
        reversed: false,
        partner_id: 10,
        date,
        amount,
    }
}

/// Invoice source backed by a mutable record list.
///
/// Counts calls, can be told to fail for specific periods and can delay
/// every chunk to widen race windows.
#[derive(Default)]
pub struct ScriptedSource {
    records: Mutex<Vec<InvoiceRecord>>,
    failing: Mutex<HashSet<PeriodKey>>,
    calls: AtomicUsize,
    delay: Duration,
}

impl ScriptedSource {
    pub fn new(records: Vec<InvoiceRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn push(&self, record: InvoiceRecord) {
        self.records.lock().unwrap().push(record);
    }

    pub fn fail(&self, period: PeriodKey) {
        self.failing.lock().unwrap().insert(period);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SourceAdapter<InvoicedTotals> for ScriptedSource {
    fn fetch(&self, key: &PeriodKey, chunk_size: usize) -> RecordChunks<'_, InvoiceRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delay;

        if self.failing.lock().unwrap().contains(key) {
            return stream::once(async move {
                tokio::time::sleep(delay).await;
                Err(SourceError::Unavailable(String::from("scripted outage")))
            })
            .boxed();
        }

        let matching: Vec<InvoiceRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| key.contains(r.date))
            .cloned()
            .collect();
        let chunks: Vec<Vec<InvoiceRecord>> = matching
            .chunks(chunk_size)
            .map(<[InvoiceRecord]>::to_vec)
            .collect();
        stream::iter(chunks)
            .then(move |chunk| async move {
                tokio::time::sleep(delay).await;
                Ok(chunk)
            })
            .boxed()
    }
}

/// Capacity source returning a fixed list.
pub struct CapacitySource(pub Vec<CapacityEntry>);

impl SourceAdapter<Utilization> for CapacitySource {
    fn fetch(&self, key: &EntityPeriodKey, _chunk_size: usize) -> RecordChunks<'_, CapacityEntry> {
        let matching: Vec<CapacityEntry> = self
            .0
            .iter()
            .filter(|e| e.employee_id == key.entity_id())
            .cloned()
            .collect();
        stream::iter(vec![Ok(matching)]).boxed()
    }
}

/// Memory store whose writes can be switched off.
pub struct FlakyStore<D: MetricDomain> {
    inner: MemoryCacheStore<D>,
    reject_writes: AtomicBool,
}

impl<D: MetricDomain> FlakyStore<D> {
    pub fn new() -> Self {
        Self {
            inner: MemoryCacheStore::new(),
            reject_writes: AtomicBool::new(false),
        }
    }

    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }
}

#[async_trait]
impl<D: MetricDomain> CacheStore<D> for FlakyStore<D> {
    async fn get(&self, key: &D::Key) -> Result<Option<Snapshot<D>>, StoreError> {
        self.inner.get(key).await
    }

    async fn upsert(
        &self,
        key: &D::Key,
        components: &D::Components,
    ) -> Result<Snapshot<D>, StoreError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write(String::from("disk full")));
        }
        self.inner.upsert(key, components).await
    }

    async fn list_all(&self) -> Result<Vec<Snapshot<D>>, StoreError> {
        self.inner.list_all().await
    }
}

pub fn invoiced_coordinator(
    source: &Arc<ScriptedSource>,
    store: &Arc<MemoryCacheStore<InvoicedTotals>>,
    config: CoordinatorConfig,
) -> Coordinator<InvoicedTotals> {
    Coordinator::new(
        InvoicedTotals::default(),
        Arc::clone(source) as Arc<dyn SourceAdapter<InvoicedTotals>>,
        Arc::clone(store) as Arc<dyn CacheStore<InvoicedTotals>>,
        Arc::new(FixedClock::on(TODAY)),
        config,
    )
}

pub fn default_config() -> CoordinatorConfig {
    CoordinatorConfig::for_domain::<InvoicedTotals>()
}

/// Memory store that stalls after every read, so a reader can act on a
/// result that has gone out of date.
pub struct SlowReadStore<D: MetricDomain> {
    inner: MemoryCacheStore<D>,
    read_delay: Duration,
}

impl<D: MetricDomain> SlowReadStore<D> {
    pub fn new(read_delay: Duration) -> Self {
        Self {
            inner: MemoryCacheStore::with_clock(Arc::new(FixedClock::on(TODAY))),
            read_delay,
        }
    }
}

#[async_trait]
impl<D: MetricDomain> CacheStore<D> for SlowReadStore<D> {
    async fn get(&self, key: &D::Key) -> Result<Option<Snapshot<D>>, StoreError> {
        let snapshot = self.inner.get(key).await;
        tokio::time::sleep(self.read_delay).await;
        snapshot
    }

    async fn upsert(
        &self,
        key: &D::Key,
        components: &D::Components,
    ) -> Result<Snapshot<D>, StoreError> {
        self.inner.upsert(key, components).await
    }

    async fn list_all(&self) -> Result<Vec<Snapshot<D>>, StoreError> {
        self.inner.list_all().await
    }
}
