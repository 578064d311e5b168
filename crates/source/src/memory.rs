// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! An in-process record source with offset/limit paging.

use crate::scope::InScope;
use futures::{StreamExt, stream};
use metricache::{MetricDomain, RecordChunks, SourceAdapter, SourceError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, trace};

/// Serves a fixed record set one page per call.
///
/// Every `fetch` re-reads the current records, so records added between two
/// fetches of an open period show up in the second.
#[derive(Debug)]
pub struct MemorySource<R> {
    records: RwLock<Vec<R>>,
    outage: RwLock<Option<SourceError>>,
    latency: Duration,
    fetches: AtomicUsize,
    pages: AtomicUsize,
}

impl<R> Default for MemorySource<R> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<R> MemorySource<R> {
    /// Creates a source over `records`.
    #[must_use]
    pub const fn new(records: Vec<R>) -> Self {
        Self {
            records: RwLock::new(records),
            outage: RwLock::new(None),
            latency: Duration::ZERO,
            fetches: AtomicUsize::new(0),
            pages: AtomicUsize::new(0),
        }
    }

    /// Delays every page by `latency`.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Appends a record.
    pub fn push(&self, record: R) {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    /// Makes every subsequent page fail with `error` until cleared.
    pub fn set_outage(&self, error: Option<SourceError>) {
        *self.outage.write().unwrap_or_else(PoisonError::into_inner) = error;
    }

    /// Number of `fetch` calls so far.
    #[must_use]
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of pages served so far, including empty final pages.
    #[must_use]
    pub fn pages(&self) -> usize {
        self.pages.load(Ordering::SeqCst)
    }

    /// Number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the source holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R: Clone> MemorySource<R> {
    fn page<K>(&self, key: &K, offset: usize, limit: usize) -> Result<Vec<R>, SourceError>
    where
        R: InScope<K>,
    {
        self.pages.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self
            .outage
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(error);
        }
        Ok(self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|record| record.in_scope(key))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

impl<D> SourceAdapter<D> for MemorySource<D::Record>
where
    D: MetricDomain,
    D::Record: Clone + InScope<D::Key>,
{
    fn fetch(&self, key: &D::Key, chunk_size: usize) -> RecordChunks<'_, D::Record> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let limit = chunk_size.max(1);
        let key = key.clone();
        debug!(kind = %D::KIND, key = %key, limit, "Fetching records");

        // State is the next offset, or None once a short page ended the scan.
        stream::unfold(Some(0_usize), move |offset| {
            let key = key.clone();
            async move {
                let offset = offset?;
                if !self.latency.is_zero() {
                    tokio::time::sleep(self.latency).await;
                }
                match self.page(&key, offset, limit) {
                    Ok(page) if page.is_empty() => None,
                    Ok(page) => {
                        trace!(key = %key, offset, records = page.len(), "Served page");
                        let next = (page.len() == limit).then_some(offset + limit);
                        Some((Ok(page), next))
                    }
                    Err(error) => Some((Err(error), None)),
                }
            }
        })
        .boxed()
    }
}
