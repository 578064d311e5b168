// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use futures::{StreamExt, stream};
use metricache::{MetricDomain, RecordChunks, SourceAdapter, SourceError};
use std::time::Duration;
use tracing::warn;

/// Fails a fetch when any single page takes longer than `limit`.
///
/// The stream ends after the timeout error; the coordinator discards the
/// partial aggregation.
#[derive(Debug, Clone)]
pub struct WithTimeout<S> {
    inner: S,
    limit: Duration,
}

impl<S> WithTimeout<S> {
    /// Wraps `inner`.
    #[must_use]
    pub const fn new(inner: S, limit: Duration) -> Self {
        Self { inner, limit }
    }

    /// Returns the per-page limit.
    #[must_use]
    pub const fn limit(&self) -> Duration {
        self.limit
    }

    /// Returns the wrapped adapter.
    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.inner
    }
}

impl<D, S> SourceAdapter<D> for WithTimeout<S>
where
    D: MetricDomain,
    S: SourceAdapter<D>,
{
    fn fetch(&self, key: &D::Key, chunk_size: usize) -> RecordChunks<'_, D::Record> {
        let pages = self.inner.fetch(key, chunk_size);
        let limit = self.limit;
        let after_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
        let key = key.clone();

        stream::unfold(Some(pages), move |pages| {
            let key = key.clone();
            async move {
                let mut pages = pages?;
                match tokio::time::timeout(limit, pages.next()).await {
                    Ok(Some(page)) => Some((page, Some(pages))),
                    Ok(None) => None,
                    Err(_) => {
                        warn!(kind = %D::KIND, key = %key, after_ms, "Source page timed out");
                        Some((Err(SourceError::Timeout { after_ms }), None))
                    }
                }
            }
        })
        .boxed()
    }
}
