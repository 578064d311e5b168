// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::coordinator::{Coordinator, Resolution};
use crate::domains::{MetricDomain, Snapshot};
use crate::error::CacheError;
use futures::StreamExt;
use futures::stream;
use metricache_domain::MetricKind;
use std::time::Instant;
use tracing::{info, warn};

/// Outcome of refreshing one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOutcome<K, S> {
    /// The key.
    pub key: K,
    /// The resolved snapshot, or why it could not be produced.
    pub result: Result<Resolution<S>, CacheError>,
}

/// Per-key outcomes of a bulk refresh, in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport<K, S> {
    /// The domain refreshed.
    pub kind: MetricKind,
    /// One outcome per requested key.
    pub outcomes: Vec<KeyOutcome<K, S>>,
}

impl<K, S> RefreshReport<K, S> {
    /// Number of keys refreshed successfully.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    /// Number of keys that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// The keys that failed with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&K, &CacheError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|err| (&o.key, err)))
    }
}

/// The refresh report type of a domain.
pub type DomainRefreshReport<D> = RefreshReport<<D as MetricDomain>::Key, Snapshot<D>>;

impl<D: MetricDomain> Coordinator<D> {
    /// Resolves every key in `keys`, at most `concurrency` at a time.
    ///
    /// A failing key does not abort the batch: it keeps its previously
    /// stored snapshot (or stays absent) and is reported as a failure.
    pub async fn refresh_range<I>(
        &self,
        keys: I,
        force_refresh: bool,
        concurrency: usize,
    ) -> DomainRefreshReport<D>
    where
        I: IntoIterator<Item = D::Key>,
    {
        let started = Instant::now();
        let outcomes: Vec<_> = stream::iter(keys)
            .map(|key| async move {
                let result = self.resolve(&key, force_refresh).await;
                KeyOutcome { key, result }
            })
            .buffered(concurrency.max(1))
            .collect()
            .await;

        let report = RefreshReport {
            kind: D::KIND,
            outcomes,
        };
        for (key, err) in report.failures() {
            warn!(kind = %D::KIND, key = %key, error = %err, "Refresh failed for key");
        }
        info!(
            kind = %D::KIND,
            succeeded = report.succeeded(),
            failed = report.failed(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Refresh finished"
        );
        report
    }
}
