// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The recompute coordinator.
//!
//! Per key the coordinator moves between `ABSENT`, `COMPUTING` and `READY`.
//! A read that cannot be answered from the cache either starts the single
//! computation for its key or joins the one already running. Computations
//! run on their own task, so a caller going away does not cancel work other
//! callers are waiting on, and the result still lands in the store.

use crate::clock::Clock;
use crate::domains::{MetricDomain, MetricKey, Snapshot};
use crate::error::CacheError;
use crate::freshness::{PeriodState, classify, should_use_cache};
use crate::source::SourceAdapter;
use crate::store::CacheStore;
use futures::future::{BoxFuture, FutureExt, Shared};
use futures::StreamExt;
use metricache_domain::{Aggregator, MetricSnapshot};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Per-coordinator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Records requested per source call.
    pub chunk_size: usize,
    /// Serve the previous snapshot, tagged stale, when the source fails.
    pub serve_stale_on_failure: bool,
}

impl CoordinatorConfig {
    /// Default settings for domain `D`.
    #[must_use]
    pub const fn for_domain<D: MetricDomain>() -> Self {
        Self {
            chunk_size: D::DEFAULT_CHUNK_SIZE,
            serve_stale_on_failure: false,
        }
    }

    /// Overrides the chunk size. Zero is treated as one.
    #[must_use]
    pub const fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = if chunk_size == 0 { 1 } else { chunk_size };
        self
    }

    /// Enables or disables the stale fallback.
    #[must_use]
    pub const fn with_serve_stale_on_failure(mut self, enabled: bool) -> Self {
        self.serve_stale_on_failure = enabled;
        self
    }
}

/// Where a resolved snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Served from the store without contacting the source.
    Cached,
    /// Recomputed from the source and written to the store.
    Recomputed,
    /// Recomputed, but the store write failed. The next read recomputes.
    Unpersisted,
    /// The source failed and the previously stored snapshot was served.
    Stale,
}

impl Origin {
    /// Converts this origin to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cached => "cached",
            Self::Recomputed => "recomputed",
            Self::Unpersisted => "unpersisted",
            Self::Stale => "stale",
        }
    }

    /// Whether the snapshot may be behind the source.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::Stale)
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A snapshot together with how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<S> {
    /// The snapshot.
    pub snapshot: S,
    /// How it was obtained.
    pub origin: Origin,
}

/// The resolution type of a domain.
pub type Resolved<D> = Resolution<Snapshot<D>>;

type Computation<D> = Shared<BoxFuture<'static, Result<Resolved<D>, CacheError>>>;
type InFlight<D> = Arc<Mutex<HashMap<<D as MetricDomain>::Key, Computation<D>>>>;

/// Serves snapshots of one domain, recomputing at most once per key at a time.
pub struct Coordinator<D: MetricDomain> {
    domain: Arc<D>,
    source: Arc<dyn SourceAdapter<D>>,
    store: Arc<dyn CacheStore<D>>,
    clock: Arc<dyn Clock>,
    config: CoordinatorConfig,
    in_flight: InFlight<D>,
}

impl<D: MetricDomain> Coordinator<D> {
    /// Creates a coordinator.
    #[must_use]
    pub fn new(
        domain: D,
        source: Arc<dyn SourceAdapter<D>>,
        store: Arc<dyn CacheStore<D>>,
        clock: Arc<dyn Clock>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            domain: Arc::new(domain),
            source,
            store,
            clock,
            config,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the settings.
    #[must_use]
    pub const fn config(&self) -> CoordinatorConfig {
        self.config
    }

    /// Returns the clock used for freshness decisions.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Number of keys currently being computed.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        lock(&self.in_flight).len()
    }

    /// Returns every stored snapshot of the domain, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn list_all(&self) -> Result<Vec<Snapshot<D>>, CacheError> {
        Ok(self.store.list_all().await?)
    }

    /// Resolves the snapshot for `key`.
    ///
    /// A stored snapshot of a closed period is served as is unless
    /// `force_refresh` is set. Otherwise the snapshot is recomputed from the
    /// source and written through the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read, or if recomputation
    /// fails and no stale fallback applies.
    pub async fn resolve(
        &self,
        key: &D::Key,
        force_refresh: bool,
    ) -> Result<Resolved<D>, CacheError> {
        let cached = self.store.get(key).await?;
        self.resolve_preloaded(key, cached, force_refresh).await
    }

    /// Resolves `key` given the snapshot already read for it.
    ///
    /// Used by bulk readers that fetched the whole table up front.
    ///
    /// # Errors
    ///
    /// See [`Coordinator::resolve`].
    pub async fn resolve_preloaded(
        &self,
        key: &D::Key,
        cached: Option<Snapshot<D>>,
        force_refresh: bool,
    ) -> Result<Resolved<D>, CacheError> {
        let today = self.clock.today();
        if let Some(snapshot) = cached.as_ref()
            && should_use_cache(key.period(), true, today, force_refresh)
        {
            debug!(kind = %D::KIND, key = %key, "Serving cached snapshot");
            return Ok(Resolution {
                snapshot: snapshot.clone(),
                origin: Origin::Cached,
            });
        }

        debug!(
            kind = %D::KIND,
            key = %key,
            state = %classify(key.period(), today),
            cached = cached.is_some(),
            force_refresh,
            "Recompute required"
        );

        let mut outcome = self.join_or_start(key, !force_refresh).await;
        if force_refresh && matches!(&outcome, Ok(joined) if joined.origin == Origin::Cached) {
            debug!(kind = %D::KIND, key = %key, "Joined read served the cache, recomputing");
            outcome = self.join_or_start(key, false).await;
        }

        match outcome {
            Ok(resolution) => Ok(resolution),
            Err(err) if err.is_retryable() && self.config.serve_stale_on_failure => match cached {
                Some(snapshot) => {
                    warn!(
                        kind = %D::KIND,
                        key = %key,
                        error = %err,
                        "Source failed, serving stale snapshot"
                    );
                    Ok(Resolution {
                        snapshot,
                        origin: Origin::Stale,
                    })
                }
                None => Err(err),
            },
            Err(err) => Err(err),
        }
    }

    /// Returns the running computation for `key`, starting one if needed.
    ///
    /// A computation started with `recheck` serves a closed-period snapshot
    /// stored after the caller's read instead of fetching again.
    fn join_or_start(&self, key: &D::Key, recheck: bool) -> Computation<D> {
        let mut in_flight = lock(&self.in_flight);
        if let Some(running) = in_flight.get(key) {
            debug!(kind = %D::KIND, key = %key, "Joining in-flight computation");
            return running.clone();
        }

        // The guard is created before the task is spawned and the entry is
        // inserted before the lock is released, so removal always follows
        // insertion.
        let guard = InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
            key: key.clone(),
        };
        let job = RecomputeJob {
            domain: Arc::clone(&self.domain),
            source: Arc::clone(&self.source),
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            key: key.clone(),
            chunk_size: self.config.chunk_size,
            recheck,
        };
        let task = tokio::spawn(recompute(job, guard));

        let label = key.to_string();
        let computation = async move {
            match task.await {
                Ok(result) => result,
                Err(err) => Err(CacheError::ComputationAborted {
                    key: label,
                    reason: err.to_string(),
                }),
            }
        }
        .boxed()
        .shared();

        in_flight.insert(key.clone(), computation.clone());
        computation
    }
}

/// Removes a key from the in-flight table when its computation ends,
/// including when it panics.
struct InFlightGuard<K: MetricKey, V> {
    in_flight: Arc<Mutex<HashMap<K, V>>>,
    key: K,
}

impl<K: MetricKey, V> Drop for InFlightGuard<K, V> {
    fn drop(&mut self) {
        lock(&self.in_flight).remove(&self.key);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Everything a spawned computation owns.
struct RecomputeJob<D: MetricDomain> {
    domain: Arc<D>,
    source: Arc<dyn SourceAdapter<D>>,
    store: Arc<dyn CacheStore<D>>,
    clock: Arc<dyn Clock>,
    key: D::Key,
    chunk_size: usize,
    recheck: bool,
}

async fn recompute<D: MetricDomain>(
    job: RecomputeJob<D>,
    guard: InFlightGuard<D::Key, Computation<D>>,
) -> Result<Resolved<D>, CacheError> {
    let RecomputeJob {
        domain,
        source,
        store,
        clock,
        key,
        chunk_size,
        recheck,
    } = job;

    // A computation that finished between the caller's read and this start
    // has already stored a closed period.
    if recheck
        && classify(key.period(), clock.today()) == PeriodState::Closed
        && let Some(snapshot) = store.get(&key).await?
    {
        debug!(kind = %D::KIND, key = %key, "Snapshot stored since read, serving it");
        drop(guard);
        return Ok(Resolution {
            snapshot,
            origin: Origin::Cached,
        });
    }

    let started = Instant::now();
    let mut aggregator = domain.aggregator(&key);
    let mut records = 0_usize;
    let mut chunks = source.fetch(&key, chunk_size);
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.inspect_err(|err| {
            warn!(kind = %D::KIND, key = %key, error = %err, "Source fetch failed");
        })?;
        records += chunk.len();
        for record in &chunk {
            aggregator.push(record)?;
        }
    }
    drop(chunks);

    let components = aggregator.finish();
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let resolution = match store.upsert(&key, &components).await {
        Ok(snapshot) => {
            info!(
                kind = %D::KIND,
                key = %key,
                records,
                elapsed_ms,
                "Recomputed snapshot"
            );
            Resolution {
                snapshot,
                origin: Origin::Recomputed,
            }
        }
        Err(err) => {
            warn!(
                kind = %D::KIND,
                key = %key,
                error = %err,
                "Store write failed, returning unpersisted snapshot"
            );
            Resolution {
                snapshot: MetricSnapshot::new(key, components, clock.now()),
                origin: Origin::Unpersisted,
            }
        }
    };
    drop(guard);
    Ok(resolution)
}
