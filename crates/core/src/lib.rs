// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The periodic metric cache engine.
//!
//! Decides, per metric domain and key, whether a stored snapshot can be
//! served or must be recomputed from the source system, and makes sure a
//! key is recomputed at most once at a time no matter how many readers ask
//! for it.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod clock;
mod coordinator;
mod domains;
mod error;
mod freshness;
mod refresh;
mod source;
mod store;

#[cfg(test)]
mod tests;

pub use clock::{Clock, FixedClock, SystemClock};
pub use coordinator::{Coordinator, CoordinatorConfig, Origin, Resolution, Resolved};
pub use domains::{
    ExternalHours, InvoicedTotals, MetricDomain, MetricKey, SalesOrderTotals, Snapshot,
    Utilization,
};
pub use error::CacheError;
pub use freshness::{PeriodState, classify, should_use_cache};
pub use refresh::{DomainRefreshReport, KeyOutcome, RefreshReport};
pub use source::{RecordChunks, SourceAdapter, SourceError};
pub use store::{CacheStore, MemoryCacheStore, StoreError};
