// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Boundary contract of the metric cache.
//!
//! [`MetricService`] exposes the three operations a dashboard needs:
//! reading one metric, reading a series and the refresh button. Requests
//! and responses are plain data; responses serialize with serde.

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
#![allow(clippy::multiple_crate_versions)]

mod config;
mod error;
mod request_response;
mod service;

#[cfg(test)]
mod tests;

pub use config::EngineConfig;
pub use error::{
    ApiError, translate_cache_error, translate_domain_error, translate_persistence_error,
};
pub use request_response::{
    ComponentsView, GetMetricRequest, GetSeriesRequest, RefreshAllRequest, RefreshFailureView,
    RefreshView, SeriesOrder, SeriesView, SnapshotView, ViewDomain,
};
pub use service::{MetricService, MetricSources, MetricStores};
