// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Domain types for the metric cache.
//!
//! Everything in this crate is pure: period arithmetic, the raw records
//! delivered by the source system, the component values of each metric
//! domain with their headline formulas, and the aggregation rules that turn
//! one into the other.

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

mod aggregate;
mod decimal;
mod error;
mod metrics;
mod period;
mod records;
mod snapshot;

#[cfg(test)]
mod tests;

pub use aggregate::{
    Aggregator, ExternalHoursAggregator, InvoicedTotalsAggregator, SalesOrderTotalsAggregator,
    UtilizationAggregator, aggregate,
};
pub use decimal::{SCALE, add_fixed, fixed, format_fixed, parse_fixed};
pub use error::{AggregationError, DomainError};
pub use metrics::{
    ExternalHoursComponents, InvoicedTotalsComponents, MetricComponents, MetricKind,
    SalesOrderTotalsComponents, UtilizationComponents,
};
pub use period::{EntityPeriodKey, PeriodIter, PeriodKey, PeriodRange};
pub use records::{
    CapacityEntry, CapacityKind, HoursKind, HoursLine, InvoiceKind, InvoiceRecord,
    SalesOrderRecord, SalesOrderState,
};
pub use snapshot::MetricSnapshot;

// Re-exported so downstream crates agree on the decimal type.
pub use rust_decimal::Decimal;
