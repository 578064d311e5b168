// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The metric domains sharing the caching discipline.
//!
//! A domain ties together its key shape, the raw records it consumes, the
//! components it produces and the aggregation rule between them. The
//! coordinator, the freshness policy and the stores are written once against
//! [`MetricDomain`].

use metricache_domain::{
    Aggregator, CapacityEntry, EntityPeriodKey, ExternalHoursAggregator,
    ExternalHoursComponents, HoursLine, InvoiceRecord, InvoicedTotalsAggregator,
    InvoicedTotalsComponents, MetricComponents, MetricKind, MetricSnapshot, PeriodKey,
    SalesOrderRecord, SalesOrderTotalsAggregator, SalesOrderTotalsComponents,
    UtilizationAggregator, UtilizationComponents,
};
use std::fmt;
use std::hash::Hash;

/// The key a domain's snapshots are addressed by.
pub trait MetricKey:
    Clone + Eq + Ord + Hash + fmt::Display + fmt::Debug + Send + Sync + 'static
{
    /// The calendar month the key falls in.
    fn period(&self) -> PeriodKey;
}

impl MetricKey for PeriodKey {
    fn period(&self) -> PeriodKey {
        *self
    }
}

impl MetricKey for EntityPeriodKey {
    fn period(&self) -> PeriodKey {
        Self::period(self)
    }
}

/// A metric domain: key shape, record type and aggregation rule.
pub trait MetricDomain: Send + Sync + 'static {
    /// Key shape.
    type Key: MetricKey;
    /// Raw record delivered by the source.
    type Record: Send + Sync + 'static;
    /// Components produced by aggregation.
    type Components: MetricComponents + Clone + PartialEq + fmt::Debug + Send + Sync + 'static;
    /// Aggregation rule.
    type Aggregator: Aggregator<Record = Self::Record, Components = Self::Components> + Send;

    /// The kind this domain is reported as.
    const KIND: MetricKind;
    /// Records requested per source call unless configured otherwise.
    const DEFAULT_CHUNK_SIZE: usize;

    /// Creates a fresh aggregator for `key`.
    fn aggregator(&self, key: &Self::Key) -> Self::Aggregator;
}

/// The snapshot type of a domain.
pub type Snapshot<D> = MetricSnapshot<<D as MetricDomain>::Key, <D as MetricDomain>::Components>;

/// Net invoiced amount per month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvoicedTotals {
    /// Counterparty whose moves are excluded from every sum.
    pub internal_partner_id: Option<i64>,
}

impl MetricDomain for InvoicedTotals {
    type Key = PeriodKey;
    type Record = InvoiceRecord;
    type Components = InvoicedTotalsComponents;
    type Aggregator = InvoicedTotalsAggregator;

    const KIND: MetricKind = MetricKind::InvoicedTotals;
    const DEFAULT_CHUNK_SIZE: usize = 500;

    fn aggregator(&self, key: &PeriodKey) -> InvoicedTotalsAggregator {
        InvoicedTotalsAggregator::new(*key, self.internal_partner_id)
    }
}

/// External and subscription hours per month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExternalHours;

impl MetricDomain for ExternalHours {
    type Key = PeriodKey;
    type Record = HoursLine;
    type Components = ExternalHoursComponents;
    type Aggregator = ExternalHoursAggregator;

    const KIND: MetricKind = MetricKind::ExternalHours;
    const DEFAULT_CHUNK_SIZE: usize = 1000;

    fn aggregator(&self, key: &PeriodKey) -> ExternalHoursAggregator {
        ExternalHoursAggregator::new(*key)
    }
}

/// Confirmed sales order total per month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SalesOrderTotals {
    /// Counterparty whose orders are excluded.
    pub internal_partner_id: Option<i64>,
}

impl MetricDomain for SalesOrderTotals {
    type Key = PeriodKey;
    type Record = SalesOrderRecord;
    type Components = SalesOrderTotalsComponents;
    type Aggregator = SalesOrderTotalsAggregator;

    const KIND: MetricKind = MetricKind::SalesOrderTotals;
    const DEFAULT_CHUNK_SIZE: usize = 500;

    fn aggregator(&self, key: &PeriodKey) -> SalesOrderTotalsAggregator {
        SalesOrderTotalsAggregator::new(*key, self.internal_partner_id)
    }
}

/// Per-employee utilization per month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Utilization;

impl MetricDomain for Utilization {
    type Key = EntityPeriodKey;
    type Record = CapacityEntry;
    type Components = UtilizationComponents;
    type Aggregator = UtilizationAggregator;

    const KIND: MetricKind = MetricKind::Utilization;
    const DEFAULT_CHUNK_SIZE: usize = 2000;

    fn aggregator(&self, key: &EntityPeriodKey) -> UtilizationAggregator {
        UtilizationAggregator::new(*key)
    }
}
