// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Pure per-domain aggregation rules.
//!
//! Each aggregator is created for a single key, fed records one at a time
//! (in any order, in any number of chunks) and finished into components.
//! Records outside the key's month, and for per-entity domains outside the
//! key's entity, are skipped. Only records that are summed are validated.
//! All sums are kept at fixed precision.

use crate::decimal::add_fixed;
use crate::error::AggregationError;
use crate::metrics::{
    ExternalHoursComponents, InvoicedTotalsComponents, SalesOrderTotalsComponents,
    UtilizationComponents,
};
use crate::period::{EntityPeriodKey, PeriodKey};
use crate::records::{
    CapacityEntry, CapacityKind, HoursKind, HoursLine, InvoiceKind, InvoiceRecord,
    SalesOrderRecord,
};
use rust_decimal::Decimal;

/// Incremental fold of source records into metric components.
pub trait Aggregator {
    /// Raw record type consumed.
    type Record;
    /// Components produced.
    type Components;

    /// Folds a single record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is malformed or a sum overflows.
    fn push(&mut self, record: &Self::Record) -> Result<(), AggregationError>;

    /// Completes the fold.
    fn finish(self) -> Self::Components;
}

/// Folds every record of `records` into `aggregator`.
///
/// # Errors
///
/// Returns the first aggregation error encountered.
pub fn aggregate<'a, A, I>(mut aggregator: A, records: I) -> Result<A::Components, AggregationError>
where
    A: Aggregator,
    A::Record: 'a,
    I: IntoIterator<Item = &'a A::Record>,
{
    for record in records {
        aggregator.push(record)?;
    }
    Ok(aggregator.finish())
}

fn ensure_amount(record_id: i64, value: Decimal) -> Result<(), AggregationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AggregationError::NegativeAmount {
            record_id,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn ensure_hours(record_id: i64, value: Decimal) -> Result<(), AggregationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AggregationError::NegativeHours {
            record_id,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Invoiced totals for one month, excluding an optional internal counterparty.
#[derive(Debug, Clone)]
pub struct InvoicedTotalsAggregator {
    period: PeriodKey,
    internal_partner_id: Option<i64>,
    totals: InvoicedTotalsComponents,
}

impl InvoicedTotalsAggregator {
    /// Creates an aggregator for `period`.
    #[must_use]
    pub fn new(period: PeriodKey, internal_partner_id: Option<i64>) -> Self {
        Self {
            period,
            internal_partner_id,
            totals: InvoicedTotalsComponents::default(),
        }
    }
}

impl Aggregator for InvoicedTotalsAggregator {
    type Record = InvoiceRecord;
    type Components = InvoicedTotalsComponents;

    fn push(&mut self, record: &InvoiceRecord) -> Result<(), AggregationError> {
        if !self.period.contains(record.date) || self.internal_partner_id == Some(record.partner_id)
        {
            return Ok(());
        }
        if record.kind == InvoiceKind::CreditNote && record.reversed {
            return Ok(());
        }
        ensure_amount(record.id, record.amount)?;
        match (record.kind, record.reversed) {
            (InvoiceKind::Invoice, false) => {
                self.totals.invoices_total =
                    add_fixed(self.totals.invoices_total, record.amount, "invoices_total")?;
            }
            (InvoiceKind::CreditNote, false) => {
                self.totals.credit_notes_total = add_fixed(
                    self.totals.credit_notes_total,
                    record.amount,
                    "credit_notes_total",
                )?;
            }
            (InvoiceKind::Invoice, true) => {
                self.totals.reversed_total =
                    add_fixed(self.totals.reversed_total, record.amount, "reversed_total")?;
            }
            // A reversed credit note cancels itself out of every bucket.
            (InvoiceKind::CreditNote, true) => {}
        }
        Ok(())
    }

    fn finish(self) -> InvoicedTotalsComponents {
        self.totals
    }
}

/// External and subscription hours for one month.
#[derive(Debug, Clone)]
pub struct ExternalHoursAggregator {
    period: PeriodKey,
    totals: ExternalHoursComponents,
}

impl ExternalHoursAggregator {
    /// Creates an aggregator for `period`.
    #[must_use]
    pub fn new(period: PeriodKey) -> Self {
        Self {
            period,
            totals: ExternalHoursComponents::default(),
        }
    }
}

impl Aggregator for ExternalHoursAggregator {
    type Record = HoursLine;
    type Components = ExternalHoursComponents;

    fn push(&mut self, record: &HoursLine) -> Result<(), AggregationError> {
        if !self.period.contains(record.date) {
            return Ok(());
        }
        ensure_hours(record.id, record.hours)?;
        let totals = &mut self.totals;
        if matches!(record.kind, HoursKind::External | HoursKind::Subscription) {
            totals.total_used_hours =
                add_fixed(totals.total_used_hours, record.hours, "total_used_hours")?;
        }
        match record.kind {
            HoursKind::External => {
                totals.total_external_hours =
                    add_fixed(totals.total_external_hours, record.hours, "total_external_hours")?;
            }
            HoursKind::Subscription => {
                totals.total_subscription_used_hours = add_fixed(
                    totals.total_subscription_used_hours,
                    record.hours,
                    "total_subscription_used_hours",
                )?;
            }
            HoursKind::SubscriptionAllotment => {
                totals.total_monthly_subscription_hours = add_fixed(
                    totals.total_monthly_subscription_hours,
                    record.hours,
                    "total_monthly_subscription_hours",
                )?;
            }
            HoursKind::Sold => {
                totals.total_sold_hours =
                    add_fixed(totals.total_sold_hours, record.hours, "total_sold_hours")?;
            }
        }
        Ok(())
    }

    fn finish(self) -> ExternalHoursComponents {
        self.totals
    }
}

/// Confirmed sales order total for one month.
#[derive(Debug, Clone)]
pub struct SalesOrderTotalsAggregator {
    period: PeriodKey,
    internal_partner_id: Option<i64>,
    totals: SalesOrderTotalsComponents,
}

impl SalesOrderTotalsAggregator {
    /// Creates an aggregator for `period`.
    #[must_use]
    pub fn new(period: PeriodKey, internal_partner_id: Option<i64>) -> Self {
        Self {
            period,
            internal_partner_id,
            totals: SalesOrderTotalsComponents::default(),
        }
    }
}

impl Aggregator for SalesOrderTotalsAggregator {
    type Record = SalesOrderRecord;
    type Components = SalesOrderTotalsComponents;

    fn push(&mut self, record: &SalesOrderRecord) -> Result<(), AggregationError> {
        if !record.state.is_confirmed()
            || !self.period.contains(record.date)
            || self.internal_partner_id == Some(record.partner_id)
        {
            return Ok(());
        }
        ensure_amount(record.id, record.amount)?;
        self.totals.total_amount =
            add_fixed(self.totals.total_amount, record.amount, "total_amount")?;
        Ok(())
    }

    fn finish(self) -> SalesOrderTotalsComponents {
        self.totals
    }
}

/// Capacity figures for one employee and month.
#[derive(Debug, Clone)]
pub struct UtilizationAggregator {
    key: EntityPeriodKey,
    totals: UtilizationComponents,
}

impl UtilizationAggregator {
    /// Creates an aggregator for `key`.
    #[must_use]
    pub fn new(key: EntityPeriodKey) -> Self {
        Self {
            key,
            totals: UtilizationComponents::default(),
        }
    }
}

impl Aggregator for UtilizationAggregator {
    type Record = CapacityEntry;
    type Components = UtilizationComponents;

    fn push(&mut self, record: &CapacityEntry) -> Result<(), AggregationError> {
        if record.employee_id != self.key.entity_id() || !self.key.period().contains(record.date) {
            return Ok(());
        }
        ensure_hours(record.id, record.hours)?;
        let totals = &mut self.totals;
        match record.kind {
            CapacityKind::Available => {
                totals.available_hours =
                    add_fixed(totals.available_hours, record.hours, "available_hours")?;
            }
            CapacityKind::Logged => {
                totals.logged_hours = add_fixed(totals.logged_hours, record.hours, "logged_hours")?;
            }
            CapacityKind::Planned => {
                totals.planned_hours =
                    add_fixed(totals.planned_hours, record.hours, "planned_hours")?;
            }
        }
        Ok(())
    }

    fn finish(self) -> UtilizationComponents {
        self.totals
    }
}
