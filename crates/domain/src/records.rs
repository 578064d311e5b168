// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Raw records as delivered by the source system.
//!
//! These are deliberately thin: the source decides which rows match a
//! period, and the aggregators decide which rows count toward a total.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Whether an accounting move is an invoice or a credit note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceKind {
    /// Customer invoice.
    Invoice,
    /// Customer credit note (refund).
    CreditNote,
}

/// A posted customer invoice or credit note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Source identifier.
    pub id: i64,
    /// Invoice or credit note.
    pub kind: InvoiceKind,
    /// Whether the move was reversed by a later entry.
    #[serde(default)]
    pub reversed: bool,
    /// Counterparty identifier.
    pub partner_id: i64,
    /// Effective (accounting) date.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// Untaxed amount, always non-negative.
    pub amount: Decimal,
}

/// Category of a time or allotment line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoursKind {
    /// Hours logged on external (billable, non-subscription) work.
    External,
    /// Hours logged against a customer subscription.
    Subscription,
    /// Monthly hours included in customer subscriptions.
    SubscriptionAllotment,
    /// Hours sold on confirmed orders.
    Sold,
}

/// A single hours line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursLine {
    /// Source identifier.
    pub id: i64,
    /// Line category.
    pub kind: HoursKind,
    /// Date the hours apply to.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// Number of hours, always non-negative.
    pub hours: Decimal,
}

/// Lifecycle state of a sales order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesOrderState {
    /// Quotation not yet sent.
    Draft,
    /// Quotation sent to the customer.
    Sent,
    /// Confirmed order.
    Confirmed,
    /// Confirmed and locked order.
    Done,
    /// Cancelled order.
    Cancelled,
}

impl SalesOrderState {
    /// Whether orders in this state count toward sales totals.
    #[must_use]
    pub const fn is_confirmed(self) -> bool {
        matches!(self, Self::Confirmed | Self::Done)
    }
}

/// A sales order header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesOrderRecord {
    /// Source identifier.
    pub id: i64,
    /// Order state.
    pub state: SalesOrderState,
    /// Counterparty identifier.
    pub partner_id: i64,
    /// Order date.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// Untaxed order total, always non-negative.
    pub amount: Decimal,
}

/// Category of a capacity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityKind {
    /// Contracted working hours.
    Available,
    /// Hours logged on timesheets.
    Logged,
    /// Hours planned in the schedule.
    Planned,
}

/// A per-employee, per-day capacity entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityEntry {
    /// Source identifier.
    pub id: i64,
    /// Employee the entry belongs to.
    pub employee_id: i64,
    /// Entry category.
    pub kind: CapacityKind,
    /// Day the entry applies to.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// Number of hours, always non-negative.
    pub hours: Decimal,
}
