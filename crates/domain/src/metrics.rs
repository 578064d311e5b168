// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Metric components and their headline formulas.

use crate::decimal::fixed;
use crate::error::DomainError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The metric domains served by the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Net invoiced amount per month.
    InvoicedTotals,
    /// External and subscription hours per month.
    ExternalHours,
    /// Confirmed sales order total per month.
    SalesOrderTotals,
    /// Per-employee utilization per month.
    Utilization,
}

impl MetricKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 4] = [
        Self::InvoicedTotals,
        Self::ExternalHours,
        Self::SalesOrderTotals,
        Self::Utilization,
    ];

    /// Converts this kind to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvoicedTotals => "invoiced_totals",
            Self::ExternalHours => "external_hours",
            Self::SalesOrderTotals => "sales_order_totals",
            Self::Utilization => "utilization",
        }
    }

    /// Whether snapshots of this kind are keyed per entity.
    #[must_use]
    pub const fn is_per_entity(&self) -> bool {
        matches!(self, Self::Utilization)
    }
}

impl FromStr for MetricKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invoiced_totals" | "invoiced" => Ok(Self::InvoicedTotals),
            "external_hours" | "hours" => Ok(Self::ExternalHours),
            "sales_order_totals" | "sales" => Ok(Self::SalesOrderTotals),
            "utilization" => Ok(Self::Utilization),
            _ => Err(DomainError::UnknownMetricKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Component values of a metric, from which the headline is derived.
pub trait MetricComponents {
    /// The single derived value a dashboard displays, if the domain has one.
    fn headline(&self) -> Option<Decimal>;
}

/// Invoiced totals for one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InvoicedTotalsComponents {
    /// Sum of non-reversed invoices.
    pub invoices_total: Decimal,
    /// Sum of non-reversed credit notes.
    pub credit_notes_total: Decimal,
    /// Sum of reversed invoices.
    pub reversed_total: Decimal,
}

impl InvoicedTotalsComponents {
    /// Net invoiced amount: `invoices - credit notes + reversed`.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        fixed(self.invoices_total - self.credit_notes_total + self.reversed_total)
    }
}

impl MetricComponents for InvoicedTotalsComponents {
    fn headline(&self) -> Option<Decimal> {
        Some(self.amount())
    }
}

/// Hours totals for one month. There is no single headline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExternalHoursComponents {
    /// Hours logged on external work.
    pub total_external_hours: Decimal,
    /// Hours logged against subscriptions.
    pub total_subscription_used_hours: Decimal,
    /// External plus subscription hours.
    pub total_used_hours: Decimal,
    /// Hours included in subscriptions for the month.
    pub total_monthly_subscription_hours: Decimal,
    /// Hours sold.
    pub total_sold_hours: Decimal,
}

impl MetricComponents for ExternalHoursComponents {
    fn headline(&self) -> Option<Decimal> {
        None
    }
}

/// Confirmed sales order total for one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SalesOrderTotalsComponents {
    /// Sum of confirmed order amounts.
    pub total_amount: Decimal,
}

impl MetricComponents for SalesOrderTotalsComponents {
    fn headline(&self) -> Option<Decimal> {
        Some(fixed(self.total_amount))
    }
}

/// Capacity figures for one employee and month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UtilizationComponents {
    /// Contracted hours.
    pub available_hours: Decimal,
    /// Logged hours.
    pub logged_hours: Decimal,
    /// Planned hours.
    pub planned_hours: Decimal,
}

impl UtilizationComponents {
    /// `logged / available * 100`, or `None` when nothing was available.
    #[must_use]
    pub fn utilization_percent(&self) -> Option<Decimal> {
        if self.available_hours <= Decimal::ZERO {
            return None;
        }
        self.logged_hours
            .checked_div(self.available_hours)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map(fixed)
    }
}

impl MetricComponents for UtilizationComponents {
    fn headline(&self) -> Option<Decimal> {
        self.utilization_percent()
    }
}
