// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Period freshness policy.
//!
//! The current month is still changing in the source system and is never
//! trusted from cache on a normal read. Every other month is considered
//! closed, and a closed month's snapshot is trusted once it exists.

use metricache_domain::PeriodKey;
use time::Date;

/// Whether a period may still change in the source system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodState {
    /// The current month.
    Open,
    /// Any other month.
    Closed,
}

impl PeriodState {
    /// Converts this state to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl std::fmt::Display for PeriodState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classifies `period` relative to `today`.
#[must_use]
pub fn classify(period: PeriodKey, today: Date) -> PeriodState {
    if period == PeriodKey::from_date(today) {
        PeriodState::Open
    } else {
        PeriodState::Closed
    }
}

/// Whether a read may be answered from the cache without recomputing.
#[must_use]
pub fn should_use_cache(
    period: PeriodKey,
    cached_present: bool,
    today: Date,
    force_refresh: bool,
) -> bool {
    cached_present && classify(period, today) == PeriodState::Closed && !force_refresh
}
