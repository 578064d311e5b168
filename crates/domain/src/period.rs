// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Calendar-month keys used to address cached metrics.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::Date;

const MIN_YEAR: i32 = -9999;
const MAX_YEAR: i32 = 9999;

/// A calendar month, the aggregation window of every metric.
///
/// Ordering is chronological: by year, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PeriodKey {
    year: i32,
    month: u8,
}

impl PeriodKey {
    /// Creates a new `PeriodKey`.
    ///
    /// # Errors
    ///
    /// Returns an error if `month` is outside `1..=12` or `year` is outside
    /// the supported calendar range.
    pub const fn new(year: i32, month: u8) -> Result<Self, DomainError> {
        if month < 1 || month > 12 {
            return Err(DomainError::InvalidMonth { month });
        }
        if year < MIN_YEAR || year > MAX_YEAR {
            return Err(DomainError::InvalidYear { year });
        }
        Ok(Self { year, month })
    }

    /// Returns the month containing `date`.
    #[must_use]
    pub fn from_date(date: Date) -> Self {
        Self {
            year: date.year(),
            month: u8::from(date.month()),
        }
    }

    /// Returns the year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Returns the month (1-12).
    #[must_use]
    pub const fn month(&self) -> u8 {
        self.month
    }

    /// Returns the first day of the month.
    ///
    /// # Errors
    ///
    /// Returns an error if the year is outside the range `time` can represent.
    pub fn first_day(&self) -> Result<Date, DomainError> {
        let month = time::Month::try_from(self.month)
            .map_err(|_| DomainError::InvalidMonth { month: self.month })?;
        Date::from_calendar_date(self.year, month, 1)
            .map_err(|_| DomainError::InvalidYear { year: self.year })
    }

    /// Returns whether `date` falls within this month.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        date.year() == self.year && u8::from(date.month()) == self.month
    }

    /// Returns the following month, or `None` past the supported range.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// Returns the preceding month, or `None` before the supported range.
    #[must_use]
    pub fn previous(&self) -> Option<Self> {
        Self::from_index(self.index() - 1)
    }

    /// Number of months from `self` to `other` (negative if `other` is earlier).
    #[must_use]
    pub fn months_until(&self, other: &Self) -> i64 {
        other.index() - self.index()
    }

    fn index(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    fn from_index(index: i64) -> Option<Self> {
        let year = i32::try_from(index.div_euclid(12)).ok()?;
        let month = u8::try_from(index.rem_euclid(12) + 1).ok()?;
        Self::new(year, month).ok()
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PeriodKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidPeriod {
            value: s.to_string(),
        };
        let (year, month) = s.trim().rsplit_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u8 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl From<PeriodKey> for String {
    fn from(key: PeriodKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for PeriodKey {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A period scoped to a single entity (e.g. a creative or employee).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityPeriodKey {
    period: PeriodKey,
    entity_id: i64,
}

impl EntityPeriodKey {
    /// Creates a new `EntityPeriodKey`.
    #[must_use]
    pub const fn new(period: PeriodKey, entity_id: i64) -> Self {
        Self { period, entity_id }
    }

    /// Returns the period.
    #[must_use]
    pub const fn period(&self) -> PeriodKey {
        self.period
    }

    /// Returns the entity identifier.
    #[must_use]
    pub const fn entity_id(&self) -> i64 {
        self.entity_id
    }
}

impl fmt::Display for EntityPeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.period, self.entity_id)
    }
}

/// An inclusive, chronologically ordered range of months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodRange {
    start: PeriodKey,
    end: PeriodKey,
}

impl PeriodRange {
    /// Creates a range covering `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns an error if `start` is after `end`.
    pub fn new(start: PeriodKey, end: PeriodKey) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::InvalidPeriodRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// A range containing exactly one month.
    #[must_use]
    pub const fn single(period: PeriodKey) -> Self {
        Self {
            start: period,
            end: period,
        }
    }

    /// First month of the range.
    #[must_use]
    pub const fn start(&self) -> PeriodKey {
        self.start
    }

    /// Last month of the range.
    #[must_use]
    pub const fn end(&self) -> PeriodKey {
        self.end
    }

    /// Number of months in the range.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::try_from(self.start.months_until(&self.end) + 1).unwrap_or(0)
    }

    /// A range is never empty; provided for API symmetry with `len`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Returns the last `count` months of this range.
    ///
    /// A `count` of zero is treated as one; a `count` at least as large as
    /// the range returns the range unchanged.
    #[must_use]
    pub fn trailing(&self, count: usize) -> Self {
        let count = count.max(1);
        if count >= self.len() {
            return *self;
        }
        let skip = i64::try_from(self.len() - count).unwrap_or(0);
        let start = PeriodKey::from_index(self.start.index() + skip).unwrap_or(self.start);
        Self {
            start,
            end: self.end,
        }
    }

    /// Iterates the months of the range in ascending order.
    #[must_use]
    pub fn iter(&self) -> PeriodIter {
        PeriodIter {
            next: Some(self.start),
            end: self.end,
        }
    }
}

impl IntoIterator for PeriodRange {
    type Item = PeriodKey;
    type IntoIter = PeriodIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending iterator over a [`PeriodRange`].
#[derive(Debug, Clone)]
pub struct PeriodIter {
    next: Option<PeriodKey>,
    end: PeriodKey,
}

impl Iterator for PeriodIter {
    type Item = PeriodKey;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = if current < self.end {
            current.next()
        } else {
            None
        };
        Some(current)
    }
}
