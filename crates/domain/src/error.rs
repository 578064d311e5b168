// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;

/// Errors that can occur while constructing or parsing domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Month is outside `1..=12`.
    #[error("Invalid month {month}: must be between 1 and 12")]
    InvalidMonth {
        /// The rejected month value.
        month: u8,
    },
    /// Year is outside the supported calendar range.
    #[error("Invalid year {year}")]
    InvalidYear {
        /// The rejected year value.
        year: i32,
    },
    /// A period string was not in `YYYY-MM` form.
    #[error("Invalid period '{value}': expected YYYY-MM")]
    InvalidPeriod {
        /// The rejected input.
        value: String,
    },
    /// A period range ends before it starts.
    #[error("Invalid period range: {start} is after {end}")]
    InvalidPeriodRange {
        /// First period of the range.
        start: String,
        /// Last period of the range.
        end: String,
    },
    /// A stored decimal value could not be parsed.
    #[error("Invalid decimal '{value}': {reason}")]
    InvalidDecimal {
        /// The rejected input.
        value: String,
        /// Parser message.
        reason: String,
    },
    /// A metric kind name was not recognised.
    #[error("Unknown metric kind '{0}'")]
    UnknownMetricKind(String),
}

/// Errors raised while folding raw source records into metric components.
///
/// Any of these aborts a single aggregation; no partial result is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    /// A monetary field carried a negative value.
    #[error("Record {record_id} has negative amount {value}")]
    NegativeAmount {
        /// Source identifier of the record.
        record_id: i64,
        /// The offending value, rendered as text.
        value: String,
    },
    /// An hours field carried a negative value.
    #[error("Record {record_id} has negative hours {value}")]
    NegativeHours {
        /// Source identifier of the record.
        record_id: i64,
        /// The offending value, rendered as text.
        value: String,
    },
    /// A running sum exceeded the decimal range.
    #[error("Decimal overflow while summing {field}")]
    Overflow {
        /// The component being accumulated.
        field: &'static str,
    },
    /// The source delivered a record that could not be decoded.
    #[error("Malformed source record: {reason}")]
    MalformedRecord {
        /// Decoder message.
        reason: String,
    },
}
