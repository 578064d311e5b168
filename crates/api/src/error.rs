// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use metricache::CacheError;
use metricache_domain::DomainError;
use metricache_persistence::PersistenceError;
use thiserror::Error;

/// API-level errors.
///
/// These are distinct from domain and cache errors and represent the API
/// contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Invalid input was provided.
    #[error("Invalid input for field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// The source system failed while recomputing.
    #[error("Source failure: {message}")]
    SourceFailure {
        /// A human-readable description of the failure.
        message: String,
        /// Whether the same request may succeed later.
        retryable: bool,
    },
    /// The source delivered records that could not be aggregated.
    #[error("Aggregation failed: {message}")]
    AggregationFailed {
        /// A human-readable description of the failure.
        message: String,
    },
    /// An internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Whether the caller may retry the same request.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::SourceFailure { retryable: true, .. })
    }
}

/// Translates a domain error into an API error.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let field = match &err {
        DomainError::InvalidMonth { .. } => "month",
        DomainError::InvalidYear { .. } => "year",
        DomainError::InvalidPeriod { .. } => "period",
        DomainError::InvalidPeriodRange { .. } => "range",
        DomainError::UnknownMetricKind(_) => "kind",
        DomainError::InvalidDecimal { .. } => {
            return ApiError::Internal {
                message: err.to_string(),
            };
        }
    };
    ApiError::InvalidInput {
        field: String::from(field),
        message: err.to_string(),
    }
}

/// Translates a cache error into an API error.
///
/// Store failures and aborted computations are internal; the caller cannot
/// do anything about them beyond retrying.
#[must_use]
pub fn translate_cache_error(err: CacheError) -> ApiError {
    match err {
        CacheError::SourceUnavailable(_) | CacheError::SourceTimeout { .. } => {
            ApiError::SourceFailure {
                message: err.to_string(),
                retryable: true,
            }
        }
        CacheError::Aggregation(inner) => ApiError::AggregationFailed {
            message: inner.to_string(),
        },
        CacheError::InvalidKey(inner) => translate_domain_error(inner),
        CacheError::Store(_) | CacheError::ComputationAborted { .. } => ApiError::Internal {
            message: err.to_string(),
        },
    }
}

/// Translates a persistence error into an API error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::InvalidSettings(message) => ApiError::InvalidInput {
            field: String::from("settings"),
            message,
        },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        translate_domain_error(err)
    }
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        translate_cache_error(err)
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        translate_persistence_error(err)
    }
}
